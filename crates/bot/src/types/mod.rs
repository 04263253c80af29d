pub mod position;
pub mod quote;
pub mod wad;

pub use position::Position;
pub use quote::PriceQuote;
