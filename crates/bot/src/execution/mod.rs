pub mod allowance;
pub mod contracts;
pub mod lending;
pub mod price_feed;
pub mod swap;
pub mod tx_submitter;
