pub mod sizing;
pub mod workflow;
