pub mod client;
pub mod logging;
pub mod sizing;
pub mod streaming;
pub mod wrap;
