pub mod process;
pub mod stats;

pub use process::{process_feed, FeedReport};
pub use stats::{FeedStats, PostBudget, RunStats};
