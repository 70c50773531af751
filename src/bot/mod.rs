//! Bot runtime: the update loop and its shared counters.

mod runner;
mod stats;

pub use runner::{BotRunner, RunnerMessage};
pub use stats::BotStats;
