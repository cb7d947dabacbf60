//! Application Layer
//!
//! User-facing CLI, configuration management, and the trace replay driver.

pub mod cli;
pub mod config;
pub mod replay;

pub use cli::Cli;
pub use config::Config;
pub use replay::{ReplaySummary, ScoreBucket};
