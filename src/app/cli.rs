//! Command-Line Interface

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engines::EngineKind;

/// Motion Sentry - Replay pointer traces through anomaly scoring
#[derive(Parser, Debug)]
#[command(name = "motion-sentry")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Gesture engine selector
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineArg {
    /// Count completed clockwise revolutions around the surface center
    Rotary,
    /// Chase relocating targets on a square grid
    Grid,
    /// Free drawing; every path segment scores
    Freehand,
}

impl From<EngineArg> for EngineKind {
    fn from(arg: EngineArg) -> Self {
        match arg {
            EngineArg::Rotary => EngineKind::Rotary,
            EngineArg::Grid => EngineKind::GridTarget,
            EngineArg::Freehand => EngineKind::Freehand,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a recorded trace through a gesture engine and the scoring sink
    Replay {
        /// Input trace file
        #[arg(short, long)]
        input: PathBuf,

        /// Gesture engine to drive
        #[arg(short, long, value_enum, default_value = "freehand")]
        engine: EngineArg,

        /// Dry run (score batches in memory, no network)
        #[arg(long)]
        dry_run: bool,
    },

    /// Print metadata and event statistics for a trace file
    Inspect {
        /// Input trace file
        input: PathBuf,
    },

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View or modify configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the trace storage directory
    pub fn traces_dir() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".motion_sentry").join("traces"))
            .unwrap_or_else(|| PathBuf::from("traces"))
    }
}
