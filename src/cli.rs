use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Fixed relative location of the fixture database
pub const DEFAULT_FIXTURE_PATH: &str = "tests/fixtures/board-minimal.db";

#[derive(Parser)]
#[command(name = "boardfix")]
#[command(about = "Minimal board fixture tooling")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a fresh fixture database
    Create {
        /// Fixture database path
        #[arg(long, default_value = DEFAULT_FIXTURE_PATH)]
        db: PathBuf,
    },

    /// Verify an existing fixture database
    Verify {
        /// Fixture database path
        #[arg(long, default_value = DEFAULT_FIXTURE_PATH)]
        db: PathBuf,
    },

    /// Export, re-import, and re-verify the fixture
    RoundTrip {
        /// Fixture database path
        #[arg(long, default_value = DEFAULT_FIXTURE_PATH)]
        db: PathBuf,
    },
}
