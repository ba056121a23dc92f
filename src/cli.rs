use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "release-sync",
    version,
    about = "Sync Boost release downloads and release notes into a local store"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log progress at info level
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Register a release, e.g. `boost-1.81.0`
    AddVersion {
        name: String,
        /// Release date (YYYY-MM-DD)
        #[arg(long)]
        release_date: Option<NaiveDate>,
        /// Mark the version inactive
        #[arg(long)]
        inactive: bool,
    },
    /// List known versions
    List,
    /// Fetch a version's downloads from Artifactory and store them
    Downloads { version_id: i64 },
    /// Fetch a version's release notes and store them
    Notes { version_id: i64 },
    /// Print a version with its downloads and release notes
    Show {
        version_id: i64,
        /// Wrap release notes at this many columns
        #[arg(long, default_value_t = 80)]
        width: usize,
    },
}
