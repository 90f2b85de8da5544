use clap::{Parser, Subcommand};
use std::path::PathBuf;

use flixdeck::Row;

#[derive(Parser)]
#[command(name = "flixdeck")]
#[command(author, version, about = "Browse the TMDB catalog from the command line")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch browse rows (all rows when none are named)
    Rows {
        /// Row to fetch; repeat for several
        #[arg(short, long = "row", value_parser = clap::value_parser!(Row))]
        rows: Vec<Row>,
    },

    /// Look up the trailer and genres for a movie or show
    Trailer {
        /// Catalog id of the title
        id: u64,

        /// Treat the id as a TV show instead of a movie
        #[arg(long)]
        tv: bool,
    },

    /// Search movies, shows, and people
    Search {
        /// Search text
        #[arg(required = true)]
        query: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
