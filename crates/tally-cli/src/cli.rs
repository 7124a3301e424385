//! Command-line arguments for `tally`
//!
//! Only parsing lives here; `commands` does the work.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Categorize bank transactions by merchant
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Categorize CSV transactions using merchant matching", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to ~/.config/tally/config.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database path, or ":memory:" (overrides config)
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log level (overrides config, overridden by RUST_LOG)
    #[arg(long, global = true, value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: Option<String>,

    /// Enable verbose logging (same as --log-level DEBUG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, filter and categorize transactions, then show the dashboard
    Categorize {
        /// Directory containing transaction CSV files (or a `transactions/` folder)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Column-oriented category list
        #[arg(short, long)]
        categories: Option<PathBuf>,

        /// Category,Budget file
        #[arg(short, long)]
        budgets: Option<PathBuf>,

        /// Export the category summary to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the dashboard for transactions already in the database
    Report {
        /// Category,Budget file
        #[arg(short, long)]
        budgets: Option<PathBuf>,

        /// Only show the N largest categories
        #[arg(long)]
        top: Option<usize>,

        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List the transactions in one category, oldest first
    Drill {
        /// Exact category name
        category: String,

        /// Export the listing to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Inspect category definitions
    Categories {
        #[command(subcommand)]
        action: CategoriesAction,
    },
}

#[derive(Subcommand)]
pub enum CategoriesAction {
    /// Summarize categories, duplicate merchants and ignore patterns
    List {
        /// Column-oriented category list
        #[arg(short, long)]
        categories: Option<PathBuf>,
    },

    /// Show which category and pattern a description would match
    Test {
        /// Column-oriented category list
        #[arg(short, long)]
        categories: Option<PathBuf>,

        /// Transaction description to try
        description: String,
    },
}
