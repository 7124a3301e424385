//! Tally CLI - Transaction categorizer
//!
//! Usage:
//!   tally categorize -i DIR -c FILE    Categorize transactions and show the dashboard
//!   tally report --top 5               Dashboard for an existing database
//!   tally drill Restaurants            Transactions in one category
//!   tally categories test "SHELL 123"  Which category a description matches

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tally_core::config::{log_filter, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }

    // Set up logging on stderr so `--json` output stays clean
    // Priority: RUST_LOG env var > --log-level/--verbose > config > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if let Some(level) = cli.log_level.as_deref() {
        EnvFilter::new(log_filter(level).unwrap_or("info"))
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(log_filter(&config.log_level).unwrap_or("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Categorize {
            input,
            categories,
            budgets,
            export,
            json,
        } => {
            let db = commands::open_db(&config.db_path)?;
            let options = commands::CategorizeOptions {
                input_dir: input.unwrap_or_else(|| config.input_dir.clone()),
                category_file: categories.unwrap_or_else(|| config.category_file.clone()),
                budget_file: budgets.or_else(|| config.budget_file.clone()),
                export,
                default_category: config.default_category.clone(),
                json,
            };
            commands::cmd_categorize(&db, &options)
        }
        Commands::Report { budgets, top, json } => {
            let db = commands::open_db(&config.db_path)?;
            let budgets = commands::load_budget_registry(
                budgets.as_deref().or(config.budget_file.as_deref()),
            )?;
            commands::cmd_report(&db, &budgets, top, json)
        }
        Commands::Drill { category, export } => {
            let db = commands::open_db(&config.db_path)?;
            commands::cmd_drill(&db, &category, export.as_deref())
        }
        Commands::Categories { action } => match action {
            CategoriesAction::List { categories } => {
                commands::cmd_categories_list(categories.as_deref().unwrap_or(&config.category_file))
            }
            CategoriesAction::Test {
                categories,
                description,
            } => commands::cmd_categories_test(
                categories.as_deref().unwrap_or(&config.category_file),
                &description,
                &config.default_category,
            ),
        },
    }
}
