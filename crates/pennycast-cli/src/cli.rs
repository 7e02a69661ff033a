//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pennycast - Track expenses and forecast next month's spend
#[derive(Parser)]
#[command(name = "pennycast")]
#[command(about = "Personal expense tracker with next-month forecasting", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (defaults to ~/.local/share/pennycast/config/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding expenses.csv and the model (overrides settings)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Monthly budget for this run (overrides settings)
    #[arg(long, global = true)]
    pub budget: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new expense
    Add {
        /// Amount spent
        #[arg(short, long)]
        amount: f64,

        /// Category (see `pennycast categories`)
        #[arg(short, long)]
        category: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Optional note
        #[arg(long)]
        description: Option<String>,
    },

    /// List expenses in date order
    List {
        /// Show only the most recent N rows
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Edit an expense by row number (from `pennycast list`)
    Edit {
        /// Row number (1-based)
        row: usize,

        /// New amount
        #[arg(short, long)]
        amount: Option<f64>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// New description
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,
    },

    /// Delete an expense by row number (from `pennycast list`)
    Delete {
        /// Row number (1-based)
        row: usize,
    },

    /// Replace all expenses with a CSV file (Date, Amount, Category, Description)
    Import {
        /// CSV file to load
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Retrain the forecast model from current data
    Retrain,

    /// Show totals, the next-month forecast and the budget comparison
    Dashboard {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate reports
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// List known categories
    Categories,

    /// Inspect settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Monthly totals with month index
    Monthly {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Monthly history followed by the forecast month
    Forecast {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spending by category
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Daily spending trend
    Trend {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show resolved settings
    Show,
    /// Show the settings override path
    Path,
}
