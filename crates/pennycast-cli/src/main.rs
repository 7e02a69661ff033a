//! Pennycast CLI - Personal expense tracker with next-month forecasting
//!
//! Usage:
//!   pennycast add --amount 250 --category Groceries   Record an expense
//!   pennycast import --file expenses.csv              Replace data with a CSV
//!   pennycast dashboard                               Totals, forecast, budget check
//!   pennycast report forecast                         History plus next month

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use commands::GlobalOpts;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging on stderr; stdout carries command output only
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();

    let opts = GlobalOpts {
        config: cli.config,
        data_dir: cli.data_dir,
        budget: cli.budget,
    };

    match cli.command {
        Commands::Add {
            amount,
            category,
            date,
            description,
        } => commands::cmd_add(
            &opts,
            amount,
            &category,
            date.as_deref(),
            description.as_deref(),
        ),
        Commands::List { limit, json } => commands::cmd_list(&opts, limit, json),
        Commands::Edit {
            row,
            amount,
            category,
            date,
            description,
            clear_description,
        } => commands::cmd_edit(
            &opts,
            row,
            amount,
            category.as_deref(),
            date.as_deref(),
            description.as_deref(),
            clear_description,
        ),
        Commands::Delete { row } => commands::cmd_delete(&opts, row),
        Commands::Import { file } => commands::cmd_import(&opts, &file),
        Commands::Retrain => commands::cmd_retrain(&opts),
        Commands::Dashboard { json } => commands::cmd_dashboard(&opts, json),
        Commands::Report { report_type } => match report_type {
            ReportType::Monthly { json } => commands::cmd_report_monthly(&opts, json),
            ReportType::Forecast { json } => commands::cmd_report_forecast(&opts, json),
            ReportType::Categories { json } => commands::cmd_report_categories(&opts, json),
            ReportType::Trend { json } => commands::cmd_report_trend(&opts, json),
        },
        Commands::Categories => commands::cmd_categories(&opts),
        Commands::Config { action } => match action {
            None | Some(ConfigAction::Show) => commands::cmd_config_show(&opts),
            Some(ConfigAction::Path) => commands::cmd_config_path(&opts),
        },
    }
}
