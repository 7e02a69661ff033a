//! Dashboard and report command implementations

use anyhow::{Context, Result};
use pennycast_core::dashboard::{category_breakdown, daily_trend};
use chrono::NaiveDate;
use pennycast_core::{
    aggregate_monthly, format_amount, BudgetCheck, BudgetStatus, Forecast, Session,
};

use super::core::{open_session, today, GlobalOpts};
use super::truncate;

fn budget_icon(check: &BudgetCheck) -> &'static str {
    match check.status {
        BudgetStatus::Over { .. } => "🚨",
        BudgetStatus::Under { .. } => "✅",
        BudgetStatus::NotSet => "ℹ️ ",
    }
}

fn print_forecast(forecast: &Forecast, currency: &str) {
    println!(
        "  🔮 Forecast for {}: {}",
        forecast.month,
        format_amount(forecast.amount, currency)
    );
    println!(
        "  {} {}",
        budget_icon(&forecast.budget),
        forecast.budget.message
    );
}

/// JSON bodies printed by the `--json` variants of the report commands
pub fn dashboard_json(session: &Session, today: NaiveDate) -> Result<String> {
    let dashboard = session
        .dashboard(today)
        .context("Failed to build dashboard")?;
    Ok(serde_json::to_string_pretty(&dashboard)?)
}

pub fn monthly_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(&aggregate_monthly(
        session.transactions(),
    ))?)
}

pub fn forecast_json(session: &Session, today: NaiveDate) -> Result<String> {
    let dashboard = session
        .dashboard(today)
        .context("Failed to build forecast")?;
    let value = serde_json::json!({
        "series": dashboard.forecast_series(),
        "forecast": dashboard.forecast,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn categories_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(&category_breakdown(
        session.transactions(),
    ))?)
}

pub fn trend_json(session: &Session) -> Result<String> {
    Ok(serde_json::to_string_pretty(&daily_trend(
        session.transactions(),
    ))?)
}

pub fn cmd_dashboard(opts: &GlobalOpts, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    if json {
        println!("{}", dashboard_json(&session, today())?);
        return Ok(());
    }

    let dashboard = session
        .dashboard(today())
        .context("Failed to build dashboard")?;

    let currency = session.currency_symbol();

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💰 Pennycast Dashboard          │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  Total Expenses:   {}",
        format_amount(dashboard.total_expenses, currency)
    );
    println!(
        "  Monthly Average:  {}",
        format_amount(dashboard.average_monthly, currency)
    );
    println!("  Transactions:     {}", dashboard.transaction_count);
    println!("  Months of Data:   {}", dashboard.monthly.len());
    if session.budget() > 0.0 {
        println!(
            "  Monthly Budget:   {}",
            format_amount(session.budget(), currency)
        );
    }
    println!();

    match &dashboard.forecast {
        Some(forecast) => print_forecast(forecast, currency),
        None => {
            println!("  ℹ️  Not enough data to forecast yet. Add expenses for at least 2 months.")
        }
    }
    println!();

    if let Some(top) = dashboard.categories.first() {
        println!(
            "  🏷️  Top Category: {} ({:.1}%)",
            top.category, top.percentage
        );
        println!();
    }

    if dashboard.transaction_count == 0 {
        println!("  Add an expense with 'pennycast add' or load a CSV with 'pennycast import'.");
    }

    Ok(())
}

pub fn cmd_report_monthly(opts: &GlobalOpts, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    if json {
        println!("{}", monthly_json(&session)?);
        return Ok(());
    }

    let monthly = aggregate_monthly(session.transactions());

    println!();
    println!("📅 Monthly Totals");
    println!("   ─────────────────────────────────────────────────────────────");

    if monthly.is_empty() {
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    println!(
        "   {:8} │ {:>5} │ {:>12} │ {:>5}",
        "Month", "Index", "Amount", "Count"
    );
    println!("   ─────────┼───────┼──────────────┼───────");

    for month in &monthly {
        println!(
            "   {:8} │ {:>5} │ {:>12.2} │ {:>5}",
            month.month.to_string(),
            month.month_index,
            month.amount,
            month.transaction_count
        );
    }

    let total: f64 = monthly.iter().map(|m| m.amount).sum();
    println!("   ─────────┼───────┼──────────────┼───────");
    println!("   {:8} │ {:>5} │ {:>12.2} │", "Total", "", total);
    println!(
        "   {:8} │ {:>5} │ {:>12.2} │",
        "Average",
        "",
        total / monthly.len() as f64
    );

    Ok(())
}

pub fn cmd_report_forecast(opts: &GlobalOpts, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    if json {
        println!("{}", forecast_json(&session, today())?);
        return Ok(());
    }

    let dashboard = session
        .dashboard(today())
        .context("Failed to build forecast")?;
    let series = dashboard.forecast_series();

    println!();
    println!("🔮 Expense Forecast");
    println!("   ─────────────────────────────────────────────────────────────");

    if series.is_empty() {
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    println!("   {:8} │ {:>12} │ {}", "Month", "Amount", "Kind");
    println!("   ─────────┼──────────────┼──────────");
    for point in &series {
        println!(
            "   {:8} │ {:>12.2} │ {}",
            point.period,
            point.amount,
            if point.forecast { "forecast" } else { "actual" }
        );
    }
    println!();

    match &dashboard.forecast {
        Some(forecast) => print_forecast(forecast, session.currency_symbol()),
        None => println!("   Not enough data to forecast yet (need at least 2 months)."),
    }

    Ok(())
}

pub fn cmd_report_categories(opts: &GlobalOpts, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    if json {
        println!("{}", categories_json(&session)?);
        return Ok(());
    }

    let categories = category_breakdown(session.transactions());

    println!();
    println!("🏷️  Spending by Category");
    println!("   ─────────────────────────────────────────────────────────────");

    if categories.is_empty() {
        println!("   No expenses recorded yet.");
        return Ok(());
    }

    println!(
        "   {:20} │ {:>12} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ─────────────────────┼──────────────┼────────┼───────");

    for cat in &categories {
        println!(
            "   {:20} │ {:>12.2} │ {:>5.1}% │ {:>5}",
            truncate(&cat.category, 20),
            cat.amount,
            cat.percentage,
            cat.transaction_count
        );
    }

    Ok(())
}

pub fn cmd_report_trend(opts: &GlobalOpts, json: bool) -> Result<()> {
    let session = open_session(opts)?;
    if json {
        println!("{}", trend_json(&session)?);
        return Ok(());
    }

    let trend = daily_trend(session.transactions());

    println!();
    println!("📈 Daily Spending Trend");
    println!("   ─────────────────────────────────────────────────────────────");

    let Some(days) = trend else {
        println!("   Need expenses on at least 2 different dates to show a trend.");
        return Ok(());
    };

    let max = days.iter().map(|d| d.amount).fold(0.0_f64, f64::max);
    println!("   {:10} │ {:>12} │", "Date", "Amount");
    println!("   ───────────┼──────────────┼──────────────────────────────");

    for day in &days {
        let width = if max > 0.0 {
            ((day.amount / max) * 30.0).round() as usize
        } else {
            0
        };
        println!(
            "   {} │ {:>12.2} │ {}",
            day.date,
            day.amount,
            "█".repeat(width)
        );
    }

    Ok(())
}
