//! Forecast model commands

use anyhow::{Context, Result};
use pennycast_core::Regressor;

use super::core::{open_session, print_commit, GlobalOpts};

pub fn cmd_retrain(opts: &GlobalOpts) -> Result<()> {
    println!("🧠 Retraining forecast model...");

    let mut session = open_session(opts)?;
    let report = session.retrain().context("Cannot retrain")?;
    print_commit(&report);

    if let Some(model) = session.model() {
        println!("   Regressor: {}", model.kind());
        if let Some(trained_at) = session.model_trained_at() {
            println!("   Trained:   {}", trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }

    Ok(())
}
