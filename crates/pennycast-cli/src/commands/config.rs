//! Settings inspection commands

use anyhow::Result;
use pennycast_core::config::default_config_path;

use super::core::{load_settings, GlobalOpts};

pub fn cmd_config_show(opts: &GlobalOpts) -> Result<()> {
    let settings = load_settings(opts)?;
    let budget = opts.budget.unwrap_or(settings.budget);

    println!();
    println!("⚙️  Settings");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Data dir:      {}", settings.data_dir.display());
    println!("   Expenses:      {}", settings.expenses_path().display());
    println!("   Model:         {}", settings.model_path().display());
    println!("   Budget:        {:.2}", budget);
    println!("   Currency:      {}", settings.currency_symbol);
    println!("   Regressor:     {}", settings.regressor);
    println!(
        "   Boosting:      {} trees, learning rate {}, depth {}",
        settings.boosting.n_estimators,
        settings.boosting.learning_rate,
        settings.boosting.max_depth
    );
    println!("   Categories:    {}", settings.categories.join(", "));

    Ok(())
}

pub fn cmd_config_path(opts: &GlobalOpts) -> Result<()> {
    match opts.config.clone().or_else(default_config_path) {
        Some(path) => {
            let status = if path.exists() { "" } else { " (not present, using defaults)" };
            println!("{}{}", path.display(), status);
        }
        None => println!("No settings directory available on this platform"),
    }
    Ok(())
}
