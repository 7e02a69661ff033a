//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (settings, session, row numbers)
//! - `config` - Settings inspection commands (show, path)
//! - `expenses` - Expense table commands (add, list, edit, delete, import, categories)
//! - `model` - Forecast model commands (retrain)
//! - `reports` - Dashboard and report commands

pub mod config;
pub mod core;
pub mod expenses;
pub mod model;
pub mod reports;

// Re-export command functions for main.rs
pub use config::*;
pub use self::core::*;
pub use expenses::*;
pub use model::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
