//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `categories` - Category definition inspection (list, test)
//! - `categorize` - The load → filter → categorize → store pipeline
//! - `core` - Shared utilities (open_db, definition and budget loading)
//! - `reports` - Dashboard, JSON report and drill-down

pub mod categories;
pub mod categorize;
pub mod core;
pub mod reports;

// Re-export command functions for main.rs
pub use categories::*;
pub use categorize::*;
pub use core::*;
pub use reports::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
