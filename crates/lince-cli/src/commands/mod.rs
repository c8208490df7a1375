//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init, dashboard, audit and shared utilities (open_db, load_company, parsing)
//! - `customers` - Customer commands (list, show, toggle, delete, birthdays)
//! - `expenses` - Expense commands (list, add, toggle, refresh-overdue, render)
//! - `export` - CSV export commands
//! - `invoices` - Invoice commands (list, generate, toggle, whatsapp, render)
//! - `proposals` - Proposal commands (list, status, render)
//! - `reports` - Report generation commands
//! - `serve` - Web server command

pub mod core;
pub mod customers;
pub mod expenses;
pub mod export;
pub mod invoices;
pub mod proposals;
pub mod reports;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use customers::*;
pub use expenses::*;
pub use export::*;
pub use invoices::*;
pub use proposals::*;
pub use reports::*;
pub use serve::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
