//! Lince Core Library
//!
//! Shared functionality for the Lince Track back office:
//! - Database access and migrations (customers, vehicles, invoices, expenses, proposals)
//! - Monthly invoice generation and status toggles
//! - Period reports and dashboard aggregation
//! - Brazilian formatting and WhatsApp reminder links
//! - Printable HTML documents (invoice, proposal, expense list)
//! - CSV export

pub mod billing;
pub mod config;
pub mod db;
pub mod documents;
pub mod error;
pub mod export;
pub mod format;
pub mod models;
pub mod reports;

pub use config::CompanyProfile;
pub use db::{AuditEntry, Database, ExpenseFilter, InvoiceFilter};
pub use error::{Error, Result};
pub use reports::Period;
