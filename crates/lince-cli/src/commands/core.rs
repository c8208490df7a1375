//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_company` - Company profile used on documents and reminders
//! - `cmd_init` - Initialize the database
//! - `cmd_dashboard` / `cmd_audit` - Overview commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lince_core::{
    db::Database,
    format::{format_currency, format_naive_date, parse_month, year_month},
    reports, CompanyProfile, ExpenseFilter, InvoiceFilter, Period,
};

use super::truncate;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Load the company profile from --company, the environment or defaults
pub fn load_company(path: Option<&Path>) -> Result<CompanyProfile> {
    CompanyProfile::load(path).context("Failed to load company profile")
}

/// Parse an optional `YYYY-MM` argument, defaulting to the month of `today`
pub fn parse_month_arg(month: Option<&str>, today: NaiveDate) -> Result<(i32, u32)> {
    match month {
        Some(m) => parse_month(m)
            .with_context(|| format!("Invalid --month '{}' (use YYYY-MM)", m)),
        None => Ok(year_month(today)),
    }
}

/// Resolve report arguments: --month wins, then --from/--to, then the current month
pub fn resolve_period(
    month: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
    today: NaiveDate,
) -> Result<Period> {
    Period::resolve(month, from, to, today).context("Invalid report period")
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    // Opening runs the migrations
    let db = open_db(db_path, no_encrypt)?;
    db.health_check().context("Database check failed")?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Start web UI: lince serve");
    println!("  2. Generate this month's invoices: lince invoices generate");

    Ok(())
}

pub fn cmd_dashboard(db: &Database, month: Option<&str>, today: NaiveDate) -> Result<()> {
    let (year, month) = parse_month_arg(month, today)?;

    db.refresh_overdue_expenses(today)?;
    let invoices = db.list_invoices(&InvoiceFilter {
        month: Some((year, month)),
        ..Default::default()
    })?;
    let expenses = db.list_expenses(&ExpenseFilter {
        month: Some((year, month)),
        ..Default::default()
    })?;
    let stats = reports::dashboard(&invoices, &expenses, year, month);

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│          🛰️  Lince Dashboard             │");
    println!("╰─────────────────────────────────────────╯");
    println!("  {}", stats.month_label);
    println!();
    println!("  Customers billed:  {}", stats.active_customers);
    println!("  Vehicles:          {}", stats.vehicle_count);
    println!("  Revenue:           {}", format_currency(stats.revenue));
    println!("  Pending:           {}", format_currency(stats.pending_revenue));
    println!("  Expenses:          {}", format_currency(stats.expenses));
    let icon = if stats.result >= 0.0 { "📈" } else { "📉" };
    println!("  {} Result:         {}", icon, format_currency(stats.result));

    if !stats.recent_invoices.is_empty() {
        println!();
        println!("  Recent invoices:");
        for invoice in &stats.recent_invoices {
            println!(
                "    {} {:24} {:>12}  {}",
                format_naive_date(invoice.due_date),
                truncate(&invoice.customer_name, 24),
                format_currency(invoice.amount),
                invoice.status.label()
            );
        }
    }

    if !stats.recent_expenses.is_empty() {
        println!();
        println!("  Recent expenses:");
        for expense in &stats.recent_expenses {
            println!(
                "    {} {:24} {:>12}  {}",
                format_naive_date(expense.due_date),
                truncate(&expense.description, 24),
                format_currency(expense.amount),
                expense.status.label()
            );
        }
    }
    println!();

    Ok(())
}

pub fn cmd_audit(db: &Database, limit: i64) -> Result<()> {
    let entries = db.list_audit_log(limit.max(1))?;

    if entries.is_empty() {
        println!("No audit entries yet.");
        return Ok(());
    }

    println!();
    println!("📜 Audit Log");
    println!("   ─────────────────────────────────────────────────────────────");

    for entry in entries {
        let target = match (&entry.entity_type, entry.entity_id) {
            (Some(kind), Some(id)) => format!("{} #{}", kind, id),
            (Some(kind), None) => kind.clone(),
            _ => String::new(),
        };
        println!(
            "   {} │ {:20} │ {:14} │ {:16} │ {}",
            entry.timestamp,
            truncate(&entry.user_email, 20),
            entry.action,
            target,
            entry.details.as_deref().unwrap_or("")
        );
    }

    Ok(())
}
