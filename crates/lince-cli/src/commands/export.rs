//! CSV export command implementations

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use lince_core::{db::Database, format::parse_month, ExpenseFilter, InvoiceFilter};

fn month_filter(month: Option<&str>) -> Result<Option<(i32, u32)>> {
    month
        .map(|m| parse_month(m).with_context(|| format!("Invalid --month '{}' (use YYYY-MM)", m)))
        .transpose()
}

fn write_csv(csv: &str, output: Option<PathBuf>, what: &str) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            file.write_all(csv.as_bytes())?;
            let rows = csv.lines().count().saturating_sub(1);
            println!("✅ Exported {} {} to {}", rows, what, path.display());
        }
        None => print!("{}", csv),
    }
    Ok(())
}

pub fn cmd_export_invoices(db: &Database, output: Option<PathBuf>, month: Option<&str>) -> Result<()> {
    let csv = db.export_invoices_csv(&InvoiceFilter {
        month: month_filter(month)?,
        ..Default::default()
    })?;
    write_csv(&csv, output, "invoices")
}

pub fn cmd_export_expenses(db: &Database, output: Option<PathBuf>, month: Option<&str>) -> Result<()> {
    let csv = db.export_expenses_csv(&ExpenseFilter {
        month: month_filter(month)?,
        ..Default::default()
    })?;
    write_csv(&csv, output, "expenses")
}
