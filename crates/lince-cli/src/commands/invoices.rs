//! Invoice command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lince_core::{
    db::Database,
    documents::{invoice_filename, render_invoice},
    format::{format_currency, format_naive_date, month_label, parse_month, payment_reminder_link},
    models::InvoiceStatus,
    CompanyProfile, InvoiceFilter,
};
use tracing::info;

use super::{parse_month_arg, truncate};

pub fn cmd_invoices_list(db: &Database, month: Option<&str>, status: Option<&str>) -> Result<()> {
    let month = month
        .map(|m| parse_month(m).with_context(|| format!("Invalid --month '{}' (use YYYY-MM)", m)))
        .transpose()?;
    let status = status
        .map(|s| s.parse::<InvoiceStatus>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let invoices = db.list_invoices(&InvoiceFilter {
        month,
        status,
        ..Default::default()
    })?;

    if invoices.is_empty() {
        println!("No invoices found. Generate them with:");
        println!("  lince invoices generate");
        return Ok(());
    }

    println!();
    println!("🧾 Invoices");
    println!("   ─────────────────────────────────────────────────────────────");

    let mut total = 0.0;
    for invoice in &invoices {
        let icon = match invoice.status {
            InvoiceStatus::Paid => "✅",
            InvoiceStatus::Pending => "⏳",
        };
        total += invoice.amount;
        println!(
            "   {} [{:>4}] {} │ {:28} │ {:>12} │ {}{}",
            icon,
            invoice.id,
            format_naive_date(invoice.due_date),
            truncate(&invoice.customer_name, 28),
            format_currency(invoice.amount),
            invoice.status.label(),
            if invoice.whatsapp_sent { " 📱" } else { "" }
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} invoice(s), total {}",
        invoices.len(),
        format_currency(total)
    );

    Ok(())
}

pub fn cmd_invoices_generate(db: &Database, month: Option<&str>, today: NaiveDate) -> Result<()> {
    let (year, month) = parse_month_arg(month, today)?;

    println!("🧾 Generating invoices for {}...", month_label(year, month));

    let result = db
        .generate_monthly_invoices(year, month, today)
        .context("Invoice generation failed")?;

    info!(
        created = result.created,
        skipped = result.skipped,
        invalid_due_day = result.invalid_due_day,
        "Monthly invoice generation finished"
    );

    if result.created > 0 {
        println!("✅ {}", result.message);
    } else {
        println!("ℹ️  {}", result.message);
    }
    if result.skipped > 0 {
        println!("   {} customer(s) already invoiced", result.skipped);
    }
    if result.invalid_due_day > 0 {
        println!(
            "   ⚠️  {} customer(s) skipped for an invalid due day",
            result.invalid_due_day
        );
    }

    Ok(())
}

pub fn cmd_invoices_toggle(db: &Database, id: i64) -> Result<()> {
    let status = db
        .toggle_invoice_status(id)
        .with_context(|| format!("Failed to toggle invoice {}", id))?;

    match status {
        InvoiceStatus::Paid => println!("✅ Invoice {} marked as paid", id),
        InvoiceStatus::Pending => println!("⏳ Invoice {} back to pending", id),
    }
    Ok(())
}

pub fn cmd_invoices_whatsapp(db: &Database, company: &CompanyProfile, id: i64) -> Result<()> {
    let invoice = db
        .get_invoice(id)?
        .with_context(|| format!("Invoice not found: {}", id))?;
    let customer = match invoice.customer_id {
        Some(customer_id) => db.get_customer(customer_id)?,
        None => None,
    }
    .with_context(|| format!("Customer of invoice {} no longer exists", id))?;

    let link = payment_reminder_link(
        company,
        &customer.phone,
        &customer.name,
        invoice.due_date,
        invoice.amount,
    );
    db.mark_whatsapp_sent(id)?;

    println!("📱 Reminder for {}:", customer.name);
    println!("{}", link);
    Ok(())
}

pub fn cmd_invoices_render(
    db: &Database,
    company: &CompanyProfile,
    id: i64,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> Result<()> {
    let invoice = db
        .get_invoice(id)?
        .with_context(|| format!("Invoice not found: {}", id))?;
    let customer = match invoice.customer_id {
        Some(customer_id) => db.get_customer(customer_id)?,
        None => None,
    }
    .with_context(|| format!("Customer of invoice {} no longer exists", id))?;

    let html = render_invoice(&invoice, &customer, company, today);
    let path = output.unwrap_or_else(|| PathBuf::from(invoice_filename(&invoice)));
    fs::write(&path, html)
        .with_context(|| format!("Failed to write invoice: {}", path.display()))?;

    println!("📄 Invoice written to {}", path.display());
    Ok(())
}
