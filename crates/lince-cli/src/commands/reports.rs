//! Report command implementations

use anyhow::Result;
use chrono::NaiveDate;
use lince_core::{
    db::Database,
    format::{format_currency, format_naive_date},
    reports, ExpenseFilter, InvoiceFilter, Period,
};

use super::truncate;

pub fn cmd_report_invoices(db: &Database, period: &Period) -> Result<()> {
    let invoices = db.list_invoices(&InvoiceFilter::default())?;
    let summary = reports::summarize_invoices(&invoices, period);

    println!();
    println!("🧾 Invoices: {}", period.label());
    println!("   ─────────────────────────────────────────");
    println!("   Invoices:  {}", summary.count);
    println!("   Total:     {:>14}", format_currency(summary.total));
    println!("   Paid:      {:>14}", format_currency(summary.paid));
    println!("   Pending:   {:>14}", format_currency(summary.pending));

    Ok(())
}

pub fn cmd_report_expenses(db: &Database, period: &Period, today: NaiveDate) -> Result<()> {
    db.refresh_overdue_expenses(today)?;
    let expenses = db.list_expenses(&ExpenseFilter::default())?;
    let summary = reports::summarize_expenses(&expenses, period);

    println!();
    println!("💸 Expenses: {}", period.label());
    println!("   ─────────────────────────────────────────");
    println!("   Expenses:  {}", summary.count);
    println!("   Total:     {:>14}", format_currency(summary.total));
    println!("   Paid:      {:>14}", format_currency(summary.paid));
    println!("   Pending:   {:>14}", format_currency(summary.pending));
    println!("   Overdue:   {:>14}", format_currency(summary.overdue));

    if !summary.by_category.is_empty() {
        println!();
        println!("   By category:");
        let mut categories: Vec<_> = summary.by_category.iter().collect();
        categories.sort_by(|a, b| b.1.total_cmp(a.1));
        for (category, amount) in categories {
            println!(
                "     {:28} {:>14}",
                truncate(category, 28),
                format_currency(*amount)
            );
        }
    }

    Ok(())
}

pub fn cmd_report_financial(db: &Database, period: &Period) -> Result<()> {
    let invoices = db.list_invoices(&InvoiceFilter::default())?;
    let expenses = db.list_expenses(&ExpenseFilter::default())?;
    let summary = reports::financial_summary(&invoices, &expenses, period)?;

    println!();
    println!("📊 Financial result: {}", period.label());
    println!("   ─────────────────────────────────────────");
    println!(
        "   Revenue (paid):   {:>14}  ({} invoice(s))",
        format_currency(summary.revenue),
        summary.paid_invoices.len()
    );
    println!(
        "   Expenses (paid):  {:>14}  ({} expense(s))",
        format_currency(summary.expenses),
        summary.paid_expenses.len()
    );
    let icon = if summary.result >= 0.0 { "📈" } else { "📉" };
    println!(
        "   {} Result:        {:>14}",
        icon,
        format_currency(summary.result)
    );
    println!("   Margin:           {:>13.1}%", summary.margin_percent);

    if !summary.paid_expenses.is_empty() {
        println!();
        println!("   Paid expenses:");
        for expense in &summary.paid_expenses {
            println!(
                "     {} {:28} {:>14}",
                expense
                    .payment_date
                    .map(format_naive_date)
                    .unwrap_or_else(|| format_naive_date(expense.due_date)),
                truncate(&expense.description, 28),
                format_currency(expense.amount)
            );
        }
    }

    Ok(())
}

pub fn cmd_report_customers(db: &Database) -> Result<()> {
    let summary = reports::summarize_customers(&db.list_customers()?);

    println!();
    println!("👥 Customer base");
    println!("   ─────────────────────────────────────────");
    println!("   Customers:        {}", summary.total);
    println!("   Active:           {}", summary.active);
    println!("   Inactive:         {}", summary.inactive);
    println!("   Vehicles:         {}", summary.vehicle_count);
    println!(
        "   Monthly revenue:  {}",
        format_currency(summary.monthly_revenue)
    );

    Ok(())
}
