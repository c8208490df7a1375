//! Expense command implementations

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use lince_core::{
    db::Database,
    documents::render_expense_list,
    format::{format_currency, format_naive_date, month_label, parse_month},
    models::{ExpenseCategory, ExpenseStatus, NewExpense},
    CompanyProfile, ExpenseFilter,
};

use super::{parse_month_arg, truncate};

pub fn cmd_expenses_list(
    db: &Database,
    month: Option<&str>,
    category: Option<&str>,
    status: Option<&str>,
    today: NaiveDate,
) -> Result<()> {
    let month = month
        .map(|m| parse_month(m).with_context(|| format!("Invalid --month '{}' (use YYYY-MM)", m)))
        .transpose()?;
    let category = category
        .map(|c| c.parse::<ExpenseCategory>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;
    let status = status
        .map(|s| s.parse::<ExpenseStatus>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    db.refresh_overdue_expenses(today)?;
    let expenses = db.list_expenses(&ExpenseFilter {
        month,
        category,
        status,
    })?;

    if expenses.is_empty() {
        println!("No expenses found.");
        return Ok(());
    }

    println!();
    println!("💸 Expenses");
    println!("   ─────────────────────────────────────────────────────────────");

    let mut total = 0.0;
    for expense in &expenses {
        let icon = match expense.status {
            ExpenseStatus::Paid => "✅",
            ExpenseStatus::Pending => "⏳",
            ExpenseStatus::Overdue => "🔴",
        };
        total += expense.amount;
        println!(
            "   {} [{:>4}] {} │ {:28} │ {:20} │ {:>12}",
            icon,
            expense.id,
            format_naive_date(expense.due_date),
            truncate(&expense.description, 28),
            truncate(expense.category.as_str(), 20),
            format_currency(expense.amount)
        );
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {} expense(s), total {}",
        expenses.len(),
        format_currency(total)
    );

    Ok(())
}

pub fn cmd_expenses_add(
    db: &Database,
    description: &str,
    category: &str,
    amount: f64,
    due: &str,
    vendor: Option<&str>,
) -> Result<()> {
    let category: ExpenseCategory = category.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let due_date = NaiveDate::parse_from_str(due, "%Y-%m-%d")
        .context("Invalid --due date format (use YYYY-MM-DD)")?;

    let id = db.create_expense(&NewExpense {
        description: description.to_string(),
        category,
        amount,
        due_date,
        payment_date: None,
        status: ExpenseStatus::Pending,
        vendor: vendor.map(String::from),
        notes: None,
    })?;

    println!(
        "✅ Added expense #{}: {} ({}) due {}",
        id,
        description,
        format_currency(amount),
        format_naive_date(due_date)
    );
    Ok(())
}

pub fn cmd_expenses_toggle(db: &Database, id: i64, today: NaiveDate) -> Result<()> {
    let expense = db
        .toggle_expense_status(id, today)
        .with_context(|| format!("Failed to toggle expense {}", id))?;

    match expense.payment_date {
        Some(paid) => println!(
            "✅ Expense {} paid on {}",
            id,
            format_naive_date(paid)
        ),
        None => println!("⏳ Expense {} is {}", id, expense.status.label()),
    }
    Ok(())
}

pub fn cmd_expenses_refresh_overdue(db: &Database, today: NaiveDate) -> Result<()> {
    let count = db.refresh_overdue_expenses(today)?;

    if count > 0 {
        println!("🔴 Marked {} expense(s) as overdue", count);
    } else {
        println!("✅ No new overdue expenses");
    }
    Ok(())
}

pub fn cmd_expenses_render(
    db: &Database,
    company: &CompanyProfile,
    month: Option<&str>,
    output: Option<PathBuf>,
    today: NaiveDate,
) -> Result<()> {
    let (year, month) = parse_month_arg(month, today)?;

    db.refresh_overdue_expenses(today)?;
    let expenses = db.list_expenses(&ExpenseFilter {
        month: Some((year, month)),
        ..Default::default()
    })?;

    let html = render_expense_list(&expenses, &month_label(year, month), company);
    let path = output
        .unwrap_or_else(|| PathBuf::from(format!("despesas-{:04}-{:02}.html", year, month)));
    fs::write(&path, html)
        .with_context(|| format!("Failed to write expense list: {}", path.display()))?;

    println!(
        "📄 {} expense(s) written to {}",
        expenses.len(),
        path.display()
    );
    Ok(())
}
