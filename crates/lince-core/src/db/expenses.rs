//! Expense operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{date_column, date_param, enum_column, opt_date_column, parse_datetime, Database};
use crate::error::{Error, Result};
use crate::format::month_key;
use crate::models::{Expense, ExpenseCategory, ExpenseStatus, NewExpense};

const EXPENSE_COLUMNS: &str = "id, description, category, amount, due_date, payment_date, status, \
     vendor, notes, created_at, updated_at";

/// Filters for listing expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub month: Option<(i32, u32)>,
    pub category: Option<ExpenseCategory>,
    pub status: Option<ExpenseStatus>,
}

fn row_to_expense(row: &rusqlite::Row) -> rusqlite::Result<Expense> {
    let created_at: String = row.get(9)?;
    let updated_at: String = row.get(10)?;
    Ok(Expense {
        id: row.get(0)?,
        description: row.get(1)?,
        category: enum_column(row, 2)?,
        amount: row.get(3)?,
        due_date: date_column(row, 4)?,
        payment_date: opt_date_column(row, 5)?,
        status: enum_column(row, 6)?,
        vendor: row.get(7)?,
        notes: row.get(8)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

impl Database {
    pub fn create_expense(&self, expense: &NewExpense) -> Result<i64> {
        expense.validate()?;
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO expenses (description, category, amount, due_date, payment_date, status, vendor, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                expense.description.trim(),
                expense.category.as_str(),
                expense.amount,
                date_param(expense.due_date),
                expense.payment_date.map(date_param),
                expense.status.as_str(),
                expense.vendor,
                expense.notes,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update_expense(&self, id: i64, expense: &NewExpense) -> Result<()> {
        expense.validate()?;
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE expenses
            SET description = ?, category = ?, amount = ?, due_date = ?, payment_date = ?,
                status = ?, vendor = ?, notes = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![
                expense.description.trim(),
                expense.category.as_str(),
                expense.amount,
                date_param(expense.due_date),
                expense.payment_date.map(date_param),
                expense.status.as_str(),
                expense.vendor,
                expense.notes,
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        Ok(())
    }

    pub fn get_expense(&self, id: i64) -> Result<Option<Expense>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM expenses WHERE id = ?", EXPENSE_COLUMNS),
            params![id],
            row_to_expense,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List expenses, latest due date first
    pub fn list_expenses(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>> {
        let conn = self.conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some((year, month)) = filter.month {
            conditions.push("substr(due_date, 1, 7) = ?");
            values.push(Box::new(month_key(year, month)));
        }
        if let Some(category) = filter.category {
            conditions.push("category = ?");
            values.push(Box::new(category.as_str()));
        }
        if let Some(status) = filter.status {
            conditions.push("status = ?");
            values.push(Box::new(status.as_str()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT {} FROM expenses {} ORDER BY due_date DESC, id DESC",
            EXPENSE_COLUMNS, where_clause
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let expenses = stmt
            .query_map(params_refs.as_slice(), row_to_expense)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(expenses)
    }

    pub fn delete_expense(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM expenses WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Toggle paid status and return the updated expense
    ///
    /// Pending or overdue becomes paid with `today` as the payment date. Paid
    /// clears the payment date and goes back to overdue when the due date is
    /// before `today`, otherwise to pending.
    pub fn toggle_expense_status(&self, id: i64, today: NaiveDate) -> Result<Expense> {
        let conn = self.conn()?;
        // SET expressions see the pre-update row
        let changed = conn.execute(
            r#"
            UPDATE expenses
            SET status = CASE
                    WHEN status <> 'paid' THEN 'paid'
                    WHEN due_date < ?1 THEN 'overdue'
                    ELSE 'pending'
                END,
                payment_date = CASE status WHEN 'paid' THEN NULL ELSE ?1 END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?2
            "#,
            params![date_param(today), id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Expense {}", id)));
        }
        drop(conn);

        self.get_expense(id)?
            .ok_or_else(|| Error::NotFound(format!("Expense {}", id)))
    }

    /// Mark pending expenses due before `today` as overdue
    pub fn refresh_overdue_expenses(&self, today: NaiveDate) -> Result<usize> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE expenses
            SET status = 'overdue', updated_at = CURRENT_TIMESTAMP
            WHERE status = 'pending' AND due_date < ?
            "#,
            params![date_param(today)],
        )?;
        if changed > 0 {
            info!(count = changed, "Marked expenses overdue");
        }
        Ok(changed)
    }
}
