//! Invoice operations: CRUD, monthly generation, status and WhatsApp flags

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};
use tracing::{info, warn};

use super::{
    date_column, date_param, enum_column, in_transaction, parse_datetime, Database,
};
use crate::billing::{due_date_for, first_day};
use crate::error::{is_constraint_violation, Error, Result};
use crate::format::month_key;
use crate::models::{
    GenerationResult, Invoice, InvoiceStatus, NewInvoice, MONTHLY_INVOICE_DESCRIPTION,
};

const INVOICE_COLUMNS: &str = "id, customer_id, customer_name, description, amount, vehicle_count, \
     due_date, issue_date, status, whatsapp_sent, notes, created_at, updated_at";

/// Filters for listing invoices
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Only invoices due in this (year, month)
    pub month: Option<(i32, u32)>,
    pub customer_id: Option<i64>,
    pub status: Option<InvoiceStatus>,
}

fn row_to_invoice(row: &rusqlite::Row) -> rusqlite::Result<Invoice> {
    let created_at: String = row.get(11)?;
    let updated_at: String = row.get(12)?;
    Ok(Invoice {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        customer_name: row.get(2)?,
        description: row.get(3)?,
        amount: row.get(4)?,
        vehicle_count: row.get(5)?,
        due_date: date_column(row, 6)?,
        issue_date: date_column(row, 7)?,
        status: enum_column(row, 8)?,
        whatsapp_sent: row.get(9)?,
        notes: row.get(10)?,
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

impl Database {
    /// Create an invoice by hand for one customer
    ///
    /// Fails with `Conflict` when the customer already has an invoice due that day.
    pub fn create_invoice(&self, invoice: &NewInvoice, today: NaiveDate) -> Result<i64> {
        invoice.validate()?;
        let customer = self
            .get_customer(invoice.customer_id)?
            .ok_or_else(|| Error::NotFound(format!("Customer {}", invoice.customer_id)))?;

        let conn = self.conn()?;
        let result = conn.execute(
            r#"
            INSERT INTO invoices (customer_id, customer_name, description, amount, vehicle_count,
                                  due_date, issue_date, status, whatsapp_sent, notes)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
            "#,
            params![
                customer.id,
                customer.name,
                invoice
                    .description
                    .as_deref()
                    .unwrap_or(MONTHLY_INVOICE_DESCRIPTION),
                invoice.amount,
                invoice
                    .vehicle_count
                    .unwrap_or(customer.vehicle_count() as i64),
                date_param(invoice.due_date),
                date_param(invoice.issue_date.unwrap_or(today)),
                invoice.status.as_str(),
                invoice.notes,
            ],
        );

        match result {
            Ok(_) => Ok(conn.last_insert_rowid()),
            Err(e) if is_constraint_violation(&e) => Err(Error::Conflict(format!(
                "Customer {} already has an invoice due {}",
                customer.id, invoice.due_date
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Update an invoice's editable fields
    pub fn update_invoice(&self, id: i64, invoice: &NewInvoice) -> Result<()> {
        invoice.validate()?;
        let existing = self
            .get_invoice(id)?
            .ok_or_else(|| Error::NotFound(format!("Invoice {}", id)))?;

        // Re-pointing an invoice at another customer refreshes the denormalized name
        let customer_name = if existing.customer_id == Some(invoice.customer_id) {
            existing.customer_name.clone()
        } else {
            self.get_customer(invoice.customer_id)?
                .ok_or_else(|| Error::NotFound(format!("Customer {}", invoice.customer_id)))?
                .name
        };

        let conn = self.conn()?;
        let result = conn.execute(
            r#"
            UPDATE invoices
            SET customer_id = ?, customer_name = ?, description = ?, amount = ?, vehicle_count = ?,
                due_date = ?, issue_date = ?, status = ?, notes = ?, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
            params![
                invoice.customer_id,
                customer_name,
                invoice
                    .description
                    .as_deref()
                    .unwrap_or(existing.description.as_str()),
                invoice.amount,
                invoice.vehicle_count.unwrap_or(existing.vehicle_count),
                date_param(invoice.due_date),
                date_param(invoice.issue_date.unwrap_or(existing.issue_date)),
                invoice.status.as_str(),
                invoice.notes,
                id,
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_constraint_violation(&e) => Err(Error::Conflict(format!(
                "Customer {} already has an invoice due {}",
                invoice.customer_id, invoice.due_date
            ))),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_invoice(&self, id: i64) -> Result<Option<Invoice>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM invoices WHERE id = ?", INVOICE_COLUMNS),
            params![id],
            row_to_invoice,
        )
        .optional()
        .map_err(Into::into)
    }

    /// List invoices, latest due date first
    pub fn list_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<Invoice>> {
        let conn = self.conn()?;

        let mut conditions: Vec<&str> = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some((year, month)) = filter.month {
            conditions.push("substr(due_date, 1, 7) = ?");
            values.push(Box::new(month_key(year, month)));
        }
        if let Some(customer_id) = filter.customer_id {
            conditions.push("customer_id = ?");
            values.push(Box::new(customer_id));
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
            "SELECT {} FROM invoices {} ORDER BY due_date DESC, id DESC",
            INVOICE_COLUMNS, where_clause
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> = values.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let invoices = stmt
            .query_map(params_refs.as_slice(), row_to_invoice)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(invoices)
    }

    pub fn delete_invoice(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM invoices WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Whether a customer already has an invoice due on `due_date`
    pub fn invoice_exists(&self, customer_id: i64, due_date: NaiveDate) -> Result<bool> {
        let conn = self.conn()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM invoices WHERE customer_id = ? AND due_date = ?)",
            params![customer_id, date_param(due_date)],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Ensure every active customer has one invoice for the month
    ///
    /// All inserts run in one transaction and rely on UNIQUE(customer_id, due_date),
    /// so repeated or concurrent runs never create duplicates.
    pub fn generate_monthly_invoices(
        &self,
        year: i32,
        month: u32,
        today: NaiveDate,
    ) -> Result<GenerationResult> {
        first_day(year, month)?;
        let customers = self.list_active_customers()?;
        let conn = self.conn()?;

        let (created, invalid_due_day) = in_transaction(&conn, |conn| {
            let mut stmt = conn.prepare(
                r#"
                INSERT INTO invoices (customer_id, customer_name, description, amount, vehicle_count,
                                      due_date, issue_date, status, whatsapp_sent)
                VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', 0)
                ON CONFLICT(customer_id, due_date) DO NOTHING
                "#,
            )?;

            let mut created = 0;
            let mut invalid = 0;
            for customer in &customers {
                let due_date = match due_date_for(year, month, &customer.due_day) {
                    Ok(date) => date,
                    Err(e) => {
                        warn!(customer_id = customer.id, error = %e, "Skipping customer with invalid due day");
                        invalid += 1;
                        continue;
                    }
                };

                created += stmt.execute(params![
                    customer.id,
                    customer.name,
                    MONTHLY_INVOICE_DESCRIPTION,
                    customer.monthly_fee,
                    customer.vehicle_count() as i64,
                    date_param(due_date),
                    date_param(today),
                ])?;
            }
            Ok((created, invalid))
        })?;

        let skipped = customers.len() - created - invalid_due_day;
        let result = GenerationResult::new(year, month, created, skipped, invalid_due_day);
        info!(
            month = %month_key(year, month),
            created = result.created,
            skipped = result.skipped,
            invalid_due_day = result.invalid_due_day,
            "Generated monthly invoices"
        );
        Ok(result)
    }

    /// Flip pending/paid and return the new status
    pub fn toggle_invoice_status(&self, id: i64) -> Result<InvoiceStatus> {
        let conn = self.conn()?;
        conn.query_row(
            r#"
            UPDATE invoices
            SET status = CASE status WHEN 'paid' THEN 'pending' ELSE 'paid' END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            RETURNING status
            "#,
            params![id],
            |row| enum_column(row, 0),
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Invoice {}", id)))
    }

    /// Record that the payment reminder link was opened for this invoice
    pub fn mark_whatsapp_sent(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            "UPDATE invoices SET whatsapp_sent = 1, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
            params![id],
        )?;
        if changed == 0 {
            return Err(Error::NotFound(format!("Invoice {}", id)));
        }
        Ok(())
    }
}
