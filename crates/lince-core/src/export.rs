//! CSV export of invoices and expenses
//!
//! Amounts are written with a dot decimal separator and dates in ISO format so
//! the files load cleanly into spreadsheets and accounting tools.

use serde::Serialize;

use crate::db::{Database, ExpenseFilter, InvoiceFilter};
use crate::error::{Error, Result};
use crate::models::{Expense, Invoice};

/// One CSV line per invoice
#[derive(Debug, Serialize)]
struct InvoiceRow<'a> {
    number: String,
    customer: &'a str,
    description: &'a str,
    vehicles: i64,
    amount: String,
    issue_date: String,
    due_date: String,
    status: &'a str,
    whatsapp_sent: &'a str,
}

/// One CSV line per expense
#[derive(Debug, Serialize)]
struct ExpenseRow<'a> {
    description: &'a str,
    category: &'a str,
    vendor: &'a str,
    amount: String,
    due_date: String,
    payment_date: String,
    status: &'a str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "sim"
    } else {
        "não"
    }
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::InvalidData(e.to_string()))
}

/// Write invoices as CSV with a header row
pub fn invoices_to_csv(invoices: &[Invoice]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for invoice in invoices {
        writer.serialize(InvoiceRow {
            number: invoice.display_number(),
            customer: &invoice.customer_name,
            description: &invoice.description,
            vehicles: invoice.vehicle_count,
            amount: format!("{:.2}", invoice.amount),
            issue_date: invoice.issue_date.to_string(),
            due_date: invoice.due_date.to_string(),
            status: invoice.status.label(),
            whatsapp_sent: yes_no(invoice.whatsapp_sent),
        })?;
    }
    if invoices.is_empty() {
        writer.write_record([
            "number",
            "customer",
            "description",
            "vehicles",
            "amount",
            "issue_date",
            "due_date",
            "status",
            "whatsapp_sent",
        ])?;
    }
    finish(writer)
}

/// Write expenses as CSV with a header row
pub fn expenses_to_csv(expenses: &[Expense]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for expense in expenses {
        writer.serialize(ExpenseRow {
            description: &expense.description,
            category: expense.category.as_str(),
            vendor: expense.vendor.as_deref().unwrap_or(""),
            amount: format!("{:.2}", expense.amount),
            due_date: expense.due_date.to_string(),
            payment_date: expense
                .payment_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            status: expense.status.label(),
        })?;
    }
    if expenses.is_empty() {
        writer.write_record([
            "description",
            "category",
            "vendor",
            "amount",
            "due_date",
            "payment_date",
            "status",
        ])?;
    }
    finish(writer)
}

impl Database {
    /// Export invoices matching the filter to CSV
    pub fn export_invoices_csv(&self, filter: &InvoiceFilter) -> Result<String> {
        let invoices = self.list_invoices(filter)?;
        invoices_to_csv(&invoices)
    }

    /// Export expenses matching the filter to CSV
    pub fn export_expenses_csv(&self, filter: &ExpenseFilter) -> Result<String> {
        let expenses = self.list_expenses(filter)?;
        expenses_to_csv(&expenses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExpenseCategory, ExpenseStatus, NewCustomer, NewExpense};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_exports_have_headers() {
        assert_eq!(
            invoices_to_csv(&[]).unwrap(),
            "number,customer,description,vehicles,amount,issue_date,due_date,status,whatsapp_sent\n"
        );
        assert_eq!(
            expenses_to_csv(&[]).unwrap(),
            "description,category,vendor,amount,due_date,payment_date,status\n"
        );
    }

    #[test]
    fn test_export_invoices_csv() {
        let db = Database::in_memory().unwrap();
        let mut customer = NewCustomer::new("Silva, Souza & Cia", "63061943000144", "44999999999");
        customer.monthly_fee = 1234.5;
        db.create_customer(&customer).unwrap();
        db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();

        let csv = db
            .export_invoices_csv(&InvoiceFilter {
                month: Some((2025, 3)),
                ..Default::default()
            })
            .unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("number,customer,"));
        assert!(lines[1].contains("\"Silva, Souza & Cia\""));
        assert!(lines[1].contains(",1234.50,2025-03-01,2025-03-10,Pendente,não"));

        let other_month = db
            .export_invoices_csv(&InvoiceFilter {
                month: Some((2025, 4)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(other_month.lines().count(), 1);
    }

    #[test]
    fn test_export_expenses_csv() {
        let db = Database::in_memory().unwrap();
        db.create_expense(&NewExpense {
            description: "Chips M2M".to_string(),
            category: ExpenseCategory::Telecom,
            amount: 89.9,
            due_date: date(2025, 3, 5),
            payment_date: Some(date(2025, 3, 4)),
            status: ExpenseStatus::Paid,
            vendor: Some("Algar".to_string()),
            notes: None,
        })
        .unwrap();

        let csv = db.export_expenses_csv(&ExpenseFilter::default()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Chips M2M,Telecomunicações,Algar,89.90,2025-03-05,2025-03-04,Pago"
        );
    }
}
