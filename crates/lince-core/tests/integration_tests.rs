//! Integration tests for lince-core
//!
//! These tests exercise the monthly billing cycle end to end: customers with
//! vehicles, invoice generation, payment toggles, expenses and the reports
//! built on top of them.

use chrono::NaiveDate;
use lince_core::{
    db::Database,
    documents::{proposal_pdf_filename, render_invoice, render_proposal},
    format::payment_reminder_link,
    models::{
        ExpenseCategory, ExpenseStatus, InvoiceStatus, NewCustomer, NewExpense, NewProposal,
        VehicleInput,
    },
    reports::{self, Period},
    CompanyProfile, ExpenseFilter, InvoiceFilter,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn customer(name: &str, fee: f64, due_day: &str, plates: &[&str]) -> NewCustomer {
    let mut customer = NewCustomer::new(name, "63061943000144", "44999999999");
    customer.monthly_fee = fee;
    customer.due_day = due_day.to_string();
    customer.city = "Maringá".to_string();
    customer.vehicles = plates
        .iter()
        .map(|plate| VehicleInput {
            description: "Caminhão".to_string(),
            plate: plate.to_string(),
            ..Default::default()
        })
        .collect();
    customer
}

// =============================================================================
// Billing cycle
// =============================================================================

#[test]
fn test_monthly_billing_cycle() {
    let db = Database::in_memory().expect("Failed to create in-memory database");

    db.create_customer(&customer("Transportes Silva", 100.0, "5", &["AAA1111", "BBB2222"]))
        .unwrap();
    db.create_customer(&customer("Maria Souza", 50.0, "15", &["CCC3333"]))
        .unwrap();

    let result = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 1))
        .unwrap();
    assert_eq!(result.created, 2);

    // Pay the first invoice
    let march = InvoiceFilter {
        month: Some((2025, 3)),
        ..Default::default()
    };
    let invoices = db.list_invoices(&march).unwrap();
    let silva = invoices
        .iter()
        .find(|i| i.customer_name == "Transportes Silva")
        .unwrap();
    assert_eq!(db.toggle_invoice_status(silva.id).unwrap(), InvoiceStatus::Paid);

    // Aggregation: 100 paid + 50 pending
    let invoices = db.list_invoices(&InvoiceFilter::default()).unwrap();
    let summary = reports::summarize_invoices(&invoices, &Period::month(2025, 3));
    assert_eq!(summary.count, 2);
    assert_eq!(summary.total, 150.0);
    assert_eq!(summary.paid, 100.0);
    assert_eq!(summary.pending, 50.0);

    // Second run in the same month creates nothing
    let rerun = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 20))
        .unwrap();
    assert_eq!(rerun.created, 0);
    assert_eq!(db.list_invoices(&march).unwrap().len(), 2);

    // Next month is independent
    let april = db
        .generate_monthly_invoices(2025, 4, date(2025, 4, 1))
        .unwrap();
    assert_eq!(april.created, 2);
}

#[test]
fn test_financial_result_and_dashboard() {
    let db = Database::in_memory().unwrap();
    db.create_customer(&customer("Transportes Silva", 1000.0, "10", &["AAA1111"]))
        .unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();
    let invoice_id = db.list_invoices(&InvoiceFilter::default()).unwrap()[0].id;
    db.toggle_invoice_status(invoice_id).unwrap();

    let rent = db
        .create_expense(&NewExpense {
            description: "Aluguel da sala".to_string(),
            category: ExpenseCategory::Office,
            amount: 400.0,
            due_date: date(2025, 3, 5),
            payment_date: None,
            status: ExpenseStatus::Pending,
            vendor: None,
            notes: None,
        })
        .unwrap();
    db.create_expense(&NewExpense {
        description: "Chips M2M".to_string(),
        category: ExpenseCategory::Telecom,
        amount: 100.0,
        due_date: date(2025, 3, 25),
        payment_date: None,
        status: ExpenseStatus::Pending,
        vendor: Some("Algar".to_string()),
        notes: None,
    })
    .unwrap();

    db.toggle_expense_status(rent, date(2025, 3, 5)).unwrap();
    assert_eq!(db.refresh_overdue_expenses(date(2025, 3, 26)).unwrap(), 1);

    let invoices = db.list_invoices(&InvoiceFilter::default()).unwrap();
    let expenses = db.list_expenses(&ExpenseFilter::default()).unwrap();

    let financial =
        reports::financial_summary(&invoices, &expenses, &Period::month(2025, 3)).unwrap();
    assert_eq!(financial.revenue, 1000.0);
    assert_eq!(financial.expenses, 400.0);
    assert_eq!(financial.result, 600.0);
    assert_eq!(financial.margin_percent, 60.0);

    let expense_summary = reports::summarize_expenses(&expenses, &Period::month(2025, 3));
    assert_eq!(expense_summary.paid, 400.0);
    assert_eq!(expense_summary.overdue, 100.0);

    let stats = reports::dashboard(&invoices, &expenses, 2025, 3);
    assert_eq!(stats.active_customers, 1);
    assert_eq!(stats.revenue, 1000.0);
    assert_eq!(stats.pending_revenue, 0.0);
    assert_eq!(stats.expenses, 500.0);
    assert_eq!(stats.result, 600.0);
    assert_eq!(stats.vehicle_count, 1);
    assert_eq!(stats.recent_expenses[0].description, "Chips M2M");
}

#[test]
fn test_reminder_and_invoice_document() {
    let db = Database::in_memory().unwrap();
    let company = CompanyProfile::default();
    let id = db
        .create_customer(&customer("Transportes Silva", 79.9, "10", &["AAA1111"]))
        .unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();

    let invoice = db.list_invoices(&InvoiceFilter::default()).unwrap().remove(0);
    let customer = db.get_customer(id).unwrap().unwrap();

    let link = payment_reminder_link(
        &company,
        &customer.phone,
        &customer.name,
        invoice.due_date,
        invoice.amount,
    );
    assert!(link.starts_with("https://wa.me/5544999999999?text="));
    assert!(link.contains("%5B03%2F2025%5D"));
    db.mark_whatsapp_sent(invoice.id).unwrap();
    assert!(db.get_invoice(invoice.id).unwrap().unwrap().whatsapp_sent);

    let html = render_invoice(&invoice, &customer, &company, date(2025, 3, 2));
    assert!(html.contains("R$ 79,90"));
    assert!(html.contains("Transportes Silva"));
    assert!(html.contains(&format!(">{}</p>", invoice.display_number())));
}

#[test]
fn test_proposal_workflow() {
    let db = Database::in_memory().unwrap();
    let mut new = NewProposal::new("Frota Norte", "44988887777", "63061943000144");
    new.vehicle_count = 4;
    let id = db.create_proposal(&new, date(2025, 3, 10)).unwrap();

    let proposal = db.get_proposal(id).unwrap().unwrap();
    assert_eq!(proposal_pdf_filename(proposal.number), "proposta-comercial-0001.pdf");

    let html = render_proposal(&proposal, &CompanyProfile::default(), date(2025, 3, 10));
    assert!(html.contains("R$ 159,60"));
    assert!(html.contains("GRATUITA"));

    db.set_proposal_status(id, lince_core::models::ProposalStatus::Sent)
        .unwrap();
    let stats = reports::proposal_stats(&db.list_proposals().unwrap());
    assert_eq!(stats.total, 1);
    assert_eq!(stats.sent, 1);
}

#[test]
fn test_customer_deletion_is_clean() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_customer(&customer("Maria Souza", 50.0, "10", &["AAA1111", "BBB2222"]))
        .unwrap();

    assert!(db.delete_customer(id).unwrap());
    let summary = reports::summarize_customers(&db.list_customers().unwrap());
    assert_eq!(summary.total, 0);
    assert_eq!(summary.vehicle_count, 0);
    assert!(db.list_vehicles(id).unwrap().is_empty());
}
