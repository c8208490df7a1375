//! Database tests

use super::*;
use crate::models::*;
use chrono::NaiveDate;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn vehicle(plate: &str) -> VehicleInput {
    VehicleInput {
        description: "Fiat Strada".to_string(),
        plate: plate.to_string(),
        tracker_model: "GT06".to_string(),
        ..Default::default()
    }
}

fn customer_with_vehicles(name: &str, plates: &[&str]) -> NewCustomer {
    let mut customer = NewCustomer::new(name, "63061943000144", "44999999999");
    customer.vehicles = plates.iter().map(|p| vehicle(p)).collect();
    customer
}

fn expense(description: &str, amount: f64, due: NaiveDate) -> NewExpense {
    NewExpense {
        description: description.to_string(),
        category: ExpenseCategory::Telecom,
        amount,
        due_date: due,
        payment_date: None,
        status: ExpenseStatus::Pending,
        vendor: None,
        notes: None,
    }
}

#[test]
fn test_in_memory_db() {
    let db = Database::in_memory().unwrap();
    assert!(db.list_customers().unwrap().is_empty());
    assert!(db.health_check().is_ok());
    assert!(!db.is_degraded());
}

#[test]
fn test_schema_exists() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('customers', 'vehicles', 'invoices', 'expenses', 'proposals', 'audit_log')",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 6);

    let foreign_keys: i64 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(foreign_keys, 1, "foreign keys must be enabled on pooled connections");
}

// ========== Customers ==========

#[test]
fn test_customer_crud() {
    let db = Database::in_memory().unwrap();

    let mut new = customer_with_vehicles("Transportes Silva", &["abc1d23", "XYZ9K87"]);
    new.birth_date = Some(date(1980, 5, 17));
    let id = db.create_customer(&new).unwrap();
    assert!(id > 0);

    let customer = db.get_customer(id).unwrap().unwrap();
    assert_eq!(customer.name, "Transportes Silva");
    assert_eq!(customer.monthly_fee, DEFAULT_MONTHLY_FEE);
    assert_eq!(customer.due_day, "10");
    assert!(customer.active);
    assert_eq!(customer.birth_date, Some(date(1980, 5, 17)));
    assert_eq!(customer.vehicle_count(), 2);
    assert_eq!(customer.vehicles[0].plate, "ABC1D23");

    let mut update = new.clone();
    update.name = "Transportes Silva LTDA".to_string();
    update.monthly_fee = 99.9;
    update.vehicles.clear();
    db.update_customer(id, &update).unwrap();

    let customer = db.get_customer(id).unwrap().unwrap();
    assert_eq!(customer.name, "Transportes Silva LTDA");
    assert_eq!(customer.monthly_fee, 99.9);
    assert_eq!(customer.vehicle_count(), 0);

    assert!(db.get_customer(9999).unwrap().is_none());
    assert!(matches!(
        db.update_customer(9999, &update),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_create_customer_rejects_invalid_input() {
    let db = Database::in_memory().unwrap();

    let mut missing_phone = NewCustomer::new("Maria", "12345678901", "");
    assert!(matches!(
        db.create_customer(&missing_phone),
        Err(Error::InvalidData(_))
    ));

    missing_phone.phone = "44988887777".to_string();
    missing_phone.due_day = "0".to_string();
    assert!(matches!(
        db.create_customer(&missing_phone),
        Err(Error::InvalidData(_))
    ));

    assert!(db.list_customers().unwrap().is_empty());
}

#[test]
fn test_update_customer_syncs_vehicles() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_customer(&customer_with_vehicles("Frota Norte", &["AAA1111", "BBB2222"]))
        .unwrap();
    let existing = db.list_vehicles(id).unwrap();

    // Keep the first (edited), drop the second, add a new one
    let mut kept = vehicle("AAA1111");
    kept.id = Some(existing[0].id);
    kept.has_lock = true;
    let mut update = customer_with_vehicles("Frota Norte", &[]);
    update.vehicles = vec![kept, vehicle("CCC3333")];
    db.update_customer(id, &update).unwrap();

    let vehicles = db.list_vehicles(id).unwrap();
    assert_eq!(vehicles.len(), 2);
    assert_eq!(vehicles[0].id, existing[0].id);
    assert!(vehicles[0].has_lock);
    assert_eq!(vehicles[1].plate, "CCC3333");
    assert!(db.get_vehicle(existing[1].id).unwrap().is_none());
}

#[test]
fn test_update_customer_rejects_foreign_vehicle() {
    let db = Database::in_memory().unwrap();
    let a = db.create_customer(&customer_with_vehicles("A", &["AAA1111"])).unwrap();
    let b = db.create_customer(&customer_with_vehicles("B", &["BBB2222"])).unwrap();
    let foreign = db.list_vehicles(b).unwrap()[0].id;

    let mut stolen = vehicle("BBB2222");
    stolen.id = Some(foreign);
    let mut update = customer_with_vehicles("A", &[]);
    update.vehicles = vec![stolen];

    assert!(matches!(
        db.update_customer(a, &update),
        Err(Error::InvalidData(_))
    ));
    // Transaction rolled back: A keeps its vehicle, B is untouched
    assert_eq!(db.list_vehicles(a).unwrap().len(), 1);
    assert_eq!(db.list_vehicles(b).unwrap().len(), 1);
}

#[test]
fn test_delete_customer_removes_vehicles() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_customer(&customer_with_vehicles("Silva", &["AAA1111", "BBB2222"]))
        .unwrap();

    assert!(db.delete_customer(id).unwrap());
    assert!(db.get_customer(id).unwrap().is_none());

    let conn = db.conn().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM vehicles", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);

    assert!(!db.delete_customer(id).unwrap());
}

#[test]
fn test_delete_customer_keeps_invoices() {
    let db = Database::in_memory().unwrap();
    let id = db.create_customer(&customer_with_vehicles("Silva", &[])).unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();

    assert!(db.delete_customer(id).unwrap());

    let invoices = db.list_invoices(&InvoiceFilter::default()).unwrap();
    assert_eq!(invoices.len(), 1);
    assert_eq!(invoices[0].customer_id, None);
    assert_eq!(invoices[0].customer_name, "Silva");
}

#[test]
fn test_toggle_customer_active() {
    let db = Database::in_memory().unwrap();
    let id = db.create_customer(&customer_with_vehicles("Silva", &[])).unwrap();

    assert!(!db.toggle_customer_active(id).unwrap());
    assert!(db.list_active_customers().unwrap().is_empty());
    assert!(db.toggle_customer_active(id).unwrap());
    assert_eq!(db.list_active_customers().unwrap().len(), 1);

    assert!(matches!(
        db.toggle_customer_active(424242),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_vehicle_operations() {
    let db = Database::in_memory().unwrap();
    let id = db.create_customer(&customer_with_vehicles("Silva", &[])).unwrap();

    let vehicle_id = db.add_vehicle(id, &vehicle("qwe4r56")).unwrap();
    let stored = db.get_vehicle(vehicle_id).unwrap().unwrap();
    assert_eq!(stored.customer_id, id);
    assert_eq!(stored.plate, "QWE4R56");

    let mut edit = vehicle("QWE4R56");
    edit.device_id = "359710000000001".to_string();
    db.update_vehicle(vehicle_id, &edit).unwrap();
    assert_eq!(
        db.get_vehicle(vehicle_id).unwrap().unwrap().device_id,
        "359710000000001"
    );

    assert!(matches!(
        db.add_vehicle(9999, &vehicle("AAA1111")),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        db.update_vehicle(9999, &edit),
        Err(Error::NotFound(_))
    ));

    assert!(db.delete_vehicle(vehicle_id).unwrap());
    assert!(db.list_vehicles(id).unwrap().is_empty());
}

// ========== Invoices ==========

#[test]
fn test_generate_monthly_invoices() {
    let db = Database::in_memory().unwrap();

    let mut a = customer_with_vehicles("Ana", &["AAA1111", "BBB2222"]);
    a.due_day = "5".to_string();
    a.monthly_fee = 150.0;
    let a_id = db.create_customer(&a).unwrap();

    let mut b = customer_with_vehicles("Bruno", &[]);
    b.due_day = "31".to_string();
    let b_id = db.create_customer(&b).unwrap();

    let mut inactive = customer_with_vehicles("Carla", &[]);
    inactive.active = false;
    db.create_customer(&inactive).unwrap();

    let result = db
        .generate_monthly_invoices(2025, 2, date(2025, 2, 1))
        .unwrap();
    assert_eq!(result.created, 2);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.message, "2 fatura(s) gerada(s) com sucesso!");

    let invoices = db
        .list_invoices(&InvoiceFilter {
            customer_id: Some(a_id),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(invoices.len(), 1);
    let invoice = &invoices[0];
    assert_eq!(invoice.due_date, date(2025, 2, 5));
    assert_eq!(invoice.issue_date, date(2025, 2, 1));
    assert_eq!(invoice.amount, 150.0);
    assert_eq!(invoice.vehicle_count, 2);
    assert_eq!(invoice.description, MONTHLY_INVOICE_DESCRIPTION);
    assert_eq!(invoice.status, InvoiceStatus::Pending);
    assert!(!invoice.whatsapp_sent);

    // Day 31 in February is clamped to the last day of the month
    assert!(db.invoice_exists(b_id, date(2025, 2, 28)).unwrap());
}

#[test]
fn test_generate_monthly_invoices_is_idempotent() {
    let db = Database::in_memory().unwrap();
    db.create_customer(&customer_with_vehicles("Ana", &[])).unwrap();
    db.create_customer(&customer_with_vehicles("Bruno", &[])).unwrap();

    let first = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 1))
        .unwrap();
    assert_eq!(first.created, 2);

    let second = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 2))
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.message, "Todas as faturas deste mês já foram geradas.");

    let all = db.list_invoices(&InvoiceFilter::default()).unwrap();
    assert_eq!(all.len(), 2);

    // A new customer only gets the missing invoice
    db.create_customer(&customer_with_vehicles("Carla", &[])).unwrap();
    let third = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 3))
        .unwrap();
    assert_eq!(third.created, 1);
    assert_eq!(third.skipped, 2);
}

#[test]
fn test_generate_counts_invalid_due_days_separately() {
    let db = Database::in_memory().unwrap();
    db.create_customer(&customer_with_vehicles("Ana", &[])).unwrap();
    let broken = db
        .create_customer(&customer_with_vehicles("Bruno", &[]))
        .unwrap();
    // Rows written before due-day validation existed
    db.conn()
        .unwrap()
        .execute(
            "UPDATE customers SET due_day = 'dez' WHERE id = ?",
            [broken],
        )
        .unwrap();

    let first = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 1))
        .unwrap();
    assert_eq!(first.created, 1);
    assert_eq!(first.skipped, 0);
    assert_eq!(first.invalid_due_day, 1);
    assert_eq!(
        first.message,
        "1 fatura(s) gerada(s) com sucesso! 1 cliente(s) com dia de vencimento inválido."
    );

    let second = db
        .generate_monthly_invoices(2025, 3, date(2025, 3, 2))
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped, 1);
    assert_eq!(second.invalid_due_day, 1);
    assert!(!db.invoice_exists(broken, date(2025, 3, 10)).unwrap());
}

#[test]
fn test_in_transaction_returns_original_error_when_rollback_fails() {
    let db = Database::in_memory().unwrap();
    let conn = db.conn().unwrap();

    let result: Result<()> = in_transaction(&conn, |conn| {
        // Ends the transaction early so the rollback has nothing to undo
        conn.execute("ROLLBACK", [])?;
        Err(Error::InvalidData("boom".to_string()))
    });
    assert!(matches!(result, Err(Error::InvalidData(msg)) if msg == "boom"));

    // The connection is still usable afterwards
    let value: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
    assert_eq!(value, 1);
}

#[test]
fn test_generate_rejects_invalid_month() {
    let db = Database::in_memory().unwrap();
    assert!(db
        .generate_monthly_invoices(2025, 13, date(2025, 3, 1))
        .is_err());
}

#[test]
fn test_manual_invoice_conflict() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_customer(&customer_with_vehicles("Ana", &["AAA1111"]))
        .unwrap();

    let invoice = NewInvoice {
        customer_id: id,
        description: None,
        amount: 79.9,
        vehicle_count: None,
        due_date: date(2025, 3, 10),
        issue_date: None,
        status: InvoiceStatus::Pending,
        notes: Some("Primeira mensalidade".to_string()),
    };
    let invoice_id = db.create_invoice(&invoice, date(2025, 3, 1)).unwrap();
    let stored = db.get_invoice(invoice_id).unwrap().unwrap();
    assert_eq!(stored.customer_name, "Ana");
    assert_eq!(stored.vehicle_count, 1);
    assert_eq!(stored.issue_date, date(2025, 3, 1));
    assert_eq!(stored.description, MONTHLY_INVOICE_DESCRIPTION);

    assert!(matches!(
        db.create_invoice(&invoice, date(2025, 3, 1)),
        Err(Error::Conflict(_))
    ));

    let mut missing_customer = invoice.clone();
    missing_customer.customer_id = 9999;
    assert!(matches!(
        db.create_invoice(&missing_customer, date(2025, 3, 1)),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_update_invoice() {
    let db = Database::in_memory().unwrap();
    let ana = db.create_customer(&customer_with_vehicles("Ana", &[])).unwrap();
    let bruno = db.create_customer(&customer_with_vehicles("Bruno", &[])).unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();

    let invoice = &db
        .list_invoices(&InvoiceFilter {
            customer_id: Some(ana),
            ..Default::default()
        })
        .unwrap()[0];

    let update = NewInvoice {
        customer_id: bruno,
        description: Some("Mensalidade avulsa".to_string()),
        amount: 120.0,
        vehicle_count: Some(3),
        due_date: date(2025, 3, 20),
        issue_date: None,
        status: InvoiceStatus::Paid,
        notes: None,
    };
    db.update_invoice(invoice.id, &update).unwrap();

    let updated = db.get_invoice(invoice.id).unwrap().unwrap();
    assert_eq!(updated.customer_id, Some(bruno));
    assert_eq!(updated.customer_name, "Bruno");
    assert_eq!(updated.amount, 120.0);
    assert_eq!(updated.status, InvoiceStatus::Paid);
    assert_eq!(updated.issue_date, invoice.issue_date);

    // Moving onto Bruno's existing due date collides
    let mut clash = update.clone();
    clash.due_date = date(2025, 3, 10);
    assert!(matches!(
        db.update_invoice(invoice.id, &clash),
        Err(Error::Conflict(_))
    ));
}

#[test]
fn test_list_invoices_filters() {
    let db = Database::in_memory().unwrap();
    db.create_customer(&customer_with_vehicles("Ana", &[])).unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();
    db.generate_monthly_invoices(2025, 4, date(2025, 4, 1)).unwrap();

    let all = db.list_invoices(&InvoiceFilter::default()).unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].due_date, date(2025, 4, 10));

    let march = db
        .list_invoices(&InvoiceFilter {
            month: Some((2025, 3)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(march.len(), 1);

    db.toggle_invoice_status(march[0].id).unwrap();
    let paid = db
        .list_invoices(&InvoiceFilter {
            status: Some(InvoiceStatus::Paid),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].id, march[0].id);
}

#[test]
fn test_toggle_invoice_status_twice() {
    let db = Database::in_memory().unwrap();
    db.create_customer(&customer_with_vehicles("Ana", &[])).unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();
    let id = db.list_invoices(&InvoiceFilter::default()).unwrap()[0].id;

    assert_eq!(db.toggle_invoice_status(id).unwrap(), InvoiceStatus::Paid);
    assert_eq!(db.toggle_invoice_status(id).unwrap(), InvoiceStatus::Pending);
    assert_eq!(
        db.get_invoice(id).unwrap().unwrap().status,
        InvoiceStatus::Pending
    );

    assert!(matches!(
        db.toggle_invoice_status(9999),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_mark_whatsapp_sent() {
    let db = Database::in_memory().unwrap();
    db.create_customer(&customer_with_vehicles("Ana", &[])).unwrap();
    db.generate_monthly_invoices(2025, 3, date(2025, 3, 1)).unwrap();
    let id = db.list_invoices(&InvoiceFilter::default()).unwrap()[0].id;

    db.mark_whatsapp_sent(id).unwrap();
    assert!(db.get_invoice(id).unwrap().unwrap().whatsapp_sent);
    assert!(db.mark_whatsapp_sent(9999).is_err());

    assert!(db.delete_invoice(id).unwrap());
    assert!(!db.delete_invoice(id).unwrap());
}

// ========== Expenses ==========

#[test]
fn test_expense_crud() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_expense(&expense("Chips M2M", 89.9, date(2025, 3, 5)))
        .unwrap();

    let stored = db.get_expense(id).unwrap().unwrap();
    assert_eq!(stored.category, ExpenseCategory::Telecom);
    assert_eq!(stored.status, ExpenseStatus::Pending);
    assert_eq!(stored.payment_date, None);

    let mut update = expense("Chips M2M (Algar)", 99.9, date(2025, 3, 6));
    update.category = ExpenseCategory::Infrastructure;
    update.vendor = Some("Algar Telecom".to_string());
    db.update_expense(id, &update).unwrap();

    let stored = db.get_expense(id).unwrap().unwrap();
    assert_eq!(stored.description, "Chips M2M (Algar)");
    assert_eq!(stored.category, ExpenseCategory::Infrastructure);
    assert_eq!(stored.vendor.as_deref(), Some("Algar Telecom"));

    assert!(matches!(
        db.update_expense(9999, &update),
        Err(Error::NotFound(_))
    ));
    assert!(db.delete_expense(id).unwrap());
    assert!(db.get_expense(id).unwrap().is_none());
}

#[test]
fn test_list_expenses_filters() {
    let db = Database::in_memory().unwrap();
    db.create_expense(&expense("Chips", 50.0, date(2025, 3, 5))).unwrap();
    let mut fuel = expense("Gasolina", 200.0, date(2025, 3, 20));
    fuel.category = ExpenseCategory::Fuel;
    db.create_expense(&fuel).unwrap();
    db.create_expense(&expense("Chips", 50.0, date(2025, 4, 5))).unwrap();

    let march = db
        .list_expenses(&ExpenseFilter {
            month: Some((2025, 3)),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(march.len(), 2);
    assert_eq!(march[0].description, "Gasolina");

    let fuel_only = db
        .list_expenses(&ExpenseFilter {
            category: Some(ExpenseCategory::Fuel),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(fuel_only.len(), 1);
}

#[test]
fn test_toggle_expense_status_sets_payment_date() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_expense(&expense("Aluguel", 1500.0, date(2025, 3, 10)))
        .unwrap();

    let paid = db.toggle_expense_status(id, date(2025, 3, 9)).unwrap();
    assert_eq!(paid.status, ExpenseStatus::Paid);
    assert_eq!(paid.payment_date, Some(date(2025, 3, 9)));

    let pending = db.toggle_expense_status(id, date(2025, 3, 10)).unwrap();
    assert_eq!(pending.status, ExpenseStatus::Pending);
    assert_eq!(pending.payment_date, None);

    assert!(matches!(
        db.toggle_expense_status(9999, date(2025, 3, 12)),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_refresh_overdue_expenses() {
    let db = Database::in_memory().unwrap();
    let late = db
        .create_expense(&expense("Internet", 120.0, date(2025, 3, 1)))
        .unwrap();
    let due_today = db
        .create_expense(&expense("Energia", 300.0, date(2025, 3, 10)))
        .unwrap();
    let mut paid = expense("Contador", 400.0, date(2025, 2, 1));
    paid.status = ExpenseStatus::Paid;
    let paid = db.create_expense(&paid).unwrap();

    assert_eq!(db.refresh_overdue_expenses(date(2025, 3, 10)).unwrap(), 1);
    assert_eq!(
        db.get_expense(late).unwrap().unwrap().status,
        ExpenseStatus::Overdue
    );
    assert_eq!(
        db.get_expense(due_today).unwrap().unwrap().status,
        ExpenseStatus::Pending
    );
    assert_eq!(
        db.get_expense(paid).unwrap().unwrap().status,
        ExpenseStatus::Paid
    );

    // Already overdue rows are not counted again
    assert_eq!(db.refresh_overdue_expenses(date(2025, 3, 10)).unwrap(), 0);

    // Paying an overdue expense works like paying a pending one
    let toggled = db.toggle_expense_status(late, date(2025, 3, 11)).unwrap();
    assert_eq!(toggled.status, ExpenseStatus::Paid);
    assert_eq!(toggled.payment_date, Some(date(2025, 3, 11)));
}

#[test]
fn test_toggle_overdue_expense_twice_restores_overdue() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_expense(&expense("Internet", 120.0, date(2025, 3, 1)))
        .unwrap();
    assert_eq!(db.refresh_overdue_expenses(date(2025, 3, 10)).unwrap(), 1);

    let paid = db.toggle_expense_status(id, date(2025, 3, 10)).unwrap();
    assert_eq!(paid.status, ExpenseStatus::Paid);
    assert_eq!(paid.payment_date, Some(date(2025, 3, 10)));

    let back = db.toggle_expense_status(id, date(2025, 3, 10)).unwrap();
    assert_eq!(back.status, ExpenseStatus::Overdue);
    assert_eq!(back.payment_date, None);
}

// ========== Proposals ==========

#[test]
fn test_proposal_numbering_and_validity() {
    let db = Database::in_memory().unwrap();
    let today = date(2025, 3, 10);

    let first = db
        .create_proposal(&NewProposal::new("João", "44988887777", "12345678901"), today)
        .unwrap();
    let second = db
        .create_proposal(&NewProposal::new("Frota Norte", "44977776666", "63061943000144"), today)
        .unwrap();

    let first = db.get_proposal(first).unwrap().unwrap();
    let second = db.get_proposal(second).unwrap().unwrap();
    assert_eq!(first.number, 1);
    assert_eq!(second.number, 2);
    assert_eq!(first.valid_until, date(2025, 4, 9));
    assert_eq!(first.status, ProposalStatus::Pending);

    // Numbers are never reused after a delete of a lower number
    assert!(db.delete_proposal(first.id).unwrap());
    let third = db
        .create_proposal(&NewProposal::new("Maria", "44966665555", "98765432100"), today)
        .unwrap();
    assert_eq!(db.get_proposal(third).unwrap().unwrap().number, 3);

    let listed: Vec<i64> = db.list_proposals().unwrap().iter().map(|p| p.number).collect();
    assert_eq!(listed, vec![3, 2]);
}

#[test]
fn test_update_proposal_keeps_number() {
    let db = Database::in_memory().unwrap();
    let id = db
        .create_proposal(&NewProposal::new("João", "44988887777", "12345678901"), date(2025, 3, 10))
        .unwrap();

    let mut update = NewProposal::new("João da Silva", "44988887777", "12345678901");
    update.vehicle_count = 5;
    update.free_installation = false;
    update.installation_price = Some(120.0);
    db.update_proposal(id, &update).unwrap();

    let stored = db.get_proposal(id).unwrap().unwrap();
    assert_eq!(stored.number, 1);
    assert_eq!(stored.valid_until, date(2025, 4, 9));
    assert_eq!(stored.prospect_name, "João da Silva");
    assert_eq!(stored.vehicle_count, 5);
    assert_eq!(stored.installation_price, Some(120.0));

    db.set_proposal_status(id, ProposalStatus::Approved).unwrap();
    assert_eq!(
        db.get_proposal(id).unwrap().unwrap().status,
        ProposalStatus::Approved
    );
    assert!(matches!(
        db.set_proposal_status(9999, ProposalStatus::Sent),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_free_installation_drops_price() {
    let db = Database::in_memory().unwrap();
    let mut proposal = NewProposal::new("João", "44988887777", "12345678901");
    proposal.installation_price = Some(200.0);
    let id = db.create_proposal(&proposal, date(2025, 3, 10)).unwrap();
    assert_eq!(db.get_proposal(id).unwrap().unwrap().installation_price, None);
}

// ========== Audit ==========

#[test]
fn test_audit_log() {
    let db = Database::in_memory().unwrap();
    db.log_audit("ana@lincetrack.com.br", "create", Some("customer"), Some(1), None)
        .unwrap();
    db.log_audit("cli", "generate", Some("invoice"), None, Some("{\"month\":\"2025-03\"}"))
        .unwrap();

    let entries = db.list_audit_log(10).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].action, "generate");
    assert_eq!(entries[1].user_email, "ana@lincetrack.com.br");

    assert_eq!(db.list_audit_log(1).unwrap().len(), 1);
}
