//! Customer command implementations

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use lince_core::{
    db::Database,
    format::{birthday_link, format_currency, format_naive_date, format_phone, format_tax_id},
    reports, CompanyProfile,
};

use super::truncate;

pub fn cmd_customers_list(db: &Database, search: Option<&str>, all: bool) -> Result<()> {
    let customers = db.list_customers()?;
    let matches: Vec<_> = reports::search_customers(&customers, search.unwrap_or(""))
        .into_iter()
        .filter(|c| all || c.active)
        .collect();

    if matches.is_empty() {
        println!("No customers found.");
        return Ok(());
    }

    println!();
    println!("👥 Customers");
    println!("   ─────────────────────────────────────────────────────────────");

    for customer in matches {
        let icon = if customer.active { "✅" } else { "⏸️" };
        println!(
            "   {} [{:>4}] {:28} │ {:16} │ {:>11} │ dia {:>2} │ {} veículo(s)",
            icon,
            customer.id,
            truncate(&customer.name, 28),
            format_phone(&customer.phone),
            format_currency(customer.monthly_fee),
            customer.due_day,
            customer.vehicle_count()
        );
    }

    Ok(())
}

pub fn cmd_customers_show(db: &Database, id: i64) -> Result<()> {
    let customer = db
        .get_customer(id)?
        .with_context(|| format!("Customer not found: {}", id))?;

    println!();
    println!("👤 {} (#{})", customer.name, customer.id);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Documento:   {}", format_tax_id(&customer.tax_id));
    println!("   Telefone:    {}", format_phone(&customer.phone));
    if let Some(email) = &customer.email {
        println!("   E-mail:      {}", email);
    }
    println!(
        "   Endereço:    {}, {} - {}/{}",
        customer.address, customer.district, customer.city, customer.state
    );
    if let Some(birth_date) = customer.birth_date {
        println!("   Nascimento:  {}", format_naive_date(birth_date));
    }
    println!("   Mensalidade: {}", format_currency(customer.monthly_fee));
    println!("   Vencimento:  dia {}", customer.due_day);
    println!(
        "   Status:      {}",
        if customer.active { "Ativo" } else { "Inativo" }
    );

    if customer.vehicles.is_empty() {
        println!("   (sem veículos)");
    } else {
        println!();
        println!("   Veículos:");
        for vehicle in &customer.vehicles {
            println!(
                "     [{:>4}] {:10} {:24} {}{}",
                vehicle.id,
                vehicle.plate,
                truncate(&vehicle.description, 24),
                vehicle.tracker_model,
                if vehicle.has_lock { " 🔒" } else { "" }
            );
        }
    }

    Ok(())
}

pub fn cmd_customers_toggle(db: &Database, id: i64) -> Result<()> {
    let active = db
        .toggle_customer_active(id)
        .with_context(|| format!("Failed to toggle customer {}", id))?;

    if active {
        println!("✅ Customer {} is now active", id);
    } else {
        println!("⏸️  Customer {} is now inactive", id);
    }
    Ok(())
}

pub fn cmd_customers_delete(db: &Database, id: i64, yes: bool) -> Result<()> {
    use std::io::{self, Write};

    let customer = db
        .get_customer(id)?
        .with_context(|| format!("Customer not found: {}", id))?;

    if !yes {
        print!(
            "⚠️  This will delete '{}' and {} vehicle(s). Invoices are kept.\n\n",
            customer.name,
            customer.vehicle_count()
        );
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.delete_customer(id)?;
    println!("🗑️  Deleted customer '{}'", customer.name);
    Ok(())
}

pub fn cmd_customers_birthdays(
    db: &Database,
    company: &CompanyProfile,
    month: Option<u32>,
    today: NaiveDate,
) -> Result<()> {
    let month = month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        anyhow::bail!("Month must be between 1 and 12");
    }

    let customers = db.list_customers()?;
    let birthdays = reports::birthdays(&customers, month, today);

    if birthdays.is_empty() {
        println!("No birthdays this month.");
        return Ok(());
    }

    println!();
    println!("🎂 Birthdays");
    println!("   ─────────────────────────────────────────────────────────────");

    for birthday in birthdays {
        println!(
            "   {:02}/{:02} {:28} {} anos",
            birthday.day,
            month,
            truncate(&birthday.name, 28),
            birthday.age
        );
        println!(
            "         {}",
            birthday_link(company, &birthday.phone, &birthday.name)
        );
    }

    Ok(())
}
