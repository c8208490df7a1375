//! Customer and vehicle operations
//!
//! A customer and its vehicle list are always written in one transaction, so a
//! failed vehicle row never leaves a half-saved customer behind.

use std::collections::HashMap;

use rusqlite::{params, OptionalExtension};
use tracing::info;

use super::{date_param, in_transaction, opt_date_column, parse_datetime, Database, DbConn};
use crate::error::{Error, Result};
use crate::models::{Customer, NewCustomer, Vehicle, VehicleInput};

const CUSTOMER_COLUMNS: &str = "id, name, tax_id, state_registration, birth_date, phone, email, \
     address, district, city, state, zip_code, monthly_fee, due_day, active, platform_login, \
     created_at, updated_at";

const VEHICLE_COLUMNS: &str =
    "id, customer_id, description, plate, tracker_model, device_id, has_lock, chip_number";

fn row_to_customer(row: &rusqlite::Row) -> rusqlite::Result<Customer> {
    let created_at: String = row.get(16)?;
    let updated_at: String = row.get(17)?;
    Ok(Customer {
        id: row.get(0)?,
        name: row.get(1)?,
        tax_id: row.get(2)?,
        state_registration: row.get(3)?,
        birth_date: opt_date_column(row, 4)?,
        phone: row.get(5)?,
        email: row.get(6)?,
        address: row.get(7)?,
        district: row.get(8)?,
        city: row.get(9)?,
        state: row.get(10)?,
        zip_code: row.get(11)?,
        monthly_fee: row.get(12)?,
        due_day: row.get(13)?,
        active: row.get(14)?,
        platform_login: row.get(15)?,
        vehicles: Vec::new(),
        created_at: parse_datetime(&created_at),
        updated_at: parse_datetime(&updated_at),
    })
}

fn row_to_vehicle(row: &rusqlite::Row) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        id: row.get(0)?,
        customer_id: row.get(1)?,
        description: row.get(2)?,
        plate: row.get(3)?,
        tracker_model: row.get(4)?,
        device_id: row.get(5)?,
        has_lock: row.get(6)?,
        chip_number: row.get(7)?,
    })
}

fn insert_vehicle(conn: &DbConn, customer_id: i64, vehicle: &VehicleInput) -> Result<i64> {
    conn.execute(
        r#"
        INSERT INTO vehicles (customer_id, description, plate, tracker_model, device_id, has_lock, chip_number)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            customer_id,
            vehicle.description.trim(),
            vehicle.plate.trim().to_uppercase(),
            vehicle.tracker_model.trim(),
            vehicle.device_id.trim(),
            vehicle.has_lock,
            vehicle.chip_number.trim(),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update a vehicle, optionally scoped to one customer. Returns rows changed.
fn update_vehicle_row(
    conn: &DbConn,
    id: i64,
    customer_id: Option<i64>,
    vehicle: &VehicleInput,
) -> Result<usize> {
    let changed = conn.execute(
        r#"
        UPDATE vehicles
        SET description = ?, plate = ?, tracker_model = ?, device_id = ?, has_lock = ?, chip_number = ?
        WHERE id = ? AND (?8 IS NULL OR customer_id = ?8)
        "#,
        params![
            vehicle.description.trim(),
            vehicle.plate.trim().to_uppercase(),
            vehicle.tracker_model.trim(),
            vehicle.device_id.trim(),
            vehicle.has_lock,
            vehicle.chip_number.trim(),
            id,
            customer_id,
        ],
    )?;
    Ok(changed)
}

/// Make the stored vehicle list of a customer match `vehicles`
fn sync_vehicles(conn: &DbConn, customer_id: i64, vehicles: &[VehicleInput]) -> Result<()> {
    let existing: Vec<i64> = {
        let mut stmt = conn.prepare("SELECT id FROM vehicles WHERE customer_id = ?")?;
        let ids = stmt
            .query_map(params![customer_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<i64>, _>>()?;
        ids
    };

    let keep: Vec<i64> = vehicles.iter().filter_map(|v| v.id).collect();
    for id in existing.iter().filter(|id| !keep.contains(id)) {
        conn.execute("DELETE FROM vehicles WHERE id = ?", params![id])?;
    }

    for vehicle in vehicles {
        match vehicle.id {
            Some(id) => {
                if update_vehicle_row(conn, id, Some(customer_id), vehicle)? == 0 {
                    return Err(Error::InvalidData(format!(
                        "Vehicle {} does not belong to customer {}",
                        id, customer_id
                    )));
                }
            }
            None => {
                insert_vehicle(conn, customer_id, vehicle)?;
            }
        }
    }

    Ok(())
}

impl Database {
    /// Create a customer together with its vehicles
    pub fn create_customer(&self, customer: &NewCustomer) -> Result<i64> {
        customer.validate()?;
        let conn = self.conn()?;

        let id = in_transaction(&conn, |conn| {
            conn.execute(
                r#"
                INSERT INTO customers (name, tax_id, state_registration, birth_date, phone, email,
                                       address, district, city, state, zip_code, monthly_fee,
                                       due_day, active, platform_login)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    customer.name.trim(),
                    customer.tax_id.trim(),
                    customer.state_registration,
                    customer.birth_date.map(date_param),
                    customer.phone.trim(),
                    customer.email,
                    customer.address,
                    customer.district,
                    customer.city,
                    customer.state,
                    customer.zip_code,
                    customer.monthly_fee,
                    customer.due_day.trim(),
                    customer.active,
                    customer.platform_login,
                ],
            )?;
            let id = conn.last_insert_rowid();

            for vehicle in &customer.vehicles {
                insert_vehicle(conn, id, vehicle)?;
            }
            Ok(id)
        })?;

        info!(
            customer_id = id,
            vehicles = customer.vehicles.len(),
            "Created customer"
        );
        Ok(id)
    }

    /// Update a customer and reconcile its vehicle list in one transaction
    ///
    /// Vehicles with an `id` are updated, vehicles without one are inserted and
    /// stored vehicles missing from the list are removed.
    pub fn update_customer(&self, id: i64, customer: &NewCustomer) -> Result<()> {
        customer.validate()?;
        let conn = self.conn()?;

        in_transaction(&conn, |conn| {
            let changed = conn.execute(
                r#"
                UPDATE customers
                SET name = ?, tax_id = ?, state_registration = ?, birth_date = ?, phone = ?,
                    email = ?, address = ?, district = ?, city = ?, state = ?, zip_code = ?,
                    monthly_fee = ?, due_day = ?, active = ?, platform_login = ?,
                    updated_at = CURRENT_TIMESTAMP
                WHERE id = ?
                "#,
                params![
                    customer.name.trim(),
                    customer.tax_id.trim(),
                    customer.state_registration,
                    customer.birth_date.map(date_param),
                    customer.phone.trim(),
                    customer.email,
                    customer.address,
                    customer.district,
                    customer.city,
                    customer.state,
                    customer.zip_code,
                    customer.monthly_fee,
                    customer.due_day.trim(),
                    customer.active,
                    customer.platform_login,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(Error::NotFound(format!("Customer {}", id)));
            }

            sync_vehicles(conn, id, &customer.vehicles)
        })
    }

    /// Get a customer with its vehicles
    pub fn get_customer(&self, id: i64) -> Result<Option<Customer>> {
        let conn = self.conn()?;

        let customer = conn
            .query_row(
                &format!("SELECT {} FROM customers WHERE id = ?", CUSTOMER_COLUMNS),
                params![id],
                row_to_customer,
            )
            .optional()?;

        match customer {
            Some(mut customer) => {
                customer.vehicles = self.list_vehicles(id)?;
                Ok(Some(customer))
            }
            None => Ok(None),
        }
    }

    /// List all customers ordered by name, vehicles included
    pub fn list_customers(&self) -> Result<Vec<Customer>> {
        self.query_customers(false)
    }

    /// List active customers ordered by name, vehicles included
    pub fn list_active_customers(&self) -> Result<Vec<Customer>> {
        self.query_customers(true)
    }

    fn query_customers(&self, active_only: bool) -> Result<Vec<Customer>> {
        let conn = self.conn()?;

        let sql = format!(
            "SELECT {} FROM customers {} ORDER BY name COLLATE NOCASE, id",
            CUSTOMER_COLUMNS,
            if active_only { "WHERE active = 1" } else { "" }
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut customers = stmt
            .query_map([], row_to_customer)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM vehicles ORDER BY customer_id, id",
            VEHICLE_COLUMNS
        ))?;
        let mut by_customer: HashMap<i64, Vec<Vehicle>> = HashMap::new();
        for vehicle in stmt.query_map([], row_to_vehicle)? {
            let vehicle = vehicle?;
            by_customer
                .entry(vehicle.customer_id)
                .or_default()
                .push(vehicle);
        }

        for customer in &mut customers {
            customer.vehicles = by_customer.remove(&customer.id).unwrap_or_default();
        }

        Ok(customers)
    }

    /// Delete a customer; its vehicles go with it and its invoices are kept
    pub fn delete_customer(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM customers WHERE id = ?", params![id])?;
        if deleted > 0 {
            info!(customer_id = id, "Deleted customer");
        }
        Ok(deleted > 0)
    }

    /// Flip the active flag and return the new value
    pub fn toggle_customer_active(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        conn.query_row(
            r#"
            UPDATE customers
            SET active = NOT active, updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            RETURNING active
            "#,
            params![id],
            |row| row.get(0),
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Customer {}", id)))
    }

    // ========== Vehicles ==========

    /// List the vehicles of a customer
    pub fn list_vehicles(&self, customer_id: i64) -> Result<Vec<Vehicle>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM vehicles WHERE customer_id = ? ORDER BY id",
            VEHICLE_COLUMNS
        ))?;
        let vehicles = stmt
            .query_map(params![customer_id], row_to_vehicle)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(vehicles)
    }

    pub fn get_vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        let conn = self.conn()?;
        conn.query_row(
            &format!("SELECT {} FROM vehicles WHERE id = ?", VEHICLE_COLUMNS),
            params![id],
            row_to_vehicle,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Add a single vehicle to an existing customer
    pub fn add_vehicle(&self, customer_id: i64, vehicle: &VehicleInput) -> Result<i64> {
        vehicle.validate()?;
        let conn = self.conn()?;

        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE id = ?)",
            params![customer_id],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(Error::NotFound(format!("Customer {}", customer_id)));
        }

        insert_vehicle(&conn, customer_id, vehicle)
    }

    pub fn update_vehicle(&self, id: i64, vehicle: &VehicleInput) -> Result<()> {
        vehicle.validate()?;
        let conn = self.conn()?;
        if update_vehicle_row(&conn, id, None, vehicle)? == 0 {
            return Err(Error::NotFound(format!("Vehicle {}", id)));
        }
        Ok(())
    }

    pub fn delete_vehicle(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM vehicles WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }
}
