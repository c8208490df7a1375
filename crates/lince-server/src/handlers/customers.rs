//! Customer and vehicle handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use super::today;
use crate::{core_error, get_user_email, AppError, AppState, SuccessResponse};
use lince_core::{
    format::birthday_link,
    models::{Birthday, Customer, NewCustomer, Vehicle, VehicleInput},
    reports,
};

/// Query parameters for listing customers
#[derive(Debug, Deserialize)]
pub struct CustomerListQuery {
    /// Matches name (case-insensitive), tax id or phone
    pub search: Option<String>,
    pub active: Option<bool>,
}

/// GET /api/customers - List customers with their vehicles
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CustomerListQuery>,
    request: Request,
) -> Result<Json<Vec<Customer>>, AppError> {
    let user_email = get_user_email(request.headers());

    let customers = state.db.list_customers().map_err(core_error)?;
    let term = params.search.as_deref().unwrap_or("");
    let result: Vec<Customer> = reports::search_customers(&customers, term)
        .into_iter()
        .filter(|c| params.active.map_or(true, |active| c.active == active))
        .cloned()
        .collect();

    state
        .db
        .log_audit(
            &user_email,
            "list",
            Some("customer"),
            None,
            Some(&format!("count={}", result.len())),
        )
        .map_err(core_error)?;

    Ok(Json(result))
}

/// POST /api/customers - Create a customer with its vehicles
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), AppError> {
    let user_email = get_user_email(&headers);

    let id = state.db.create_customer(&req).map_err(core_error)?;
    let customer = state
        .db
        .get_customer(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::internal("Customer vanished after insert"))?;

    state
        .db
        .log_audit(
            &user_email,
            "create",
            Some("customer"),
            Some(id),
            Some(&format!("vehicles={}", customer.vehicle_count())),
        )
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/customers/:id - Get a customer with its vehicles
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Customer>, AppError> {
    let user_email = get_user_email(request.headers());

    let customer = state
        .db
        .get_customer(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::not_found(&format!("Customer {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "view", Some("customer"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(customer))
}

/// PUT /api/customers/:id - Update a customer and synchronize its vehicles
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<NewCustomer>,
) -> Result<Json<Customer>, AppError> {
    let user_email = get_user_email(&headers);

    state.db.update_customer(id, &req).map_err(core_error)?;
    let customer = state
        .db
        .get_customer(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::not_found(&format!("Customer {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "update", Some("customer"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(customer))
}

/// DELETE /api/customers/:id - Delete a customer and its vehicles
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_customer(id).map_err(core_error)? {
        return Err(AppError::not_found(&format!("Customer {} not found", id)));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("customer"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Response for the active toggle
#[derive(Serialize)]
pub struct ActiveResponse {
    pub id: i64,
    pub active: bool,
}

/// POST /api/customers/:id/toggle-active - Flip the active flag
pub async fn toggle_customer_active(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<ActiveResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let active = state.db.toggle_customer_active(id).map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "toggle_active",
            Some("customer"),
            Some(id),
            Some(&format!("active={}", active)),
        )
        .map_err(core_error)?;

    Ok(Json(ActiveResponse { id, active }))
}

/// Query parameters for the birthday list
#[derive(Debug, Deserialize)]
pub struct BirthdayQuery {
    /// Month number (1-12), defaults to the current month
    pub month: Option<u32>,
}

/// A birthday with a ready-to-open greeting link
#[derive(Serialize)]
pub struct BirthdayResponse {
    #[serde(flatten)]
    pub birthday: Birthday,
    pub whatsapp_link: String,
}

/// GET /api/customers/birthdays - Customers born in the given month
pub async fn list_birthdays(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BirthdayQuery>,
    request: Request,
) -> Result<Json<Vec<BirthdayResponse>>, AppError> {
    use chrono::Datelike;

    let user_email = get_user_email(request.headers());
    let today = today();
    let month = params.month.unwrap_or_else(|| today.month());
    if !(1..=12).contains(&month) {
        return Err(AppError::bad_request("Month must be between 1 and 12"));
    }

    let customers = state.db.list_customers().map_err(core_error)?;
    let result: Vec<BirthdayResponse> = reports::birthdays(&customers, month, today)
        .into_iter()
        .map(|birthday| {
            let whatsapp_link = birthday_link(&state.company, &birthday.phone, &birthday.name);
            BirthdayResponse {
                birthday,
                whatsapp_link,
            }
        })
        .collect();

    state
        .db
        .log_audit(
            &user_email,
            "list",
            Some("birthday"),
            None,
            Some(&format!("month={}", month)),
        )
        .map_err(core_error)?;

    Ok(Json(result))
}

/// GET /api/customers/:id/vehicles - List a customer's vehicles
pub async fn list_vehicles(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    request: Request,
) -> Result<Json<Vec<Vehicle>>, AppError> {
    let user_email = get_user_email(request.headers());

    if state.db.get_customer(customer_id).map_err(core_error)?.is_none() {
        return Err(AppError::not_found(&format!(
            "Customer {} not found",
            customer_id
        )));
    }
    let vehicles = state.db.list_vehicles(customer_id).map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "list",
            Some("vehicle"),
            None,
            Some(&format!("customer_id={}", customer_id)),
        )
        .map_err(core_error)?;

    Ok(Json(vehicles))
}

/// POST /api/customers/:id/vehicles - Add a vehicle to a customer
pub async fn add_vehicle(
    State(state): State<Arc<AppState>>,
    Path(customer_id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<VehicleInput>,
) -> Result<(StatusCode, Json<Vehicle>), AppError> {
    let user_email = get_user_email(&headers);

    let id = state.db.add_vehicle(customer_id, &req).map_err(core_error)?;
    let vehicle = state
        .db
        .get_vehicle(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::internal("Vehicle vanished after insert"))?;

    state
        .db
        .log_audit(
            &user_email,
            "create",
            Some("vehicle"),
            Some(id),
            Some(&format!("customer_id={}", customer_id)),
        )
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(vehicle)))
}

/// PUT /api/vehicles/:id - Edit a vehicle
pub async fn update_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<VehicleInput>,
) -> Result<Json<Vehicle>, AppError> {
    let user_email = get_user_email(&headers);

    state.db.update_vehicle(id, &req).map_err(core_error)?;
    let vehicle = state
        .db
        .get_vehicle(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::not_found(&format!("Vehicle {} not found", id)))?;

    state
        .db
        .log_audit(&user_email, "update", Some("vehicle"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(vehicle))
}

/// DELETE /api/vehicles/:id - Remove a vehicle
pub async fn delete_vehicle(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_vehicle(id).map_err(core_error)? {
        return Err(AppError::not_found(&format!("Vehicle {} not found", id)));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("vehicle"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(SuccessResponse { success: true }))
}
