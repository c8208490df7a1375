//! Invoice handlers: listing, manual edits, monthly generation and reminders

use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, Response, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{html_document, parse_month_param, today};
use crate::{core_error, get_user_email, AppError, AppState, SuccessResponse};
use lince_core::{
    documents::{invoice_filename, render_invoice},
    format::{payment_reminder_link, year_month},
    models::{GenerationResult, Invoice, InvoiceStatus, NewInvoice},
    InvoiceFilter,
};

/// Query parameters for listing invoices
#[derive(Debug, Deserialize)]
pub struct InvoiceListQuery {
    /// Due month (YYYY-MM)
    pub month: Option<String>,
    pub customer_id: Option<i64>,
    /// `pending` or `paid`
    pub status: Option<String>,
}

impl InvoiceListQuery {
    pub(crate) fn to_filter(&self) -> Result<InvoiceFilter, AppError> {
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<InvoiceStatus>())
            .transpose()
            .map_err(|e| AppError::bad_request(&e))?;

        Ok(InvoiceFilter {
            month: parse_month_param(self.month.as_deref())?,
            customer_id: self.customer_id,
            status,
        })
    }
}

fn load_invoice(state: &AppState, id: i64) -> Result<Invoice, AppError> {
    state
        .db
        .get_invoice(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::not_found(&format!("Invoice {} not found", id)))
}

/// GET /api/invoices - List invoices, latest due date first
pub async fn list_invoices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<InvoiceListQuery>,
    request: Request,
) -> Result<Json<Vec<Invoice>>, AppError> {
    let user_email = get_user_email(request.headers());
    let filter = params.to_filter()?;

    let invoices = state.db.list_invoices(&filter).map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "list",
            Some("invoice"),
            None,
            Some(&format!("count={}", invoices.len())),
        )
        .map_err(core_error)?;

    Ok(Json(invoices))
}

/// POST /api/invoices - Create an invoice by hand
pub async fn create_invoice(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewInvoice>,
) -> Result<(StatusCode, Json<Invoice>), AppError> {
    let user_email = get_user_email(&headers);

    let id = state
        .db
        .create_invoice(&req, today())
        .map_err(core_error)?;
    let invoice = load_invoice(&state, id)?;

    state
        .db
        .log_audit(
            &user_email,
            "create",
            Some("invoice"),
            Some(id),
            Some(&format!("customer_id={} due={}", req.customer_id, req.due_date)),
        )
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(invoice)))
}

/// GET /api/invoices/:id - Get a single invoice
pub async fn get_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Invoice>, AppError> {
    let user_email = get_user_email(request.headers());

    let invoice = load_invoice(&state, id)?;

    state
        .db
        .log_audit(&user_email, "view", Some("invoice"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(invoice))
}

/// PUT /api/invoices/:id - Update an invoice
pub async fn update_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<NewInvoice>,
) -> Result<Json<Invoice>, AppError> {
    let user_email = get_user_email(&headers);

    state.db.update_invoice(id, &req).map_err(core_error)?;
    let invoice = load_invoice(&state, id)?;

    state
        .db
        .log_audit(&user_email, "update", Some("invoice"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(invoice))
}

/// DELETE /api/invoices/:id - Delete an invoice
pub async fn delete_invoice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_invoice(id).map_err(core_error)? {
        return Err(AppError::not_found(&format!("Invoice {} not found", id)));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("invoice"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Request body for monthly generation
#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Target month (YYYY-MM), defaults to the current month
    #[serde(default)]
    pub month: Option<String>,
}

impl GenerateRequest {
    /// Parse an optional JSON body
    ///
    /// Only an empty body falls back to the defaults; anything else must be
    /// well-formed JSON sent as `application/json`.
    fn from_body(headers: &HeaderMap, body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let is_json = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.trim_start().starts_with("application/json"));
        if !is_json {
            return Err(AppError::bad_request(
                "Expected request with `Content-Type: application/json`",
            ));
        }

        Json::<Self>::from_bytes(body)
            .map(|Json(req)| req)
            .map_err(|rejection| AppError::bad_request(&rejection.body_text()))
    }
}

/// POST /api/invoices/generate - Create missing invoices for every active customer
///
/// The body is optional; without one the current month is generated.
pub async fn generate_invoices(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<GenerationResult>, AppError> {
    let user_email = get_user_email(&headers);
    let req = GenerateRequest::from_body(&headers, &body)?;
    let today = today();

    let (year, month) =
        parse_month_param(req.month.as_deref())?.unwrap_or_else(|| year_month(today));

    let result = state
        .db
        .generate_monthly_invoices(year, month, today)
        .map_err(core_error)?;

    info!(
        year,
        month,
        created = result.created,
        skipped = result.skipped,
        "Monthly invoice generation finished"
    );

    state
        .db
        .log_audit(
            &user_email,
            "generate",
            Some("invoice"),
            None,
            Some(&format!(
                "month={:04}-{:02} created={} skipped={}",
                year, month, result.created, result.skipped
            )),
        )
        .map_err(core_error)?;

    Ok(Json(result))
}

/// POST /api/invoices/:id/toggle-status - Flip pending and paid
pub async fn toggle_invoice_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Invoice>, AppError> {
    let user_email = get_user_email(request.headers());

    let status = state.db.toggle_invoice_status(id).map_err(core_error)?;
    let invoice = load_invoice(&state, id)?;

    state
        .db
        .log_audit(
            &user_email,
            "toggle_status",
            Some("invoice"),
            Some(id),
            Some(&format!("status={}", status)),
        )
        .map_err(core_error)?;

    Ok(Json(invoice))
}

/// Response for the reminder endpoint
#[derive(Serialize)]
pub struct WhatsappResponse {
    /// `wa.me` link with the reminder text pre-filled
    pub link: String,
    pub invoice: Invoice,
}

/// POST /api/invoices/:id/whatsapp - Build the payment reminder link and mark it sent
pub async fn send_whatsapp_reminder(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<WhatsappResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    let invoice = load_invoice(&state, id)?;
    let customer_id = invoice
        .customer_id
        .ok_or_else(|| AppError::bad_request("Invoice customer no longer exists"))?;
    let customer = state
        .db
        .get_customer(customer_id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::bad_request("Invoice customer no longer exists"))?;

    let link = payment_reminder_link(
        &state.company,
        &customer.phone,
        &customer.name,
        invoice.due_date,
        invoice.amount,
    );

    state.db.mark_whatsapp_sent(id).map_err(core_error)?;
    let invoice = load_invoice(&state, id)?;

    state
        .db
        .log_audit(
            &user_email,
            "whatsapp",
            Some("invoice"),
            Some(id),
            Some(&format!("customer_id={}", customer_id)),
        )
        .map_err(core_error)?;

    Ok(Json(WhatsappResponse { link, invoice }))
}

/// GET /api/invoices/:id/document - Printable invoice
pub async fn invoice_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Response<Body>, AppError> {
    let user_email = get_user_email(request.headers());

    let invoice = load_invoice(&state, id)?;
    let customer = match invoice.customer_id {
        Some(customer_id) => state.db.get_customer(customer_id).map_err(core_error)?,
        None => None,
    }
    .ok_or_else(|| AppError::bad_request("Invoice customer no longer exists"))?;

    let html = render_invoice(&invoice, &customer, &state.company, today());

    state
        .db
        .log_audit(&user_email, "render", Some("invoice"), Some(id), None)
        .map_err(core_error)?;

    html_document(html, &invoice_filename(&invoice))
}
