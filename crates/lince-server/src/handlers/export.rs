//! CSV export handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, HeaderMap, Response, StatusCode},
};
use serde::Deserialize;

use super::parse_month_param;
use crate::{core_error, get_user_email, AppError, AppState};
use lince_core::{format::month_key, ExpenseFilter, InvoiceFilter};

/// Query parameters for CSV export
#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    /// Month (YYYY-MM); everything when omitted
    pub month: Option<String>,
}

fn csv_response(content: String, filename: &str) -> Result<Response<Body>, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        )
        .body(Body::from(content))
        .map_err(|e| AppError::internal(&format!("Failed to build response: {}", e)))
}

fn export_filename(prefix: &str, month: Option<(i32, u32)>) -> String {
    match month {
        Some((year, month)) => format!("{}-{}.csv", prefix, month_key(year, month)),
        None => format!("{}.csv", prefix),
    }
}

/// GET /api/export/invoices - Download invoices as CSV
pub async fn export_invoices(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let user_email = get_user_email(&headers);
    let month = parse_month_param(params.month.as_deref())?;

    let content = state
        .db
        .export_invoices_csv(&InvoiceFilter {
            month,
            ..Default::default()
        })
        .map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "export",
            Some("invoice"),
            None,
            params.month.as_deref(),
        )
        .map_err(core_error)?;

    csv_response(content, &export_filename("faturas", month))
}

/// GET /api/export/expenses - Download expenses as CSV
pub async fn export_expenses(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ExportQuery>,
) -> Result<Response<Body>, AppError> {
    let user_email = get_user_email(&headers);
    let month = parse_month_param(params.month.as_deref())?;

    let content = state
        .db
        .export_expenses_csv(&ExpenseFilter {
            month,
            ..Default::default()
        })
        .map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "export",
            Some("expense"),
            None,
            params.month.as_deref(),
        )
        .map_err(core_error)?;

    csv_response(content, &export_filename("despesas", month))
}
