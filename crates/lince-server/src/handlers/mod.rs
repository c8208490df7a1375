//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod audit;
pub mod customers;
pub mod expenses;
pub mod export;
pub mod health;
pub mod invoices;
pub mod proposals;
pub mod reports;

// Re-export all handlers for use in router
pub use audit::*;
pub use customers::*;
pub use expenses::*;
pub use export::*;
pub use health::*;
pub use invoices::*;
pub use proposals::*;
pub use reports::*;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppError;

/// Current local date used for issue dates, toggles and overdue checks
pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Query parameters shared by period reports
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// Month (YYYY-MM), takes precedence over the range
    pub month: Option<String>,
    /// Start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// End date (YYYY-MM-DD)
    pub to: Option<String>,
}

impl PeriodQuery {
    pub(crate) fn resolve(&self, today: NaiveDate) -> Result<lince_core::Period, AppError> {
        lince_core::Period::resolve(
            self.month.as_deref(),
            self.from.as_deref(),
            self.to.as_deref(),
            today,
        )
        .map_err(crate::core_error)
    }
}

/// Parse an optional `YYYY-MM` query value
pub(crate) fn parse_month_param(month: Option<&str>) -> Result<Option<(i32, u32)>, AppError> {
    match month.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => lince_core::format::parse_month(m)
            .map(Some)
            .ok_or_else(|| AppError::bad_request("Invalid month format (use YYYY-MM)")),
        None => Ok(None),
    }
}

/// Printable HTML response with a suggested filename
pub(crate) fn html_document(html: String, filename: &str) -> Result<Response<Body>, AppError> {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/html; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        )
        .body(Body::from(html))
        .map_err(|e| AppError::internal(&format!("Failed to build response: {}", e)))
}
