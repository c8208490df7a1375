//! Health check and dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use super::{parse_month_param, today};
use crate::{core_error, get_user_email, AppError, AppState};
use lince_core::{
    format::year_month,
    models::DashboardStats,
    reports, ExpenseFilter, InvoiceFilter,
};

/// GET /api/health - Storage status
///
/// Returns 503 when the database cannot be reached or the last connection
/// attempt failed.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let reachable = match state.db.health_check() {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check failed");
            false
        }
    };
    let degraded = state.db.is_degraded();

    let status = if reachable && !degraded {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if status == StatusCode::OK { "ok" } else { "unavailable" },
            "database": if reachable { "connected" } else { "unreachable" },
            "degraded": degraded,
        })),
    )
        .into_response()
}

/// Query parameters for the dashboard
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// Month (YYYY-MM), defaults to the current month
    pub month: Option<String>,
}

/// GET /api/dashboard - Month overview
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DashboardQuery>,
    request: Request,
) -> Result<Json<DashboardStats>, AppError> {
    let user_email = get_user_email(request.headers());
    let today = today();
    let (year, month) = parse_month_param(params.month.as_deref())?
        .unwrap_or_else(|| year_month(today));

    state.db.refresh_overdue_expenses(today).map_err(core_error)?;

    let invoices = state
        .db
        .list_invoices(&InvoiceFilter {
            month: Some((year, month)),
            ..Default::default()
        })
        .map_err(core_error)?;
    let expenses = state
        .db
        .list_expenses(&ExpenseFilter {
            month: Some((year, month)),
            ..Default::default()
        })
        .map_err(core_error)?;

    let stats = reports::dashboard(&invoices, &expenses, year, month);

    state
        .db
        .log_audit(
            &user_email,
            "view",
            Some("dashboard"),
            None,
            Some(&stats.month),
        )
        .map_err(core_error)?;

    Ok(Json(stats))
}
