//! Report handlers
//!
//! Period reports accept `?month=YYYY-MM` or `?from=YYYY-MM-DD&to=YYYY-MM-DD`
//! and default to the current month.

use std::sync::Arc;

use axum::{
    extract::{Query, Request, State},
    Json,
};
use serde::Serialize;

use super::{today, PeriodQuery};
use crate::{core_error, get_user_email, AppError, AppState};
use lince_core::{
    models::{CustomerSummary, ExpenseSummary, FinancialSummary, InvoiceSummary, ReportPeriod},
    reports, ExpenseFilter, InvoiceFilter, Period,
};

/// A period summary together with the resolved period
#[derive(Serialize)]
pub struct PeriodReport<T: Serialize> {
    pub period: ReportPeriod,
    /// Human-readable period, e.g. "março de 2025"
    pub label: String,
    #[serde(flatten)]
    pub summary: T,
}

fn period_report<T: Serialize>(period: &Period, summary: T) -> Result<PeriodReport<T>, AppError> {
    Ok(PeriodReport {
        period: period.report_period().map_err(core_error)?,
        label: period.label(),
        summary,
    })
}

/// GET /api/reports/invoices - Invoice totals for a period
pub async fn report_invoices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
    request: Request,
) -> Result<Json<PeriodReport<InvoiceSummary>>, AppError> {
    let user_email = get_user_email(request.headers());
    let period = params.resolve(today())?;

    let invoices = state.db.list_invoices(&InvoiceFilter::default()).map_err(core_error)?;
    let summary = reports::summarize_invoices(&invoices, &period);

    state
        .db
        .log_audit(
            &user_email,
            "report",
            Some("invoices"),
            None,
            Some(&period.label()),
        )
        .map_err(core_error)?;

    Ok(Json(period_report(&period, summary)?))
}

/// GET /api/reports/expenses - Expense totals for a period, by status and category
pub async fn report_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
    request: Request,
) -> Result<Json<PeriodReport<ExpenseSummary>>, AppError> {
    let user_email = get_user_email(request.headers());
    let today = today();
    let period = params.resolve(today)?;

    state.db.refresh_overdue_expenses(today).map_err(core_error)?;
    let expenses = state.db.list_expenses(&ExpenseFilter::default()).map_err(core_error)?;
    let summary = reports::summarize_expenses(&expenses, &period);

    state
        .db
        .log_audit(
            &user_email,
            "report",
            Some("expenses"),
            None,
            Some(&period.label()),
        )
        .map_err(core_error)?;

    Ok(Json(period_report(&period, summary)?))
}

/// GET /api/reports/financial - Paid revenue against paid expenses
pub async fn report_financial(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PeriodQuery>,
    request: Request,
) -> Result<Json<FinancialSummary>, AppError> {
    let user_email = get_user_email(request.headers());
    let period = params.resolve(today())?;

    let invoices = state.db.list_invoices(&InvoiceFilter::default()).map_err(core_error)?;
    let expenses = state.db.list_expenses(&ExpenseFilter::default()).map_err(core_error)?;
    let summary = reports::financial_summary(&invoices, &expenses, &period).map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "report",
            Some("financial"),
            None,
            Some(&period.label()),
        )
        .map_err(core_error)?;

    Ok(Json(summary))
}

/// GET /api/reports/customers - Customer base snapshot
pub async fn report_customers(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<CustomerSummary>, AppError> {
    let user_email = get_user_email(request.headers());

    let summary = reports::summarize_customers(&state.db.list_customers().map_err(core_error)?);

    state
        .db
        .log_audit(&user_email, "report", Some("customers"), None, None)
        .map_err(core_error)?;

    Ok(Json(summary))
}
