//! Expense handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, Response, StatusCode},
    Json,
};
use serde::Deserialize;

use super::{html_document, parse_month_param, today};
use crate::{core_error, get_user_email, AppError, AppState, SuccessResponse};
use lince_core::{
    documents::render_expense_list,
    format::{month_label, year_month},
    models::{Expense, ExpenseCategory, ExpenseStatus, NewExpense},
    ExpenseFilter,
};

/// Query parameters for listing expenses
#[derive(Debug, Deserialize)]
pub struct ExpenseListQuery {
    /// Due month (YYYY-MM)
    pub month: Option<String>,
    /// Category label, e.g. `Telecomunicações`
    pub category: Option<String>,
    /// `pending`, `paid` or `overdue`
    pub status: Option<String>,
}

impl ExpenseListQuery {
    pub(crate) fn to_filter(&self) -> Result<ExpenseFilter, AppError> {
        let category = self
            .category
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ExpenseCategory>())
            .transpose()
            .map_err(|e| AppError::bad_request(&e))?;
        let status = self
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ExpenseStatus>())
            .transpose()
            .map_err(|e| AppError::bad_request(&e))?;

        Ok(ExpenseFilter {
            month: parse_month_param(self.month.as_deref())?,
            category,
            status,
        })
    }
}

fn load_expense(state: &AppState, id: i64) -> Result<Expense, AppError> {
    state
        .db
        .get_expense(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::not_found(&format!("Expense {} not found", id)))
}

/// GET /api/expenses - List expenses, overdue status refreshed first
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseListQuery>,
    request: Request,
) -> Result<Json<Vec<Expense>>, AppError> {
    let user_email = get_user_email(request.headers());
    let filter = params.to_filter()?;

    state.db.refresh_overdue_expenses(today()).map_err(core_error)?;
    let expenses = state.db.list_expenses(&filter).map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "list",
            Some("expense"),
            None,
            Some(&format!("count={}", expenses.len())),
        )
        .map_err(core_error)?;

    Ok(Json(expenses))
}

/// POST /api/expenses - Create an expense
pub async fn create_expense(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    let user_email = get_user_email(&headers);

    let id = state.db.create_expense(&req).map_err(core_error)?;
    let expense = load_expense(&state, id)?;

    state
        .db
        .log_audit(
            &user_email,
            "create",
            Some("expense"),
            Some(id),
            Some(&format!("category={}", req.category)),
        )
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /api/expenses/categories - Available expense categories
pub async fn list_expense_categories() -> Json<Vec<&'static str>> {
    Json(ExpenseCategory::ALL.iter().map(|c| c.as_str()).collect())
}

/// GET /api/expenses/:id - Get a single expense
pub async fn get_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_email = get_user_email(request.headers());

    let expense = load_expense(&state, id)?;

    state
        .db
        .log_audit(&user_email, "view", Some("expense"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(expense))
}

/// PUT /api/expenses/:id - Update an expense
pub async fn update_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<NewExpense>,
) -> Result<Json<Expense>, AppError> {
    let user_email = get_user_email(&headers);

    state.db.update_expense(id, &req).map_err(core_error)?;
    let expense = load_expense(&state, id)?;

    state
        .db
        .log_audit(&user_email, "update", Some("expense"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(expense))
}

/// DELETE /api/expenses/:id - Delete an expense
pub async fn delete_expense(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_expense(id).map_err(core_error)? {
        return Err(AppError::not_found(&format!("Expense {} not found", id)));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("expense"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// POST /api/expenses/:id/toggle-status - Mark paid today, or back to pending/overdue
pub async fn toggle_expense_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Expense>, AppError> {
    let user_email = get_user_email(request.headers());

    let expense = state
        .db
        .toggle_expense_status(id, today())
        .map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "toggle_status",
            Some("expense"),
            Some(id),
            Some(&format!("status={}", expense.status)),
        )
        .map_err(core_error)?;

    Ok(Json(expense))
}

/// Query parameters for the printable expense list
#[derive(Debug, Deserialize)]
pub struct ExpenseDocumentQuery {
    /// Month (YYYY-MM), defaults to the current month
    pub month: Option<String>,
}

/// GET /api/expenses/document - Printable expense list for a month
pub async fn expense_list_document(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ExpenseDocumentQuery>,
    request: Request,
) -> Result<Response<Body>, AppError> {
    let user_email = get_user_email(request.headers());
    let today = today();
    let (year, month) =
        parse_month_param(params.month.as_deref())?.unwrap_or_else(|| year_month(today));

    state.db.refresh_overdue_expenses(today).map_err(core_error)?;
    let expenses = state
        .db
        .list_expenses(&ExpenseFilter {
            month: Some((year, month)),
            ..Default::default()
        })
        .map_err(core_error)?;

    let html = render_expense_list(&expenses, &month_label(year, month), &state.company);

    state
        .db
        .log_audit(
            &user_email,
            "render",
            Some("expense"),
            None,
            Some(&format!("month={:04}-{:02}", year, month)),
        )
        .map_err(core_error)?;

    html_document(html, &format!("despesas-{:04}-{:02}.html", year, month))
}
