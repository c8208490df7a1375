//! Commercial proposal handlers

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderMap, Response, StatusCode},
    Json,
};
use serde::Deserialize;

use super::{html_document, today};
use crate::{core_error, get_user_email, AppError, AppState, SuccessResponse};
use lince_core::{
    documents::{proposal_pdf_filename, render_proposal},
    models::{NewProposal, Proposal, ProposalStats, ProposalStatus},
    reports,
};

fn load_proposal(state: &AppState, id: i64) -> Result<Proposal, AppError> {
    state
        .db
        .get_proposal(id)
        .map_err(core_error)?
        .ok_or_else(|| AppError::not_found(&format!("Proposal {} not found", id)))
}

/// GET /api/proposals - List proposals, newest number first
pub async fn list_proposals(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<Vec<Proposal>>, AppError> {
    let user_email = get_user_email(request.headers());

    let proposals = state.db.list_proposals().map_err(core_error)?;

    state
        .db
        .log_audit(
            &user_email,
            "list",
            Some("proposal"),
            None,
            Some(&format!("count={}", proposals.len())),
        )
        .map_err(core_error)?;

    Ok(Json(proposals))
}

/// POST /api/proposals - Create a proposal with the next sequential number
pub async fn create_proposal(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<NewProposal>,
) -> Result<(StatusCode, Json<Proposal>), AppError> {
    let user_email = get_user_email(&headers);

    let id = state
        .db
        .create_proposal(&req, today())
        .map_err(core_error)?;
    let proposal = load_proposal(&state, id)?;

    state
        .db
        .log_audit(
            &user_email,
            "create",
            Some("proposal"),
            Some(id),
            Some(&format!("number={}", proposal.number)),
        )
        .map_err(core_error)?;

    Ok((StatusCode::CREATED, Json(proposal)))
}

/// GET /api/proposals/stats - Counters by status
pub async fn get_proposal_stats(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Json<ProposalStats>, AppError> {
    let user_email = get_user_email(request.headers());

    let stats = reports::proposal_stats(&state.db.list_proposals().map_err(core_error)?);

    state
        .db
        .log_audit(&user_email, "view", Some("proposal_stats"), None, None)
        .map_err(core_error)?;

    Ok(Json(stats))
}

/// GET /api/proposals/:id - Get a single proposal
pub async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<Proposal>, AppError> {
    let user_email = get_user_email(request.headers());

    let proposal = load_proposal(&state, id)?;

    state
        .db
        .log_audit(&user_email, "view", Some("proposal"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(proposal))
}

/// PUT /api/proposals/:id - Update a proposal (number and validity are kept)
pub async fn update_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<NewProposal>,
) -> Result<Json<Proposal>, AppError> {
    let user_email = get_user_email(&headers);

    state.db.update_proposal(id, &req).map_err(core_error)?;
    let proposal = load_proposal(&state, id)?;

    state
        .db
        .log_audit(&user_email, "update", Some("proposal"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(proposal))
}

/// DELETE /api/proposals/:id - Delete a proposal
pub async fn delete_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Json<SuccessResponse>, AppError> {
    let user_email = get_user_email(request.headers());

    if !state.db.delete_proposal(id).map_err(core_error)? {
        return Err(AppError::not_found(&format!("Proposal {} not found", id)));
    }

    state
        .db
        .log_audit(&user_email, "delete", Some("proposal"), Some(id), None)
        .map_err(core_error)?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Request body for setting a proposal status
#[derive(Debug, Deserialize)]
pub struct ProposalStatusRequest {
    pub status: ProposalStatus,
}

/// POST /api/proposals/:id/status - Move a proposal through the negotiation
pub async fn set_proposal_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(req): Json<ProposalStatusRequest>,
) -> Result<Json<Proposal>, AppError> {
    let user_email = get_user_email(&headers);

    state
        .db
        .set_proposal_status(id, req.status)
        .map_err(core_error)?;
    let proposal = load_proposal(&state, id)?;

    state
        .db
        .log_audit(
            &user_email,
            "set_status",
            Some("proposal"),
            Some(id),
            Some(&format!("status={}", req.status)),
        )
        .map_err(core_error)?;

    Ok(Json(proposal))
}

/// GET /api/proposals/:id/document - Printable proposal
///
/// Served inline; the suggested filename is the one used when saving as PDF.
pub async fn proposal_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    request: Request,
) -> Result<Response<Body>, AppError> {
    let user_email = get_user_email(request.headers());

    let proposal = load_proposal(&state, id)?;
    let html = render_proposal(&proposal, &state.company, today());

    state
        .db
        .log_audit(&user_email, "render", Some("proposal"), Some(id), None)
        .map_err(core_error)?;

    html_document(html, &proposal_pdf_filename(proposal.number))
}
