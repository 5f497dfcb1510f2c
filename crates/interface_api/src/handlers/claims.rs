//! Claims handlers
//!
//! Thin adapters from HTTP to [`ClaimService`](domain_claims::ClaimService):
//! parse the request, act as the authenticated [`Caller`], map the result.

use std::str::FromStr;

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use rust_decimal::Decimal;
use tracing::debug;
use validator::Validate;

use core_kernel::ClaimId;
use domain_claims::{Caller, ClaimStatus, ClaimSubmission, DocumentUpload};

use crate::dto::claims::*;
use crate::{error::ApiError, AppState};

/// Submits a claim from a multipart form
///
/// Fields: `hours_worked`, `hourly_rate`, optional `notes`, optional
/// `document` file part.
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmitClaimResponse>), ApiError> {
    let mut hours_worked = None;
    let mut hourly_rate = None;
    let mut notes = None;
    let mut document = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "hours_worked" => hours_worked = Some(parse_decimal(&name, &field.text().await?)?),
            "hourly_rate" => hourly_rate = Some(parse_decimal(&name, &field.text().await?)?),
            "notes" => {
                let text = field.text().await?;
                notes = Some(text.trim().to_string()).filter(|n| !n.is_empty());
            }
            "document" => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let content = field.bytes().await?;
                // Browsers send an empty part when no file was chosen
                if !content.is_empty() {
                    document = Some(DocumentUpload::new(file_name, content.to_vec())?);
                }
            }
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    let hours_worked = hours_worked.ok_or_else(|| ApiError::validation("hours_worked is required"))?;
    let hourly_rate = hourly_rate.ok_or_else(|| ApiError::validation("hourly_rate is required"))?;

    let mut submission = ClaimSubmission::new(hours_worked, hourly_rate);
    if let Some(notes) = notes {
        submission = submission.with_notes(notes);
    }

    let receipt = state
        .service
        .submit_claim(&caller, submission, document)
        .await?;

    Ok((StatusCode::CREATED, Json(receipt.into())))
}

/// Lists claims visible to the caller
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<Vec<ClaimResponse>>, ApiError> {
    let status = query
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ClaimStatus::from_str)
        .transpose()?;

    let claims = state.service.list_claims(&caller, status).await?;
    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

/// Gets a claim by ID
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.service.get_claim(&caller, parse_claim_id(&id)?).await?;
    Ok(Json(claim.into()))
}

/// Gets the supporting document record of a claim
pub async fn get_document(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let document = state.service.get_document(&caller, parse_claim_id(&id)?).await?;
    Ok(Json(document.into()))
}

/// Verifies a pending claim
pub async fn verify_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<VerifyRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;
    let claim = state
        .service
        .verify_claim(&caller, parse_claim_id(&id)?, request.note)
        .await?;
    Ok(Json(claim.into()))
}

/// Approves a verified claim
pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<ClaimResponse>, ApiError> {
    let claim = state.service.approve_claim(&caller, parse_claim_id(&id)?).await?;
    Ok(Json(claim.into()))
}

/// Rejects a pending or verified claim
pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<Json<ClaimResponse>, ApiError> {
    request.validate()?;
    let claim = state
        .service
        .reject_claim(&caller, parse_claim_id(&id)?, request.note)
        .await?;
    Ok(Json(claim.into()))
}

fn parse_claim_id(raw: &str) -> Result<ClaimId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::validation(format!("'{}' is not a valid claim id", raw)))
}

fn parse_decimal(field: &str, raw: &str) -> Result<Decimal, ApiError> {
    Decimal::from_str(raw.trim())
        .map_err(|_| ApiError::validation(format!("{} must be a decimal number, got '{}'", field, raw)))
}
