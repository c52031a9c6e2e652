use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use amora_core::kyc::{KycDecision, KycStatus, KycSubmission};
use amora_core::users::Principal;
use amora_core::withdrawals::{WithdrawalRequest, WithdrawalStatus};

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

#[derive(Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

pub async fn list_withdrawals(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Json<Vec<WithdrawalRequest>>> {
    let status = filter
        .status
        .map(|s| s.parse::<WithdrawalStatus>())
        .transpose()
        .map_err(ApiError::Core)?;
    Ok(Json(state.withdrawal_service.list(status)?))
}

pub async fn approve_withdrawal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Value>> {
    let withdrawal = state.withdrawal_service.approve(&id).await?;
    Ok(Json(json!({ "ok": true, "status": withdrawal.status })))
}

#[derive(Deserialize)]
pub struct RejectBody {
    pub reason: Option<String>,
}

pub async fn reject_withdrawal(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RejectBody>,
) -> ApiResult<Json<Value>> {
    let reason = payload.reason.unwrap_or_default();
    let withdrawal = state.withdrawal_service.reject(&id, &reason).await?;
    Ok(Json(json!({ "ok": true, "status": withdrawal.status })))
}

pub async fn list_kyc(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Json<Vec<KycSubmission>>> {
    let status = match filter.status.as_deref() {
        None => Some(KycStatus::Pending),
        Some("all") => None,
        Some(other) => Some(other.parse::<KycStatus>().map_err(ApiError::Core)?),
    };
    Ok(Json(state.kyc_service.list(status)?))
}

#[derive(Deserialize)]
pub struct ReviewBody {
    pub decision: KycDecision,
    pub notes: Option<String>,
}

pub async fn review_kyc(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<ReviewBody>,
) -> ApiResult<Json<KycSubmission>> {
    let submission = state
        .kyc_service
        .review(&principal.user_id, &id, payload.decision, payload.notes)
        .await?;
    Ok(Json(submission))
}
