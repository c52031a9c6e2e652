use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use amora_core::subscriptions::{ActivationOutcome, Plan, PlanCode, SubscriptionCheckout};
use amora_core::users::Principal;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

pub async fn list_plans(State(state): State<Arc<AppState>>) -> Json<Vec<Plan>> {
    Json(state.subscription_service.plans())
}

#[derive(Deserialize)]
pub struct SubscribeBody {
    pub plan: PlanCode,
}

pub async fn subscribe(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<SubscribeBody>,
) -> ApiResult<(StatusCode, Json<SubscriptionCheckout>)> {
    let checkout = state
        .subscription_service
        .subscribe(&principal.user_id, payload.plan)
        .await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}

/// Explicit activation for environments without a reachable webhook.
/// Hidden unless the dev flag is set.
pub async fn activate(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<SubscribeBody>,
) -> ApiResult<Json<Value>> {
    if !state.config.dev_allow_activate {
        return Err(ApiError::NotFound);
    }

    let outcome = state
        .subscription_service
        .activate_direct(&principal.user_id, payload.plan)
        .await?;

    let expires_at = match outcome {
        ActivationOutcome::Activated { expires_at, .. } => Some(expires_at),
        ActivationOutcome::AlreadyCompleted { purchase } => purchase.expires_at,
    };
    Ok(Json(json!({ "ok": true, "expiresAt": expires_at })))
}
