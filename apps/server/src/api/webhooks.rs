use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tracing::warn;

use amora_core::errors::Error as CoreError;
use amora_core::payments::{WebhookAck, WebhookEvent};
use amora_core::providers::verify_webhook_signature;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Query-string callback (the provider's redirect-style notification).
/// Carries no signature; settlement still re-verifies server-to-server.
pub async fn chapa_webhook_get(
    State(state): State<Arc<AppState>>,
    Query(event): Query<WebhookEvent>,
) -> ApiResult<Json<Value>> {
    handle(state, event).await
}

/// JSON-body callback, HMAC-signed over the raw bytes.
pub async fn chapa_webhook_post(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    if state.config.webhook_require_signature {
        let signature = headers
            .get("chapa-signature")
            .or_else(|| headers.get("x-chapa-signature"))
            .or_else(|| headers.get("verif-hash"))
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing signature header".into()))?;

        if !verify_webhook_signature(&state.config.chapa_webhook_secret, &body, signature) {
            return Err(ApiError::Unauthorized("Invalid signature".into()));
        }
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid webhook payload: {e}")))?;
    handle(state, event).await
}

async fn handle(state: Arc<AppState>, event: WebhookEvent) -> ApiResult<Json<Value>> {
    match state.settlement_service.handle(event).await {
        Ok(WebhookAck::Ignored) => Ok(Json(json!({ "ok": true, "ignored": true }))),
        Ok(WebhookAck::Idempotent) => Ok(Json(json!({ "ok": true, "idempotent": true }))),
        Ok(WebhookAck::Settled { user_id }) => {
            // Coins landed; re-run the top-up risk rules for the payer.
            let risk = state.risk_service.clone();
            tokio::spawn(async move {
                if let Err(err) = risk.evaluate_user(&user_id).await {
                    warn!("risk evaluation after settlement failed: {}", err);
                }
            });
            Ok(Json(json!({ "ok": true })))
        }
        Ok(WebhookAck::Activated) => Ok(Json(json!({ "ok": true }))),
        // The provider retries on non-2xx; a verification outage is our
        // problem, not theirs - acknowledge and let the replay settle it.
        Err(CoreError::ProviderUnavailable(reason)) => {
            warn!("webhook verification unavailable: {}", reason);
            Ok(Json(json!({ "ok": false, "deferred": true })))
        }
        Err(err) => Err(err.into()),
    }
}
