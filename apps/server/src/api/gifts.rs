use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use tracing::warn;

use amora_core::gifts::{Gift, GiftSendRequest};
use amora_core::users::Principal;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

pub async fn list_gifts(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Gift>>> {
    Ok(Json(state.gift_service.list_gifts()?))
}

pub async fn send_gift(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<GiftSendRequest>,
) -> ApiResult<Json<Value>> {
    if !state.gift_limiter.try_acquire(&principal.user_id) {
        return Err(ApiError::TooManyRequests);
    }

    let recipient_id = payload.recipient_id.clone();
    let outcome = state
        .gift_service
        .send_gift(&principal.user_id, payload)
        .await?;

    // Gift value moved; re-run the risk rules for the recipient.
    let risk = state.risk_service.clone();
    tokio::spawn(async move {
        if let Err(err) = risk.evaluate_user(&recipient_id).await {
            warn!("risk evaluation after gift failed: {}", err);
        }
    });

    let tx = outcome.transaction;
    Ok(Json(json!({
        "ok": true,
        "txId": tx.id,
        "coinsSpent": tx.coins_spent,
        "creatorPayout": tx.creator_payout,
    })))
}
