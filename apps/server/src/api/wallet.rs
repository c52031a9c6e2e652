use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::warn;

use amora_core::users::Principal;
use amora_core::wallets::{WalletServiceTrait, WalletView};
use amora_core::withdrawals::NewWithdrawal;

use crate::error::ApiResult;
use crate::main_lib::AppState;

pub async fn get_wallet(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<WalletView>> {
    Ok(Json(
        state
            .wallet_service
            .get_wallet_view(&principal.user_id)
            .await?,
    ))
}

pub async fn create_withdrawal(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NewWithdrawal>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let withdrawal = state
        .withdrawal_service
        .create_withdrawal(&principal.user_id, payload)
        .await?;

    // Money left available funds; re-run the risk rules for the owner.
    let risk = state.risk_service.clone();
    let user_id = principal.user_id.clone();
    tokio::spawn(async move {
        if let Err(err) = risk.evaluate_user(&user_id).await {
            warn!("risk evaluation after withdrawal failed: {}", err);
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "withdrawalId": withdrawal.id })),
    ))
}
