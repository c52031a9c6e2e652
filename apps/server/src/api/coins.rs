use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;

use amora_core::payments::{CoinPackage, CoinPackageRepositoryTrait, TopUpCheckout};
use amora_core::users::Principal;

use crate::error::ApiResult;
use crate::main_lib::AppState;

pub async fn list_packages(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<CoinPackage>>> {
    Ok(Json(state.packages.list_active()?))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopUpBody {
    pub package_id: String,
    pub return_url: Option<String>,
}

pub async fn create_topup(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<TopUpBody>,
) -> ApiResult<(StatusCode, Json<TopUpCheckout>)> {
    let checkout = state
        .topup_service
        .create_topup(&principal.user_id, &payload.package_id, payload.return_url)
        .await?;
    Ok((StatusCode::CREATED, Json(checkout)))
}
