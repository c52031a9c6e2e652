use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Extension, Json,
};

use amora_core::payments::Receipt;
use amora_core::providers::{Bank, PaymentProviderTrait};
use amora_core::users::Principal;

use crate::error::ApiResult;
use crate::main_lib::AppState;

pub async fn get_receipt(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Receipt>> {
    Ok(Json(state.topup_service.get_receipt(&principal.user_id, &id)?))
}

pub async fn list_banks(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Bank>>> {
    Ok(Json(state.provider.list_banks().await?))
}
