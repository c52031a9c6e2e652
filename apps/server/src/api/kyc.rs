use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};

use amora_core::kyc::KycDocType;
use amora_core::users::Principal;

use crate::error::{ApiError, ApiResult};
use crate::main_lib::AppState;

/// Multipart submission: `doc_type` text field plus `document` and
/// `selfie` file parts.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut doc_type: Option<KycDocType> = None;
    let mut document: Option<Vec<u8>> = None;
    let mut selfie: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("doc_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                doc_type = Some(
                    value
                        .trim()
                        .to_uppercase()
                        .parse::<KycDocType>()
                        .map_err(ApiError::Core)?,
                );
            }
            Some("document") => {
                document = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?
                        .to_vec(),
                );
            }
            Some("selfie") => {
                selfie = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::BadRequest(e.to_string()))?
                        .to_vec(),
                );
            }
            _ => {}
        }
    }

    let doc_type =
        doc_type.ok_or_else(|| ApiError::BadRequest("doc_type is required".into()))?;
    let document =
        document.ok_or_else(|| ApiError::BadRequest("document file is required".into()))?;
    let selfie = selfie.ok_or_else(|| ApiError::BadRequest("selfie file is required".into()))?;

    let outcome = state
        .kyc_service
        .submit(&principal.user_id, doc_type, &document, &selfie)
        .await?;

    let status = if outcome.already_pending {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(json!({
            "id": outcome.submission.id,
            "status": outcome.submission.status,
            "alreadyPending": outcome.already_pending,
        })),
    ))
}
