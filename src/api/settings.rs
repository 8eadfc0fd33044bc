//! `/settings` routes for the receipt QR link and footer message.

use super::{AppState, error::ApiResult};
use crate::core::setting::{self, QR_LINK_KEY, RECEIPT_MESSAGE_KEY};
use axum::{Json, Router, extract::State, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/settings/qr-link", get(get_qr_link).put(put_qr_link))
        .route(
            "/settings/receipt-message",
            get(get_receipt_message).put(put_receipt_message),
        )
}

#[derive(Debug, Deserialize)]
struct SettingUpdate {
    value: String,
}

async fn read(state: &AppState, key: &str) -> ApiResult<Json<Value>> {
    let value = setting::get_setting_value(&state.db, key).await?;
    Ok(Json(json!({ "value": value })))
}

async fn write(state: &AppState, key: &str, value: &str, message: &str) -> ApiResult<Json<Value>> {
    let saved = setting::set_setting_value(&state.db, key, value).await?;
    Ok(Json(json!({ "message": message, "value": saved.value })))
}

async fn get_qr_link(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    read(&state, QR_LINK_KEY).await
}

async fn put_qr_link(
    State(state): State<AppState>,
    Json(body): Json<SettingUpdate>,
) -> ApiResult<Json<Value>> {
    write(&state, QR_LINK_KEY, &body.value, "QR link updated").await
}

async fn get_receipt_message(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    read(&state, RECEIPT_MESSAGE_KEY).await
}

async fn put_receipt_message(
    State(state): State<AppState>,
    Json(body): Json<SettingUpdate>,
) -> ApiResult<Json<Value>> {
    write(&state, RECEIPT_MESSAGE_KEY, &body.value, "Receipt message updated").await
}
