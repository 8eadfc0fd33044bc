//! Supervisor and cashier routes.

use super::{AppState, error::ApiResult};
use crate::{
    core::identity::{self, CashierUpdate, NewCashier},
    entities::{cashier, supervisor},
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/supervisors", get(list_supervisors))
        .route("/supervisors/verify", post(verify_supervisor))
        .route("/supervisors/:id", put(update_supervisor))
        .route("/cashiers", get(list_cashiers).post(create_cashier))
        .route(
            "/cashiers/:id",
            get(get_cashier).put(update_cashier).delete(delete_cashier),
        )
}

#[derive(Debug, Deserialize)]
struct PinRequest {
    pin: String,
}

async fn list_supervisors(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<supervisor::Model>>> {
    Ok(Json(identity::list_supervisors(&state.db).await?))
}

async fn update_supervisor(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PinRequest>,
) -> ApiResult<Json<Value>> {
    identity::update_supervisor_pin(&state.db, id, &body.pin).await?;
    Ok(Json(json!({ "message": "Supervisor PIN updated" })))
}

async fn verify_supervisor(
    State(state): State<AppState>,
    Json(body): Json<PinRequest>,
) -> ApiResult<Json<Value>> {
    let valid = identity::verify_supervisor_pin(&state.db, &body.pin).await?;
    Ok(Json(json!({ "valid": valid })))
}

async fn list_cashiers(State(state): State<AppState>) -> ApiResult<Json<Vec<cashier::Model>>> {
    Ok(Json(identity::list_cashiers(&state.db).await?))
}

async fn get_cashier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<cashier::Model>> {
    Ok(Json(identity::get_cashier(&state.db, id).await?))
}

async fn create_cashier(
    State(state): State<AppState>,
    Json(body): Json<NewCashier>,
) -> ApiResult<Json<cashier::Model>> {
    Ok(Json(identity::create_cashier(&state.db, body).await?))
}

async fn update_cashier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<CashierUpdate>,
) -> ApiResult<Json<Value>> {
    identity::update_cashier(&state.db, id, body).await?;
    Ok(Json(json!({ "message": "Cashier updated" })))
}

async fn delete_cashier(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    identity::delete_cashier(&state.db, id).await?;
    Ok(Json(json!({ "message": "Cashier deleted" })))
}
