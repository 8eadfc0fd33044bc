//! `/orders` routes.

use super::{AppState, error::ApiResult};
use crate::{
    core::order::{self, NewOrder, OrderFilter, OrderItemView, OrderView, PaymentReceipt},
    entities::order as order_entity,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/", get(list_orders).post(create_order))
        .route("/orders/new", post(create_empty_order))
        .route("/orders/hold", post(hold_order))
        .route("/orders/:id", get(get_order).delete(delete_order))
        .route("/orders/:id/items", get(get_order_items).post(add_item))
        .route(
            "/orders/:id/items/:item_id",
            put(update_item_quantity).delete(remove_item),
        )
        .route("/orders/:id/discount", put(set_discount))
        .route("/orders/:id/pay", post(pay_order))
        .route("/orders/:id/save-unpaid", post(save_unpaid))
        .route("/orders/:id/cancel", delete(cancel_order))
        .route("/orders/:id/restore", post(restore_order))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> ApiResult<Json<Vec<OrderView>>> {
    Ok(Json(order::list_orders(&state.db, &filter).await?))
}

async fn create_order(
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(order::create_order(&state.db, body).await?))
}

async fn create_empty_order(State(state): State<AppState>) -> ApiResult<Json<order_entity::Model>> {
    Ok(Json(order::create_empty_order(&state.db).await?))
}

async fn hold_order(
    State(state): State<AppState>,
    Json(body): Json<NewOrder>,
) -> ApiResult<Json<Value>> {
    let held = order::hold_order(&state.db, body).await?;
    Ok(Json(json!({ "message": "Order held successfully", "order_id": held.id })))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<OrderView>> {
    Ok(Json(order::get_order(&state.db, id).await?))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    order::delete_order(&state.db, id).await?;
    Ok(Json(json!({ "message": format!("Order #{id} deleted") })))
}

async fn get_order_items(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Vec<OrderItemView>>> {
    Ok(Json(order::get_order_items(&state.db, id).await?))
}

#[derive(Debug, Deserialize)]
struct AddItemRequest {
    menu_item_id: i64,
    quantity: i32,
}

async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<AddItemRequest>,
) -> ApiResult<Json<OrderItemView>> {
    Ok(Json(
        order::add_item(&state.db, id, body.menu_item_id, body.quantity).await?,
    ))
}

#[derive(Debug, Deserialize)]
struct QuantityRequest {
    quantity: i32,
}

async fn update_item_quantity(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
    Json(body): Json<QuantityRequest>,
) -> ApiResult<Json<Value>> {
    let updated = order::update_item_quantity(&state.db, id, item_id, body.quantity).await?;
    Ok(Json(json!({ "message": "Item quantity updated", "total": updated.total })))
}

async fn remove_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> ApiResult<Json<Value>> {
    let updated = order::remove_item(&state.db, id, item_id).await?;
    Ok(Json(json!({ "message": "Item removed", "total": updated.total })))
}

#[derive(Debug, Deserialize)]
struct DiscountRequest {
    discount: f64,
}

async fn set_discount(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<DiscountRequest>,
) -> ApiResult<Json<Value>> {
    let updated = order::set_discount(&state.db, id, body.discount).await?;
    Ok(Json(json!({ "message": "Discount updated", "discount": updated.discount })))
}

#[derive(Debug, Deserialize)]
struct PayRequest {
    paid: f64,
    /// Change handed back, logged only
    #[serde(default)]
    change: Option<f64>,
}

async fn pay_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PayRequest>,
) -> ApiResult<Json<Value>> {
    debug!(order_id = id, paid = body.paid, change = ?body.change, "payment received");
    let PaymentReceipt {
        paid,
        receipt_number,
        ..
    } = order::pay_order(&state.db, id, body.paid).await?;

    Ok(Json(json!({
        "message": "Order marked as paid",
        "paid": paid,
        "receipt_number": receipt_number,
    })))
}

/// The terminal sends either a bare number or `{"paid": n}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SaveUnpaidRequest {
    Bare(f64),
    Wrapped { paid: f64 },
}

impl SaveUnpaidRequest {
    const fn paid(&self) -> f64 {
        match self {
            Self::Bare(paid) | Self::Wrapped { paid } => *paid,
        }
    }
}

async fn save_unpaid(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SaveUnpaidRequest>,
) -> ApiResult<Json<Value>> {
    let updated = order::save_unpaid(&state.db, id, body.paid()).await?;
    Ok(Json(json!({ "message": "Partial payment saved", "paid": updated.paid })))
}

#[derive(Debug, Default, Deserialize)]
struct CancelRequest {
    #[serde(default)]
    cancel_reason: Option<String>,
}

async fn cancel_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Option<Json<CancelRequest>>,
) -> ApiResult<Json<Value>> {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let canceled = order::cancel_order(&state.db, id, request.cancel_reason).await?;
    Ok(Json(json!({
        "message": format!("Order #{id} canceled"),
        "cancel_reason": canceled.cancel_reason,
        "status": canceled.status,
    })))
}

async fn restore_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Value>> {
    order::restore_order(&state.db, id).await?;
    Ok(Json(json!({ "message": format!("Order #{id} restored") })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::send;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use chrono::{Datelike, Local};
    use serde_json::json;

    #[tokio::test]
    async fn test_order_lifecycle_over_http() {
        let db = setup_test_db().await.unwrap();
        let five = create_test_menu_item(&db, "Sisig", 5.0).await.unwrap();
        let three = create_test_menu_item(&db, "Chicharon", 3.0).await.unwrap();

        let (status, created) = send(
            &db,
            Method::POST,
            "/orders/",
            Some(json!({
                "items": [
                    {"menu_item_id": five.id, "quantity": 2},
                    {"menu_item_id": three.id, "quantity": 1, "discount_person_type": "senior"}
                ],
                "type": "dine-in",
                "cashier": "Ana"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["total"], 13.0);
        assert_eq!(created["type"], "dine-in");
        assert_eq!(created["is_paid"], false);
        assert_eq!(created["items"].as_array().unwrap().len(), 2);
        assert_eq!(created["items"][0]["menu_item"]["name"], "Sisig");
        let id = created["id"].as_i64().unwrap();

        let (status, _) = send(
            &db,
            Method::PUT,
            &format!("/orders/{id}/discount"),
            Some(json!({"discount": 3.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, paid) = send(
            &db,
            Method::POST,
            &format!("/orders/{id}/pay"),
            Some(json!({"paid": 10.0, "change": 0.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["paid"], 10.0);
        assert_eq!(
            paid["receipt_number"],
            format!("PX-{}-000001", Local::now().year())
        );

        let (status, body) = send(
            &db,
            Method::POST,
            &format!("/orders/{id}/save-unpaid"),
            Some(json!(13.0)),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        let (status, body) = send(
            &db,
            Method::POST,
            &format!("/orders/{id}/save-unpaid"),
            Some(json!({"paid": 13.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("already paid"));

        let (status, body) = send(&db, Method::DELETE, &format!("/orders/{id}/cancel"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "void");
        assert_eq!(body["cancel_reason"], "Canceled by user");

        let (status, _) = send(&db, Method::POST, &format!("/orders/{id}/restore"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&db, Method::POST, &format!("/orders/{id}/restore"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&db, Method::DELETE, &format!("/orders/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(&db, Method::GET, &format!("/orders/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_tab_item_routes() {
        let db = setup_test_db().await.unwrap();
        let beer = create_test_menu_item(&db, "Red Horse", 95.0).await.unwrap();

        let (status, tab) = send(&db, Method::POST, "/orders/new", None).await;
        assert_eq!(status, StatusCode::OK);
        let id = tab["id"].as_i64().unwrap();

        let (status, item) = send(
            &db,
            Method::POST,
            &format!("/orders/{id}/items"),
            Some(json!({"menu_item_id": beer.id, "quantity": 2})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let item_id = item["id"].as_i64().unwrap();

        let (status, body) = send(
            &db,
            Method::PUT,
            &format!("/orders/{id}/items/{item_id}"),
            Some(json!({"quantity": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 285.0);

        let (status, items) = send(&db, Method::GET, &format!("/orders/{id}/items"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items[0]["quantity"], 3);

        let (status, body) = send(
            &db,
            Method::DELETE,
            &format!("/orders/{id}/items/{item_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0.0);

        let (status, _) = send(
            &db,
            Method::POST,
            &format!("/orders/{id}/items"),
            Some(json!({"menu_item_id": 9999, "quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_hold_and_filter_orders() {
        let db = setup_test_db().await.unwrap();
        let beer = create_test_menu_item(&db, "Red Horse", 95.0).await.unwrap();
        create_test_order(&db, &[(beer.id, 1)]).await.unwrap();

        let (status, held) = send(
            &db,
            Method::POST,
            "/orders/hold",
            Some(json!({"items": [{"menu_item_id": beer.id, "quantity": 4}], "type": "take-out"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(held["order_id"].is_i64());

        let (status, all) = send(&db, Method::GET, "/orders/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);

        let (_, held_only) =
            send(&db, Method::GET, "/orders?status=held&is_paid=false", None).await;
        let held_only = held_only.as_array().unwrap();
        assert_eq!(held_only.len(), 1);
        assert_eq!(held_only[0]["id"], held["order_id"]);
        assert_eq!(held_only[0]["total"], 0.0);
    }

    #[tokio::test]
    async fn test_invalid_payloads_are_rejected() {
        let db = setup_test_db().await.unwrap();
        let order = create_test_order(&db, &[]).await.unwrap();
        let id = order.order.id;

        let (status, _) = send(
            &db,
            Method::PUT,
            &format!("/orders/{id}/discount"),
            Some(json!({"discount": -1.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &db,
            Method::POST,
            "/orders/9999/pay",
            Some(json!({"paid": 10.0})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
