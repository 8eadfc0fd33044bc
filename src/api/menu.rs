//! `/menu` routes.

use super::{AppState, error::ApiResult};
use crate::{
    core::menu::{self, CategoryChange, MenuItemUpdate, NewMenuItem},
    entities::menu_item,
    errors::Error,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Value, json};

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/menu", get(list_items).post(create_item))
        .route("/menu/", get(list_items).post(create_item))
        .route("/menu/delete-category", post(delete_category))
        .route(
            "/menu/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

async fn list_items(State(state): State<AppState>) -> ApiResult<Json<Vec<menu_item::Model>>> {
    Ok(Json(menu::list_menu_items(&state.db).await?))
}

async fn create_item(
    State(state): State<AppState>,
    Json(body): Json<NewMenuItem>,
) -> ApiResult<Json<menu_item::Model>> {
    Ok(Json(menu::create_menu_item(&state.db, body).await?))
}

async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<menu_item::Model>> {
    let item = menu::get_menu_item_by_id(&state.db, id)
        .await?
        .ok_or(Error::MenuItemNotFound { id })?;
    Ok(Json(item))
}

async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<MenuItemUpdate>,
) -> ApiResult<Json<menu_item::Model>> {
    Ok(Json(menu::update_menu_item(&state.db, id, body).await?))
}

async fn delete_item(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Json<Value>> {
    menu::delete_menu_item(&state.db, id).await?;
    Ok(Json(json!({ "message": "Menu item deleted" })))
}

#[derive(Debug, Deserialize)]
struct DeleteCategoryRequest {
    category: String,
    #[serde(default)]
    reassign_to: Option<String>,
}

async fn delete_category(
    State(state): State<AppState>,
    Json(body): Json<DeleteCategoryRequest>,
) -> ApiResult<Json<Value>> {
    let change =
        menu::delete_category(&state.db, &body.category, body.reassign_to.as_deref()).await?;

    let message = match &change {
        CategoryChange::Reassigned { to, .. } => {
            format!("Category '{}' deleted and items reassigned to '{to}'.", body.category)
        }
        CategoryChange::Deleted { .. } => {
            format!("Category '{}' and its items deleted.", body.category)
        }
    };
    let items = match change {
        CategoryChange::Reassigned { items, .. } | CategoryChange::Deleted { items } => items,
    };
    Ok(Json(json!({ "message": message, "items": items })))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::api::test_support::send;
    use crate::test_utils::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_and_list_menu_items() {
        let db = setup_test_db().await.unwrap();

        let (status, created) = send(
            &db,
            Method::POST,
            "/menu/",
            Some(json!({"name": "Sisig", "category": "Pulutan", "price": 180.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["name"], "Sisig");
        assert!(created["image_url"].is_null());

        let (status, body) = send(
            &db,
            Method::POST,
            "/menu/",
            Some(json!({"name": "Sisig", "category": "Pulutan", "price": 200.0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["detail"].as_str().unwrap().contains("Sisig"));

        let (status, list) = send(&db, Method::GET, "/menu", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_and_delete_menu_item() {
        let db = setup_test_db().await.unwrap();
        let item = create_test_menu_item(&db, "Red Horse", 95.0).await.unwrap();

        let (status, updated) = send(
            &db,
            Method::PUT,
            &format!("/menu/{}", item.id),
            Some(json!({"name": "Red Horse Grande", "category": "Beer", "price": 160.0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["price"], 160.0);

        let (status, _) = send(&db, Method::DELETE, &format!("/menu/{}", item.id), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&db, Method::DELETE, &format!("/menu/{}", item.id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn test_get_single_menu_item() {
        let db = setup_test_db().await.unwrap();
        let item = create_test_menu_item(&db, "San Mig Light", 85.0).await.unwrap();

        let (status, body) = send(&db, Method::GET, &format!("/menu/{}", item.id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "San Mig Light");
        assert_eq!(body["price"], 85.0);

        let (status, body) = send(&db, Method::GET, "/menu/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("999"));
    }

    #[tokio::test]
    async fn test_delete_category_reassigns_items() {
        let db = setup_test_db().await.unwrap();
        create_custom_menu_item(&db, "Sisig", "Pulutan", 180.0).await.unwrap();
        create_custom_menu_item(&db, "Chicharon", "Pulutan", 90.0).await.unwrap();

        let (status, body) = send(
            &db,
            Method::POST,
            "/menu/delete-category",
            Some(json!({"category": "Pulutan", "reassign_to": "Food"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["items"], 2);

        let (_, list) = send(&db, Method::GET, "/menu/", None).await;
        assert!(
            list.as_array()
                .unwrap()
                .iter()
                .all(|item| item["category"] == "Food")
        );
    }
}
