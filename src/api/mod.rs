//! HTTP API consumed by the terminal front end.
//!
//! Handlers are thin: they parse the request, call into [`crate::core`] and
//! serialize the result. Errors become JSON bodies through [`error::ApiError`].

pub mod error;
mod menu;
mod orders;
mod reports;
mod settings;
mod staff;

use crate::errors::Result;
use axum::{Json, Router, routing::get};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

/// Shared state for axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle, cloned per request
    pub db: DatabaseConnection,
}

impl AppState {
    /// Wraps a connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Builds the full router (separated from [`serve`] for testing).
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .merge(menu::routes())
        .merge(orders::routes())
        .merge(reports::routes())
        .merge(staff::routes())
        .merge(settings::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Pub Express POS API" }))
}

/// Binds `address` and serves until Ctrl-C.
///
/// # Errors
/// Returns an I/O error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!(address = %listener.local_addr()?, "HTTP API listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("shutdown signal received");
}

#[cfg(test)]
pub(crate) mod test_support {
    #![allow(clippy::unwrap_used)]
    use super::{AppState, router};
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode},
    };
    use sea_orm::DatabaseConnection;
    use serde_json::Value;
    use tower::ServiceExt;

    pub fn app(db: &DatabaseConnection) -> Router {
        router(AppState::new(db.clone()))
    }

    /// Sends a request and returns the status with the parsed JSON body
    /// (`Value::Null` for empty or non-JSON bodies).
    pub async fn send(
        db: &DatabaseConnection,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = app(db).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::test_support::send;
    use crate::test_utils::setup_test_db;
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn test_root_health_message() {
        let db = setup_test_db().await.unwrap();
        let (status, body) = send(&db, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let db = setup_test_db().await.unwrap();
        let (status, _) = send(&db, Method::GET, "/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
