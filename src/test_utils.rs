//! Shared test utilities for the point-of-sale backend.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        menu::{self, NewMenuItem},
        order::{self, NewOrder, NewOrderItem, OrderView},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDateTime;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use std::path::Path;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Opens (creating if needed) a file-backed `SQLite` database with all tables.
pub async fn setup_file_db(path: &Path) -> Result<DatabaseConnection> {
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = crate::config::database::create_connection(&url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a menu item in the "Beer" category.
pub async fn create_test_menu_item(
    db: &DatabaseConnection,
    name: &str,
    price: f64,
) -> Result<entities::menu_item::Model> {
    create_custom_menu_item(db, name, "Beer", price).await
}

/// Creates a menu item with an explicit category.
pub async fn create_custom_menu_item(
    db: &DatabaseConnection,
    name: &str,
    category: &str,
    price: f64,
) -> Result<entities::menu_item::Model> {
    menu::create_menu_item(
        db,
        NewMenuItem {
            name: name.to_string(),
            category: category.to_string(),
            price,
            image_url: None,
        },
    )
    .await
}

/// Creates an unpaid dine-in order from `(menu_item_id, quantity)` pairs.
pub async fn create_test_order(db: &DatabaseConnection, lines: &[(i64, i32)]) -> Result<OrderView> {
    order::create_order(
        db,
        NewOrder {
            items: lines
                .iter()
                .map(|&(menu_item_id, quantity)| NewOrderItem::new(menu_item_id, quantity))
                .collect(),
            ..Default::default()
        },
    )
    .await
}

/// Moves an order's creation time, for date-range tests.
pub async fn backdate_order(
    db: &DatabaseConnection,
    order_id: i64,
    created_at: NaiveDateTime,
) -> Result<entities::order::Model> {
    let stored = order::get_order(db, order_id).await?.order;
    let mut active: entities::order::ActiveModel = stored.into();
    active.created_at = Set(created_at);
    Ok(active.update(db).await?)
}
