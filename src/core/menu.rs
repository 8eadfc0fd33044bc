//! Menu business logic - Handles the catalog of sellable items.
//!
//! Names are unique across the menu. Categories are plain strings on the items,
//! so "category" operations act on every item carrying that string.

use crate::{
    entities::{MenuItem, OrderItem, menu_item, order_item},
    errors::{Error, Result, ensure_amount, ensure_not_blank},
};
use sea_orm::{
    PaginatorTrait, QueryOrder, Set, SqlErr, TransactionTrait,
    prelude::*,
    sea_query::{Expr, Query},
};
use serde::Deserialize;
use tracing::{info, instrument, warn};

/// Fields required to put a new item on the menu.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMenuItem {
    /// Unique display name
    pub name: String,
    /// Menu section
    pub category: String,
    /// Unit price, non-negative
    pub price: f64,
    /// Optional picture
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Replacement values for an existing item. Name, category and price are always
/// replaced; the image is only replaced when supplied.
#[derive(Debug, Clone, Deserialize)]
pub struct MenuItemUpdate {
    /// New display name
    pub name: String,
    /// New menu section
    pub category: String,
    /// New unit price
    pub price: f64,
    /// New picture, if any
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Outcome of a bulk category operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChange {
    /// Items were moved to another category
    Reassigned {
        /// Number of items moved
        items: u64,
        /// Category they now belong to
        to: String,
    },
    /// Items were removed from the menu
    Deleted {
        /// Number of items removed
        items: u64,
    },
}

fn duplicate_or_db_error(err: DbErr, name: &str) -> Error {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateMenuItem {
            name: name.to_string(),
        },
        _ => err.into(),
    }
}

async fn ensure_name_available<C>(db: &C, name: &str, except_id: Option<i64>) -> Result<()>
where
    C: ConnectionTrait,
{
    let mut query = MenuItem::find().filter(menu_item::Column::Name.eq(name));
    if let Some(id) = except_id {
        query = query.filter(menu_item::Column::Id.ne(id));
    }

    if query.one(db).await?.is_some() {
        return Err(Error::DuplicateMenuItem {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Retrieves the whole menu in insertion order.
pub async fn list_menu_items(db: &DatabaseConnection) -> Result<Vec<menu_item::Model>> {
    MenuItem::find()
        .order_by_asc(menu_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a menu item by its unique ID.
pub async fn get_menu_item_by_id(
    db: &DatabaseConnection,
    menu_item_id: i64,
) -> Result<Option<menu_item::Model>> {
    MenuItem::find_by_id(menu_item_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a new menu item after validating its fields.
///
/// # Errors
/// - `EmptyField` if the name or category is blank
/// - `InvalidAmount` if the price is negative or not finite
/// - `DuplicateMenuItem` if another item already uses the name
#[instrument(skip(db))]
pub async fn create_menu_item(
    db: &DatabaseConnection,
    new_item: NewMenuItem,
) -> Result<menu_item::Model> {
    let name = ensure_not_blank("name", &new_item.name)?;
    let category = ensure_not_blank("category", &new_item.category)?;
    let price = ensure_amount("price", new_item.price)?;

    let txn = db.begin().await?;
    ensure_name_available(&txn, &name, None).await?;

    let model = menu_item::ActiveModel {
        name: Set(name.clone()),
        category: Set(category),
        price: Set(price),
        image_url: Set(new_item.image_url),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| duplicate_or_db_error(e, &name))?;

    txn.commit().await?;
    info!(menu_item_id = model.id, name = %model.name, "menu item created");
    Ok(model)
}

/// Replaces the name, category and price of a menu item.
///
/// Prices on existing orders are not touched; their totals were fixed when the
/// items were rung up.
///
/// # Errors
/// - `MenuItemNotFound` if the item does not exist
/// - `DuplicateMenuItem` if the new name belongs to another item
/// - validation errors as for [`create_menu_item`]
#[instrument(skip(db))]
pub async fn update_menu_item(
    db: &DatabaseConnection,
    menu_item_id: i64,
    update: MenuItemUpdate,
) -> Result<menu_item::Model> {
    let name = ensure_not_blank("name", &update.name)?;
    let category = ensure_not_blank("category", &update.category)?;
    let price = ensure_amount("price", update.price)?;

    let txn = db.begin().await?;
    let existing = MenuItem::find_by_id(menu_item_id)
        .one(&txn)
        .await?
        .ok_or(Error::MenuItemNotFound { id: menu_item_id })?;
    ensure_name_available(&txn, &name, Some(menu_item_id)).await?;

    let mut active: menu_item::ActiveModel = existing.into();
    active.name = Set(name.clone());
    active.category = Set(category);
    active.price = Set(price);
    if update.image_url.is_some() {
        active.image_url = Set(update.image_url);
    }
    let model = active
        .update(&txn)
        .await
        .map_err(|e| duplicate_or_db_error(e, &name))?;

    txn.commit().await?;
    info!(menu_item_id, "menu item updated");
    Ok(model)
}

/// Removes a menu item. Order items that reference it are left in place until
/// the next orphan sweep.
///
/// # Errors
/// Returns `MenuItemNotFound` if the item does not exist.
#[instrument(skip(db))]
pub async fn delete_menu_item(db: &DatabaseConnection, menu_item_id: i64) -> Result<()> {
    let result = MenuItem::delete_by_id(menu_item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::MenuItemNotFound { id: menu_item_id });
    }
    info!(menu_item_id, "menu item deleted");
    Ok(())
}

/// Moves every item of `category` to `reassign_to`, or deletes them all when no
/// target is given. An unknown category affects nothing.
///
/// # Errors
/// Returns `EmptyField` if the category (or a supplied target) is blank.
#[instrument(skip(db))]
pub async fn delete_category(
    db: &DatabaseConnection,
    category: &str,
    reassign_to: Option<&str>,
) -> Result<CategoryChange> {
    let category = ensure_not_blank("category", category)?;
    let target = reassign_to
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.trim().to_string());

    let txn = db.begin().await?;
    let change = if let Some(to) = target {
        let result = MenuItem::update_many()
            .col_expr(menu_item::Column::Category, Expr::value(to.clone()))
            .filter(menu_item::Column::Category.eq(category.as_str()))
            .exec(&txn)
            .await?;
        CategoryChange::Reassigned {
            items: result.rows_affected,
            to,
        }
    } else {
        let result = MenuItem::delete_many()
            .filter(menu_item::Column::Category.eq(category.as_str()))
            .exec(&txn)
            .await?;
        CategoryChange::Deleted {
            items: result.rows_affected,
        }
    };
    txn.commit().await?;

    info!(category = %category, ?change, "category removed");
    Ok(change)
}

/// Deletes order items whose menu item no longer exists and returns how many
/// were removed. Order totals are left as they were.
pub async fn sweep_orphan_order_items(db: &DatabaseConnection) -> Result<u64> {
    let orphan_filter = order_item::Column::MenuItemId.not_in_subquery(
        Query::select()
            .column(menu_item::Column::Id)
            .from(MenuItem)
            .to_owned(),
    );

    let txn = db.begin().await?;
    let orphans = OrderItem::find()
        .filter(orphan_filter.clone())
        .count(&txn)
        .await?;

    if orphans == 0 {
        info!("No broken order items found. Database is clean.");
        return Ok(0);
    }

    warn!(count = orphans, "Cleaning up order items with missing menu items");
    let result = OrderItem::delete_many()
        .filter(orphan_filter)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    Ok(result.rows_affected)
}
