//! Menu item entity - A sellable product on the menu.
//!
//! Menu items are referenced by order items but do not own them: deleting a
//! menu item leaves its historical order items behind as orphans, which the
//! startup sweep removes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Menu item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "menu_items")]
pub struct Model {
    /// Unique identifier for the menu item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, unique across the menu (e.g., "San Miguel Pale Pilsen")
    #[sea_orm(unique)]
    pub name: String,
    /// Menu section (e.g., "Beer", "Pulutan")
    pub category: String,
    /// Unit price
    pub price: f64,
    /// Optional picture shown by the terminal
    pub image_url: Option<String>,
}

/// Menu items have no declared relations; order items point at them loosely.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
