//! Order item entity - One menu selection on an order.
//!
//! Each line belongs to exactly one order (deleted with it) and points at a
//! menu item without a foreign key, so deleting a menu item never fails
//! because of sales history.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line item
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning order
    pub order_id: i64,
    /// Menu item sold on this line
    pub menu_item_id: i64,
    /// Units sold, always positive
    pub quantity: i32,
    /// Name of the discount holder (senior citizen, PWD, ...)
    pub discount_person_name: Option<String>,
    /// ID card or coupon code of the discount holder
    pub discount_person_id: Option<String>,
    /// Discount category (e.g., `"senior"`, `"pwd"`, `"coupon"`)
    pub discount_person_type: Option<String>,
    /// Manual discount kind (e.g., `"percent"`, `"amount"`)
    pub manual_discount_type: Option<String>,
    /// Manual discount value; recorded only, never subtracted from the total
    pub manual_discount_value: f64,
    /// Kitchen or bar notes for this line
    pub notes: Option<String>,
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line item belongs to one order and goes away with it
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id",
        on_delete = "Cascade"
    )]
    Order,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

/// Join path from a line item to its menu item.
///
/// Kept out of [`Relation`] so that schema generation does not emit a foreign
/// key for it.
#[must_use]
pub fn menu_item_relation() -> RelationDef {
    Entity::belongs_to(super::menu_item::Entity)
        .from(Column::MenuItemId)
        .to(super::menu_item::Column::Id)
        .into()
}

impl ActiveModelBehavior for ActiveModel {}
