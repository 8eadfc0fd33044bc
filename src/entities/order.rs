//! Order entity - A customer transaction and its payment state.
//!
//! `total` is derived from the line items, `is_paid` from `paid` against
//! `total - discount`. `receipt_number` is assigned once, on the first payment.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the order was opened (local time), never changed afterwards
    pub created_at: DateTime,
    /// Sum of `quantity * price` over the line items
    pub total: f64,
    /// Order-level discount
    pub discount: f64,
    /// Amount tendered so far
    pub paid: f64,
    /// Whether the order counts as settled
    pub is_paid: bool,
    /// `"dine-in"`, `"take-out"` or another free-form tag
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub order_type: String,
    /// Free-text notes from the cashier
    pub notes: Option<String>,
    /// Set when the order is voided
    pub cancel_reason: Option<String>,
    /// `"new"`, `"held"`, `"paid"` or `"void"`
    pub status: String,
    /// `PX-<year>-<sequence>`, assigned on first payment
    #[sea_orm(unique)]
    pub receipt_number: Option<String>,
    /// Operator who rang up the order
    pub cashier: Option<String>,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order owns many line items
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
