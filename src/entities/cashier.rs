//! Cashier entity - Named operators who ring up orders.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cashier database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cashiers")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, copied onto orders as the `cashier` tag
    pub name: String,
    /// Plain-text PIN
    pub pin: String,
}

/// `Cashier` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
