//! Receipt counter entity - Last receipt sequence handed out per calendar year.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Receipt counter database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receipt_counters")]
pub struct Model {
    /// Calendar year the sequence belongs to
    #[sea_orm(primary_key, auto_increment = false)]
    pub year: i32,
    /// Highest sequence number already allocated for `year`
    pub last_sequence: i64,
}

/// `ReceiptCounter` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
