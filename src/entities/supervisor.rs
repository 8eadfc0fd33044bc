//! Supervisor entity - PIN records that authorize privileged actions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Supervisor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "supervisors")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Plain-text PIN
    pub pin: String,
}

/// `Supervisor` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
