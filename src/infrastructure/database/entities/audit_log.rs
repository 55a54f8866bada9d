//! Append-only audit log entry

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    /// Action kind: CREATE, UPDATE, DELETE, PAYMENT
    pub action: String,

    /// Affected table, e.g. "meter_readings", "bills"
    pub entity_type: String,

    #[sea_orm(nullable)]
    pub entity_id: Option<i32>,

    pub performed_by: String,

    #[sea_orm(nullable)]
    pub ip_address: Option<String>,

    /// Free-form structured payload describing the mutation
    #[sea_orm(column_type = "Json", nullable)]
    pub details: Option<Json>,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
