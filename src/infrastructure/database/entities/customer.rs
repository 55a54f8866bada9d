//! Customer entity with running outstanding balance

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,

    /// Externally visible customer number, unique across the utility
    pub customer_number: i32,

    /// Sum of all non-paid bill totals net of partial payments
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub outstanding_balance: Decimal,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    /// Set by the soft-delete cascade; deleted rows are hidden from default queries
    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::meter_reading::Entity")]
    MeterReadings,
}

impl Related<super::meter_reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeterReadings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
