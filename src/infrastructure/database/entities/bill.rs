//! Bill entity, 1:1 with a meter reading

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bills")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub meter_reading_id: i32,

    /// Charge fixed at creation, before any penalty
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub total_amount: Decimal,

    /// Payment status: pending, partial, paid
    pub payment_status: String,

    /// Late-payment penalty, decided once on the first payment
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub penalty: Decimal,

    /// Cumulative cash received over the bill's life
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount_paid: Decimal,

    /// Outstanding amount still owed
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub remaining: Decimal,

    /// Excess returned on the settling payment
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub change: Decimal,

    /// Set on transition to paid
    #[sea_orm(nullable)]
    pub paid_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::meter_reading::Entity",
        from = "Column::MeterReadingId",
        to = "super::meter_reading::Column::Id"
    )]
    MeterReading,

    #[sea_orm(has_many = "super::bill_item::Entity")]
    Items,
}

impl Related<super::meter_reading::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MeterReading.def()
    }
}

impl Related<super::bill_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
