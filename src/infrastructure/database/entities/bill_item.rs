//! Bill line item, one row per tariff component

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "bill_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub bill_id: i32,

    /// Tariff component: ADMIN_FEE, K1, K2
    pub item_type: String,

    /// Usage billed on this line in m³ (0 for the admin fee)
    pub usage: i32,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub rate: Decimal,

    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    pub amount: Decimal,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,

    #[sea_orm(nullable)]
    pub deleted_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bill::Entity",
        from = "Column::BillId",
        to = "super::bill::Column::Id"
    )]
    Bill,
}

impl Related<super::bill::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bill.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
