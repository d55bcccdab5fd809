//! `SeaORM` Entity for cash table (cash receipts).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub reference: String,
    pub date: Date,
    pub patient_uuid: Uuid,
    pub currency_id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
    pub reversed: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cash_item::Entity")]
    CashItem,
}

impl Related<super::cash_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CashItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
