//! `SeaORM` Entity for cash_item table (allocation of a receipt to invoices).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "cash_item")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    pub cash_uuid: Uuid,
    pub invoice_uuid: Uuid,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub amount: Decimal,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::cash::Entity",
        from = "Column::CashUuid",
        to = "super::cash::Column::Uuid"
    )]
    Cash,
}

impl Related<super::cash::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cash.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
