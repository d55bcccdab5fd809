//! `SeaORM` Entity for general_ledger table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "general_ledger")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub uuid: Uuid,
    /// Source document (voucher, cash receipt, invoice...).
    pub record_uuid: Uuid,
    pub trans_id: String,
    pub trans_date: Date,
    pub period_id: Option<i32>,
    pub account_id: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub debit_equiv: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub credit_equiv: Decimal,
    pub currency_id: i32,
    pub description: String,
    pub transaction_type_id: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::account::Entity",
        from = "Column::AccountId",
        to = "super::account::Column::Id"
    )]
    Account,
    #[sea_orm(
        belongs_to = "super::transaction_type::Entity",
        from = "Column::TransactionTypeId",
        to = "super::transaction_type::Column::Id"
    )]
    TransactionType,
}

impl Related<super::account::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl Related<super::transaction_type::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionType.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
