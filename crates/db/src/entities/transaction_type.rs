//! `SeaORM` Entity for transaction_type table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_type")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// Label shown in reports, e.g. `CASH_PAYMENT`.
    pub text: String,
    /// `income`, `expense` or `other`.
    pub category: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
