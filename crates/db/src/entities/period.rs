//! `SeaORM` Entity for period table.
//!
//! Number 0 is the opening pseudo-period of a fiscal year and 13 the closing
//! one; reports only use 1 to 12.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "period")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub fiscal_year_id: i32,
    pub number: i16,
    pub start_date: Date,
    pub end_date: Date,
    pub locked: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::fiscal_year::Entity",
        from = "Column::FiscalYearId",
        to = "super::fiscal_year::Column::Id"
    )]
    FiscalYear,
}

impl Related<super::fiscal_year::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FiscalYear.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
