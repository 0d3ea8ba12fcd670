//! `SeaORM` Entity for bank_accounts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "bank_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub opening_balance: Decimal,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movements::Entity")]
    Movements,
    #[sea_orm(has_many = "super::closing_records::Entity")]
    ClosingRecords,
}

impl Related<super::movements::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl Related<super::closing_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClosingRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
