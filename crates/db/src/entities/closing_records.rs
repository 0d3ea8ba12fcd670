//! `SeaORM` Entity for closing_records table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "closing_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub closing_date: Date,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub previous_balance: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_in: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub total_out: Decimal,
    #[sea_orm(column_type = "Decimal(Some((18, 2)))")]
    pub final_balance: Decimal,
    pub is_closed: bool,
    pub closed_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::bank_accounts::Entity",
        from = "Column::AccountId",
        to = "super::bank_accounts::Column::Id"
    )]
    BankAccounts,
}

impl Related<super::bank_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BankAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
