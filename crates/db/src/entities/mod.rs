//! `SeaORM` entity definitions.

pub mod bank_accounts;
pub mod closing_records;
pub mod movements;
pub mod sea_orm_active_enums;
