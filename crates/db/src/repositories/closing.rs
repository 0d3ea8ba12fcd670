//! Closing repository for database operations.
//!
//! Implements the core `ClosingStore` trait using SeaORM. Closing batches are
//! written as one upsert on `(account_id, closing_date)` so re-closing a
//! reopened date reuses the existing rows.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use treasury_core::StoreError;
use treasury_core::closing::{ClosingFigures, ClosingRecord, ClosingStore};
use treasury_core::ledger::{BankAccount, Movement};
use treasury_shared::types::{AccountId, ClosingId, UserId};

use super::account::to_bank_account;
use super::movement::to_movement;
use super::store_err;
use crate::entities::{bank_accounts, closing_records, movements};

/// Closing repository implementation.
#[derive(Debug, Clone)]
pub struct ClosingRepository {
    db: DatabaseConnection,
}

impl ClosingRepository {
    /// Create a new closing repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ClosingStore for ClosingRepository {
    async fn list_active_accounts(&self) -> Result<Vec<BankAccount>, StoreError> {
        let models = bank_accounts::Entity::find()
            .filter(bank_accounts::Column::IsActive.eq(true))
            .order_by_asc(bank_accounts::Column::Name)
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(models.into_iter().map(to_bank_account).collect())
    }

    async fn get_opening_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        let balance: Option<Decimal> = bank_accounts::Entity::find_by_id(account_id.into_inner())
            .select_only()
            .column(bank_accounts::Column::OpeningBalance)
            .into_tuple()
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(balance)
    }

    async fn find_latest_closed_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Option<ClosingRecord>, StoreError> {
        let model = closing_records::Entity::find()
            .filter(closing_records::Column::AccountId.eq(account_id.into_inner()))
            .filter(closing_records::Column::IsClosed.eq(true))
            .filter(closing_records::Column::ClosingDate.lt(date))
            .order_by_desc(closing_records::Column::ClosingDate)
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(to_closing_record))
    }

    async fn find_movements(
        &self,
        account_id: AccountId,
        after: Option<NaiveDate>,
        through: NaiveDate,
    ) -> Result<Vec<Movement>, StoreError> {
        let mut query = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .filter(movements::Column::MovementDate.lte(through))
            .order_by_asc(movements::Column::MovementDate);

        if let Some(after) = after {
            query = query.filter(movements::Column::MovementDate.gt(after));
        }

        let models = query.all(&self.db).await.map_err(store_err)?;
        Ok(models.into_iter().map(to_movement).collect())
    }

    async fn insert_closing_batch(
        &self,
        records: Vec<ClosingRecord>,
    ) -> Result<Vec<ClosingRecord>, StoreError> {
        if records.is_empty() {
            return Ok(vec![]);
        }

        let keys: Vec<(AccountId, NaiveDate)> = records
            .iter()
            .map(|r| (r.account_id, r.closing_date))
            .collect();
        let account_ids: Vec<_> = keys.iter().map(|(a, _)| a.into_inner()).collect();
        let mut dates: Vec<NaiveDate> = keys.iter().map(|(_, d)| *d).collect();
        dates.sort_unstable();
        dates.dedup();

        let now = Utc::now();
        let models = records.iter().map(|r| closing_records::ActiveModel {
            id: Set(r.id.into_inner()),
            account_id: Set(r.account_id.into_inner()),
            closing_date: Set(r.closing_date),
            previous_balance: Set(r.previous_balance),
            total_in: Set(r.total_in),
            total_out: Set(r.total_out),
            final_balance: Set(r.final_balance),
            is_closed: Set(r.is_closed),
            closed_by: Set(r.closed_by.into_inner()),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        });

        let txn = self.db.begin().await.map_err(store_err)?;

        closing_records::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    closing_records::Column::AccountId,
                    closing_records::Column::ClosingDate,
                ])
                .update_columns([
                    closing_records::Column::PreviousBalance,
                    closing_records::Column::TotalIn,
                    closing_records::Column::TotalOut,
                    closing_records::Column::FinalBalance,
                    closing_records::Column::IsClosed,
                    closing_records::Column::ClosedBy,
                    closing_records::Column::UpdatedAt,
                ])
                .to_owned(),
            )
            .exec(&txn)
            .await
            .map_err(store_err)?;

        let stored = closing_records::Entity::find()
            .filter(closing_records::Column::AccountId.is_in(account_ids))
            .filter(closing_records::Column::ClosingDate.is_in(dates))
            .order_by_asc(closing_records::Column::ClosingDate)
            .all(&txn)
            .await
            .map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;

        Ok(stored
            .into_iter()
            .map(to_closing_record)
            .filter(|r| keys.contains(&(r.account_id, r.closing_date)))
            .collect())
    }

    async fn update_closing_figures(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        figures: ClosingFigures,
    ) -> Result<(), StoreError> {
        let result = closing_records::Entity::update_many()
            .col_expr(
                closing_records::Column::PreviousBalance,
                Expr::value(figures.previous_balance),
            )
            .col_expr(closing_records::Column::TotalIn, Expr::value(figures.total_in))
            .col_expr(closing_records::Column::TotalOut, Expr::value(figures.total_out))
            .col_expr(
                closing_records::Column::FinalBalance,
                Expr::value(figures.final_balance),
            )
            .col_expr(closing_records::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(closing_records::Column::AccountId.eq(account_id.into_inner()))
            .filter(closing_records::Column::ClosingDate.eq(date))
            .exec(&self.db)
            .await
            .map_err(store_err)?;

        if result.rows_affected == 0 {
            return Err(StoreError::new(format!(
                "closing record for account {account_id} on {date} not found"
            )));
        }
        Ok(())
    }

    async fn set_closed_flag(&self, date: NaiveDate, closed: bool) -> Result<u64, StoreError> {
        let result = closing_records::Entity::update_many()
            .col_expr(closing_records::Column::IsClosed, Expr::value(closed))
            .col_expr(closing_records::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(closing_records::Column::ClosingDate.eq(date))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn exists_closed_after(&self, date: NaiveDate) -> Result<bool, StoreError> {
        let count = closing_records::Entity::find()
            .filter(closing_records::Column::IsClosed.eq(true))
            .filter(closing_records::Column::ClosingDate.gt(date))
            .count(&self.db)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn exists_closed_on(&self, date: NaiveDate) -> Result<bool, StoreError> {
        let count = closing_records::Entity::find()
            .filter(closing_records::Column::IsClosed.eq(true))
            .filter(closing_records::Column::ClosingDate.eq(date))
            .count(&self.db)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn exists_reopened_on(&self, date: NaiveDate) -> Result<bool, StoreError> {
        let count = closing_records::Entity::find()
            .filter(closing_records::Column::IsClosed.eq(false))
            .filter(closing_records::Column::ClosingDate.eq(date))
            .count(&self.db)
            .await
            .map_err(store_err)?;
        Ok(count > 0)
    }

    async fn list_closed_dates_after(&self, date: NaiveDate) -> Result<Vec<NaiveDate>, StoreError> {
        let dates: Vec<NaiveDate> = closing_records::Entity::find()
            .filter(closing_records::Column::IsClosed.eq(true))
            .filter(closing_records::Column::ClosingDate.gt(date))
            .select_only()
            .column(closing_records::Column::ClosingDate)
            .distinct()
            .order_by_asc(closing_records::Column::ClosingDate)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(dates)
    }

    async fn list_closings(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ClosingRecord>, StoreError> {
        let mut query = closing_records::Entity::find()
            .order_by_asc(closing_records::Column::ClosingDate)
            .order_by_asc(closing_records::Column::AccountId);

        if let Some(from) = from {
            query = query.filter(closing_records::Column::ClosingDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(closing_records::Column::ClosingDate.lte(to));
        }

        let models = query.all(&self.db).await.map_err(store_err)?;
        Ok(models.into_iter().map(to_closing_record).collect())
    }
}

/// Convert database model to domain model.
fn to_closing_record(model: closing_records::Model) -> ClosingRecord {
    ClosingRecord {
        id: ClosingId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        closing_date: model.closing_date,
        previous_balance: model.previous_balance,
        total_in: model.total_in,
        total_out: model.total_out,
        final_balance: model.final_balance,
        is_closed: model.is_closed,
        closed_by: UserId::from_uuid(model.closed_by),
    }
}
