//! Movement repository for database operations.
//!
//! Implements the core `MovementStore` trait using SeaORM.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use treasury_core::StoreError;
use treasury_core::ledger::{BankAccount, CoveringClosing, Movement, MovementKind, MovementStore};
use treasury_shared::types::{AccountId, MovementId, TransferId};

use super::account::to_bank_account;
use super::store_err;
use crate::entities::{
    bank_accounts, closing_records, movements, sea_orm_active_enums::MovementKind as DbMovementKind,
};

/// Movement repository implementation.
#[derive(Debug, Clone)]
pub struct MovementRepository {
    db: DatabaseConnection,
}

impl MovementRepository {
    /// Create a new movement repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl MovementStore for MovementRepository {
    async fn find_account(&self, id: AccountId) -> Result<Option<BankAccount>, StoreError> {
        let model = bank_accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(to_bank_account))
    }

    async fn find_movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        let model = movements::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?;
        Ok(model.map(to_movement))
    }

    async fn insert_movement(&self, movement: Movement) -> Result<Movement, StoreError> {
        let model = to_active_model(&movement)
            .insert(&self.db)
            .await
            .map_err(store_err)?;
        Ok(to_movement(model))
    }

    async fn insert_transfer(&self, outgoing: Movement, incoming: Movement) -> Result<(), StoreError> {
        let txn = self.db.begin().await.map_err(store_err)?;

        to_active_model(&outgoing)
            .insert(&txn)
            .await
            .map_err(store_err)?;
        to_active_model(&incoming)
            .insert(&txn)
            .await
            .map_err(store_err)?;

        txn.commit().await.map_err(store_err)?;
        Ok(())
    }

    async fn update_movement(&self, movement: Movement) -> Result<Movement, StoreError> {
        let model = movements::Entity::find_by_id(movement.id.into_inner())
            .one(&self.db)
            .await
            .map_err(store_err)?
            .ok_or_else(|| StoreError::new(format!("movement {} not found", movement.id)))?;

        let mut active = model.into_active_model();
        active.movement_date = Set(movement.movement_date);
        active.amount = Set(movement.amount);
        active.description = Set(movement.description);

        let model = active.update(&self.db).await.map_err(store_err)?;
        Ok(to_movement(model))
    }

    async fn delete_movement(&self, id: MovementId) -> Result<bool, StoreError> {
        let result = movements::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected > 0)
    }

    async fn find_transfer_legs(&self, transfer_id: TransferId) -> Result<Vec<Movement>, StoreError> {
        let models = movements::Entity::find()
            .filter(movements::Column::TransferId.eq(transfer_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(store_err)?;
        Ok(models.into_iter().map(to_movement).collect())
    }

    async fn delete_transfer(&self, transfer_id: TransferId) -> Result<u64, StoreError> {
        let result = movements::Entity::delete_many()
            .filter(movements::Column::TransferId.eq(transfer_id.into_inner()))
            .exec(&self.db)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected)
    }

    async fn find_covering_closing(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Option<CoveringClosing>, StoreError> {
        let model = closing_records::Entity::find()
            .filter(closing_records::Column::AccountId.eq(account_id.into_inner()))
            .filter(closing_records::Column::ClosingDate.gte(date))
            .order_by_asc(closing_records::Column::ClosingDate)
            .one(&self.db)
            .await
            .map_err(store_err)?;

        Ok(model.map(|m| CoveringClosing {
            closing_date: m.closing_date,
            is_closed: m.is_closed,
        }))
    }

    async fn list_movements(
        &self,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Movement>, StoreError> {
        let mut query = movements::Entity::find()
            .filter(movements::Column::AccountId.eq(account_id.into_inner()))
            .order_by_asc(movements::Column::MovementDate)
            .order_by_asc(movements::Column::CreatedAt);

        if let Some(from) = from {
            query = query.filter(movements::Column::MovementDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(movements::Column::MovementDate.lte(to));
        }

        let models = query.all(&self.db).await.map_err(store_err)?;
        Ok(models.into_iter().map(to_movement).collect())
    }
}

fn to_active_model(movement: &Movement) -> movements::ActiveModel {
    movements::ActiveModel {
        id: Set(movement.id.into_inner()),
        account_id: Set(movement.account_id.into_inner()),
        movement_date: Set(movement.movement_date),
        kind: Set(to_db_kind(movement.kind)),
        amount: Set(movement.amount),
        description: Set(movement.description.clone()),
        transfer_id: Set(movement.transfer_id.map(TransferId::into_inner)),
        created_at: Set(Utc::now().into()),
    }
}

/// Convert domain movement kind to database enum.
pub(crate) fn to_db_kind(kind: MovementKind) -> DbMovementKind {
    match kind {
        MovementKind::Inflow => DbMovementKind::Inflow,
        MovementKind::Outflow => DbMovementKind::Outflow,
        MovementKind::TransferOut => DbMovementKind::TransferOut,
        MovementKind::TransferIn => DbMovementKind::TransferIn,
    }
}

/// Convert database movement kind to domain enum.
pub(crate) fn from_db_kind(kind: DbMovementKind) -> MovementKind {
    match kind {
        DbMovementKind::Inflow => MovementKind::Inflow,
        DbMovementKind::Outflow => MovementKind::Outflow,
        DbMovementKind::TransferOut => MovementKind::TransferOut,
        DbMovementKind::TransferIn => MovementKind::TransferIn,
    }
}

/// Convert database model to domain model.
pub(crate) fn to_movement(model: movements::Model) -> Movement {
    Movement {
        id: MovementId::from_uuid(model.id),
        account_id: AccountId::from_uuid(model.account_id),
        movement_date: model.movement_date,
        kind: from_db_kind(model.kind),
        amount: model.amount,
        description: model.description,
        transfer_id: model.transfer_id.map(TransferId::from_uuid),
    }
}
