//! Movement service: recording, editing and deleting bank movements.
//!
//! Every write checks the movement lock: a date whose covering closing is
//! closed cannot be touched until that closing is reopened. Writes under a
//! reopened date then recalculate the account's later closed records, so
//! their balances never wait on the reopened date being closed again.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{error, info};
use treasury_shared::types::{AccountId, MovementId, TransferId};

use super::error::MovementError;
use super::store::MovementStore;
use super::types::{
    BankAccount, Movement, MovementKind, MovementUpdate, NewMovement, NewTransfer, Transfer,
};
use crate::closing::ClosingStore;
use crate::closing::cascade::recalculate_account_after;

/// Movement service for bank account bookkeeping.
pub struct MovementService<S: MovementStore, C: ClosingStore> {
    store: Arc<S>,
    closings: Arc<C>,
    lock: Arc<Mutex<()>>,
}

impl<S: MovementStore, C: ClosingStore> MovementService<S, C> {
    /// Create a new movement service.
    ///
    /// `closings` is used to recalculate closed records after a write, and
    /// `lock` is shared with the closing service so that movement writes
    /// never interleave with a closing or reopening.
    #[must_use]
    pub fn new(store: Arc<S>, closings: Arc<C>, lock: Arc<Mutex<()>>) -> Self {
        Self {
            store,
            closings,
            lock,
        }
    }

    /// Record a plain inflow or outflow.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount is not positive or has more than 2 decimal places
    /// - The kind is a transfer leg
    /// - The account does not exist or is inactive
    /// - The movement date is locked by a closing
    /// - Later closings of the account cannot be recalculated
    pub async fn record_movement(&self, input: NewMovement) -> Result<Movement, MovementError> {
        validate_amount(input.amount)?;
        if input.kind.is_transfer() {
            return Err(MovementError::TransferKindNotAllowed(input.kind.to_string()));
        }

        let _guard = self.lock.lock().await;

        self.active_account(input.account_id).await?;
        self.ensure_open(input.account_id, input.movement_date).await?;

        let movement = self
            .store
            .insert_movement(Movement {
                id: MovementId::new(),
                account_id: input.account_id,
                movement_date: input.movement_date,
                kind: input.kind,
                amount: input.amount,
                description: input.description,
                transfer_id: None,
            })
            .await?;
        self.refresh_closed_after(movement.account_id, movement.movement_date)
            .await?;

        info!(
            movement_id = %movement.id,
            account_id = %movement.account_id,
            movement_date = %movement.movement_date,
            kind = %movement.kind,
            amount = %movement.amount,
            "Movement recorded"
        );

        Ok(movement)
    }

    /// Move money between two accounts on a single date.
    ///
    /// Both legs share a transfer id and are written atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if the accounts are the same, either account is
    /// missing or inactive, the amount is invalid, the date is locked on
    /// either account, or later closings cannot be recalculated.
    pub async fn record_transfer(&self, input: NewTransfer) -> Result<Transfer, MovementError> {
        validate_amount(input.amount)?;
        if input.from_account_id == input.to_account_id {
            return Err(MovementError::SameAccountTransfer);
        }

        let _guard = self.lock.lock().await;

        self.active_account(input.from_account_id).await?;
        self.active_account(input.to_account_id).await?;
        self.ensure_open(input.from_account_id, input.transfer_date).await?;
        self.ensure_open(input.to_account_id, input.transfer_date).await?;

        let transfer_id = TransferId::new();
        let leg = |account_id: AccountId, kind: MovementKind| Movement {
            id: MovementId::new(),
            account_id,
            movement_date: input.transfer_date,
            kind,
            amount: input.amount,
            description: input.description.clone(),
            transfer_id: Some(transfer_id),
        };
        let outgoing = leg(input.from_account_id, MovementKind::TransferOut);
        let incoming = leg(input.to_account_id, MovementKind::TransferIn);

        self.store
            .insert_transfer(outgoing.clone(), incoming.clone())
            .await?;
        self.refresh_closed_after(input.from_account_id, input.transfer_date)
            .await?;
        self.refresh_closed_after(input.to_account_id, input.transfer_date)
            .await?;

        info!(
            transfer_id = %transfer_id,
            from_account_id = %input.from_account_id,
            to_account_id = %input.to_account_id,
            transfer_date = %input.transfer_date,
            amount = %input.amount,
            "Transfer recorded"
        );

        Ok(Transfer {
            id: transfer_id,
            outgoing,
            incoming,
        })
    }

    /// Edit date, amount and description of a plain movement.
    ///
    /// Both the current and the new date must be editable.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement does not exist, is a transfer leg,
    /// the new amount is invalid, or either date is locked.
    pub async fn update_movement(
        &self,
        id: MovementId,
        update: MovementUpdate,
    ) -> Result<Movement, MovementError> {
        validate_amount(update.amount)?;

        let _guard = self.lock.lock().await;

        let existing = self.existing_movement(id).await?;
        if existing.transfer_id.is_some() {
            return Err(MovementError::TransferLegImmutable(id));
        }

        self.ensure_open(existing.account_id, existing.movement_date).await?;
        if update.movement_date != existing.movement_date {
            self.ensure_open(existing.account_id, update.movement_date).await?;
        }

        let earliest = existing.movement_date.min(update.movement_date);
        let updated = self
            .store
            .update_movement(Movement {
                movement_date: update.movement_date,
                amount: update.amount,
                description: update.description,
                ..existing
            })
            .await?;
        self.refresh_closed_after(updated.account_id, earliest).await?;

        info!(
            movement_id = %updated.id,
            movement_date = %updated.movement_date,
            amount = %updated.amount,
            "Movement updated"
        );

        Ok(updated)
    }

    /// Delete a movement. Deleting either leg of a transfer removes both.
    ///
    /// # Errors
    ///
    /// Returns an error if the movement does not exist or its date is locked
    /// on any affected account.
    pub async fn delete_movement(&self, id: MovementId) -> Result<(), MovementError> {
        let _guard = self.lock.lock().await;

        let existing = self.existing_movement(id).await?;

        match existing.transfer_id {
            Some(transfer_id) => {
                let legs = self.store.find_transfer_legs(transfer_id).await?;
                for leg in &legs {
                    self.ensure_open(leg.account_id, leg.movement_date).await?;
                }
                let removed = self.store.delete_transfer(transfer_id).await?;
                for leg in &legs {
                    self.refresh_closed_after(leg.account_id, leg.movement_date)
                        .await?;
                }
                info!(transfer_id = %transfer_id, legs_removed = removed, "Transfer deleted");
            }
            None => {
                self.ensure_open(existing.account_id, existing.movement_date).await?;
                if !self.store.delete_movement(id).await? {
                    return Err(MovementError::MovementNotFound(id));
                }
                self.refresh_closed_after(existing.account_id, existing.movement_date)
                    .await?;
                info!(movement_id = %id, "Movement deleted");
            }
        }

        Ok(())
    }

    /// List an account's movements, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the store fails.
    pub async fn list_movements(
        &self,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Movement>, MovementError> {
        if self.store.find_account(account_id).await?.is_none() {
            return Err(MovementError::AccountNotFound(account_id));
        }
        let mut movements = self.store.list_movements(account_id, from, to).await?;
        movements.sort_by_key(|m| m.movement_date);
        Ok(movements)
    }

    async fn active_account(&self, id: AccountId) -> Result<BankAccount, MovementError> {
        let account = self
            .store
            .find_account(id)
            .await?
            .ok_or(MovementError::AccountNotFound(id))?;
        if !account.is_active {
            return Err(MovementError::AccountInactive(id));
        }
        Ok(account)
    }

    async fn existing_movement(&self, id: MovementId) -> Result<Movement, MovementError> {
        self.store
            .find_movement(id)
            .await?
            .ok_or(MovementError::MovementNotFound(id))
    }

    /// Rejects writes on a date whose covering closing is closed.
    async fn ensure_open(&self, account_id: AccountId, date: NaiveDate) -> Result<(), MovementError> {
        match self.store.find_covering_closing(account_id, date).await? {
            Some(covering) if covering.is_closed => Err(MovementError::PeriodClosed {
                account_id,
                date,
                closed_on: covering.closing_date,
            }),
            _ => Ok(()),
        }
    }

    /// Recomputes the account's closed records dated after `date`.
    ///
    /// Only a reopened covering record lets a write through, so the records
    /// touched here all lie beyond a reopened date.
    async fn refresh_closed_after(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<(), MovementError> {
        let dates = recalculate_account_after(self.closings.as_ref(), account_id, date)
            .await
            .map_err(|e| {
                error!(
                    account_id = %account_id,
                    movement_date = %date,
                    error = %e,
                    "Failed to recalculate closings after movement write"
                );
                MovementError::Recalculation {
                    account_id,
                    date,
                    reason: e.to_string(),
                }
            })?;

        if !dates.is_empty() {
            info!(
                account_id = %account_id,
                movement_date = %date,
                recalculated = dates.len(),
                "Later closings recalculated after movement write"
            );
        }
        Ok(())
    }
}

/// Amounts must be positive and fit a NUMERIC(18,2) column.
fn validate_amount(amount: Decimal) -> Result<(), MovementError> {
    if amount <= Decimal::ZERO {
        return Err(MovementError::NonPositiveAmount);
    }
    if amount.normalize().scale() > 2 {
        return Err(MovementError::InvalidAmountScale(amount));
    }
    Ok(())
}
