//! Closing service: daily closing, reopening and closing history.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Mutex;
use tracing::{error, info};
use treasury_shared::types::UserId;

use super::balance::compute_closing;
use super::cascade::recalculate_after;
use super::error::{ClosingError, ClosingValidationError};
use super::policy::ClosingPolicy;
use super::store::ClosingStore;
use super::types::{ClosingBatchResult, ClosingPreview, ClosingRecord, ReopenResult};

/// Closing service for daily bank closings.
///
/// Closings, reopenings and their cascades are serialized through one lock,
/// so the chronological checks never race each other.
pub struct ClosingService<S: ClosingStore> {
    store: Arc<S>,
    policy: ClosingPolicy,
    lock: Arc<Mutex<()>>,
}

impl<S: ClosingStore> ClosingService<S> {
    /// Create a new closing service with its own operation lock.
    #[must_use]
    pub fn new(store: Arc<S>, policy: ClosingPolicy) -> Self {
        Self::with_lock(store, policy, Arc::new(Mutex::new(())))
    }

    /// Create a closing service sharing an existing operation lock.
    #[must_use]
    pub fn with_lock(store: Arc<S>, policy: ClosingPolicy, lock: Arc<Mutex<()>>) -> Self {
        Self {
            store,
            policy,
            lock,
        }
    }

    /// Handle to the operation lock, for services whose writes must not
    /// interleave with closings.
    #[must_use]
    pub fn lock_handle(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.lock)
    }

    /// The policy this service enforces.
    #[must_use]
    pub fn policy(&self) -> &ClosingPolicy {
        &self.policy
    }

    /// Figures a closing of `date` would persist for each active account.
    ///
    /// Nothing is validated or written.
    ///
    /// # Errors
    ///
    /// Returns `DataAccess` if a store read fails.
    pub async fn preview(&self, date: NaiveDate) -> Result<Vec<ClosingPreview>, ClosingError> {
        let accounts = self.store.list_active_accounts().await?;
        let mut previews = Vec::with_capacity(accounts.len());
        for account in accounts {
            let computation = compute_closing(self.store.as_ref(), account.id, date).await?;
            previews.push(ClosingPreview {
                account_id: account.id,
                account_name: account.name,
                computation,
            });
        }
        Ok(previews)
    }

    /// Close `date` for every active account.
    ///
    /// Validation runs completely before anything is written:
    /// 1. `date` is not after `today`
    /// 2. `date` is within the backdating window
    /// 3. no later date is closed, unless `date` was reopened and is being closed again
    /// 4. `date` is not already closed
    /// 5. there is at least one active account
    ///
    /// Closing a reopened date overwrites its rows and then recalculates every
    /// later closed date.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for rule violations, `DataAccess` for store
    /// failures and `CascadeRecalculation` when a re-closing cascade stops.
    pub async fn perform_closing(
        &self,
        date: NaiveDate,
        actor: UserId,
        today: NaiveDate,
    ) -> Result<ClosingBatchResult, ClosingError> {
        let _guard = self.lock.lock().await;

        self.policy.validate_window(date, today)?;

        let reclosing = self.store.exists_reopened_on(date).await?;
        if !reclosing && self.store.exists_closed_after(date).await? {
            return Err(ClosingValidationError::OutOfOrder(date).into());
        }
        if self.store.exists_closed_on(date).await? {
            return Err(ClosingValidationError::DuplicateDate(date).into());
        }

        let accounts = self.store.list_active_accounts().await?;
        if accounts.is_empty() {
            return Err(ClosingValidationError::NoActiveAccounts.into());
        }

        let mut batch = Vec::with_capacity(accounts.len());
        for account in &accounts {
            let computation = compute_closing(self.store.as_ref(), account.id, date).await?;
            batch.push(ClosingRecord::closed(
                account.id,
                date,
                &computation.figures,
                actor,
            ));
        }

        let records = self.store.insert_closing_batch(batch).await.map_err(|e| {
            error!(closing_date = %date, error = %e, "Closing batch insert failed");
            ClosingError::from(e)
        })?;

        info!(
            closing_date = %date,
            accounts = records.len(),
            actor = %actor,
            reclosing,
            "Daily closing performed"
        );

        let recalculation = if reclosing {
            Some(recalculate_after(self.store.as_ref(), date, self.policy.stop_on_error).await?)
        } else {
            None
        };

        Ok(ClosingBatchResult {
            closing_date: date,
            accounts_closed: records.len(),
            records,
            reclosed: reclosing,
            recalculation,
        })
    }

    /// Reopen `date` and recalculate every later closed date.
    ///
    /// # Errors
    ///
    /// Returns `Validation(NotClosed)` if nothing is closed on `date`,
    /// `DataAccess` for store failures and `CascadeRecalculation` when the
    /// cascade stops at a failing date.
    pub async fn reopen(&self, date: NaiveDate) -> Result<ReopenResult, ClosingError> {
        let _guard = self.lock.lock().await;

        if !self.store.exists_closed_on(date).await? {
            return Err(ClosingValidationError::NotClosed(date).into());
        }

        let records_reopened = self.store.set_closed_flag(date, false).await?;

        info!(reopened_date = %date, records = records_reopened, "Closing reopened");

        let recalculation =
            recalculate_after(self.store.as_ref(), date, self.policy.stop_on_error).await?;

        Ok(ReopenResult {
            reopened_date: date,
            records_reopened,
            recalculation,
        })
    }

    /// Closing records in a date range, ordered by date.
    ///
    /// # Errors
    ///
    /// Returns `DataAccess` if the store read fails.
    pub async fn list_closings(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ClosingRecord>, ClosingError> {
        let mut records = self.store.list_closings(from, to).await?;
        records.sort_by_key(|r| r.closing_date);
        Ok(records)
    }
}
