//! In-memory store shared by the core unit and property tests.

use std::sync::Mutex;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use treasury_shared::types::{AccountId, ClosingId, CompanyId, MovementId, TransferId, UserId};

use crate::closing::{ClosingFigures, ClosingRecord, ClosingStore};
use crate::ledger::{BankAccount, CoveringClosing, Movement, MovementKind, MovementStore};
use crate::store::StoreError;

#[derive(Default)]
struct State {
    accounts: Vec<BankAccount>,
    movements: Vec<Movement>,
    closings: Vec<ClosingRecord>,
    fail_batch_insert: bool,
    fail_update_on: Option<NaiveDate>,
}

/// In-memory store backing both the movement and closing services in tests.
#[derive(Default)]
pub(crate) struct MockStore {
    state: Mutex<State>,
}

impl MockStore {
    pub(crate) fn add_account(&self, opening_balance: Decimal) -> AccountId {
        let id = AccountId::new();
        self.state.lock().unwrap().accounts.push(BankAccount {
            id,
            company_id: CompanyId::new(),
            name: format!("Conta {id}"),
            opening_balance,
            is_active: true,
        });
        id
    }

    pub(crate) fn deactivate(&self, account_id: AccountId) {
        let mut state = self.state.lock().unwrap();
        if let Some(account) = state.accounts.iter_mut().find(|a| a.id == account_id) {
            account.is_active = false;
        }
    }

    pub(crate) fn add_movement(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        kind: MovementKind,
        amount: Decimal,
    ) {
        self.state.lock().unwrap().movements.push(Movement {
            id: MovementId::new(),
            account_id,
            movement_date: date,
            kind,
            amount,
            description: None,
            transfer_id: None,
        });
    }

    /// Seeds a record with zero figures, closed or reopened.
    pub(crate) fn add_closing(&self, account_id: AccountId, date: NaiveDate, closed: bool) {
        self.state.lock().unwrap().closings.push(ClosingRecord {
            id: ClosingId::new(),
            account_id,
            closing_date: date,
            previous_balance: Decimal::ZERO,
            total_in: Decimal::ZERO,
            total_out: Decimal::ZERO,
            final_balance: Decimal::ZERO,
            is_closed: closed,
            closed_by: UserId::new(),
        });
    }

    pub(crate) fn movement_count(&self) -> usize {
        self.state.lock().unwrap().movements.len()
    }

    pub(crate) fn record(&self, account_id: AccountId, date: NaiveDate) -> Option<ClosingRecord> {
        self.state
            .lock()
            .unwrap()
            .closings
            .iter()
            .find(|r| r.account_id == account_id && r.closing_date == date)
            .cloned()
    }

    /// Closed records of an account, ascending by date.
    pub(crate) fn closed_chain(&self, account_id: AccountId) -> Vec<ClosingRecord> {
        let mut chain: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .filter(|r| r.account_id == account_id && r.is_closed)
            .cloned()
            .collect();
        chain.sort_by_key(|r| r.closing_date);
        chain
    }

    pub(crate) fn opening_balance(&self, account_id: AccountId) -> Decimal {
        self.state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .map_or(Decimal::ZERO, |a| a.opening_balance)
    }

    pub(crate) fn closing_count(&self) -> usize {
        self.state.lock().unwrap().closings.len()
    }

    pub(crate) fn fail_batch_insert(&self) {
        self.state.lock().unwrap().fail_batch_insert = true;
    }

    pub(crate) fn fail_update_on(&self, date: NaiveDate) {
        self.state.lock().unwrap().fail_update_on = Some(date);
    }
}

impl ClosingStore for MockStore {
    async fn list_active_accounts(&self) -> Result<Vec<BankAccount>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn get_opening_balance(&self, account_id: AccountId) -> Result<Option<Decimal>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == account_id)
            .map(|a| a.opening_balance))
    }

    async fn find_latest_closed_before(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Option<ClosingRecord>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .filter(|r| r.account_id == account_id && r.is_closed && r.closing_date < date)
            .max_by_key(|r| r.closing_date)
            .cloned())
    }

    async fn find_movements(
        &self,
        account_id: AccountId,
        after: Option<NaiveDate>,
        through: NaiveDate,
    ) -> Result<Vec<Movement>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .movements
            .iter()
            .filter(|m| m.account_id == account_id)
            .filter(|m| after.is_none_or(|a| m.movement_date > a))
            .filter(|m| m.movement_date <= through)
            .cloned()
            .collect())
    }

    async fn insert_closing_batch(
        &self,
        records: Vec<ClosingRecord>,
    ) -> Result<Vec<ClosingRecord>, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_batch_insert {
            return Err(StoreError::new("batch insert rejected"));
        }
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            match state
                .closings
                .iter_mut()
                .find(|r| r.account_id == record.account_id && r.closing_date == record.closing_date)
            {
                Some(existing) => {
                    *existing = ClosingRecord {
                        id: existing.id,
                        ..record
                    };
                    stored.push(existing.clone());
                }
                None => {
                    state.closings.push(record.clone());
                    stored.push(record);
                }
            }
        }
        Ok(stored)
    }

    async fn update_closing_figures(
        &self,
        account_id: AccountId,
        date: NaiveDate,
        figures: ClosingFigures,
    ) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_update_on == Some(date) {
            return Err(StoreError::new("update rejected"));
        }
        let record = state
            .closings
            .iter_mut()
            .find(|r| r.account_id == account_id && r.closing_date == date)
            .ok_or_else(|| StoreError::new("closing record not found"))?;
        record.previous_balance = figures.previous_balance;
        record.total_in = figures.total_in;
        record.total_out = figures.total_out;
        record.final_balance = figures.final_balance;
        Ok(())
    }

    async fn set_closed_flag(&self, date: NaiveDate, closed: bool) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let mut changed = 0;
        for record in state.closings.iter_mut().filter(|r| r.closing_date == date) {
            record.is_closed = closed;
            changed += 1;
        }
        Ok(changed)
    }

    async fn exists_closed_after(&self, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .any(|r| r.is_closed && r.closing_date > date))
    }

    async fn exists_closed_on(&self, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .any(|r| r.is_closed && r.closing_date == date))
    }

    async fn exists_reopened_on(&self, date: NaiveDate) -> Result<bool, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .any(|r| !r.is_closed && r.closing_date == date))
    }

    async fn list_closed_dates_after(&self, date: NaiveDate) -> Result<Vec<NaiveDate>, StoreError> {
        let mut dates: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .filter(|r| r.is_closed && r.closing_date > date)
            .map(|r| r.closing_date)
            .collect();
        dates.sort();
        dates.dedup();
        Ok(dates)
    }

    async fn list_closings(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<ClosingRecord>, StoreError> {
        let mut records: Vec<_> = self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .filter(|r| from.is_none_or(|f| r.closing_date >= f))
            .filter(|r| to.is_none_or(|t| r.closing_date <= t))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.closing_date);
        Ok(records)
    }
}

impl MovementStore for MockStore {
    async fn find_account(&self, id: AccountId) -> Result<Option<BankAccount>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .accounts
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn find_movement(&self, id: MovementId) -> Result<Option<Movement>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .movements
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    async fn insert_movement(&self, movement: Movement) -> Result<Movement, StoreError> {
        self.state.lock().unwrap().movements.push(movement.clone());
        Ok(movement)
    }

    async fn insert_transfer(&self, outgoing: Movement, incoming: Movement) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();
        state.movements.push(outgoing);
        state.movements.push(incoming);
        Ok(())
    }

    async fn update_movement(&self, movement: Movement) -> Result<Movement, StoreError> {
        let mut state = self.state.lock().unwrap();
        let slot = state
            .movements
            .iter_mut()
            .find(|m| m.id == movement.id)
            .ok_or_else(|| StoreError::new("missing row"))?;
        *slot = movement.clone();
        Ok(movement)
    }

    async fn delete_movement(&self, id: MovementId) -> Result<bool, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.movements.len();
        state.movements.retain(|m| m.id != id);
        Ok(state.movements.len() != before)
    }

    async fn find_transfer_legs(&self, transfer_id: TransferId) -> Result<Vec<Movement>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .movements
            .iter()
            .filter(|m| m.transfer_id == Some(transfer_id))
            .cloned()
            .collect())
    }

    async fn delete_transfer(&self, transfer_id: TransferId) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        let before = state.movements.len();
        state.movements.retain(|m| m.transfer_id != Some(transfer_id));
        Ok((before - state.movements.len()) as u64)
    }

    async fn find_covering_closing(
        &self,
        account_id: AccountId,
        date: NaiveDate,
    ) -> Result<Option<CoveringClosing>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .closings
            .iter()
            .filter(|r| r.account_id == account_id && r.closing_date >= date)
            .min_by_key(|r| r.closing_date)
            .map(|r| CoveringClosing {
                closing_date: r.closing_date,
                is_closed: r.is_closed,
            }))
    }

    async fn list_movements(
        &self,
        account_id: AccountId,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<Movement>, StoreError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .movements
            .iter()
            .filter(|m| m.account_id == account_id)
            .filter(|m| from.is_none_or(|f| m.movement_date >= f))
            .filter(|m| to.is_none_or(|t| m.movement_date <= t))
            .cloned()
            .collect())
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}
