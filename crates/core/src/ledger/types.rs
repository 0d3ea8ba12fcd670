//! Bank account and movement domain types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use treasury_shared::types::{AccountId, CompanyId, MovementId, TransferId};

/// A bank account whose balance is carried from day to day by closings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankAccount {
    /// Unique identifier.
    pub id: AccountId,
    /// Company owning the account.
    pub company_id: CompanyId,
    /// Display name (bank, branch, number).
    pub name: String,
    /// Balance before the first recorded movement.
    pub opening_balance: Decimal,
    /// Inactive accounts are skipped by closings and reject new movements.
    pub is_active: bool,
}

/// Direction of a movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementKind {
    /// Money entering the account.
    Inflow,
    /// Money leaving the account.
    Outflow,
    /// Outgoing leg of a transfer between accounts.
    TransferOut,
    /// Incoming leg of a transfer between accounts.
    TransferIn,
}

impl MovementKind {
    /// Returns true for kinds that increase the balance.
    #[must_use]
    pub const fn is_inflow(self) -> bool {
        matches!(self, Self::Inflow | Self::TransferIn)
    }

    /// Returns true for transfer legs.
    #[must_use]
    pub const fn is_transfer(self) -> bool {
        matches!(self, Self::TransferOut | Self::TransferIn)
    }
}

impl std::fmt::Display for MovementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
            Self::TransferOut => "transfer_out",
            Self::TransferIn => "transfer_in",
        };
        f.write_str(s)
    }
}

/// A single recorded inflow, outflow, or transfer leg against an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Unique identifier.
    pub id: MovementId,
    /// Account the movement is booked against.
    pub account_id: AccountId,
    /// Calendar date of the movement.
    pub movement_date: NaiveDate,
    /// Direction.
    pub kind: MovementKind,
    /// Non-negative amount.
    pub amount: Decimal,
    /// Optional free-text description.
    pub description: Option<String>,
    /// Set on both legs of a transfer.
    pub transfer_id: Option<TransferId>,
}

/// Input for recording a plain inflow or outflow.
#[derive(Debug, Clone)]
pub struct NewMovement {
    /// Target account.
    pub account_id: AccountId,
    /// Movement date.
    pub movement_date: NaiveDate,
    /// `Inflow` or `Outflow`.
    pub kind: MovementKind,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Optional description.
    pub description: Option<String>,
}

/// Input for editing a plain movement.
#[derive(Debug, Clone)]
pub struct MovementUpdate {
    /// New movement date.
    pub movement_date: NaiveDate,
    /// New amount, must be positive.
    pub amount: Decimal,
    /// New description.
    pub description: Option<String>,
}

/// Input for moving money between two accounts.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    /// Account the money leaves.
    pub from_account_id: AccountId,
    /// Account the money enters.
    pub to_account_id: AccountId,
    /// Transfer date (both legs).
    pub transfer_date: NaiveDate,
    /// Amount, must be positive.
    pub amount: Decimal,
    /// Optional description copied to both legs.
    pub description: Option<String>,
}

/// Both legs of a recorded transfer.
#[derive(Debug, Clone, Serialize)]
pub struct Transfer {
    /// Identifier shared by both legs.
    pub id: TransferId,
    /// `TransferOut` leg on the source account.
    pub outgoing: Movement,
    /// `TransferIn` leg on the destination account.
    pub incoming: Movement,
}
