//! Bank account repository.

use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use treasury_core::ledger::BankAccount;
use treasury_shared::types::{AccountId, CompanyId};

use crate::entities::bank_accounts;

/// Error types for account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Account name is blank.
    #[error("Account name cannot be empty")]
    EmptyName,

    /// Account not found.
    #[error("Bank account not found: {0}")]
    AccountNotFound(AccountId),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl AccountError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "VALIDATION_ERROR",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::EmptyName => 400,
            Self::AccountNotFound(_) => 404,
            Self::Database(_) => 500,
        }
    }
}

/// Input for creating a bank account.
#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    /// Owning company.
    pub company_id: CompanyId,
    /// Display name.
    pub name: String,
    /// Balance before the first movement.
    pub opening_balance: Decimal,
}

/// Filter options for listing accounts.
#[derive(Debug, Clone, Default)]
pub struct AccountFilter {
    /// Filter by company.
    pub company_id: Option<CompanyId>,
    /// Filter by active status.
    pub is_active: Option<bool>,
}

/// Bank account repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a new active bank account.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the insert fails.
    pub async fn create_account(&self, input: CreateAccountInput) -> Result<BankAccount, AccountError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AccountError::EmptyName);
        }

        let now = chrono::Utc::now().into();
        let account = bank_accounts::ActiveModel {
            id: Set(AccountId::new().into_inner()),
            company_id: Set(input.company_id.into_inner()),
            name: Set(name.to_string()),
            opening_balance: Set(input.opening_balance.round_dp(2)),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = account.insert(&self.db).await?;

        tracing::info!(
            account_id = %model.id,
            company_id = %model.company_id,
            "Bank account created"
        );

        Ok(to_bank_account(model))
    }

    /// Lists bank accounts ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self, filter: AccountFilter) -> Result<Vec<BankAccount>, AccountError> {
        let mut query = bank_accounts::Entity::find().order_by_asc(bank_accounts::Column::Name);

        if let Some(company_id) = filter.company_id {
            query = query.filter(bank_accounts::Column::CompanyId.eq(company_id.into_inner()));
        }

        if let Some(is_active) = filter.is_active {
            query = query.filter(bank_accounts::Column::IsActive.eq(is_active));
        }

        let models = query.all(&self.db).await?;
        Ok(models.into_iter().map(to_bank_account).collect())
    }

    /// Finds a bank account by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, id: AccountId) -> Result<Option<BankAccount>, AccountError> {
        let model = bank_accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?;
        Ok(model.map(to_bank_account))
    }

    /// Activates or deactivates a bank account.
    ///
    /// Inactive accounts are skipped by daily closings and reject new movements.
    ///
    /// # Errors
    ///
    /// Returns an error if the account does not exist or the update fails.
    pub async fn set_account_active(
        &self,
        id: AccountId,
        is_active: bool,
    ) -> Result<BankAccount, AccountError> {
        let model = bank_accounts::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await?
            .ok_or(AccountError::AccountNotFound(id))?;

        let mut active = model.into_active_model();
        active.is_active = Set(is_active);
        active.updated_at = Set(chrono::Utc::now().into());
        let model = active.update(&self.db).await?;

        tracing::info!(account_id = %model.id, is_active, "Bank account status changed");

        Ok(to_bank_account(model))
    }
}

/// Convert database model to domain model.
pub(crate) fn to_bank_account(model: bank_accounts::Model) -> BankAccount {
    BankAccount {
        id: AccountId::from_uuid(model.id),
        company_id: CompanyId::from_uuid(model.company_id),
        name: model.name,
        opening_balance: model.opening_balance,
        is_active: model.is_active,
    }
}
