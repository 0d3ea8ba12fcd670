//! Initial database migration.
//!
//! Creates bank accounts, movements and daily closing records.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: ACCOUNTS & MOVEMENTS
        // ============================================================
        db.execute_unprepared(BANK_ACCOUNTS_SQL).await?;
        db.execute_unprepared(MOVEMENTS_SQL).await?;

        // ============================================================
        // PART 3: DAILY CLOSINGS
        // ============================================================
        db.execute_unprepared(CLOSING_RECORDS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_SQL).await?;
        Ok(())
    }
}

const ENUMS_SQL: &str = r"
CREATE TYPE movement_kind AS ENUM ('inflow', 'outflow', 'transfer_out', 'transfer_in');
";

const BANK_ACCOUNTS_SQL: &str = r"
CREATE TABLE bank_accounts (
    id UUID PRIMARY KEY,
    company_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    opening_balance NUMERIC(18, 2) NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_bank_accounts_company ON bank_accounts(company_id);
CREATE INDEX idx_bank_accounts_active ON bank_accounts(is_active) WHERE is_active;
";

const MOVEMENTS_SQL: &str = r"
CREATE TABLE movements (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES bank_accounts(id) ON DELETE RESTRICT,
    movement_date DATE NOT NULL,
    kind movement_kind NOT NULL,
    amount NUMERIC(18, 2) NOT NULL,
    description TEXT,
    transfer_id UUID,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT chk_movement_amount_positive CHECK (amount > 0),
    CONSTRAINT chk_transfer_kind CHECK (
        (transfer_id IS NULL AND kind IN ('inflow', 'outflow'))
        OR (transfer_id IS NOT NULL AND kind IN ('transfer_out', 'transfer_in'))
    )
);

CREATE INDEX idx_movements_account_date ON movements(account_id, movement_date);
CREATE INDEX idx_movements_transfer ON movements(transfer_id) WHERE transfer_id IS NOT NULL;
";

const CLOSING_RECORDS_SQL: &str = r"
CREATE TABLE closing_records (
    id UUID PRIMARY KEY,
    account_id UUID NOT NULL REFERENCES bank_accounts(id) ON DELETE RESTRICT,
    closing_date DATE NOT NULL,
    previous_balance NUMERIC(18, 2) NOT NULL,
    total_in NUMERIC(18, 2) NOT NULL,
    total_out NUMERIC(18, 2) NOT NULL,
    final_balance NUMERIC(18, 2) NOT NULL,
    is_closed BOOLEAN NOT NULL DEFAULT true,
    closed_by UUID NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    CONSTRAINT uq_closing_account_date UNIQUE (account_id, closing_date),
    CONSTRAINT chk_closing_balance CHECK (final_balance = previous_balance + total_in - total_out)
);

CREATE INDEX idx_closing_records_date ON closing_records(closing_date) WHERE is_closed;
";

const DROP_SQL: &str = r"
DROP TABLE IF EXISTS closing_records CASCADE;
DROP TABLE IF EXISTS movements CASCADE;
DROP TABLE IF EXISTS bank_accounts CASCADE;
DROP TYPE IF EXISTS movement_kind;
";
