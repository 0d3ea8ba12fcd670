//! Database migration runner for Treasury.
//!
//! Usage:
//!   migrator up      - Apply pending migrations
//!   migrator down    - Roll back the last migration
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop the schema and apply every migration
//!
//! The connection string is read from `DATABASE_URL`.

use sea_orm_migration::prelude::*;
use treasury_db::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    cli::run_cli(Migrator).await;
}
