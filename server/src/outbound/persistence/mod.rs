//! Diesel/PostgreSQL persistence adapters.

mod diesel_counter_store;
mod diesel_issue_repository;
mod diesel_project_repository;
mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_counter_store::DieselCounterStore;
pub use diesel_issue_repository::DieselIssueRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// SQL migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply any pending migrations over a short-lived synchronous connection.
pub fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    let mut conn =
        PgConnection::establish(database_url).map_err(|err| PoolError::build(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|err| PoolError::build(err.to_string()))
}
