//! PostgreSQL-backed `CounterStore` implementation using Diesel.
//!
//! The increment is one atomic upsert: the row is created at 1 on first use
//! and bumped with `count = count + 1` otherwise, with the new value
//! returned in the same statement. Two concurrent allocations for the same
//! project therefore always observe distinct counts.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{CounterStore, CounterStoreError};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewCounterRow;
use super::pool::{DbPool, PoolError};
use super::schema::counters;

/// Diesel-backed implementation of the counter store port.
#[derive(Clone)]
pub struct DieselCounterStore {
    pool: DbPool,
}

impl DieselCounterStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> CounterStoreError {
    map_pool_error(error, CounterStoreError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CounterStoreError {
    map_diesel_error(
        error,
        CounterStoreError::query,
        CounterStoreError::connection,
    )
}

#[async_trait]
impl CounterStore for DieselCounterStore {
    async fn allocate(&self, project_id: Uuid) -> Result<i64, CounterStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        diesel::insert_into(counters::table)
            .values(NewCounterRow {
                project_id,
                count: 1,
            })
            .on_conflict(counters::project_id)
            .do_update()
            .set(counters::count.eq(counters::count + 1_i64))
            .returning(counters::count)
            .get_result::<i64>(&mut conn)
            .await
            .map_err(map_diesel)
    }
}
