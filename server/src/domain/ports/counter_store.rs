//! Port for per-project identifier allocation.
//!
//! One counter exists per project, created lazily on the first allocation
//! and starting at zero. Adapters MUST increment atomically: two concurrent
//! allocations for the same project must never observe the same prior count.
//! (The source design read, incremented, and wrote in separate steps; that
//! race is deliberately not reproduced here; see DESIGN.md.)

use async_trait::async_trait;
use uuid::Uuid;

use super::define_port_error;

define_port_error! {
    /// Errors raised by counter store adapters.
    pub enum CounterStoreError {
        /// Store connection could not be established.
        Connection { message: String } =>
            "counter store connection failed: {message}",
        /// The increment failed during execution.
        Query { message: String } =>
            "counter store query failed: {message}",
    }
}

/// Port allocating monotonically increasing per-project identifiers.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Return one more than the previous allocation for `project_id`,
    /// starting at 1.
    async fn allocate(&self, project_id: Uuid) -> Result<i64, CounterStoreError>;
}

/// Fixture implementation for tests that do not exercise allocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCounterStore;

#[async_trait]
impl CounterStore for FixtureCounterStore {
    async fn allocate(&self, _project_id: Uuid) -> Result<i64, CounterStoreError> {
        Ok(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_always_allocates_one() {
        let store = FixtureCounterStore;
        let identifier = store
            .allocate(Uuid::new_v4())
            .await
            .expect("fixture allocation succeeds");
        assert_eq!(identifier, 1);
    }
}
