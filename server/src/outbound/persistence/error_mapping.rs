//! Shared Diesel error mapping for the persistence adapters.

use tracing::debug;

use super::pool::PoolError;

/// Map pool errors into a repository-specific connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
pub(crate) fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, info) => {
            connection(info.message().to_owned())
        }
        other => query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::IssueRepositoryError;

    #[test]
    fn pool_errors_map_to_connection() {
        let error = map_pool_error(PoolError::checkout("pool exhausted"), |message| {
            IssueRepositoryError::connection(message)
        });
        assert_eq!(
            error,
            IssueRepositoryError::connection("pool exhausted")
        );
    }

    #[test]
    fn not_found_maps_to_query() {
        let error = map_diesel_error(
            diesel::result::Error::NotFound,
            IssueRepositoryError::query,
            IssueRepositoryError::connection,
        );
        assert!(matches!(error, IssueRepositoryError::Query { .. }));
    }
}
