//! Port for issue persistence and the lookups the webhook relies on.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::issue::Issue;

use super::define_port_error;

define_port_error! {
    /// Errors raised by issue repository adapters.
    pub enum IssueRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "issue repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "issue repository query failed: {message}",
    }
}

/// Port for reading and writing issues.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Persist a newly created issue.
    async fn insert(&self, issue: &Issue) -> Result<(), IssueRepositoryError>;

    /// Persist changes to an existing issue.
    async fn update(&self, issue: &Issue) -> Result<(), IssueRepositoryError>;

    /// Find an issue by its immutable internal URL.
    async fn find_by_internal_url(
        &self,
        internal_url: &str,
    ) -> Result<Option<Issue>, IssueRepositoryError>;

    /// Find an issue by its per-project identifier.
    async fn find_by_identifier(
        &self,
        project_id: Uuid,
        identifier: i64,
    ) -> Result<Option<Issue>, IssueRepositoryError>;

    /// List a project's issues, newest first.
    async fn list_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<Issue>, IssueRepositoryError>;

    /// Delete an issue.
    async fn delete(&self, issue_id: Uuid) -> Result<(), IssueRepositoryError>;
}

/// Fixture implementation for tests that do not exercise issue persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIssueRepository;

#[async_trait]
impl IssueRepository for FixtureIssueRepository {
    async fn insert(&self, _issue: &Issue) -> Result<(), IssueRepositoryError> {
        Ok(())
    }

    async fn update(&self, _issue: &Issue) -> Result<(), IssueRepositoryError> {
        Ok(())
    }

    async fn find_by_internal_url(
        &self,
        _internal_url: &str,
    ) -> Result<Option<Issue>, IssueRepositoryError> {
        Ok(None)
    }

    async fn find_by_identifier(
        &self,
        _project_id: Uuid,
        _identifier: i64,
    ) -> Result<Option<Issue>, IssueRepositoryError> {
        Ok(None)
    }

    async fn list_for_project(
        &self,
        _project_id: Uuid,
    ) -> Result<Vec<Issue>, IssueRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _issue_id: Uuid) -> Result<(), IssueRepositoryError> {
        Ok(())
    }
}
