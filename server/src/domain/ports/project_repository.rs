//! Port for project persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::identity::UserId;
use crate::domain::project::Project;

use super::define_port_error;

define_port_error! {
    /// Errors raised by project repository adapters.
    pub enum ProjectRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "project repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "project repository query failed: {message}",
        /// Another project already uses this display name.
        DuplicateName => "a project with this name already exists",
    }
}

/// Port for reading and writing projects.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persist a newly created project.
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    /// Persist settings changes to an existing project.
    async fn update(&self, project: &Project) -> Result<(), ProjectRepositoryError>;

    /// Find a project by its URL slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, ProjectRepositoryError>;

    /// List the most recently created projects, newest first.
    async fn list_recent(&self, limit: i64) -> Result<Vec<Project>, ProjectRepositoryError>;

    /// List projects owned by `user`, newest first.
    async fn list_for_user(&self, user: &UserId)
    -> Result<Vec<Project>, ProjectRepositoryError>;

    /// Delete a project. Issues and the counter cascade with it.
    async fn delete(&self, project_id: Uuid) -> Result<(), ProjectRepositoryError>;
}

/// Fixture implementation for tests that do not exercise project persistence.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProjectRepository;

#[async_trait]
impl ProjectRepository for FixtureProjectRepository {
    async fn insert(&self, _project: &Project) -> Result<(), ProjectRepositoryError> {
        Ok(())
    }

    async fn update(&self, _project: &Project) -> Result<(), ProjectRepositoryError> {
        Ok(())
    }

    async fn find_by_slug(&self, _slug: &str) -> Result<Option<Project>, ProjectRepositoryError> {
        Ok(None)
    }

    async fn list_recent(&self, _limit: i64) -> Result<Vec<Project>, ProjectRepositoryError> {
        Ok(Vec::new())
    }

    async fn list_for_user(
        &self,
        _user: &UserId,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        Ok(Vec::new())
    }

    async fn delete(&self, _project_id: Uuid) -> Result<(), ProjectRepositoryError> {
        Ok(())
    }
}
