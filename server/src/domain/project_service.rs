//! Project domain services implementing the project driving ports.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;

use crate::domain::Error;
use crate::domain::identity::{Actor, UserId, can_manage};
use crate::domain::ports::{
    IssueRepository, IssueRepositoryError, ProjectCommand, ProjectOverview, ProjectQuery,
    ProjectRepository, ProjectRepositoryError,
};
use crate::domain::project::Project;

/// Listing cap shared by the index and project-list views.
pub const PROJECT_LIST_LIMIT: i64 = 50;

pub(crate) fn map_project_repo_error(error: ProjectRepositoryError) -> Error {
    match error {
        ProjectRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("project repository unavailable: {message}"))
        }
        ProjectRepositoryError::Query { message } => {
            Error::internal(format!("project repository error: {message}"))
        }
        ProjectRepositoryError::DuplicateName => {
            Error::conflict("a project with this name already exists")
        }
    }
}

pub(crate) fn map_issue_repo_error(error: IssueRepositoryError) -> Error {
    match error {
        IssueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("issue repository unavailable: {message}"))
        }
        IssueRepositoryError::Query { message } => {
            Error::internal(format!("issue repository error: {message}"))
        }
    }
}

/// Project service implementing the command and query driving ports.
#[derive(Clone)]
pub struct ProjectService<P, I> {
    projects: Arc<P>,
    issues: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<P, I> ProjectService<P, I> {
    /// Create a new service over the project and issue repositories.
    pub fn new(projects: Arc<P>, issues: Arc<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            projects,
            issues,
            clock,
        }
    }
}

impl<P, I> ProjectService<P, I>
where
    P: ProjectRepository,
{
    async fn load_managed(&self, actor: &Actor, slug: &str) -> Result<Project, Error> {
        let project = self
            .projects
            .find_by_slug(slug)
            .await
            .map_err(map_project_repo_error)?
            .ok_or_else(|| Error::not_found(format!("project {slug} not found")))?;
        if !can_manage(actor, project.owner(), project.other_users()) {
            return Err(Error::forbidden(format!(
                "{} may not manage project {slug}",
                actor.id()
            )));
        }
        Ok(project)
    }
}

#[async_trait]
impl<P, I> ProjectCommand for ProjectService<P, I>
where
    P: ProjectRepository,
    I: IssueRepository,
{
    async fn create_project(
        &self,
        actor: &Actor,
        name: &str,
        description: &str,
    ) -> Result<Project, Error> {
        let project = Project::create(name, description, actor.id().clone(), self.clock.utc())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.projects
            .insert(&project)
            .await
            .map_err(map_project_repo_error)?;
        Ok(project)
    }

    async fn update_settings<'a>(
        &self,
        actor: &Actor,
        slug: &str,
        url: Option<&'a str>,
        other_users: &str,
    ) -> Result<Project, Error> {
        let mut project = self.load_managed(actor, slug).await?;
        project
            .set_url(url)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        let other_users = other_users
            .split_whitespace()
            .map(UserId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        project.set_other_users(other_users);
        self.projects
            .update(&project)
            .await
            .map_err(map_project_repo_error)?;
        Ok(project)
    }

    async fn delete_project(&self, actor: &Actor, slug: &str) -> Result<(), Error> {
        let project = self.load_managed(actor, slug).await?;
        self.projects
            .delete(project.id())
            .await
            .map_err(map_project_repo_error)
    }
}

#[async_trait]
impl<P, I> ProjectQuery for ProjectService<P, I>
where
    P: ProjectRepository,
    I: IssueRepository,
{
    async fn list_projects(&self) -> Result<Vec<Project>, Error> {
        self.projects
            .list_recent(PROJECT_LIST_LIMIT)
            .await
            .map_err(map_project_repo_error)
    }

    async fn projects_for_user(&self, user: &UserId) -> Result<Vec<Project>, Error> {
        self.projects
            .list_for_user(user)
            .await
            .map_err(map_project_repo_error)
    }

    async fn project_overview(&self, slug: &str) -> Result<ProjectOverview, Error> {
        let project = self
            .projects
            .find_by_slug(slug)
            .await
            .map_err(map_project_repo_error)?
            .ok_or_else(|| Error::not_found(format!("project {slug} not found")))?;
        let (closed, open) = self
            .issues
            .list_for_project(project.id())
            .await
            .map_err(map_issue_repo_error)?
            .into_iter()
            .partition(|issue| issue.is_fixed());
        Ok(ProjectOverview {
            project,
            open,
            closed,
        })
    }
}

#[cfg(test)]
#[path = "project_service_tests.rs"]
mod tests;
