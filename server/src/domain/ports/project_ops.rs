//! Driving ports for project use cases.

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::Error;
use crate::domain::identity::{Actor, UserId};
use crate::domain::issue::Issue;
use crate::domain::project::Project;

/// A project together with its issues split by state, newest first.
#[derive(Debug, Clone)]
pub struct ProjectOverview {
    pub project: Project,
    pub open: Vec<Issue>,
    pub closed: Vec<Issue>,
}

impl ProjectOverview {
    /// All issues, open before closed, preserving per-list order.
    #[must_use]
    pub fn all_issues(&self) -> impl Iterator<Item = &Issue> {
        self.open.iter().chain(self.closed.iter())
    }
}

/// Port for project mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectCommand: Send + Sync {
    /// Create a project owned by `actor`. The slug and hook secret are
    /// derived here, once.
    async fn create_project(
        &self,
        actor: &Actor,
        name: &str,
        description: &str,
    ) -> Result<Project, Error>;

    /// Owner-only update of the external URL and additional-user list
    /// (space-delimited identities).
    async fn update_settings<'a>(
        &self,
        actor: &Actor,
        slug: &str,
        url: Option<&'a str>,
        other_users: &str,
    ) -> Result<Project, Error>;

    /// Owner-only deletion.
    async fn delete_project(&self, actor: &Actor, slug: &str) -> Result<(), Error>;
}

/// Port for project reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectQuery: Send + Sync {
    /// The most recently created projects across all users.
    async fn list_projects(&self) -> Result<Vec<Project>, Error>;

    /// Projects owned by `user`, newest first.
    async fn projects_for_user(&self, user: &UserId) -> Result<Vec<Project>, Error>;

    /// A project and its issues, looked up by slug.
    async fn project_overview(&self, slug: &str) -> Result<ProjectOverview, Error>;
}

/// Fixture implementation for tests that do not exercise project commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProjectCommand;

#[async_trait]
impl ProjectCommand for FixtureProjectCommand {
    async fn create_project(
        &self,
        actor: &Actor,
        name: &str,
        description: &str,
    ) -> Result<Project, Error> {
        Project::create(name, description, actor.id().clone(), Utc::now())
            .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn update_settings<'a>(
        &self,
        _actor: &Actor,
        slug: &str,
        _url: Option<&'a str>,
        _other_users: &str,
    ) -> Result<Project, Error> {
        Err(Error::not_found(format!("project {slug} not found")))
    }

    async fn delete_project(&self, _actor: &Actor, slug: &str) -> Result<(), Error> {
        Err(Error::not_found(format!("project {slug} not found")))
    }
}

/// Fixture implementation for tests that do not exercise project reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProjectQuery;

#[async_trait]
impl ProjectQuery for FixtureProjectQuery {
    async fn list_projects(&self) -> Result<Vec<Project>, Error> {
        Ok(Vec::new())
    }

    async fn projects_for_user(&self, _user: &UserId) -> Result<Vec<Project>, Error> {
        Ok(Vec::new())
    }

    async fn project_overview(&self, slug: &str) -> Result<ProjectOverview, Error> {
        Err(Error::not_found(format!("project {slug} not found")))
    }
}
