//! Driving ports for issue use cases.

use async_trait::async_trait;

use crate::domain::Error;
use crate::domain::identity::Actor;
use crate::domain::issue::Issue;
use crate::domain::project::Project;

/// An issue together with its owning project.
#[derive(Debug, Clone)]
pub struct IssueDetail {
    pub project: Project,
    pub issue: Issue,
}

/// Full set of fields an owner may edit on an issue.
#[derive(Debug, Clone, Default)]
pub struct IssueEdit {
    pub name: String,
    pub description: String,
    pub email: Option<String>,
    pub fixed: bool,
    pub fixed_description: Option<String>,
}

/// Port for issue mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueCommand: Send + Sync {
    /// File a new issue against the project. No authentication required.
    async fn create_issue<'a>(
        &self,
        project_slug: &str,
        name: &str,
        description: &str,
        email: Option<&'a str>,
    ) -> Result<Issue, Error>;

    /// Owner-only edit, including the fixed flag driving the state machine.
    async fn edit_issue(
        &self,
        actor: &Actor,
        project_slug: &str,
        issue_slug: &str,
        edit: IssueEdit,
    ) -> Result<Issue, Error>;

    /// Owner-only deletion.
    async fn delete_issue(
        &self,
        actor: &Actor,
        project_slug: &str,
        issue_slug: &str,
    ) -> Result<(), Error>;
}

/// Port for issue reads.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueQuery: Send + Sync {
    /// An issue and its project, looked up by the two slugs in its path.
    async fn issue_detail(
        &self,
        project_slug: &str,
        issue_slug: &str,
    ) -> Result<IssueDetail, Error>;
}

/// Fixture implementation for tests that do not exercise issue commands.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIssueCommand;

#[async_trait]
impl IssueCommand for FixtureIssueCommand {
    async fn create_issue<'a>(
        &self,
        project_slug: &str,
        _name: &str,
        _description: &str,
        _email: Option<&'a str>,
    ) -> Result<Issue, Error> {
        Err(Error::not_found(format!("project {project_slug} not found")))
    }

    async fn edit_issue(
        &self,
        _actor: &Actor,
        project_slug: &str,
        issue_slug: &str,
        _edit: IssueEdit,
    ) -> Result<Issue, Error> {
        Err(Error::not_found(format!(
            "issue /{project_slug}/{issue_slug}/ not found"
        )))
    }

    async fn delete_issue(
        &self,
        _actor: &Actor,
        project_slug: &str,
        issue_slug: &str,
    ) -> Result<(), Error> {
        Err(Error::not_found(format!(
            "issue /{project_slug}/{issue_slug}/ not found"
        )))
    }
}

/// Fixture implementation for tests that do not exercise issue reads.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureIssueQuery;

#[async_trait]
impl IssueQuery for FixtureIssueQuery {
    async fn issue_detail(
        &self,
        project_slug: &str,
        issue_slug: &str,
    ) -> Result<IssueDetail, Error> {
        Err(Error::not_found(format!(
            "issue /{project_slug}/{issue_slug}/ not found"
        )))
    }
}
