//! Issue domain services implementing the issue driving ports.
//!
//! Creation is the only path that touches the counter allocator; the
//! identifier and internal URL it derives are never revisited. Edits drive
//! the Open/Fixed state machine and trigger the best-effort notification
//! side effect after a successful persist.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use crate::domain::Error;
use crate::domain::identity::{Actor, can_manage};
use crate::domain::issue::{self, Issue};
use crate::domain::ports::{
    CounterStore, CounterStoreError, FixedNotification, IssueCommand, IssueDetail, IssueEdit,
    IssueQuery, IssueRepository, Mailer, ProjectRepository,
};
use crate::domain::project::Project;
use crate::domain::project_service::{map_issue_repo_error, map_project_repo_error};

fn map_counter_error(error: CounterStoreError) -> Error {
    match error {
        CounterStoreError::Connection { message } => {
            Error::service_unavailable(format!("counter store unavailable: {message}"))
        }
        CounterStoreError::Query { message } => {
            Error::internal(format!("counter store error: {message}"))
        }
    }
}

/// Send the fixed notification for `issue` if one is due.
///
/// Best-effort: a transport failure is logged and swallowed, never rolling
/// back the state change that was already persisted.
pub(crate) async fn notify_fixed(mailer: &dyn Mailer, issue: &Issue) {
    if !issue.is_fixed() {
        return;
    }
    let Some(email) = issue.email() else {
        return;
    };
    let notification = FixedNotification {
        to: email.to_owned(),
        issue_name: issue.name().to_owned(),
        description: issue.description().to_owned(),
        fixed_description: issue.fixed_description().map(str::to_owned),
    };
    if let Err(error) = mailer.send_fixed_notification(&notification).await {
        warn!(
            error = %error,
            issue = %issue.internal_url(),
            "fixed notification delivery failed"
        );
    }
}

/// Issue service implementing the command and query driving ports.
#[derive(Clone)]
pub struct IssueService<P, I, C> {
    projects: Arc<P>,
    issues: Arc<I>,
    counters: Arc<C>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl<P, I, C> IssueService<P, I, C> {
    /// Create a new service over the repositories and collaborators.
    pub fn new(
        projects: Arc<P>,
        issues: Arc<I>,
        counters: Arc<C>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            issues,
            counters,
            mailer,
            clock,
        }
    }
}

impl<P, I, C> IssueService<P, I, C>
where
    P: ProjectRepository,
    I: IssueRepository,
{
    async fn load_project(&self, slug: &str) -> Result<Project, Error> {
        self.projects
            .find_by_slug(slug)
            .await
            .map_err(map_project_repo_error)?
            .ok_or_else(|| Error::not_found(format!("project {slug} not found")))
    }

    async fn load_issue(&self, project_slug: &str, issue_slug: &str) -> Result<Issue, Error> {
        let internal_url = format!("/{project_slug}/{issue_slug}/");
        self.issues
            .find_by_internal_url(&internal_url)
            .await
            .map_err(map_issue_repo_error)?
            .ok_or_else(|| Error::not_found(format!("issue {internal_url} not found")))
    }
}

#[async_trait]
impl<P, I, C> IssueCommand for IssueService<P, I, C>
where
    P: ProjectRepository,
    I: IssueRepository,
    C: CounterStore,
{
    async fn create_issue<'a>(
        &self,
        project_slug: &str,
        name: &str,
        description: &str,
        email: Option<&'a str>,
    ) -> Result<Issue, Error> {
        let project = self.load_project(project_slug).await?;
        let email =
            issue::parse_email(email).map_err(|err| Error::invalid_request(err.to_string()))?;
        let identifier = self
            .counters
            .allocate(project.id())
            .await
            .map_err(map_counter_error)?;
        let issue = Issue::create(
            &project,
            identifier,
            name,
            description,
            email,
            self.clock.utc(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))?;
        self.issues
            .insert(&issue)
            .await
            .map_err(map_issue_repo_error)?;
        Ok(issue)
    }

    async fn edit_issue(
        &self,
        actor: &Actor,
        project_slug: &str,
        issue_slug: &str,
        edit: IssueEdit,
    ) -> Result<Issue, Error> {
        let project = self.load_project(project_slug).await?;
        if !can_manage(actor, project.owner(), project.other_users()) {
            return Err(Error::forbidden(format!(
                "{} may not edit issues of project {project_slug}",
                actor.id()
            )));
        }
        let mut issue = self.load_issue(project_slug, issue_slug).await?;

        issue
            .rename(&edit.name)
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        issue.set_description(&edit.description);
        let email = issue::parse_email(edit.email.as_deref())
            .map_err(|err| Error::invalid_request(err.to_string()))?;
        issue.set_email(email);
        if edit.fixed {
            issue.mark_fixed(self.clock.utc());
            issue.set_fixed_description(edit.fixed_description);
        } else {
            issue.reopen();
        }

        self.issues
            .update(&issue)
            .await
            .map_err(map_issue_repo_error)?;
        notify_fixed(self.mailer.as_ref(), &issue).await;
        Ok(issue)
    }

    async fn delete_issue(
        &self,
        actor: &Actor,
        project_slug: &str,
        issue_slug: &str,
    ) -> Result<(), Error> {
        let project = self.load_project(project_slug).await?;
        if !can_manage(actor, project.owner(), project.other_users()) {
            return Err(Error::forbidden(format!(
                "{} may not delete issues of project {project_slug}",
                actor.id()
            )));
        }
        let issue = self.load_issue(project_slug, issue_slug).await?;
        self.issues
            .delete(issue.id())
            .await
            .map_err(map_issue_repo_error)
    }
}

#[async_trait]
impl<P, I, C> IssueQuery for IssueService<P, I, C>
where
    P: ProjectRepository,
    I: IssueRepository,
    C: CounterStore,
{
    async fn issue_detail(
        &self,
        project_slug: &str,
        issue_slug: &str,
    ) -> Result<IssueDetail, Error> {
        let project = self.load_project(project_slug).await?;
        let issue = self.load_issue(project_slug, issue_slug).await?;
        Ok(IssueDetail { project, issue })
    }
}

#[cfg(test)]
#[path = "issue_service_tests.rs"]
mod tests;
