//! Row structs bridging the database schema and domain constructors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use url::Url;
use uuid::Uuid;

use crate::domain::identity::UserId;
use crate::domain::issue::{Issue, IssueRecord};
use crate::domain::project::{Project, ProjectRecord};

use super::schema::{counters, issues, projects};

/// Errors raised when a row cannot be rehydrated into a domain value.
#[derive(Debug, thiserror::Error)]
#[error("invalid stored row: {0}")]
pub struct RowDecodeError(String);

impl RowDecodeError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = projects, check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub html: String,
    pub url: Option<String>,
    pub owner: String,
    pub other_users: Vec<String>,
    pub hook_secret: String,
    pub created_date: DateTime<Utc>,
}

impl ProjectRow {
    /// Rebuild the domain project through its validated constructor.
    pub fn into_domain(self) -> Result<Project, RowDecodeError> {
        let owner = UserId::new(self.owner).map_err(|err| RowDecodeError::new(err.to_string()))?;
        let other_users = self
            .other_users
            .into_iter()
            .map(UserId::new)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| RowDecodeError::new(err.to_string()))?;
        let url = self
            .url
            .map(|raw| Url::parse(&raw))
            .transpose()
            .map_err(|err| RowDecodeError::new(err.to_string()))?;
        Project::from_record(ProjectRecord {
            id: self.id,
            name: self.name,
            slug: self.slug,
            description: self.description,
            html: self.html,
            url,
            owner,
            other_users,
            hook_secret: self.hook_secret,
            created_date: self.created_date,
        })
        .map_err(|err| RowDecodeError::new(err.to_string()))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = projects)]
pub struct NewProjectRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub html: String,
    pub url: Option<String>,
    pub owner: String,
    pub other_users: Vec<String>,
    pub hook_secret: String,
    pub created_date: DateTime<Utc>,
}

impl From<&Project> for NewProjectRow {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id(),
            name: project.name().to_owned(),
            slug: project.slug().to_owned(),
            description: project.description().to_owned(),
            html: project.html().to_owned(),
            url: project.url().map(|url| url.as_str().to_owned()),
            owner: project.owner().as_str().to_owned(),
            other_users: project
                .other_users()
                .iter()
                .map(|user| user.as_str().to_owned())
                .collect(),
            hook_secret: project.hook_secret().to_owned(),
            created_date: project.created_date(),
        }
    }
}

/// Mutable project fields; settings edits never touch name or slug.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = projects, treat_none_as_null = true)]
pub struct ProjectUpdate {
    pub description: String,
    pub html: String,
    pub url: Option<String>,
    pub other_users: Vec<String>,
}

impl From<&Project> for ProjectUpdate {
    fn from(project: &Project) -> Self {
        Self {
            description: project.description().to_owned(),
            html: project.html().to_owned(),
            url: project.url().map(|url| url.as_str().to_owned()),
            other_users: project
                .other_users()
                .iter()
                .map(|user| user.as_str().to_owned())
                .collect(),
        }
    }
}

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = issues, check_for_backend(diesel::pg::Pg))]
pub struct IssueRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
    pub html: String,
    pub email: Option<String>,
    pub internal_url: String,
    pub identifier: i64,
    pub fixed: bool,
    pub fixed_date: Option<DateTime<Utc>>,
    pub fixed_description: Option<String>,
    pub created_date: DateTime<Utc>,
}

impl IssueRow {
    /// Rebuild the domain issue through its validated constructor.
    pub fn into_domain(self) -> Result<Issue, RowDecodeError> {
        Issue::from_record(IssueRecord {
            id: self.id,
            project_id: self.project_id,
            name: self.name,
            description: self.description,
            html: self.html,
            email: self.email,
            internal_url: self.internal_url,
            identifier: self.identifier,
            fixed: self.fixed,
            fixed_date: self.fixed_date,
            fixed_description: self.fixed_description,
            created_date: self.created_date,
        })
        .map_err(|err| RowDecodeError::new(err.to_string()))
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = issues)]
pub struct NewIssueRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub description: String,
    pub html: String,
    pub email: Option<String>,
    pub internal_url: String,
    pub identifier: i64,
    pub fixed: bool,
    pub fixed_date: Option<DateTime<Utc>>,
    pub fixed_description: Option<String>,
    pub created_date: DateTime<Utc>,
}

impl From<&Issue> for NewIssueRow {
    fn from(issue: &Issue) -> Self {
        Self {
            id: issue.id(),
            project_id: issue.project_id(),
            name: issue.name().to_owned(),
            description: issue.description().to_owned(),
            html: issue.html().to_owned(),
            email: issue.email().map(str::to_owned),
            internal_url: issue.internal_url().to_owned(),
            identifier: issue.identifier(),
            fixed: issue.is_fixed(),
            fixed_date: issue.fixed_date(),
            fixed_description: issue.fixed_description().map(str::to_owned),
            created_date: issue.created_date(),
        }
    }
}

/// Mutable issue fields; identifier and internal URL are write-once.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = issues, treat_none_as_null = true)]
pub struct IssueUpdate {
    pub name: String,
    pub description: String,
    pub html: String,
    pub email: Option<String>,
    pub fixed: bool,
    pub fixed_date: Option<DateTime<Utc>>,
    pub fixed_description: Option<String>,
}

impl From<&Issue> for IssueUpdate {
    fn from(issue: &Issue) -> Self {
        Self {
            name: issue.name().to_owned(),
            description: issue.description().to_owned(),
            html: issue.html().to_owned(),
            email: issue.email().map(str::to_owned),
            fixed: issue.is_fixed(),
            fixed_date: issue.fixed_date(),
            fixed_description: issue.fixed_description().map(str::to_owned),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = counters)]
pub struct NewCounterRow {
    pub project_id: Uuid,
    pub count: i64,
}
