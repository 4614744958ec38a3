//! Issue aggregate and its Open/Fixed state machine.
//!
//! `identifier` and `internal_url` are assigned exactly once, when the issue
//! is first created, and are never recomputed; later renames change only the
//! display name. `fixed_date` is non-null exactly while the issue is fixed.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::project::Project;
use super::{markup, reference, slug};

/// Validation errors raised by issue constructors and mutators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IssueValidationError {
    /// Display name was missing or blank once trimmed.
    #[error("issue name must not be empty")]
    EmptyName,
    /// Display name has no characters usable in a URL slug.
    #[error("issue name does not produce a usable slug")]
    UnusableName,
    /// The notification email address is malformed.
    #[error("invalid notification email: {0}")]
    InvalidEmail(String),
    /// Identifier must be a positive integer.
    #[error("issue identifier must be positive, got {0}")]
    InvalidIdentifier(i64),
    /// `fixed` and `fixed_date` disagree when rehydrating from persistence.
    #[error("fixed flag and fixed date disagree")]
    InconsistentFixedState,
}

/// Parse an optional notification email from raw form input.
///
/// Blank input means "no notification". The address only has to look
/// deliverable; the mail adapter performs transport-level validation.
pub fn parse_email(raw: Option<&str>) -> Result<Option<String>, IssueValidationError> {
    let Some(value) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return Ok(None);
    };
    let deliverable = !value.contains(char::is_whitespace)
        && value
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if deliverable {
        Ok(Some(value.to_owned()))
    } else {
        Err(IssueValidationError::InvalidEmail(value.to_owned()))
    }
}

/// All fields of an issue, used to rehydrate from persistence.
#[derive(Debug, Clone)]
pub struct IssueRecord {
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

/// A single reported defect with lifecycle Open/Fixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    id: Uuid,
    project_id: Uuid,
    name: String,
    description: String,
    html: String,
    email: Option<String>,
    internal_url: String,
    identifier: i64,
    fixed: bool,
    fixed_date: Option<DateTime<Utc>>,
    fixed_description: Option<String>,
    created_date: DateTime<Utc>,
}

impl Issue {
    /// Create a new open issue under `project`.
    ///
    /// `identifier` comes from the project's counter allocator and, like the
    /// derived `internal_url`, is fixed for the lifetime of the issue.
    pub fn create(
        project: &Project,
        identifier: i64,
        name: &str,
        description: &str,
        email: Option<String>,
        created_date: DateTime<Utc>,
    ) -> Result<Self, IssueValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IssueValidationError::EmptyName);
        }
        if identifier < 1 {
            return Err(IssueValidationError::InvalidIdentifier(identifier));
        }
        let issue_slug = slug::slugify(name);
        if issue_slug.is_empty() {
            return Err(IssueValidationError::UnusableName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            project_id: project.id(),
            name: name.to_owned(),
            description: description.to_owned(),
            html: markup::render(description),
            email,
            internal_url: format!("/{}/{}/", project.slug(), issue_slug),
            identifier,
            fixed: false,
            fixed_date: None,
            fixed_description: None,
            created_date,
        })
    }

    /// Rehydrate an issue from a persisted record.
    pub fn from_record(record: IssueRecord) -> Result<Self, IssueValidationError> {
        if record.name.trim().is_empty() {
            return Err(IssueValidationError::EmptyName);
        }
        if record.identifier < 1 {
            return Err(IssueValidationError::InvalidIdentifier(record.identifier));
        }
        if record.fixed != record.fixed_date.is_some() {
            return Err(IssueValidationError::InconsistentFixedState);
        }
        Ok(Self {
            id: record.id,
            project_id: record.project_id,
            name: record.name,
            description: record.description,
            html: record.html,
            email: record.email,
            internal_url: record.internal_url,
            identifier: record.identifier,
            fixed: record.fixed,
            fixed_date: record.fixed_date,
            fixed_description: record.fixed_description,
            created_date: record.created_date,
        })
    }

    /// Rename the issue. The internal URL keeps its originally derived form.
    pub fn rename(&mut self, name: &str) -> Result<(), IssueValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IssueValidationError::EmptyName);
        }
        self.name = name.to_owned();
        Ok(())
    }

    /// Replace the description, re-rendering the stored markup.
    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
        self.html = markup::render(description);
    }

    /// Replace the optional notification email.
    pub fn set_email(&mut self, email: Option<String>) {
        self.email = email;
    }

    /// Transition into `Fixed`, stamping the transition time.
    ///
    /// Re-marking an already fixed issue re-stamps the date; the caller
    /// decides whether to re-notify (it does, preserving observed
    /// behaviour).
    pub fn mark_fixed(&mut self, now: DateTime<Utc>) {
        self.fixed = true;
        self.fixed_date = Some(now);
    }

    /// Attach or clear the fix summary. Only meaningful while fixed.
    pub fn set_fixed_description(&mut self, fixed_description: Option<String>) {
        self.fixed_description = if self.fixed { fixed_description } else { None };
    }

    /// Transition back to `Open`, clearing the date and fix summary.
    pub fn reopen(&mut self) {
        self.fixed = false;
        self.fixed_date = None;
        self.fixed_description = None;
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn project_id(&self) -> Uuid {
        self.project_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Rendered markup for the description, recomputed on every write.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Immutable path combining the project slug and the issue's first name.
    #[must_use]
    pub fn internal_url(&self) -> &str {
        &self.internal_url
    }

    /// Per-project monotonic integer used in commit-message tags.
    #[must_use]
    pub fn identifier(&self) -> i64 {
        self.identifier
    }

    #[must_use]
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    #[must_use]
    pub fn fixed_date(&self) -> Option<DateTime<Utc>> {
        self.fixed_date
    }

    #[must_use]
    pub fn fixed_description(&self) -> Option<&str> {
        self.fixed_description.as_deref()
    }

    #[must_use]
    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Display status, `"Open"` or `"Fixed"`.
    #[must_use]
    pub fn status(&self) -> &'static str {
        if self.fixed { "Fixed" } else { "Open" }
    }

    /// The issue's commit-message tag, e.g. `#snag42`.
    #[must_use]
    pub fn tag(&self) -> String {
        reference::tag(self.identifier)
    }

    /// Path of the issue's detail page, relative to the site root.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/projects{}", self.internal_url)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::{Issue, IssueValidationError, parse_email};
    use crate::domain::identity::UserId;
    use crate::domain::project::Project;

    fn project() -> Project {
        let owner = UserId::new("owner@example.org").expect("valid identity");
        Project::create("Demo", "", owner, Utc::now()).expect("project created")
    }

    fn issue() -> Issue {
        Issue::create(&project(), 1, "Crash", "it crashes", None, Utc::now()).expect("created")
    }

    #[test]
    fn create_derives_internal_url_and_starts_open() {
        let issue = Issue::create(&project(), 1, "Crash on save", "", None, Utc::now())
            .expect("issue created");
        assert_eq!(issue.internal_url(), "/demo/crash-on-save/");
        assert_eq!(issue.path(), "/projects/demo/crash-on-save/");
        assert_eq!(issue.identifier(), 1);
        assert_eq!(issue.status(), "Open");
        assert!(issue.fixed_date().is_none());
    }

    #[test]
    fn rename_keeps_the_derived_internal_url() {
        let mut issue = issue();
        issue.rename("Totally Different").expect("renamed");
        assert_eq!(issue.name(), "Totally Different");
        assert_eq!(issue.internal_url(), "/demo/crash/");
        assert_eq!(issue.identifier(), 1);
    }

    #[test]
    fn mark_fixed_stamps_and_reopen_clears() {
        let mut issue = issue();
        let now = Utc::now();

        issue.mark_fixed(now);
        issue.set_fixed_description(Some("patched".to_owned()));
        assert!(issue.is_fixed());
        assert_eq!(issue.fixed_date(), Some(now));
        assert_eq!(issue.fixed_description(), Some("patched"));
        assert_eq!(issue.status(), "Fixed");

        issue.reopen();
        assert!(!issue.is_fixed());
        assert!(issue.fixed_date().is_none());
        assert!(issue.fixed_description().is_none());
        assert_eq!(issue.status(), "Open");
    }

    #[test]
    fn remarking_fixed_restamps_the_date() {
        let mut issue = issue();
        let first = Utc::now();
        issue.mark_fixed(first);
        let second = first + chrono::Duration::seconds(90);
        issue.mark_fixed(second);
        assert_eq!(issue.fixed_date(), Some(second));
    }

    #[test]
    fn fixed_description_is_dropped_while_open() {
        let mut issue = issue();
        issue.set_fixed_description(Some("ignored".to_owned()));
        assert!(issue.fixed_description().is_none());
    }

    #[rstest]
    #[case(None, Ok(None))]
    #[case(Some(""), Ok(None))]
    #[case(Some("  "), Ok(None))]
    #[case(Some("dev@example.org"), Ok(Some("dev@example.org".to_owned())))]
    #[case(
        Some("not-an-address"),
        Err(IssueValidationError::InvalidEmail("not-an-address".to_owned()))
    )]
    #[case(
        Some("two words@example.org"),
        Err(IssueValidationError::InvalidEmail("two words@example.org".to_owned()))
    )]
    fn parses_notification_emails(
        #[case] raw: Option<&str>,
        #[case] expected: Result<Option<String>, IssueValidationError>,
    ) {
        assert_eq!(parse_email(raw), expected);
    }

    #[test]
    fn tag_uses_the_reference_marker() {
        assert_eq!(issue().tag(), "#snag1");
    }
}
