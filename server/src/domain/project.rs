//! Project aggregate.
//!
//! A project owns its issues, a lazily-created identifier counter, and the
//! shared secret its webhook endpoint is keyed on. The slug is derived from
//! the display name exactly once, on creation, and never recomputed even if
//! the name later changes.

use chrono::{DateTime, Utc};
use url::Url;
use uuid::Uuid;

use super::identity::UserId;
use super::{markup, slug};

/// Validation errors raised by project constructors and mutators.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProjectValidationError {
    /// Display name was missing or blank once trimmed.
    #[error("project name must not be empty")]
    EmptyName,
    /// Display name has no characters usable in a URL slug.
    #[error("project name does not produce a usable slug")]
    UnusableName,
    /// A stored slug failed validation when rehydrating from persistence.
    #[error("invalid project slug: {0}")]
    InvalidSlug(String),
    /// The external URL could not be parsed.
    #[error("invalid external url: {0}")]
    InvalidUrl(String),
}

/// All fields of a project, used to rehydrate from persistence.
#[derive(Debug, Clone)]
pub struct ProjectRecord {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub html: String,
    pub url: Option<Url>,
    pub owner: UserId,
    pub other_users: Vec<UserId>,
    pub hook_secret: String,
    pub created_date: DateTime<Utc>,
}

/// A tracked codebase owning zero or more issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id: Uuid,
    name: String,
    slug: String,
    description: String,
    html: String,
    url: Option<Url>,
    owner: UserId,
    other_users: Vec<UserId>,
    hook_secret: String,
    created_date: DateTime<Utc>,
}

impl Project {
    /// Create a new project, deriving the slug and hook secret once.
    pub fn create(
        name: &str,
        description: &str,
        owner: UserId,
        created_date: DateTime<Utc>,
    ) -> Result<Self, ProjectValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        let derived = slug::slugify(name);
        if derived.is_empty() {
            return Err(ProjectValidationError::UnusableName);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            slug: derived,
            description: description.to_owned(),
            html: markup::render(description),
            url: None,
            owner,
            other_users: Vec::new(),
            hook_secret: Uuid::new_v4().simple().to_string(),
            created_date,
        })
    }

    /// Rehydrate a project from a persisted record.
    pub fn from_record(record: ProjectRecord) -> Result<Self, ProjectValidationError> {
        if record.name.trim().is_empty() {
            return Err(ProjectValidationError::EmptyName);
        }
        if !slug::is_valid_slug(&record.slug) {
            return Err(ProjectValidationError::InvalidSlug(record.slug));
        }
        Ok(Self {
            id: record.id,
            name: record.name,
            slug: record.slug,
            description: record.description,
            html: record.html,
            url: record.url,
            owner: record.owner,
            other_users: record.other_users,
            hook_secret: record.hook_secret,
            created_date: record.created_date,
        })
    }

    /// Replace the description, re-rendering the stored markup.
    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_owned();
        self.html = markup::render(description);
    }

    /// Replace the optional external URL from raw form input.
    pub fn set_url(&mut self, raw: Option<&str>) -> Result<(), ProjectValidationError> {
        self.url = match raw.map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(
                Url::parse(value)
                    .map_err(|err| ProjectValidationError::InvalidUrl(err.to_string()))?,
            ),
        };
        Ok(())
    }

    /// Replace the additional-authorized-user list.
    pub fn set_other_users(&mut self, other_users: Vec<UserId>) {
        self.other_users = other_users;
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn slug(&self) -> &str {
        &self.slug
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
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    #[must_use]
    pub fn other_users(&self) -> &[UserId] {
        &self.other_users
    }

    /// Shared secret presented by the source-control host's webhook.
    #[must_use]
    pub fn hook_secret(&self) -> &str {
        &self.hook_secret
    }

    #[must_use]
    pub fn created_date(&self) -> DateTime<Utc> {
        self.created_date
    }

    /// Path of the project's detail page, relative to the site root.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/projects/{}/", self.slug)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;

    use super::{Project, ProjectValidationError};
    use crate::domain::identity::UserId;

    fn owner() -> UserId {
        UserId::new("owner@example.org").expect("valid identity")
    }

    #[test]
    fn create_derives_slug_from_name() {
        let project = Project::create("Demo Project", "", owner(), Utc::now()).expect("created");
        assert_eq!(project.slug(), "demo-project");
        assert_eq!(project.path(), "/projects/demo-project/");
        assert!(!project.hook_secret().is_empty());
    }

    #[rstest]
    #[case("", ProjectValidationError::EmptyName)]
    #[case("   ", ProjectValidationError::EmptyName)]
    #[case("&^%", ProjectValidationError::UnusableName)]
    fn create_rejects_unusable_names(#[case] name: &str, #[case] expected: ProjectValidationError) {
        let result = Project::create(name, "", owner(), Utc::now());
        assert_eq!(result.expect_err("rejected"), expected);
    }

    #[test]
    fn set_description_rerenders_markup() {
        let mut project = Project::create("Demo", "first", owner(), Utc::now()).expect("created");
        assert_eq!(project.html(), "<p>first</p>");
        project.set_description("<b>second</b>");
        assert_eq!(project.html(), "<p>&lt;b&gt;second&lt;/b&gt;</p>");
    }

    #[rstest]
    #[case(Some("https://example.org/code"), true)]
    #[case(Some("not a url"), false)]
    #[case(Some(""), true)]
    #[case(None, true)]
    fn set_url_validates_input(#[case] raw: Option<&str>, #[case] accepted: bool) {
        let mut project = Project::create("Demo", "", owner(), Utc::now()).expect("created");
        assert_eq!(project.set_url(raw).is_ok(), accepted);
    }
}
