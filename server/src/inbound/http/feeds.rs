//! Machine-readable feeds: per-project JSON, per-issue JSON, and RSS 2.0.
//!
//! The JSON endpoints keep the `application/javascript; charset=utf8`
//! content type the original application served. Feeds are cacheable for
//! anonymous callers like every other read view.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{ISSUE_VIEW_TTL, ProjectOverview, VIEW_TTL};
use crate::domain::{Error, Issue, Project, markup};

use super::cached::{FEED_JSON_CONTENT_TYPE, RSS_CONTENT_TYPE, cached_page};
use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;

/// JSON envelope for a single issue.
#[derive(Debug, Serialize, ToSchema)]
pub struct IssueJson {
    pub date: DateTime<Utc>,
    pub name: String,
    pub project: String,
    pub project_url: String,
    pub internal_url: String,
    pub created_date: DateTime<Utc>,
    /// Rendered markup, not the raw source text.
    pub description: String,
    /// `"Open"` or `"Fixed"`.
    #[schema(example = "Open")]
    pub status: String,
    /// Commit-message tag, e.g. `#snag42`.
    #[schema(example = "#snag42")]
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_description: Option<String>,
}

impl IssueJson {
    fn build(project: &Project, issue: &Issue, system_url: &str) -> Self {
        Self {
            date: issue.created_date(),
            name: issue.name().to_owned(),
            project: project.name().to_owned(),
            project_url: format!("{system_url}{}", project.path()),
            internal_url: issue.path(),
            created_date: issue.created_date(),
            description: issue.html().to_owned(),
            status: issue.status().to_owned(),
            identifier: issue.tag(),
            fixed_description: issue.fixed_description().map(str::to_owned),
        }
    }
}

/// JSON envelope for a project and its issues.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProjectJson {
    pub date: DateTime<Utc>,
    pub name: String,
    pub internal_url: String,
    pub created_date: DateTime<Utc>,
    /// Issue details keyed by issue name.
    pub issues: BTreeMap<String, IssueJson>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
}

impl ProjectJson {
    fn build(overview: &ProjectOverview, system_url: &str) -> Self {
        let project = &overview.project;
        let issues = overview
            .all_issues()
            .map(|issue| {
                (
                    issue.name().to_owned(),
                    IssueJson::build(project, issue, system_url),
                )
            })
            .collect();
        Self {
            date: project.created_date(),
            name: project.name().to_owned(),
            internal_url: project.path(),
            created_date: project.created_date(),
            issues,
            external_url: project.url().map(|url| url.as_str().to_owned()),
        }
    }
}

fn encode<T: Serialize>(value: &T) -> Result<String, Error> {
    serde_json::to_string(value)
        .map_err(|err| Error::internal(format!("feed serialisation failed: {err}")))
}

/// Project summary feed.
#[utoipa::path(
    get,
    path = "/projects/{slug}.json",
    params(("slug" = String, Path, description = "Project slug")),
    responses(
        (status = 200, description = "Project and issue summary", body = ProjectJson),
        (status = 404, description = "Unknown project", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "projectJson"
)]
#[get("/projects/{slug}.json")]
pub async fn project_json(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let signed_in = session.user_id()?.is_some();
    let query = state.projects_query.clone();
    let system_url = state.system_url.clone();
    let key = format!("projects/{slug}/json");
    cached_page(
        state.cache.as_ref(),
        signed_in,
        &key,
        VIEW_TTL,
        FEED_JSON_CONTENT_TYPE,
        || async move {
            let overview = query.project_overview(&slug).await?;
            encode(&ProjectJson::build(&overview, &system_url))
        },
    )
    .await
}

/// Single-issue feed.
#[utoipa::path(
    get,
    path = "/projects/{slug}/{issue_slug}.json",
    params(
        ("slug" = String, Path, description = "Project slug"),
        ("issue_slug" = String, Path, description = "Issue slug")
    ),
    responses(
        (status = 200, description = "Issue detail", body = IssueJson),
        (status = 404, description = "Unknown project or issue", body = Error)
    ),
    tags = ["feeds"],
    operation_id = "issueJson"
)]
#[get("/projects/{slug}/{issue_slug}.json")]
pub async fn issue_json(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (slug, issue_slug) = path.into_inner();
    let signed_in = session.user_id()?.is_some();
    let query = state.issues_query.clone();
    let system_url = state.system_url.clone();
    let key = format!("projects/{slug}/issues/{issue_slug}/json");
    cached_page(
        state.cache.as_ref(),
        signed_in,
        &key,
        ISSUE_VIEW_TTL,
        FEED_JSON_CONTENT_TYPE,
        || async move {
            let detail = query.issue_detail(&slug, &issue_slug).await?;
            encode(&IssueJson::build(&detail.project, &detail.issue, &system_url))
        },
    )
    .await
}

/// `open`/`closed` filter flags; mutually exclusive, neither means all.
#[derive(Debug, Default, Deserialize)]
pub struct FeedFilter {
    pub open: Option<String>,
    pub closed: Option<String>,
}

enum FilterKind {
    All,
    Open,
    Closed,
}

impl FeedFilter {
    fn kind(&self) -> FilterKind {
        if self.open.is_some() {
            FilterKind::Open
        } else if self.closed.is_some() {
            FilterKind::Closed
        } else {
            FilterKind::All
        }
    }
}

fn rss_item(issue: &Issue, system_url: &str) -> String {
    let link = format!("{system_url}{}", issue.path());
    format!(
        "<item>\n<title>{} {}</title>\n<link>{}</link>\n<guid>{}</guid>\n\
         <description>{}</description>\n<pubDate>{}</pubDate>\n</item>",
        markup::escape(&issue.tag()),
        markup::escape(issue.name()),
        markup::escape(&link),
        markup::escape(&link),
        markup::escape(issue.html()),
        issue.created_date().to_rfc2822(),
    )
}

fn rss_document(overview: &ProjectOverview, kind: &FilterKind, system_url: &str) -> String {
    let project = &overview.project;
    let issues: Vec<&Issue> = match kind {
        FilterKind::All => overview.all_issues().collect(),
        FilterKind::Open => overview.open.iter().collect(),
        FilterKind::Closed => overview.closed.iter().collect(),
    };
    let items = issues
        .iter()
        .map(|issue| rss_item(issue, system_url))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
         <rss version=\"2.0\">\n<channel>\n\
         <title>{}</title>\n<link>{}{}</link>\n\
         <description>Issues for {}</description>\n\
         {}\n</channel>\n</rss>\n",
        markup::escape(project.name()),
        markup::escape(system_url),
        project.path(),
        markup::escape(project.name()),
        items,
    )
}

/// RSS 2.0 feed of a project's issues.
#[get("/projects/{slug}.rss")]
pub async fn project_rss(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    filter: web::Query<FeedFilter>,
) -> ApiResult<HttpResponse> {
    let slug = path.into_inner();
    let signed_in = session.user_id()?.is_some();
    let query = state.projects_query.clone();
    let system_url = state.system_url.clone();
    let kind = filter.kind();
    let key = match kind {
        FilterKind::All => format!("projects/{slug}/rss"),
        FilterKind::Open => format!("projects/{slug}/rss/open"),
        FilterKind::Closed => format!("projects/{slug}/rss/closed"),
    };
    cached_page(
        state.cache.as_ref(),
        signed_in,
        &key,
        VIEW_TTL,
        RSS_CONTENT_TYPE,
        || async move {
            let overview = query.project_overview(&slug).await?;
            Ok(rss_document(&overview, &kind, &system_url))
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::UserId;

    fn overview() -> ProjectOverview {
        let project = Project::create(
            "Demo",
            "",
            UserId::new("owner@example.org").expect("valid identity"),
            Utc::now(),
        )
        .expect("valid project");
        let open = Issue::create(&project, 1, "Crash", "boom", None, Utc::now())
            .expect("valid issue");
        let mut fixed = Issue::create(&project, 2, "Typo", "", None, Utc::now())
            .expect("valid issue");
        fixed.mark_fixed(Utc::now());
        ProjectOverview {
            project,
            open: vec![open],
            closed: vec![fixed],
        }
    }

    #[test]
    fn project_json_maps_issues_by_name() {
        let json = ProjectJson::build(&overview(), "https://snagtrack.example");
        assert_eq!(json.internal_url, "/projects/demo/");
        let crash = json.issues.get("Crash").expect("issue keyed by name");
        assert_eq!(crash.identifier, "#snag1");
        assert_eq!(crash.status, "Open");
        assert_eq!(crash.project_url, "https://snagtrack.example/projects/demo/");
    }

    #[test]
    fn issue_status_reflects_the_state_machine() {
        let overview = overview();
        let json = ProjectJson::build(&overview, "https://snagtrack.example");
        assert_eq!(json.issues.get("Typo").expect("fixed issue").status, "Fixed");
    }

    #[test]
    fn rss_filters_split_open_and_closed() {
        let overview = overview();
        let all = rss_document(&overview, &FilterKind::All, "https://snagtrack.example");
        let open = rss_document(&overview, &FilterKind::Open, "https://snagtrack.example");
        let closed = rss_document(&overview, &FilterKind::Closed, "https://snagtrack.example");

        assert!(all.contains("#snag1") && all.contains("#snag2"));
        assert!(open.contains("#snag1") && !open.contains("#snag2"));
        assert!(closed.contains("#snag2") && !closed.contains("#snag1"));
    }

    #[test]
    fn rss_is_a_versioned_document() {
        let rss = rss_document(&overview(), &FilterKind::All, "https://snagtrack.example");
        assert!(rss.starts_with("<?xml"));
        assert!(rss.contains("<rss version=\"2.0\">"));
    }
}
