//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::collections::HashSet;
use std::sync::Arc;

use crate::domain::ports::{
    IssueCommand, IssueQuery, PageCache, ProjectCommand, ProjectQuery, WebhookIngest,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub projects: Arc<dyn ProjectCommand>,
    pub projects_query: Arc<dyn ProjectQuery>,
    pub issues: Arc<dyn IssueCommand>,
    pub issues_query: Arc<dyn IssueQuery>,
    pub webhook: Arc<dyn WebhookIngest>,
    pub cache: Arc<dyn PageCache>,
    /// Identities granted the admin capability, from configuration.
    pub admins: Arc<HashSet<String>>,
    /// Canonical external base URL used in feeds and JSON links.
    pub system_url: Arc<str>,
}

impl HttpState {
    /// State wired entirely to fixture ports, for handler tests.
    #[cfg(any(test, feature = "test-support"))]
    #[must_use]
    pub fn fixture() -> Self {
        use crate::domain::ports::{
            FixtureIssueCommand, FixtureIssueQuery, FixtureProjectCommand, FixtureProjectQuery,
            FixtureWebhookIngest,
        };
        use crate::outbound::cache::NoopPageCache;

        Self {
            projects: Arc::new(FixtureProjectCommand),
            projects_query: Arc::new(FixtureProjectQuery),
            issues: Arc::new(FixtureIssueCommand),
            issues_query: Arc::new(FixtureIssueQuery),
            webhook: Arc::new(FixtureWebhookIngest),
            cache: Arc::new(NoopPageCache::new()),
            admins: Arc::new(HashSet::new()),
            system_url: Arc::from("http://localhost:8080"),
        }
    }
}
