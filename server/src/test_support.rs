//! In-memory adapters and wiring helpers for tests.
//!
//! Exposed behind the `test-support` feature so the integration suite can
//! drive the real handler stack without a database, Redis, or SMTP.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;
use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::identity::UserId;
use crate::domain::issue::Issue;
use crate::domain::ports::{
    CacheKey, CounterStore, CounterStoreError, FixedNotification, IssueRepository,
    IssueRepositoryError, Mailer, MailerError, PageCache, PageCacheError, ProjectRepository,
    ProjectRepositoryError,
};
use crate::domain::project::Project;
use crate::domain::{IssueService, ProjectService, WebhookIngestService};
use crate::inbound::http::HttpState;

/// Cookie-session middleware with a fixed key for test apps.
#[must_use]
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[0; 64]))
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Functional project repository over a shared vector.
#[derive(Debug, Default)]
pub struct InMemoryProjectRepository {
    rows: RwLock<Vec<Project>>,
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut rows = self.rows.write().expect("poisoned lock");
        if rows.iter().any(|existing| existing.name() == project.name()) {
            return Err(ProjectRepositoryError::duplicate_name());
        }
        rows.push(project.clone());
        Ok(())
    }

    async fn update(&self, project: &Project) -> Result<(), ProjectRepositoryError> {
        let mut rows = self.rows.write().expect("poisoned lock");
        if let Some(existing) = rows.iter_mut().find(|existing| existing.id() == project.id()) {
            *existing = project.clone();
        }
        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>, ProjectRepositoryError> {
        let rows = self.rows.read().expect("poisoned lock");
        Ok(rows.iter().find(|project| project.slug() == slug).cloned())
    }

    async fn list_recent(&self, limit: i64) -> Result<Vec<Project>, ProjectRepositoryError> {
        let rows = self.rows.read().expect("poisoned lock");
        let mut projects: Vec<Project> = rows.clone();
        projects.sort_by_key(|project| std::cmp::Reverse(project.created_date()));
        projects.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(projects)
    }

    async fn list_for_user(
        &self,
        user: &UserId,
    ) -> Result<Vec<Project>, ProjectRepositoryError> {
        let rows = self.rows.read().expect("poisoned lock");
        let mut projects: Vec<Project> = rows
            .iter()
            .filter(|project| project.owner() == user)
            .cloned()
            .collect();
        projects.sort_by_key(|project| std::cmp::Reverse(project.created_date()));
        Ok(projects)
    }

    async fn delete(&self, project_id: Uuid) -> Result<(), ProjectRepositoryError> {
        let mut rows = self.rows.write().expect("poisoned lock");
        rows.retain(|project| project.id() != project_id);
        Ok(())
    }
}

/// Functional issue repository over a shared vector.
#[derive(Debug, Default)]
pub struct InMemoryIssueRepository {
    rows: RwLock<Vec<Issue>>,
}

#[async_trait]
impl IssueRepository for InMemoryIssueRepository {
    async fn insert(&self, issue: &Issue) -> Result<(), IssueRepositoryError> {
        self.rows
            .write()
            .expect("poisoned lock")
            .push(issue.clone());
        Ok(())
    }

    async fn update(&self, issue: &Issue) -> Result<(), IssueRepositoryError> {
        let mut rows = self.rows.write().expect("poisoned lock");
        if let Some(existing) = rows.iter_mut().find(|existing| existing.id() == issue.id()) {
            *existing = issue.clone();
        }
        Ok(())
    }

    async fn find_by_internal_url(
        &self,
        internal_url: &str,
    ) -> Result<Option<Issue>, IssueRepositoryError> {
        let rows = self.rows.read().expect("poisoned lock");
        Ok(rows
            .iter()
            .find(|issue| issue.internal_url() == internal_url)
            .cloned())
    }

    async fn find_by_identifier(
        &self,
        project_id: Uuid,
        identifier: i64,
    ) -> Result<Option<Issue>, IssueRepositoryError> {
        let rows = self.rows.read().expect("poisoned lock");
        Ok(rows
            .iter()
            .find(|issue| issue.project_id() == project_id && issue.identifier() == identifier)
            .cloned())
    }

    async fn list_for_project(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<Issue>, IssueRepositoryError> {
        let rows = self.rows.read().expect("poisoned lock");
        let mut issues: Vec<Issue> = rows
            .iter()
            .filter(|issue| issue.project_id() == project_id)
            .cloned()
            .collect();
        issues.sort_by_key(|issue| std::cmp::Reverse(issue.created_date()));
        Ok(issues)
    }

    async fn delete(&self, issue_id: Uuid) -> Result<(), IssueRepositoryError> {
        let mut rows = self.rows.write().expect("poisoned lock");
        rows.retain(|issue| issue.id() != issue_id);
        Ok(())
    }
}

/// Mutex-serialised counter store; allocation is atomic by construction.
#[derive(Debug, Default)]
pub struct InMemoryCounterStore {
    counts: Mutex<HashMap<Uuid, i64>>,
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn allocate(&self, project_id: Uuid) -> Result<i64, CounterStoreError> {
        let mut counts = self.counts.lock().expect("poisoned lock");
        let count = counts.entry(project_id).or_insert(0);
        *count += 1;
        Ok(*count)
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    body: String,
    expires_at: Instant,
}

/// TTL-respecting in-memory page cache.
#[derive(Debug, Default)]
pub struct InMemoryPageCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl InMemoryPageCache {
    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .expect("poisoned lock")
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    /// Whether the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a live entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        let now = Instant::now();
        self.entries
            .lock()
            .expect("poisoned lock")
            .get(key)
            .is_some_and(|entry| entry.expires_at > now)
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, PageCacheError> {
        let now = Instant::now();
        let entries = self.entries.lock().expect("poisoned lock");
        Ok(entries
            .get(key.as_str())
            .filter(|entry| entry.expires_at > now)
            .map(|entry| entry.body.clone()))
    }

    async fn add(
        &self,
        key: &CacheKey,
        body: &str,
        ttl: Duration,
    ) -> Result<bool, PageCacheError> {
        let now = Instant::now();
        let mut entries = self.entries.lock().expect("poisoned lock");
        if entries
            .get(key.as_str())
            .is_some_and(|entry| entry.expires_at > now)
        {
            return Ok(false);
        }
        entries.insert(
            key.as_str().to_owned(),
            CacheEntry {
                body: body.to_owned(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }

    async fn flush_all(&self) -> Result<(), PageCacheError> {
        self.entries.lock().expect("poisoned lock").clear();
        Ok(())
    }
}

/// Mailer capturing every notification for later assertions.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<FixedNotification>>,
}

impl RecordingMailer {
    /// Notifications delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<FixedNotification> {
        self.sent.lock().expect("poisoned lock").clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_fixed_notification(
        &self,
        notification: &FixedNotification,
    ) -> Result<(), MailerError> {
        self.sent
            .lock()
            .expect("poisoned lock")
            .push(notification.clone());
        Ok(())
    }
}

/// Fully wired in-memory application state plus handles for assertions.
pub struct TestHarness {
    pub state: HttpState,
    pub projects: Arc<InMemoryProjectRepository>,
    pub issues: Arc<InMemoryIssueRepository>,
    pub counters: Arc<InMemoryCounterStore>,
    pub cache: Arc<InMemoryPageCache>,
    pub mailer: Arc<RecordingMailer>,
}

impl TestHarness {
    /// Build services over fresh in-memory adapters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_admins(&[])
    }

    /// Like [`TestHarness::new`], with the given admin identities.
    #[must_use]
    pub fn with_admins(admins: &[&str]) -> Self {
        let projects = Arc::new(InMemoryProjectRepository::default());
        let issues = Arc::new(InMemoryIssueRepository::default());
        let counters = Arc::new(InMemoryCounterStore::default());
        let cache = Arc::new(InMemoryPageCache::default());
        let mailer = Arc::new(RecordingMailer::default());
        let clock: Arc<dyn mockable::Clock> = Arc::new(mockable::DefaultClock);

        let project_service = Arc::new(ProjectService::new(
            projects.clone(),
            issues.clone(),
            clock.clone(),
        ));
        let issue_service = Arc::new(IssueService::new(
            projects.clone(),
            issues.clone(),
            counters.clone(),
            mailer.clone(),
            clock.clone(),
        ));
        let webhook = Arc::new(WebhookIngestService::new(
            projects.clone(),
            issues.clone(),
            mailer.clone(),
            clock,
        ));

        let state = HttpState {
            projects: project_service.clone(),
            projects_query: project_service,
            issues: issue_service.clone(),
            issues_query: issue_service,
            webhook,
            cache: cache.clone(),
            admins: Arc::new(admins.iter().map(|admin| (*admin).to_owned()).collect()),
            system_url: Arc::from("https://snagtrack.example"),
        };

        Self {
            state,
            projects,
            issues,
            counters,
            cache,
            mailer,
        }
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
