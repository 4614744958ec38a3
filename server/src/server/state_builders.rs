//! Builders turning configuration into the HTTP state bundle.
//!
//! Real adapters are wired only for the collaborators the configuration
//! names; everything else falls back to fixtures (repositories), the no-op
//! cache, or console mail, so the server always starts.

use std::sync::Arc;

use tracing::warn;

use crate::domain::ports::{
    FixtureCounterStore, FixtureIssueRepository, FixtureProjectRepository, Mailer, PageCache,
};
use crate::domain::{IssueService, ProjectService, WebhookIngestService};
use crate::inbound::http::HttpState;
use crate::outbound::cache::{NoopPageCache, RedisPageCache};
use crate::outbound::mail::{ConsoleMailer, SmtpMailer};
use crate::outbound::persistence::{
    DbPool, DieselCounterStore, DieselIssueRepository, DieselProjectRepository, PoolConfig,
    PoolError,
};

use super::config::AppSettings;

/// Errors raised while wiring adapters from configuration.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The database pool could not be constructed.
    #[error("database pool: {0}")]
    Pool(#[from] PoolError),
    /// The Redis cache could not be reached.
    #[error("page cache: {0}")]
    Cache(#[from] crate::domain::ports::PageCacheError),
    /// The SMTP mailer could not be configured.
    #[error("mailer: {0}")]
    Mail(#[from] crate::domain::ports::MailerError),
}

async fn build_cache(settings: &AppSettings) -> Result<Arc<dyn PageCache>, BuildError> {
    if !settings.cache_enabled {
        return Ok(Arc::new(NoopPageCache::new()));
    }
    match settings.redis_url.as_deref() {
        Some(redis_url) => Ok(Arc::new(RedisPageCache::connect(redis_url).await?)),
        None => {
            warn!("cache enabled but no redis url configured; caching disabled");
            Ok(Arc::new(NoopPageCache::new()))
        }
    }
}

fn build_mailer(settings: &AppSettings) -> Result<Arc<dyn Mailer>, BuildError> {
    match settings.smtp_url.as_deref() {
        Some(smtp_url) => Ok(Arc::new(SmtpMailer::from_url(
            smtp_url,
            settings.mail_from(),
        )?)),
        None => Ok(Arc::new(ConsoleMailer::new())),
    }
}

/// Build the HTTP state bundle from configuration.
pub async fn build_http_state(settings: &AppSettings) -> Result<HttpState, BuildError> {
    let clock: Arc<dyn mockable::Clock> = Arc::new(mockable::DefaultClock);
    let cache = build_cache(settings).await?;
    let mailer = build_mailer(settings)?;
    let admins = Arc::new(settings.admin_users());
    let system_url: Arc<str> = Arc::from(settings.system_url());

    match settings.database_url.as_deref() {
        Some(database_url) => {
            let pool = DbPool::new(PoolConfig::new(database_url)).await?;
            let projects = Arc::new(DieselProjectRepository::new(pool.clone()));
            let issues = Arc::new(DieselIssueRepository::new(pool.clone()));
            let counters = Arc::new(DieselCounterStore::new(pool));

            let project_service = Arc::new(ProjectService::new(
                projects.clone(),
                issues.clone(),
                clock.clone(),
            ));
            let issue_service = Arc::new(IssueService::new(
                projects.clone(),
                issues.clone(),
                counters,
                mailer.clone(),
                clock.clone(),
            ));
            let webhook = Arc::new(WebhookIngestService::new(projects, issues, mailer, clock));

            Ok(HttpState {
                projects: project_service.clone(),
                projects_query: project_service,
                issues: issue_service.clone(),
                issues_query: issue_service,
                webhook,
                cache,
                admins,
                system_url,
            })
        }
        None => {
            warn!("no database url configured; using fixture repositories");
            let projects = Arc::new(FixtureProjectRepository);
            let issues = Arc::new(FixtureIssueRepository);
            let counters = Arc::new(FixtureCounterStore);

            let project_service = Arc::new(ProjectService::new(
                projects.clone(),
                issues.clone(),
                clock.clone(),
            ));
            let issue_service = Arc::new(IssueService::new(
                projects.clone(),
                issues.clone(),
                counters,
                mailer.clone(),
                clock.clone(),
            ));
            let webhook = Arc::new(WebhookIngestService::new(projects, issues, mailer, clock));

            Ok(HttpState {
                projects: project_service.clone(),
                projects_query: project_service,
                issues: issue_service.clone(),
                issues_query: issue_service,
                webhook,
                cache,
                admins,
                system_url,
            })
        }
    }
}
