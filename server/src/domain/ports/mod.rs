//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod counter_store;
mod issue_ops;
mod issue_repository;
mod mailer;
mod page_cache;
mod project_ops;
mod project_repository;
mod webhook_ingest;

#[cfg(test)]
pub use counter_store::MockCounterStore;
pub use counter_store::{CounterStore, CounterStoreError, FixtureCounterStore};
#[cfg(test)]
pub use issue_ops::{MockIssueCommand, MockIssueQuery};
pub use issue_ops::{
    FixtureIssueCommand, FixtureIssueQuery, IssueCommand, IssueDetail, IssueEdit, IssueQuery,
};
#[cfg(test)]
pub use issue_repository::MockIssueRepository;
pub use issue_repository::{FixtureIssueRepository, IssueRepository, IssueRepositoryError};
#[cfg(test)]
pub use mailer::MockMailer;
pub use mailer::{FixedNotification, FixtureMailer, Mailer, MailerError};
#[cfg(test)]
pub use page_cache::MockPageCache;
pub use page_cache::{
    CacheKey, CacheKeyValidationError, ISSUE_VIEW_TTL, PageCache, PageCacheError, VIEW_TTL,
};
#[cfg(test)]
pub use project_ops::{MockProjectCommand, MockProjectQuery};
pub use project_ops::{
    FixtureProjectCommand, FixtureProjectQuery, ProjectCommand, ProjectOverview, ProjectQuery,
};
#[cfg(test)]
pub use project_repository::MockProjectRepository;
pub use project_repository::{
    FixtureProjectRepository, ProjectRepository, ProjectRepositoryError,
};
#[cfg(test)]
pub use webhook_ingest::MockWebhookIngest;
pub use webhook_ingest::{FixtureWebhookIngest, WebhookIngest};
