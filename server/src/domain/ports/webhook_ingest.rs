//! Driving port for webhook ingestion.

use async_trait::async_trait;

/// Port consuming inbound commit payloads from a source-control host.
///
/// Ingestion is side-effecting only. Every failure (unknown project, bad
/// secret, malformed payload, unmatched reference) is logged server-side
/// and swallowed, so unauthenticated callers learn nothing and the webhook
/// protocol's expectation of a success response is always met.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WebhookIngest: Send + Sync {
    /// Process one webhook call against the project identified by `slug`.
    async fn ingest(&self, slug: &str, key: &str, payload: &str);
}

/// Fixture implementation for tests that do not exercise ingestion.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureWebhookIngest;

#[async_trait]
impl WebhookIngest for FixtureWebhookIngest {
    async fn ingest(&self, _slug: &str, _key: &str, _payload: &str) {}
}
