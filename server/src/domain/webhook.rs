//! Webhook ingestion: commit payloads from a source-control host.
//!
//! Every failure in here is logged and swallowed. The HTTP handler answers
//! 200 with an empty body no matter what happened, so unauthenticated
//! senders cannot probe for project existence or secret validity.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::domain::issue_service::notify_fixed;
use crate::domain::ports::{IssueRepository, Mailer, ProjectRepository, WebhookIngest};
use crate::domain::project::Project;
use crate::domain::reference;

/// Wire representation of a webhook payload: a batch of commits.
#[derive(Debug, Deserialize)]
struct HookPayload {
    commits: Vec<HookCommit>,
}

#[derive(Debug, Deserialize)]
struct HookCommit {
    message: String,
}

/// Short SHA-256 fingerprint of a presented key, safe to log.
fn key_fingerprint(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..8])
}

/// Webhook service implementing the ingest driving port.
#[derive(Clone)]
pub struct WebhookIngestService<P, I> {
    projects: Arc<P>,
    issues: Arc<I>,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
}

impl<P, I> WebhookIngestService<P, I> {
    /// Create a new ingest service.
    pub fn new(
        projects: Arc<P>,
        issues: Arc<I>,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            projects,
            issues,
            mailer,
            clock,
        }
    }
}

impl<P, I> WebhookIngestService<P, I>
where
    I: IssueRepository,
{
    /// Fix every issue referenced by one commit message. A failure on one
    /// reference never aborts the rest of the batch.
    async fn apply_commit(&self, project: &Project, message: &str) {
        for identifier in reference::scan(message) {
            let found = match self
                .issues
                .find_by_identifier(project.id(), identifier)
                .await
            {
                Ok(found) => found,
                Err(error) => {
                    warn!(
                        error = %error,
                        project = project.slug(),
                        identifier,
                        "webhook issue lookup failed"
                    );
                    continue;
                }
            };
            let Some(mut issue) = found else {
                debug!(
                    project = project.slug(),
                    identifier, "webhook referenced an unknown issue"
                );
                continue;
            };

            issue.mark_fixed(self.clock.utc());
            if let Err(error) = self.issues.update(&issue).await {
                warn!(
                    error = %error,
                    issue = %issue.internal_url(),
                    "webhook could not persist fix"
                );
                continue;
            }
            info!(
                project = project.slug(),
                issue = %issue.internal_url(),
                identifier,
                "issue fixed via commit reference"
            );
            notify_fixed(self.mailer.as_ref(), &issue).await;
        }
    }
}

#[async_trait]
impl<P, I> WebhookIngest for WebhookIngestService<P, I>
where
    P: ProjectRepository,
    I: IssueRepository,
{
    async fn ingest(&self, slug: &str, key: &str, payload: &str) {
        let project = match self.projects.find_by_slug(slug).await {
            Ok(Some(project)) => project,
            Ok(None) => {
                info!(slug, "webhook for unknown project");
                return;
            }
            Err(error) => {
                warn!(error = %error, slug, "webhook project lookup failed");
                return;
            }
        };

        if key != project.hook_secret() {
            info!(
                slug,
                presented_key = %key_fingerprint(key),
                "webhook key mismatch"
            );
            return;
        }

        let payload: HookPayload = match serde_json::from_str(payload) {
            Ok(payload) => payload,
            Err(error) => {
                info!(error = %error, slug, "webhook payload malformed");
                return;
            }
        };

        for commit in &payload.commits {
            self.apply_commit(&project, &commit.message).await;
        }
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
