//! Domain entities, services, and ports.
//!
//! Types in here are transport agnostic: inbound adapters map [`Error`] to
//! HTTP responses, and outbound adapters implement the traits under
//! [`ports`]. Identity is always passed in explicitly as an [`Actor`]; no
//! component reads an ambient current user.

pub mod error;
pub mod identity;
pub mod issue;
pub mod issue_service;
pub mod markup;
pub mod ports;
pub mod project;
pub mod project_service;
pub mod reference;
pub mod slug;
pub mod trace_id;
pub mod webhook;

pub use self::error::{Error, ErrorCode};
pub use self::identity::{Actor, IdentityValidationError, UserId, can_manage};
pub use self::issue::{Issue, IssueRecord, IssueValidationError};
pub use self::issue_service::IssueService;
pub use self::project::{Project, ProjectRecord, ProjectValidationError};
pub use self::project_service::{PROJECT_LIST_LIMIT, ProjectService};
pub use self::slug::slugify;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::webhook::WebhookIngestService;

/// Convenient result alias for domain operations.
pub type ApiResult<T> = Result<T, Error>;
