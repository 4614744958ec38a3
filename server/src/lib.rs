//! snagtrack: a very simple issue tracker.
//!
//! Projects own issues with per-project monotonic identifiers; issues are
//! closed from a web form or by a source-control webhook scanning commit
//! messages for `#snag<n>` tags. Reads for anonymous callers flow through
//! a TTL-bounded page cache.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use doc::ApiDoc;
pub use middleware::{Trace, TrailingSlash};
