//! Port for the read-through page cache.
//!
//! Keys map to opaque pre-rendered output blobs with a per-key expiry.
//! Population is add-if-absent: losing a race to a concurrent populate is a
//! harmless no-op. The only active invalidation is `flush_all`; normal write
//! paths rely on the expiry window bounding staleness.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use super::define_port_error;

/// Expiry for per-issue unauthenticated reads.
pub const ISSUE_VIEW_TTL: Duration = Duration::from_secs(60);

/// Expiry for every other cached view.
pub const VIEW_TTL: Duration = Duration::from_secs(3600);

define_port_error! {
    /// Errors surfaced by page cache adapters.
    pub enum PageCacheError {
        /// Cache backend is unavailable or timing out.
        Backend { message: String } => "page cache backend failure: {message}",
    }
}

/// Validation errors returned when constructing [`CacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheKeyValidationError {
    /// Key is empty.
    #[error("cache key must not be empty")]
    Empty,
    /// Key contains whitespace, control, or non-ASCII characters.
    #[error("cache key must be printable ASCII without whitespace")]
    InvalidCharacter,
}

/// Cache key: a slash-delimited path-like identifier or a named bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Construct a cache key after validating its character set.
    pub fn new(value: impl Into<String>) -> Result<Self, CacheKeyValidationError> {
        let raw = value.into();
        if raw.is_empty() {
            return Err(CacheKeyValidationError::Empty);
        }
        if !raw.chars().all(|ch| ch.is_ascii_graphic()) {
            return Err(CacheKeyValidationError::InvalidCharacter);
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Port for memoizing rendered output per logical key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Read a cached blob for the given key.
    async fn get(&self, key: &CacheKey) -> Result<Option<String>, PageCacheError>;

    /// Store a blob unless the key is already present.
    ///
    /// Returns `false` when an existing entry won the race; that outcome is
    /// not an error.
    async fn add(
        &self,
        key: &CacheKey,
        body: &str,
        ttl: Duration,
    ) -> Result<bool, PageCacheError>;

    /// Drop every cached entry.
    async fn flush_all(&self) -> Result<(), PageCacheError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{CacheKey, CacheKeyValidationError};

    #[rstest]
    #[case("")]
    fn rejects_empty_keys(#[case] value: &str) {
        assert_eq!(
            CacheKey::new(value).expect_err("empty key rejected"),
            CacheKeyValidationError::Empty
        );
    }

    #[rstest]
    #[case("two words")]
    #[case("tab\tkey")]
    #[case("caf\u{e9}")]
    fn rejects_unprintable_keys(#[case] value: &str) {
        assert_eq!(
            CacheKey::new(value).expect_err("invalid key rejected"),
            CacheKeyValidationError::InvalidCharacter
        );
    }

    #[test]
    fn accepts_path_like_keys() {
        let key = CacheKey::new("projects/demo/issues/crash").expect("valid key");
        assert_eq!(key.as_str(), "projects/demo/issues/crash");
        assert_eq!(key.to_string(), "projects/demo/issues/crash");
    }
}
