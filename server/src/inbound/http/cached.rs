//! Read-through caching for rendered responses.
//!
//! Policy: only requests with no established identity touch the cache, in
//! either direction: signed-in views carry owner controls and must never
//! be shared. Population is add-if-absent, and a cache backend failure
//! degrades to a fresh render rather than failing the request.

use std::future::Future;
use std::time::Duration;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use tracing::warn;

use crate::domain::ports::{CacheKey, PageCache, VIEW_TTL};
use crate::domain::{Error, ErrorCode};

use super::error::status_for;
use super::views;

pub(crate) const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Content type the JSON feeds have always been served with.
pub(crate) const FEED_JSON_CONTENT_TYPE: &str = "application/javascript; charset=utf8";

pub(crate) const RSS_CONTENT_TYPE: &str = "application/rss+xml; charset=utf-8";

fn respond(status: StatusCode, content_type: &str, body: String) -> HttpResponse {
    HttpResponse::build(status)
        .content_type(content_type)
        .body(body)
}

/// Serve a cacheable view through the page cache.
///
/// `signed_in` requests bypass the cache entirely. For anonymous requests a
/// hit is served as-is and a miss renders, then populates with add-if-absent
/// semantics before responding.
pub async fn cached_page<F, Fut>(
    cache: &dyn PageCache,
    signed_in: bool,
    key: &str,
    ttl: Duration,
    content_type: &str,
    render: F,
) -> Result<HttpResponse, Error>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, Error>>,
{
    if signed_in {
        let body = render().await?;
        return Ok(respond(StatusCode::OK, content_type, body));
    }

    // Unusable keys (a path segment that decodes outside printable ASCII)
    // skip the cache and render fresh.
    let Ok(cache_key) = CacheKey::new(key) else {
        let body = render().await?;
        return Ok(respond(StatusCode::OK, content_type, body));
    };

    match cache.get(&cache_key).await {
        Ok(Some(body)) => return Ok(respond(StatusCode::OK, content_type, body)),
        Ok(None) => {}
        Err(error) => warn!(key, error = %error, "page cache read failed"),
    }

    let body = render().await?;
    if let Err(error) = cache.add(&cache_key, &body, ttl).await {
        warn!(key, error = %error, "page cache populate failed");
    }
    Ok(respond(StatusCode::OK, content_type, body))
}

/// Render a failed page request as an HTML error response.
///
/// The 404 and 403 pages are cached for anonymous callers, mirroring the
/// cacheable views they sit beside; everything else renders fresh with the
/// mapped status code.
pub async fn error_page(cache: &dyn PageCache, signed_in: bool, error: &Error) -> HttpResponse {
    let status = status_for(error.code());
    let (key, body) = match error.code() {
        ErrorCode::NotFound => ("errors/404", views::not_found_page()),
        ErrorCode::Forbidden => {
            tracing::info!("unauthorised attempt: {}", error.message());
            ("errors/403", views::forbidden_page())
        }
        _ => {
            return respond(status, HTML_CONTENT_TYPE, views::error_page(status.as_u16()));
        }
    };

    if !signed_in {
        if let Ok(cache_key) = CacheKey::new(key) {
            match cache.get(&cache_key).await {
                Ok(Some(cached)) => return respond(status, HTML_CONTENT_TYPE, cached),
                Ok(None) => {
                    if let Err(error) = cache.add(&cache_key, &body, VIEW_TTL).await {
                        warn!(key, error = %error, "error page populate failed");
                    }
                }
                Err(error) => warn!(key, error = %error, "error page cache read failed"),
            }
        }
    }
    respond(status, HTML_CONTENT_TYPE, body)
}

/// Resolve a page handler result, mapping errors to HTML error pages.
pub async fn page_result(
    cache: &dyn PageCache,
    signed_in: bool,
    result: Result<HttpResponse, Error>,
) -> HttpResponse {
    match result {
        Ok(response) => response,
        Err(error) => error_page(cache, signed_in, &error).await,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::ports::{MockPageCache, PageCacheError};

    async fn render_counted(counter: &AtomicUsize) -> Result<String, Error> {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok("<html>rendered</html>".to_owned())
    }

    #[tokio::test]
    async fn anonymous_miss_renders_and_populates() {
        let mut cache = MockPageCache::new();
        cache.expect_get().times(1).returning(|_| Ok(None));
        cache
            .expect_add()
            .withf(|key, body, ttl| {
                key.as_str() == "views/index" && body.contains("rendered") && *ttl == VIEW_TTL
            })
            .times(1)
            .returning(|_, _, _| Ok(true));

        let renders = AtomicUsize::new(0);
        let response = cached_page(
            &cache,
            false,
            "views/index",
            VIEW_TTL,
            HTML_CONTENT_TYPE,
            || render_counted(&renders),
        )
        .await
        .expect("page served");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn anonymous_hit_skips_rendering() {
        let mut cache = MockPageCache::new();
        cache
            .expect_get()
            .times(1)
            .returning(|_| Ok(Some("<html>cached</html>".to_owned())));
        cache.expect_add().times(0);

        let renders = AtomicUsize::new(0);
        let response = cached_page(
            &cache,
            false,
            "views/index",
            VIEW_TTL,
            HTML_CONTENT_TYPE,
            || render_counted(&renders),
        )
        .await
        .expect("page served");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(renders.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn signed_in_requests_never_touch_the_cache() {
        let mut cache = MockPageCache::new();
        cache.expect_get().times(0);
        cache.expect_add().times(0);

        let renders = AtomicUsize::new(0);
        cached_page(
            &cache,
            true,
            "views/index",
            VIEW_TTL,
            HTML_CONTENT_TYPE,
            || render_counted(&renders),
        )
        .await
        .expect("page served");

        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_failures_degrade_to_rendering() {
        let mut cache = MockPageCache::new();
        cache
            .expect_get()
            .returning(|_| Err(PageCacheError::backend("redis down")));
        cache
            .expect_add()
            .returning(|_, _, _| Err(PageCacheError::backend("redis down")));

        let renders = AtomicUsize::new(0);
        let response = cached_page(
            &cache,
            false,
            "views/index",
            VIEW_TTL,
            HTML_CONTENT_TYPE,
            || render_counted(&renders),
        )
        .await
        .expect("page served despite cache outage");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn not_found_error_pages_are_cached_for_anonymous_callers() {
        let mut cache = MockPageCache::new();
        cache.expect_get().times(1).returning(|_| Ok(None));
        cache
            .expect_add()
            .withf(|key, _, _| key.as_str() == "errors/404")
            .times(1)
            .returning(|_, _, _| Ok(true));

        let response = error_page(&cache, false, &Error::not_found("missing")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn signed_in_error_pages_render_fresh() {
        let mut cache = MockPageCache::new();
        cache.expect_get().times(0);
        cache.expect_add().times(0);

        let response = error_page(&cache, true, &Error::forbidden("no")).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
