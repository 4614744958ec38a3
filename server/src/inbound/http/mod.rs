//! HTTP inbound adapter.

pub mod admin;
pub mod cached;
pub mod error;
pub mod feeds;
pub mod hook;
pub mod issues;
pub mod projects;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod views;

use actix_web::{HttpResponse, web};

pub use error::ApiResult;
pub use session::SessionContext;
pub use state::HttpState;

use crate::domain::Error;

/// Fallback for every unmatched path: the 404 page, cached for anonymous
/// callers.
pub async fn not_found(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let signed_in = session.user_id().ok().flatten().is_some();
    cached::error_page(
        state.cache.as_ref(),
        signed_in,
        &Error::not_found("no route matches this path"),
    )
    .await
}
