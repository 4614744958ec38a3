//! Administrator operations.
//!
//! The flush endpoint is the cache layer's only active invalidation path;
//! everything else relies on the expiry window.

use actix_web::{HttpResponse, post, web};
use tracing::info;

use crate::domain::Error;

use super::cached::error_page;
use super::projects::redirect_to;
use super::session::SessionContext;
use super::state::HttpState;

/// `POST /admin/flush/`: drop every cached entry. Admin only.
#[post("/admin/flush/")]
pub async fn flush_cache(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let actor = match session.actor(&state.admins) {
        Ok(actor) => actor,
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };
    let Some(actor) = actor.filter(crate::domain::Actor::is_admin) else {
        let error = Error::forbidden("cache flush is admin-only");
        return error_page(state.cache.as_ref(), actor_present(&session), &error).await;
    };

    match state.cache.flush_all().await {
        Ok(()) => {
            info!(admin = %actor.id(), "page cache flushed");
            redirect_to("/")
        }
        Err(error) => {
            let error = Error::service_unavailable(format!("cache flush failed: {error}"));
            error_page(state.cache.as_ref(), true, &error).await
        }
    }
}

fn actor_present(session: &SessionContext) -> bool {
    session.user_id().ok().flatten().is_some()
}
