//! Webhook endpoint for the source-control host.

use actix_web::{HttpResponse, post, web};
use zeroize::Zeroizing;

use super::state::HttpState;

#[derive(Debug, serde::Deserialize)]
pub struct HookForm {
    pub key: String,
    pub payload: String,
}

/// `POST /projects/{slug}/hook/`: ingest a commit batch.
///
/// Always answers 200 with an empty body; outcomes are only logged so
/// unauthenticated senders cannot probe project existence or key validity.
#[post("/projects/{slug}/hook/")]
pub async fn hook(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    form: web::Form<HookForm>,
) -> HttpResponse {
    let slug = path.into_inner();
    let HookForm { key, payload } = form.into_inner();
    let key = Zeroizing::new(key);
    state.webhook.ingest(&slug, &key, &payload).await;
    HttpResponse::Ok().body("")
}
