//! Trailing-slash normalisation.
//!
//! Every page route requires a trailing slash; a GET for the slash-less
//! form receives a permanent redirect to the canonical path. Paths whose
//! final segment carries an extension (the `.json`/`.rss` feeds) are left
//! alone, as are non-GET requests, so form posts never bounce.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{Method, header};
use actix_web::{Error, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};

/// Compute the redirect target for a request, if one is needed.
fn redirect_target(method: &Method, path: &str, query: &str) -> Option<String> {
    if *method != Method::GET || path.ends_with('/') {
        return None;
    }
    let last_segment = path.rsplit('/').next().unwrap_or("");
    if last_segment.contains('.') {
        return None;
    }
    let mut target = format!("{path}/");
    if !query.is_empty() {
        target.push('?');
        target.push_str(query);
    }
    Some(target)
}

/// Middleware factory issuing permanent redirects to slash-suffixed paths.
#[derive(Clone)]
pub struct TrailingSlash;

impl<S, B> Transform<S, ServiceRequest> for TrailingSlash
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = TrailingSlashMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(TrailingSlashMiddleware { service }))
    }
}

/// Service wrapper produced by [`TrailingSlash`].
pub struct TrailingSlashMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for TrailingSlashMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(target) = redirect_target(req.method(), req.path(), req.query_string()) {
            let (req, _payload) = req.into_parts();
            let response = HttpResponse::MovedPermanently()
                .insert_header((header::LOCATION, target))
                .finish()
                .map_into_right_body();
            return Box::pin(ready(Ok(ServiceResponse::new(req, response))));
        }
        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
