//! Shared harness for the HTTP integration suites.

use actix_web::body::{BoxBody, EitherBody, MessageBody};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, test, web};

use snagtrack::domain::{Error, UserId};
use snagtrack::inbound::http::{HttpState, SessionContext};
use snagtrack::server::build_app;
use snagtrack::test_support::test_session_middleware;

/// The full application plus a test-only login route that stands in for
/// the external identity provider.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    build_app(state, test_session_middleware()).route(
        "/test/login/{id}",
        web::get().to(
            |session: SessionContext, path: web::Path<String>| async move {
                let id = UserId::new(path.into_inner())
                    .map_err(|err| Error::invalid_request(err.to_string()))?;
                session.persist_user(&id)?;
                Ok::<_, Error>(HttpResponse::Ok().finish())
            },
        ),
    )
}

/// Establish a session for `id` and return its cookie.
pub async fn login<S, B>(app: &S, id: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/test/login/{id}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "test login failed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Read a response body as UTF-8 text.
pub async fn body_text(res: ServiceResponse<EitherBody<BoxBody>>) -> String {
    let bytes = test::read_body(res).await;
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}
