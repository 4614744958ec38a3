//! Server assembly: configuration, adapter wiring, and the actix app.

pub mod config;
pub mod state_builders;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::body::{BoxBody, EitherBody};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::inbound::http::{self, HttpState, admin, feeds, hook, issues, projects};
use crate::middleware::{Trace, TrailingSlash};

pub use config::AppSettings;
pub use state_builders::{BuildError, build_http_state};

/// Assemble the application: routes, middleware, and shared state.
///
/// Registration order matters for the overlapping `/projects/{slug}/...`
/// patterns: the literal `delete`, `settings`, and `hook` segments must win
/// over the issue-slug capture.
pub fn build_app(
    state: HttpState,
    session: SessionMiddleware<CookieSessionStore>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<EitherBody<BoxBody>>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(web::Data::new(state))
        .service(projects::index)
        .service(projects::faq)
        .service(projects::list_projects)
        .service(projects::create_project)
        .service(feeds::project_json)
        .service(feeds::project_rss)
        .service(hook::hook)
        .service(projects::project_delete_confirm)
        .service(projects::project_delete)
        .service(projects::project_settings_form)
        .service(projects::project_settings)
        .service(feeds::issue_json)
        .service(issues::issue_delete_confirm)
        .service(issues::delete_issue)
        .service(issues::issue_detail)
        .service(issues::edit_issue)
        .service(projects::project_detail)
        .service(projects::create_issue)
        .service(admin::flush_cache);

    #[cfg(debug_assertions)]
    let app = app.service(
        SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", crate::doc::ApiDoc::openapi()),
    );

    app.default_service(web::route().to(http::not_found))
        .wrap(session)
        .wrap(TrailingSlash)
        .wrap(Trace)
}
