//! Project page handlers.
//!
//! Page routes render HTML through the read-through cache for anonymous
//! callers. Mutating posts follow the original application's discipline:
//! validation failures redirect silently back to the origin listing, while
//! authorization failures surface as a 403 page.

use actix_web::http::header;
use actix_web::{HttpResponse, get, post, web};

use crate::domain::ports::VIEW_TTL;
use crate::domain::{Actor, ErrorCode, can_manage};

use super::cached::{HTML_CONTENT_TYPE, cached_page, error_page, page_result};
use super::session::SessionContext;
use super::state::HttpState;
use super::views;

pub(crate) fn redirect_to(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.to_owned()))
        .finish()
}

fn manages(actor: Option<&Actor>, project: &crate::domain::Project) -> bool {
    actor.is_some_and(|actor| can_manage(actor, project.owner(), project.other_users()))
}

/// `GET /`: the caller's projects, or the cached marketing page.
#[get("/")]
pub async fn index(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let actor = match session.actor(&state.admins) {
        Ok(actor) => actor,
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };

    match actor {
        Some(actor) => {
            let result = match state.projects_query.projects_for_user(actor.id()).await {
                Ok(projects) => Ok(HttpResponse::Ok()
                    .content_type(HTML_CONTENT_TYPE)
                    .body(views::my_projects_page(&projects))),
                Err(error) => Err(error),
            };
            page_result(state.cache.as_ref(), true, result).await
        }
        None => {
            let result = cached_page(
                state.cache.as_ref(),
                false,
                "views/index",
                VIEW_TTL,
                HTML_CONTENT_TYPE,
                || async { Ok(views::marketing_page()) },
            )
            .await;
            page_result(state.cache.as_ref(), false, result).await
        }
    }
}

/// `GET /faq/`: static FAQ page, cached for everyone without a session.
#[get("/faq/")]
pub async fn faq(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let signed_in = session.user_id().ok().flatten().is_some();
    let result = cached_page(
        state.cache.as_ref(),
        signed_in,
        "views/faq",
        VIEW_TTL,
        HTML_CONTENT_TYPE,
        || async { Ok(views::faq_page()) },
    )
    .await;
    page_result(state.cache.as_ref(), signed_in, result).await
}

/// `GET /projects/`: every project, newest first.
#[get("/projects/")]
pub async fn list_projects(state: web::Data<HttpState>, session: SessionContext) -> HttpResponse {
    let signed_in = session.user_id().ok().flatten().is_some();
    let query = state.projects_query.clone();
    let result = cached_page(
        state.cache.as_ref(),
        signed_in,
        "projects/index",
        VIEW_TTL,
        HTML_CONTENT_TYPE,
        || async move {
            let projects = query.list_projects().await?;
            Ok(views::projects_page(&projects, signed_in))
        },
    )
    .await;
    page_result(state.cache.as_ref(), signed_in, result).await
}

#[derive(Debug, serde::Deserialize)]
pub struct ProjectForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// `POST /projects/`: create a project (authenticated callers only).
///
/// A duplicate or unusable name silently bounces back to the listing.
#[post("/projects/")]
pub async fn create_project(
    state: web::Data<HttpState>,
    session: SessionContext,
    form: web::Form<ProjectForm>,
) -> HttpResponse {
    let actor = match session.actor(&state.admins) {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            let error = crate::domain::Error::unauthorized("login required to create projects");
            return error_page(state.cache.as_ref(), false, &error).await;
        }
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };

    match state
        .projects
        .create_project(&actor, &form.name, &form.description)
        .await
    {
        Ok(_) => redirect_to("/"),
        Err(error) if matches!(error.code(), ErrorCode::InvalidRequest | ErrorCode::Conflict) => {
            tracing::info!("project creation rejected: {error}");
            redirect_to("/projects/")
        }
        Err(error) => error_page(state.cache.as_ref(), true, &error).await,
    }
}

/// `GET /projects/{slug}/`: project detail with its issue lists.
#[get("/projects/{slug}/")]
pub async fn project_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let slug = path.into_inner();
    let actor = session.actor(&state.admins).ok().flatten();
    let signed_in = actor.is_some();
    let query = state.projects_query.clone();
    let key = format!("projects/{slug}");
    let result = cached_page(
        state.cache.as_ref(),
        signed_in,
        &key,
        VIEW_TTL,
        HTML_CONTENT_TYPE,
        || async move {
            let overview = query.project_overview(&slug).await?;
            let manager_view = manages(actor.as_ref(), &overview.project);
            Ok(views::project_page(&overview, manager_view))
        },
    )
    .await;
    page_result(state.cache.as_ref(), signed_in, result).await
}

#[derive(Debug, serde::Deserialize)]
pub struct IssueForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub email: Option<String>,
}

/// `POST /projects/{slug}/`: file an issue; no authentication required.
#[post("/projects/{slug}/")]
pub async fn create_issue(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    form: web::Form<IssueForm>,
) -> HttpResponse {
    let slug = path.into_inner();
    let signed_in = session.user_id().ok().flatten().is_some();
    let origin = format!("/projects/{slug}/");

    match state
        .issues
        .create_issue(&slug, &form.name, &form.description, form.email.as_deref())
        .await
    {
        Ok(_) => redirect_to(&origin),
        Err(error) if matches!(error.code(), ErrorCode::InvalidRequest) => {
            tracing::info!("issue creation rejected: {error}");
            redirect_to(&origin)
        }
        Err(error) => error_page(state.cache.as_ref(), signed_in, &error).await,
    }
}

/// `GET /projects/{slug}/delete/`: confirmation page.
#[get("/projects/{slug}/delete/")]
pub async fn project_delete_confirm(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let slug = path.into_inner();
    let actor = session.actor(&state.admins).ok().flatten();
    let signed_in = actor.is_some();
    let result = match state.projects_query.project_overview(&slug).await {
        Ok(overview) => {
            let manager_view = manages(actor.as_ref(), &overview.project);
            Ok(HttpResponse::Ok()
                .content_type(HTML_CONTENT_TYPE)
                .body(views::project_delete_page(&overview.project, manager_view)))
        }
        Err(error) => Err(error),
    };
    page_result(state.cache.as_ref(), signed_in, result).await
}

/// `POST /projects/{slug}/delete/`: owner-only deletion.
#[post("/projects/{slug}/delete/")]
pub async fn project_delete(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let slug = path.into_inner();
    let actor = match session.actor(&state.admins) {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            let error = crate::domain::Error::forbidden("login required to delete projects");
            return error_page(state.cache.as_ref(), false, &error).await;
        }
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };

    match state.projects.delete_project(&actor, &slug).await {
        Ok(()) => redirect_to("/projects/"),
        Err(error) => error_page(state.cache.as_ref(), true, &error).await,
    }
}

/// `GET /projects/{slug}/settings/`: owner-only settings form.
#[get("/projects/{slug}/settings/")]
pub async fn project_settings_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> HttpResponse {
    let slug = path.into_inner();
    let actor = session.actor(&state.admins).ok().flatten();
    let signed_in = actor.is_some();
    let result = match state.projects_query.project_overview(&slug).await {
        Ok(overview) => {
            if manages(actor.as_ref(), &overview.project) {
                Ok(HttpResponse::Ok()
                    .content_type(HTML_CONTENT_TYPE)
                    .body(views::project_settings_page(&overview.project)))
            } else {
                Err(crate::domain::Error::forbidden(format!(
                    "settings of {slug} are owner-only"
                )))
            }
        }
        Err(error) => Err(error),
    };
    page_result(state.cache.as_ref(), signed_in, result).await
}

#[derive(Debug, serde::Deserialize)]
pub struct SettingsForm {
    pub url: Option<String>,
    #[serde(default)]
    pub other_users: String,
}

/// `POST /projects/{slug}/settings/`: owner-only settings update.
#[post("/projects/{slug}/settings/")]
pub async fn project_settings(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    form: web::Form<SettingsForm>,
) -> HttpResponse {
    let slug = path.into_inner();
    let actor = match session.actor(&state.admins) {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            let error = crate::domain::Error::forbidden("login required to change settings");
            return error_page(state.cache.as_ref(), false, &error).await;
        }
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };
    let origin = format!("/projects/{slug}/settings/");

    match state
        .projects
        .update_settings(&actor, &slug, form.url.as_deref(), &form.other_users)
        .await
    {
        Ok(_) => redirect_to(&origin),
        Err(error) if matches!(error.code(), ErrorCode::InvalidRequest) => {
            tracing::info!("settings update rejected: {error}");
            redirect_to(&origin)
        }
        Err(error) => error_page(state.cache.as_ref(), true, &error).await,
    }
}
