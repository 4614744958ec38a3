//! Issue page handlers.

use actix_web::{HttpResponse, get, post, web};

use crate::domain::ports::{ISSUE_VIEW_TTL, IssueEdit};
use crate::domain::{Actor, ErrorCode, can_manage};

use super::cached::{HTML_CONTENT_TYPE, cached_page, error_page, page_result};
use super::projects::redirect_to;
use super::session::SessionContext;
use super::state::HttpState;
use super::views;

fn manages(actor: Option<&Actor>, project: &crate::domain::Project) -> bool {
    actor.is_some_and(|actor| can_manage(actor, project.owner(), project.other_users()))
}

/// `GET /projects/{slug}/{issue_slug}/`: issue detail.
///
/// The anonymous rendering is the hottest cacheable view and expires on
/// the short per-issue window.
#[get("/projects/{slug}/{issue_slug}/")]
pub async fn issue_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (slug, issue_slug) = path.into_inner();
    let actor = session.actor(&state.admins).ok().flatten();
    let signed_in = actor.is_some();
    let query = state.issues_query.clone();
    let key = format!("projects/{slug}/issues/{issue_slug}");
    let result = cached_page(
        state.cache.as_ref(),
        signed_in,
        &key,
        ISSUE_VIEW_TTL,
        HTML_CONTENT_TYPE,
        || async move {
            let detail = query.issue_detail(&slug, &issue_slug).await?;
            let manager_view = manages(actor.as_ref(), &detail.project);
            Ok(views::issue_page(&detail, manager_view))
        },
    )
    .await;
    page_result(state.cache.as_ref(), signed_in, result).await
}

#[derive(Debug, serde::Deserialize)]
pub struct IssueEditForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub email: Option<String>,
    /// Checkbox: any non-empty value means fixed.
    pub fixed: Option<String>,
    pub fixed_description: Option<String>,
}

impl From<IssueEditForm> for IssueEdit {
    fn from(form: IssueEditForm) -> Self {
        let fixed = form.fixed.as_deref().is_some_and(|value| !value.is_empty());
        Self {
            name: form.name,
            description: form.description,
            email: form.email,
            fixed,
            fixed_description: form
                .fixed_description
                .filter(|value| !value.trim().is_empty()),
        }
    }
}

/// `POST /projects/{slug}/{issue_slug}/`: owner-only edit.
#[post("/projects/{slug}/{issue_slug}/")]
pub async fn edit_issue(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
    form: web::Form<IssueEditForm>,
) -> HttpResponse {
    let (slug, issue_slug) = path.into_inner();
    let actor = match session.actor(&state.admins) {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            let error = crate::domain::Error::forbidden("login required to edit issues");
            return error_page(state.cache.as_ref(), false, &error).await;
        }
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };
    let origin = format!("/projects/{slug}/{issue_slug}/");

    match state
        .issues
        .edit_issue(&actor, &slug, &issue_slug, form.into_inner().into())
        .await
    {
        Ok(_) => redirect_to(&origin),
        Err(error) if matches!(error.code(), ErrorCode::InvalidRequest) => {
            tracing::info!("issue edit rejected: {error}");
            redirect_to(&origin)
        }
        Err(error) => error_page(state.cache.as_ref(), true, &error).await,
    }
}

/// `GET /projects/{slug}/{issue_slug}/delete/`: confirmation page.
#[get("/projects/{slug}/{issue_slug}/delete/")]
pub async fn issue_delete_confirm(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (slug, issue_slug) = path.into_inner();
    let actor = session.actor(&state.admins).ok().flatten();
    let signed_in = actor.is_some();
    let result = match state.issues_query.issue_detail(&slug, &issue_slug).await {
        Ok(detail) => {
            let manager_view = manages(actor.as_ref(), &detail.project);
            Ok(HttpResponse::Ok()
                .content_type(HTML_CONTENT_TYPE)
                .body(views::issue_delete_page(&detail, manager_view)))
        }
        Err(error) => Err(error),
    };
    page_result(state.cache.as_ref(), signed_in, result).await
}

/// `POST /projects/{slug}/{issue_slug}/delete/`: owner-only deletion.
#[post("/projects/{slug}/{issue_slug}/delete/")]
pub async fn delete_issue(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(String, String)>,
) -> HttpResponse {
    let (slug, issue_slug) = path.into_inner();
    let actor = match session.actor(&state.admins) {
        Ok(Some(actor)) => actor,
        Ok(None) => {
            let error = crate::domain::Error::forbidden("login required to delete issues");
            return error_page(state.cache.as_ref(), false, &error).await;
        }
        Err(error) => return error_page(state.cache.as_ref(), false, &error).await,
    };

    match state.issues.delete_issue(&actor, &slug, &issue_slug).await {
        Ok(()) => redirect_to(&format!("/projects/{slug}/")),
        Err(error) => error_page(state.cache.as_ref(), true, &error).await,
    }
}
