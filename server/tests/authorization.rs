//! Authorization, validation UX, and routing behaviour.

mod common;

use actix_web::http::{StatusCode, header};
use actix_web::test;
use chrono::Utc;

use common::{login, test_app};
use snagtrack::domain::ports::{IssueRepository, ProjectRepository};
use snagtrack::domain::{Issue, Project, UserId};
use snagtrack::test_support::TestHarness;

fn owner() -> UserId {
    UserId::new("owner@example.org").expect("valid identity")
}

async fn seed(harness: &TestHarness) -> (Project, Issue) {
    let project = Project::create("Demo", "", owner(), Utc::now()).expect("valid project");
    harness
        .projects
        .insert(&project)
        .await
        .expect("seed project");
    let issue =
        Issue::create(&project, 1, "Crash", "boom", None, Utc::now()).expect("valid issue");
    harness.issues.insert(&issue).await.expect("seed issue");
    (project, issue)
}

#[actix_web::test]
async fn settings_are_owner_only() {
    let harness = TestHarness::with_admins(&["root@example.org"]);
    let app = test::init_service(test_app(harness.state.clone())).await;
    seed(&harness).await;

    // Anonymous and non-owner callers get the 403 page.
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/projects/demo/settings/")
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let stranger = login(&app, "stranger@example.org").await;
    let res = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/projects/demo/settings/")
            .cookie(stranger)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // The owner and an admin are always granted access.
    for id in ["owner@example.org", "root@example.org"] {
        let cookie = login(&app, id).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/projects/demo/settings/")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK, "{id} should see settings");
    }
}

#[actix_web::test]
async fn settings_update_grants_additional_users() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;
    seed(&harness).await;

    let cookie = login(&app, "owner@example.org").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/demo/settings/")
            .cookie(cookie)
            .set_form([
                ("url", "https://example.org/demo"),
                ("other_users", "helper@example.org"),
            ])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);

    // The helper can now edit issues.
    let helper = login(&app, "helper@example.org").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/demo/crash/")
            .cookie(helper)
            .set_form([("name", "Crash"), ("description", ""), ("fixed", "1")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let issue = harness
        .issues
        .find_by_internal_url("/demo/crash/")
        .await
        .expect("repository lookup")
        .expect("issue present");
    assert!(issue.is_fixed());
}

#[actix_web::test]
async fn non_owner_mutations_are_rejected_with_403() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;
    seed(&harness).await;

    let stranger = login(&app, "stranger@example.org").await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/demo/crash/")
            .cookie(stranger.clone())
            .set_form([("name", "Hijacked"), ("fixed", "1")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/demo/delete/")
            .cookie(stranger)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let issue = harness
        .issues
        .find_by_internal_url("/demo/crash/")
        .await
        .expect("repository lookup")
        .expect("issue untouched");
    assert_eq!(issue.name(), "Crash");
    assert!(!issue.is_fixed());
    assert!(
        harness
            .projects
            .find_by_slug("demo")
            .await
            .expect("repository lookup")
            .is_some()
    );
}

#[actix_web::test]
async fn owner_delete_cascades_and_redirects() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;
    seed(&harness).await;

    let cookie = login(&app, "owner@example.org").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/demo/delete/")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/projects/")
    );
    assert!(
        harness
            .projects
            .find_by_slug("demo")
            .await
            .expect("repository lookup")
            .is_none()
    );
}

#[actix_web::test]
async fn duplicate_project_names_bounce_silently_back_to_the_listing() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;
    seed(&harness).await;

    let cookie = login(&app, "someone@example.org").await;
    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/")
            .cookie(cookie)
            .set_form([("name", "Demo")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/projects/")
    );

    // Only the original remains, still owned by the original owner.
    let project = harness
        .projects
        .find_by_slug("demo")
        .await
        .expect("repository lookup")
        .expect("project present");
    assert_eq!(project.owner().as_str(), "owner@example.org");
}

#[actix_web::test]
async fn unknown_slugs_render_the_404_page() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/projects/ghost/").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn slashless_gets_redirect_permanently() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;
    seed(&harness).await;

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/projects/demo").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        res.headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok()),
        Some("/projects/demo/")
    );
}

#[actix_web::test]
async fn project_creation_requires_a_session() {
    let harness = TestHarness::new();
    let app = test::init_service(test_app(harness.state.clone())).await;

    let res = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/projects/")
            .set_form([("name", "Drive-by")])
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(
        harness
            .projects
            .find_by_slug("drive-by")
            .await
            .expect("repository lookup")
            .is_none()
    );
}
