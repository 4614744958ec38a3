//! Tests for the project services.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::MockClock;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::identity::{Actor, UserId};
use crate::domain::issue::Issue;
use crate::domain::ports::{
    MockIssueRepository, MockProjectRepository, ProjectCommand, ProjectQuery,
    ProjectRepositoryError,
};
use crate::domain::project::Project;

fn actor(id: &str) -> Actor {
    Actor::new(UserId::new(id).expect("valid identity"), false)
}

fn admin(id: &str) -> Actor {
    Actor::new(UserId::new(id).expect("valid identity"), true)
}

fn sample_project(owner: &str) -> Project {
    Project::create(
        "Demo",
        "a demo project",
        UserId::new(owner).expect("valid identity"),
        Utc::now(),
    )
    .expect("valid project")
}

fn fixed_clock(now: DateTime<Utc>) -> Arc<MockClock> {
    let mut clock = MockClock::new();
    clock.expect_utc().return_const(now);
    Arc::new(clock)
}

fn service(
    projects: MockProjectRepository,
    issues: MockIssueRepository,
) -> ProjectService<MockProjectRepository, MockIssueRepository> {
    ProjectService::new(Arc::new(projects), Arc::new(issues), fixed_clock(Utc::now()))
}

#[tokio::test]
async fn create_project_persists_and_derives_slug() {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_insert()
        .withf(|project| project.slug() == "demo-project")
        .times(1)
        .returning(|_| Ok(()));

    let service = service(projects, MockIssueRepository::new());
    let project = service
        .create_project(&actor("owner@example.org"), "Demo Project", "about")
        .await
        .expect("project created");

    assert_eq!(project.slug(), "demo-project");
    assert_eq!(project.owner().as_str(), "owner@example.org");
    assert!(!project.hook_secret().is_empty());
}

#[tokio::test]
async fn create_project_maps_duplicate_name_to_conflict() {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_insert()
        .returning(|_| Err(ProjectRepositoryError::duplicate_name()));

    let service = service(projects, MockIssueRepository::new());
    let error = service
        .create_project(&actor("owner@example.org"), "Demo", "")
        .await
        .expect_err("duplicate rejected");

    assert_eq!(error.code(), ErrorCode::Conflict);
}

#[tokio::test]
async fn create_project_rejects_blank_names_without_persisting() {
    let mut projects = MockProjectRepository::new();
    projects.expect_insert().times(0);

    let service = service(projects, MockIssueRepository::new());
    let error = service
        .create_project(&actor("owner@example.org"), "   ", "")
        .await
        .expect_err("blank name rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn update_settings_requires_the_manage_capability() {
    let project = sample_project("owner@example.org");
    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_slug()
        .returning(move |_| Ok(Some(project.clone())));
    projects.expect_update().times(0);

    let service = service(projects, MockIssueRepository::new());
    let error = service
        .update_settings(&actor("stranger@example.org"), "demo", None, "")
        .await
        .expect_err("stranger rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn update_settings_parses_the_space_delimited_user_list() {
    let project = sample_project("owner@example.org");
    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_slug()
        .returning(move |_| Ok(Some(project.clone())));
    projects
        .expect_update()
        .withf(|project| project.other_users().len() == 2)
        .times(1)
        .returning(|_| Ok(()));

    let service = service(projects, MockIssueRepository::new());
    let updated = service
        .update_settings(
            &actor("owner@example.org"),
            "demo",
            Some("https://example.org/demo"),
            "helper@example.org tester@example.org",
        )
        .await
        .expect("settings updated");

    assert_eq!(updated.other_users().len(), 2);
    assert_eq!(
        updated.url().map(url::Url::as_str),
        Some("https://example.org/demo")
    );
}

#[tokio::test]
async fn admins_may_delete_any_project() {
    let project = sample_project("owner@example.org");
    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_slug()
        .returning(move |_| Ok(Some(project.clone())));
    projects.expect_delete().times(1).returning(|_| Ok(()));

    let service = service(projects, MockIssueRepository::new());
    service
        .delete_project(&admin("admin@example.org"), "demo")
        .await
        .expect("admin delete succeeds");
}

#[tokio::test]
async fn project_overview_partitions_issues_by_state() {
    let project = sample_project("owner@example.org");
    let open = Issue::create(&project, 1, "Crash", "", None, Utc::now()).expect("open issue");
    let mut fixed = Issue::create(&project, 2, "Typo", "", None, Utc::now()).expect("fixed issue");
    fixed.mark_fixed(Utc::now());

    let project_for_find = project.clone();
    let mut projects = MockProjectRepository::new();
    projects
        .expect_find_by_slug()
        .returning(move |_| Ok(Some(project_for_find.clone())));
    let mut issues = MockIssueRepository::new();
    issues
        .expect_list_for_project()
        .returning(move |_| Ok(vec![open.clone(), fixed.clone()]));

    let service = service(projects, issues);
    let overview = service
        .project_overview("demo")
        .await
        .expect("overview loaded");

    assert_eq!(overview.open.len(), 1);
    assert_eq!(overview.closed.len(), 1);
    assert_eq!(overview.all_issues().count(), 2);
}

#[tokio::test]
async fn connection_failures_map_to_service_unavailable() {
    let mut projects = MockProjectRepository::new();
    projects
        .expect_list_recent()
        .returning(|_| Err(ProjectRepositoryError::connection("pool exhausted")));

    let service = service(projects, MockIssueRepository::new());
    let error = service.list_projects().await.expect_err("propagated");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
