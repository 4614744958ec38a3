//! Tests for the issue services and the notification side effect.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use mockable::MockClock;

use super::*;
use crate::domain::ErrorCode;
use crate::domain::identity::{Actor, UserId};
use crate::domain::issue::Issue;
use crate::domain::ports::{
    CounterStoreError, IssueCommand, IssueEdit, IssueQuery, MailerError, MockCounterStore,
    MockIssueRepository, MockMailer, MockProjectRepository,
};
use crate::domain::project::Project;

fn actor(id: &str) -> Actor {
    Actor::new(UserId::new(id).expect("valid identity"), false)
}

fn sample_project() -> Project {
    Project::create(
        "Demo",
        "",
        UserId::new("owner@example.org").expect("valid identity"),
        Utc::now(),
    )
    .expect("valid project")
}

fn open_issue(project: &Project, email: Option<&str>) -> Issue {
    Issue::create(
        project,
        7,
        "Crash",
        "it crashes",
        email.map(str::to_owned),
        Utc::now(),
    )
    .expect("valid issue")
}

struct Mocks {
    projects: MockProjectRepository,
    issues: MockIssueRepository,
    counters: MockCounterStore,
    mailer: MockMailer,
    now: DateTime<Utc>,
}

impl Mocks {
    fn new() -> Self {
        Self {
            projects: MockProjectRepository::new(),
            issues: MockIssueRepository::new(),
            counters: MockCounterStore::new(),
            mailer: MockMailer::new(),
            now: Utc::now(),
        }
    }

    fn with_project(mut self, project: Project) -> Self {
        self.projects
            .expect_find_by_slug()
            .returning(move |_| Ok(Some(project.clone())));
        self
    }

    fn with_issue(mut self, issue: Issue) -> Self {
        self.issues
            .expect_find_by_internal_url()
            .returning(move |_| Ok(Some(issue.clone())));
        self
    }

    fn build(
        self,
    ) -> IssueService<MockProjectRepository, MockIssueRepository, MockCounterStore> {
        let mut clock = MockClock::new();
        clock.expect_utc().return_const(self.now);
        IssueService::new(
            Arc::new(self.projects),
            Arc::new(self.issues),
            Arc::new(self.counters),
            Arc::new(self.mailer),
            Arc::new(clock),
        )
    }
}

#[tokio::test]
async fn create_issue_allocates_identifier_and_derives_internal_url() {
    let mut mocks = Mocks::new().with_project(sample_project());
    mocks.counters.expect_allocate().times(1).returning(|_| Ok(1));
    mocks
        .issues
        .expect_insert()
        .withf(|issue| issue.internal_url() == "/demo/crash/" && issue.identifier() == 1)
        .times(1)
        .returning(|_| Ok(()));

    let service = mocks.build();
    let issue = service
        .create_issue("demo", "Crash", "it crashes", None)
        .await
        .expect("issue created");

    assert_eq!(issue.identifier(), 1);
    assert_eq!(issue.internal_url(), "/demo/crash/");
    assert!(!issue.is_fixed());
}

#[tokio::test]
async fn create_issue_for_unknown_project_is_not_found() {
    let mut mocks = Mocks::new();
    mocks.projects.expect_find_by_slug().returning(|_| Ok(None));
    mocks.counters.expect_allocate().times(0);

    let service = mocks.build();
    let error = service
        .create_issue("ghost", "Crash", "", None)
        .await
        .expect_err("unknown project");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn create_issue_rejects_bad_email_before_allocating() {
    let mut mocks = Mocks::new().with_project(sample_project());
    mocks.counters.expect_allocate().times(0);
    mocks.issues.expect_insert().times(0);

    let service = mocks.build();
    let error = service
        .create_issue("demo", "Crash", "", Some("not-an-address"))
        .await
        .expect_err("bad email rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[tokio::test]
async fn create_issue_surfaces_counter_failures() {
    let mut mocks = Mocks::new().with_project(sample_project());
    mocks
        .counters
        .expect_allocate()
        .returning(|_| Err(CounterStoreError::connection("store down")));
    mocks.issues.expect_insert().times(0);

    let service = mocks.build();
    let error = service
        .create_issue("demo", "Crash", "", None)
        .await
        .expect_err("counter failure surfaces");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}

fn edit(fixed: bool) -> IssueEdit {
    IssueEdit {
        name: "Crash".to_owned(),
        description: "it crashes".to_owned(),
        email: Some("dev@example.org".to_owned()),
        fixed,
        fixed_description: fixed.then(|| "patched".to_owned()),
    }
}

#[tokio::test]
async fn edit_marks_fixed_stamps_date_and_notifies_once() {
    let project = sample_project();
    let mut mocks = Mocks::new()
        .with_project(project.clone())
        .with_issue(open_issue(&project, Some("dev@example.org")));
    let now = mocks.now;
    mocks
        .issues
        .expect_update()
        .withf(move |issue| issue.is_fixed() && issue.fixed_date() == Some(now))
        .times(1)
        .returning(|_| Ok(()));
    mocks
        .mailer
        .expect_send_fixed_notification()
        .withf(|notification| notification.to == "dev@example.org")
        .times(1)
        .returning(|_| Ok(()));

    let service = mocks.build();
    let issue = service
        .edit_issue(&actor("owner@example.org"), "demo", "crash", edit(true))
        .await
        .expect("edit succeeds");

    assert_eq!(issue.fixed_date(), Some(now));
    assert_eq!(issue.fixed_description(), Some("patched"));
}

#[tokio::test]
async fn reopening_clears_state_and_sends_nothing() {
    let project = sample_project();
    let mut fixed = open_issue(&project, Some("dev@example.org"));
    fixed.mark_fixed(Utc::now());
    fixed.set_fixed_description(Some("patched".to_owned()));

    let mut mocks = Mocks::new().with_project(project).with_issue(fixed);
    mocks
        .issues
        .expect_update()
        .withf(|issue| !issue.is_fixed() && issue.fixed_date().is_none())
        .times(1)
        .returning(|_| Ok(()));
    mocks.mailer.expect_send_fixed_notification().times(0);

    let service = mocks.build();
    let issue = service
        .edit_issue(&actor("owner@example.org"), "demo", "crash", edit(false))
        .await
        .expect("edit succeeds");

    assert!(!issue.is_fixed());
    assert!(issue.fixed_description().is_none());
}

#[tokio::test]
async fn remarking_fixed_restamps_and_resends() {
    let project = sample_project();
    let mut fixed = open_issue(&project, Some("dev@example.org"));
    fixed.mark_fixed(Utc::now() - Duration::hours(1));

    let mut mocks = Mocks::new().with_project(project).with_issue(fixed);
    let now = mocks.now;
    mocks
        .issues
        .expect_update()
        .withf(move |issue| issue.fixed_date() == Some(now))
        .times(1)
        .returning(|_| Ok(()));
    mocks
        .mailer
        .expect_send_fixed_notification()
        .times(1)
        .returning(|_| Ok(()));

    let service = mocks.build();
    service
        .edit_issue(&actor("owner@example.org"), "demo", "crash", edit(true))
        .await
        .expect("re-fix succeeds");
}

#[tokio::test]
async fn non_owner_edits_are_forbidden() {
    let project = sample_project();
    let mut mocks = Mocks::new().with_project(project);
    mocks.issues.expect_update().times(0);
    mocks.mailer.expect_send_fixed_notification().times(0);

    let service = mocks.build();
    let error = service
        .edit_issue(&actor("stranger@example.org"), "demo", "crash", edit(true))
        .await
        .expect_err("stranger rejected");

    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[tokio::test]
async fn notification_failure_does_not_fail_the_edit() {
    let project = sample_project();
    let mut mocks = Mocks::new()
        .with_project(project.clone())
        .with_issue(open_issue(&project, Some("dev@example.org")));
    mocks.issues.expect_update().times(1).returning(|_| Ok(()));
    mocks
        .mailer
        .expect_send_fixed_notification()
        .returning(|_| Err(MailerError::transport("smtp down")));

    let service = mocks.build();
    service
        .edit_issue(&actor("owner@example.org"), "demo", "crash", edit(true))
        .await
        .expect("edit still succeeds");
}

#[tokio::test]
async fn issue_detail_returns_project_and_issue() {
    let project = sample_project();
    let mocks = Mocks::new()
        .with_project(project.clone())
        .with_issue(open_issue(&project, None));

    let service = mocks.build();
    let detail = service
        .issue_detail("demo", "crash")
        .await
        .expect("detail loaded");

    assert_eq!(detail.project.slug(), "demo");
    assert_eq!(detail.issue.identifier(), 7);
}
