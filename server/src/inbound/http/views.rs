//! HTML view rendering.
//!
//! Deliberately thin presentation glue: each view is a formatted document
//! assembled from escaped domain data. The cache layer stores the finished
//! strings these functions produce.

use crate::domain::markup::escape;
use crate::domain::ports::{IssueDetail, ProjectOverview};
use crate::domain::{Issue, Project};

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{} - snagtrack</title></head>\n\
         <body>\n<h1>{}</h1>\n{}\n</body>\n</html>\n",
        escape(title),
        escape(title),
        body
    )
}

fn project_list_items(projects: &[Project]) -> String {
    projects
        .iter()
        .map(|project| {
            format!(
                "<li><a href=\"{}\">{}</a></li>",
                project.path(),
                escape(project.name())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn issue_list_items(issues: &[Issue]) -> String {
    issues
        .iter()
        .map(|issue| {
            format!(
                "<li><a href=\"{}\">{} {}</a></li>",
                issue.path(),
                escape(&issue.tag()),
                escape(issue.name())
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Marketing page shown to anonymous visitors of the index.
#[must_use]
pub fn marketing_page() -> String {
    layout(
        "snagtrack",
        "<p>A very simple issue tracker. Create a project, share the link, \
         and close issues straight from your commit messages.</p>\n\
         <p><a href=\"/projects/\">Browse projects</a> or \
         <a href=\"/faq/\">read the FAQ</a>.</p>",
    )
}

/// Signed-in index: the caller's own projects.
#[must_use]
pub fn my_projects_page(projects: &[Project]) -> String {
    let body = format!(
        "<ul>\n{}\n</ul>\n<p><a href=\"/projects/\">All projects</a></p>",
        project_list_items(projects)
    );
    layout("Your projects", &body)
}

/// All-projects listing, with the creation form for signed-in callers.
#[must_use]
pub fn projects_page(projects: &[Project], signed_in: bool) -> String {
    let mut body = format!("<ul>\n{}\n</ul>", project_list_items(projects));
    if signed_in {
        body.push_str(
            "\n<form method=\"post\" action=\"/projects/\">\n\
             <input name=\"name\" placeholder=\"Project name\">\n\
             <textarea name=\"description\"></textarea>\n\
             <button type=\"submit\">Create project</button>\n</form>",
        );
    }
    layout("Projects", &body)
}

/// Project detail: open and closed issues plus the issue form.
#[must_use]
pub fn project_page(overview: &ProjectOverview, manager_view: bool) -> String {
    let project = &overview.project;
    let mut body = String::new();
    body.push_str(project.html());
    if let Some(url) = project.url() {
        body.push_str(&format!(
            "\n<p><a href=\"{}\">{}</a></p>",
            escape(url.as_str()),
            escape(url.as_str())
        ));
    }
    body.push_str(&format!(
        "\n<h2>Open issues</h2>\n<ul>\n{}\n</ul>\n<h2>Closed issues</h2>\n<ul>\n{}\n</ul>",
        issue_list_items(&overview.open),
        issue_list_items(&overview.closed)
    ));
    body.push_str(&format!(
        "\n<form method=\"post\" action=\"{}\">\n\
         <input name=\"name\" placeholder=\"Issue name\">\n\
         <textarea name=\"description\"></textarea>\n\
         <input name=\"email\" placeholder=\"Notification email (optional)\">\n\
         <button type=\"submit\">File issue</button>\n</form>",
        project.path()
    ));
    if manager_view {
        body.push_str(&format!(
            "\n<p><a href=\"{}settings/\">Settings</a> | \
             <a href=\"{}delete/\">Delete project</a></p>",
            project.path(),
            project.path()
        ));
    }
    layout(project.name(), &body)
}

/// Confirmation page for project deletion.
#[must_use]
pub fn project_delete_page(project: &Project, manager_view: bool) -> String {
    let body = if manager_view {
        format!(
            "<p>Delete {} and all of its issues?</p>\n\
             <form method=\"post\" action=\"{}delete/\">\n\
             <button type=\"submit\">Delete</button>\n</form>",
            escape(project.name()),
            project.path()
        )
    } else {
        "<p>Only the project owner can delete it.</p>".to_owned()
    };
    layout("Delete project", &body)
}

/// Owner-only settings form.
#[must_use]
pub fn project_settings_page(project: &Project) -> String {
    let other_users = project
        .other_users()
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");
    let body = format!(
        "<form method=\"post\" action=\"{}settings/\">\n\
         <input name=\"url\" value=\"{}\" placeholder=\"External URL\">\n\
         <input name=\"other_users\" value=\"{}\" placeholder=\"Additional users\">\n\
         <button type=\"submit\">Save settings</button>\n</form>\n\
         <p>Webhook endpoint: <code>{}hook/</code> with key <code>{}</code></p>",
        project.path(),
        escape(project.url().map(url::Url::as_str).unwrap_or("")),
        escape(&other_users),
        project.path(),
        escape(project.hook_secret())
    );
    layout("Project settings", &body)
}

/// Issue detail, with the edit form for managers.
#[must_use]
pub fn issue_page(detail: &IssueDetail, manager_view: bool) -> String {
    let issue = &detail.issue;
    let mut body = format!(
        "<p>{} in <a href=\"{}\">{}</a> - {}</p>\n{}",
        escape(&issue.tag()),
        detail.project.path(),
        escape(detail.project.name()),
        issue.status(),
        issue.html()
    );
    if let Some(fixed_description) = issue.fixed_description() {
        body.push_str(&format!(
            "\n<h2>Fix notes</h2>\n<p>{}</p>",
            escape(fixed_description)
        ));
    }
    if manager_view {
        let checked = if issue.is_fixed() { " checked" } else { "" };
        body.push_str(&format!(
            "\n<form method=\"post\" action=\"{}\">\n\
             <input name=\"name\" value=\"{}\">\n\
             <textarea name=\"description\">{}</textarea>\n\
             <input name=\"email\" value=\"{}\">\n\
             <label><input type=\"checkbox\" name=\"fixed\" value=\"1\"{}> Fixed</label>\n\
             <textarea name=\"fixed_description\">{}</textarea>\n\
             <button type=\"submit\">Save issue</button>\n</form>\n\
             <p><a href=\"{}delete/\">Delete issue</a></p>",
            issue.path(),
            escape(issue.name()),
            escape(issue.description()),
            escape(issue.email().unwrap_or("")),
            checked,
            escape(issue.fixed_description().unwrap_or("")),
            issue.path()
        ));
    }
    layout(issue.name(), &body)
}

/// Confirmation page for issue deletion.
#[must_use]
pub fn issue_delete_page(detail: &IssueDetail, manager_view: bool) -> String {
    let body = if manager_view {
        format!(
            "<p>Delete {} {}?</p>\n\
             <form method=\"post\" action=\"{}delete/\">\n\
             <button type=\"submit\">Delete</button>\n</form>",
            escape(&detail.issue.tag()),
            escape(detail.issue.name()),
            detail.issue.path()
        )
    } else {
        "<p>Only the project owner can delete issues.</p>".to_owned()
    };
    layout("Delete issue", &body)
}

/// Static FAQ page.
#[must_use]
pub fn faq_page() -> String {
    layout(
        "FAQ",
        "<p>File issues against a project and mark them fixed from the web \
         or straight from a commit message: include the issue tag (for \
         example <code>#snag12</code>) anywhere in the message and the \
         post-receive webhook closes the issue for you.</p>",
    )
}

/// Cached 404 page body.
#[must_use]
pub fn not_found_page() -> String {
    layout("Page not found", "<p>Nothing lives at this address.</p>")
}

/// Cached 403 page body.
#[must_use]
pub fn forbidden_page() -> String {
    layout(
        "Not allowed",
        "<p>You do not have permission to view this page.</p>",
    )
}

/// Generic error page for the remaining statuses.
#[must_use]
pub fn error_page(status: u16) -> String {
    layout(
        "Something went wrong",
        &format!("<p>The request could not be completed ({status}).</p>"),
    )
}
