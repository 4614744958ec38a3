//! OpenAPI document for the JSON feed surface.

use utoipa::OpenApi;

use crate::domain::error::{Error, ErrorCode};
use crate::inbound::http::feeds::{IssueJson, ProjectJson};

/// Public OpenAPI surface served by Swagger UI in debug builds.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::feeds::project_json,
        crate::inbound::http::feeds::issue_json,
    ),
    components(schemas(ProjectJson, IssueJson, Error, ErrorCode)),
    tags((name = "feeds", description = "Machine-readable project and issue feeds"))
)]
pub struct ApiDoc;
