//! OpenAPI specification generated from handler annotations via utoipa.

use utoipa::OpenApi;

/// Top-level OpenAPI document for the monitor API.
///
/// Each handler module contributes its own paths and schemas via per-module
/// `#[derive(OpenApi)]` structs that are merged into this root document at
/// startup.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "AP Monitor API",
        description = "Monitoring of WISP access points: reachability, availability and map clustering.",
        version = "0.3.0",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "/", description = "Current server"),
    ),
    tags(
        (name = "access_points", description = "Access point listing, properties and reachability"),
        (name = "map", description = "Clustered map markers and public feed"),
        (name = "health", description = "Health and readiness checks"),
    ),
    components(schemas(ErrorResponse))
)]
pub struct ApiDoc;

/// Standard error response body returned by all endpoints on failure.
#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code (e.g. "NOT_FOUND", "VALIDATION_ERROR")
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

/// Build the merged OpenAPI document from all handler modules.
pub fn build_openapi() -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();

    doc.merge(super::handlers::health::HealthApiDoc::openapi());
    doc.merge(super::handlers::access_points::AccessPointsApiDoc::openapi());
    doc.merge(super::handlers::map::MapApiDoc::openapi());

    doc
}
