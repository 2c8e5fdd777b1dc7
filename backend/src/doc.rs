//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the handler annotations from the inbound HTTP layer.
//! The document is served by Swagger UI in debug builds and exported by the
//! `openapi-dump` binary.

use utoipa::OpenApi;

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::users::{SignupRequestBody, SignupResponseBody, UserBody};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Social backend API",
        description = "User signup with background location and holiday enrichment.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::signup,
        crate::inbound::http::users::get_user,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(SignupRequestBody, SignupResponseBody, UserBody, Error, ErrorCode)),
    tags(
        (name = "users", description = "Signup and user lookups"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
