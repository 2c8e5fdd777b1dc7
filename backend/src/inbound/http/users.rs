//! Signup and user lookup handlers.
//!
//! ```text
//! POST /api/v1/signup {"username":"ada","email":"ada@example.com"}
//! GET /api/v1/users/{id}
//! ```

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::ports::SignupRequest;
use crate::domain::{ApiResult, Error, User, UserId};
use crate::inbound::http::state::HttpState;

/// Signup request body for `POST /api/v1/signup`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequestBody {
    #[schema(example = "ada")]
    pub username: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
}

/// Body returned by a successful signup.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponseBody {
    #[schema(value_type = String, format = "uuid")]
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&User> for SignupResponseBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
        }
    }
}

/// Stored user including enrichment attributes, `null` until enriched.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(value_type = String, format = "uuid")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[schema(example = "5.29.0.1")]
    pub ip: String,
    pub city: Option<String>,
    pub region: Option<String>,
    #[schema(example = "IL")]
    pub country: Option<String>,
    pub signup_at_holiday: Option<bool>,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            ip: user.ip().to_string(),
            city: user.city().map(str::to_owned),
            region: user.region().map(str::to_owned),
            country: user.country().map(|code| code.to_string()),
            signup_at_holiday: user.signup_at_holiday(),
        }
    }
}

/// Register a new user.
///
/// Blocks on the email format check; location and holiday attributes are
/// filled in by a background job.
#[utoipa::path(
    post,
    path = "/api/v1/signup",
    request_body = SignupRequestBody,
    responses(
        (status = 201, description = "User created", body = SignupResponseBody),
        (status = 400, description = "Invalid request or email format", body = Error),
        (status = 409, description = "Username already taken", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "signup"
)]
#[post("/signup")]
pub async fn signup(
    state: web::Data<HttpState>,
    req: HttpRequest,
    payload: web::Json<SignupRequestBody>,
) -> ApiResult<HttpResponse> {
    let ip = req.peer_addr().map(|addr| addr.ip()).ok_or_else(|| {
        Error::invalid_request("client address unavailable")
            .with_details(json!({ "code": "missing_peer_address" }))
    })?;
    let SignupRequestBody { username, email } = payload.into_inner();

    let user = state
        .signup
        .signup(SignupRequest {
            username,
            email,
            ip,
        })
        .await?;
    Ok(HttpResponse::Created().json(SignupResponseBody::from(&user)))
}

/// Fetch a user by id.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User", body = UserBody),
        (status = 400, description = "Malformed identifier", body = Error),
        (status = 404, description = "Not found", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserBody>> {
    let id = UserId::new(path.into_inner()).map_err(|err| {
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "id", "code": "invalid_id" }))
    })?;
    let user = state.users.find_user(&id).await?;
    Ok(web::Json(UserBody::from(&user)))
}
