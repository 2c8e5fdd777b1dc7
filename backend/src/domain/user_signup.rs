//! Signup use-case and user lookups.
//!
//! Signup is the only path that blocks on an external service: the email
//! validation call. Once the user is stored, enrichment is handed to the
//! background queue and the request completes whatever happens to the job.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::domain::email_validation::EmailValidationService;
use crate::domain::ports::{
    EnrichmentQueue, SignupRequest, UserEnrichmentJob, UserPersistenceError, UserRepository,
    UserSignup, UsersQuery,
};
use crate::domain::{EmailAddress, Error, User, UserId, UserValidationError, Username};

/// Message returned when the validation service rejects an address.
pub const INVALID_EMAIL_MESSAGE: &str = "The email format is not valid";

/// Domain service implementing [`UserSignup`].
#[derive(Clone)]
pub struct UserSignupService {
    users: Arc<dyn UserRepository>,
    email_validation: EmailValidationService,
    queue: Arc<dyn EnrichmentQueue>,
}

impl UserSignupService {
    /// Build the service from its collaborators.
    pub fn new(
        users: Arc<dyn UserRepository>,
        email_validation: EmailValidationService,
        queue: Arc<dyn EnrichmentQueue>,
    ) -> Self {
        Self {
            users,
            email_validation,
            queue,
        }
    }

    async fn ensure_username_available(&self, username: &Username) -> Result<(), Error> {
        let existing = self
            .users
            .find_by_username(username)
            .await
            .map_err(map_persistence_error)?;
        match existing {
            Some(_) => Err(username_taken()),
            None => Ok(()),
        }
    }

    async fn schedule_enrichment(&self, user: &User) {
        let job = UserEnrichmentJob::for_user(*user.id());
        if let Err(dispatch_error) = self.queue.enqueue(job).await {
            error!(
                user_id = %user.id(),
                error = %dispatch_error,
                "failed to enqueue user enrichment; user stays unenriched"
            );
        }
    }
}

#[async_trait]
impl UserSignup for UserSignupService {
    async fn signup(&self, request: SignupRequest) -> Result<User, Error> {
        let SignupRequest {
            username,
            email,
            ip,
        } = request;
        let username = Username::new(username).map_err(|err| field_error("username", &err))?;
        let email = EmailAddress::new(email).map_err(|err| field_error("email", &err))?;

        self.ensure_username_available(&username).await?;

        if !self.email_validation.is_valid_email(&email).await {
            return Err(Error::invalid_request(INVALID_EMAIL_MESSAGE).with_details(json!({
                "field": "email",
                "code": "invalid_email_format",
            })));
        }

        let user = User::register(username, email, ip);
        self.users
            .upsert(&user)
            .await
            .map_err(map_persistence_error)?;
        info!(user_id = %user.id(), "user signed up");

        self.schedule_enrichment(&user).await;
        Ok(user)
    }
}

/// Domain service implementing [`UsersQuery`] on top of the repository.
#[derive(Clone)]
pub struct UserQueryService {
    users: Arc<dyn UserRepository>,
}

impl UserQueryService {
    /// Build the service around a repository.
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

#[async_trait]
impl UsersQuery for UserQueryService {
    async fn find_user(&self, id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(id)
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::not_found(format!("user {id} not found")))
    }
}

fn field_error(field: &str, err: &UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyUsername | UserValidationError::EmptyEmail => "required",
        UserValidationError::UsernameTooLong { .. } | UserValidationError::EmailTooLong { .. } => {
            "too_long"
        }
        _ => "invalid",
    };
    Error::invalid_request(err.to_string()).with_details(json!({
        "field": field,
        "code": code,
    }))
}

fn username_taken() -> Error {
    Error::conflict("A user with that username already exists").with_details(json!({
        "field": "username",
        "code": "unique",
    }))
}

fn map_persistence_error(err: UserPersistenceError) -> Error {
    match err {
        UserPersistenceError::Conflict { .. } => username_taken(),
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user store unavailable: {message}"))
        }
        UserPersistenceError::Query { message } | UserPersistenceError::Corrupt { message } => {
            Error::internal(format!("user store error: {message}"))
        }
    }
}
