//! User data model.
//!
//! A user is created at signup with identity fields and the request origin
//! IP. Geolocation and holiday enrichment arrive later, in one piece, from the
//! background enrichment worker.

use std::fmt;
use std::net::IpAddr;

use uuid::Uuid;

/// Maximum allowed length for a username.
pub const USERNAME_MAX: usize = 150;
/// Maximum allowed length for an email address.
pub const EMAIL_MAX: usize = 254;

/// Validation errors returned by user value constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserValidationError {
    /// The identifier was blank.
    #[error("user id must not be empty")]
    EmptyId,
    /// The identifier was not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
    /// The username was blank.
    #[error("username must not be empty")]
    EmptyUsername,
    /// The username exceeded [`USERNAME_MAX`].
    #[error("username must be at most {max} characters")]
    UsernameTooLong { max: usize },
    /// The username contained characters outside the allowed set.
    #[error("username may only contain letters, digits, and @.+-_")]
    UsernameInvalidCharacters,
    /// The email was blank.
    #[error("email must not be empty")]
    EmptyEmail,
    /// The email exceeded [`EMAIL_MAX`].
    #[error("email must be at most {max} characters")]
    EmailTooLong { max: usize },
    /// The country code was not two ASCII letters.
    #[error("country code must be two ASCII letters")]
    InvalidCountryCode,
}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from its string form.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::UserId;
    ///
    /// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
    /// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
    /// ```
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let id = id.as_ref();
        if id.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID, for example one read back from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Login name chosen at signup.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`].
    pub fn new(username: impl Into<String>) -> Result<Self, UserValidationError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        if username.chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX });
        }
        let allowed = |c: char| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_');
        if !username.chars().all(allowed) {
            return Err(UserValidationError::UsernameInvalidCharacters);
        }
        Ok(Self(username))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Email address as typed by the user.
///
/// Only presence and length are checked locally; format validity is decided
/// by the external email validation service during signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Construct an [`EmailAddress`], trimming surrounding whitespace.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let email = email.as_ref().trim();
        if email.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if email.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        Ok(Self(email.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// ISO 3166-1 alpha-2 country code, stored upper-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Parse a two-letter country code.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::CountryCode;
    ///
    /// let code = CountryCode::new("il").expect("valid code");
    /// assert_eq!(code.as_str(), "IL");
    /// assert!(CountryCode::new("ISR").is_err());
    /// ```
    pub fn new(code: impl AsRef<str>) -> Result<Self, UserValidationError> {
        match code.as_ref().as_bytes() {
            [first, second] if first.is_ascii_alphabetic() && second.is_ascii_alphabetic() => Ok(
                Self([first.to_ascii_uppercase(), second.to_ascii_uppercase()]),
            ),
            _ => Err(UserValidationError::InvalidCountryCode),
        }
    }

    /// Borrow the code as a string slice.
    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII letters by construction.
        std::str::from_utf8(&self.0).unwrap_or("")
    }
}

impl fmt::Display for CountryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geolocation and holiday attributes attached to a user after signup.
///
/// The four values are produced by one enrichment run and always travel
/// together; a user either has all of them or none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEnrichment {
    /// City reported by the geolocation service, when known.
    pub city: Option<String>,
    /// Region reported by the geolocation service, when known.
    pub region: Option<String>,
    /// Resolved country.
    pub country: CountryCode,
    /// Whether the local signup date was a public holiday in `country`.
    pub signup_at_holiday: bool,
}

/// Errors raised when applying enrichment to a user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnrichmentError {
    /// The user already carries enrichment data.
    #[error("user {user_id} is already enriched")]
    AlreadyEnriched { user_id: UserId },
}

/// Application user.
///
/// ## Invariants
/// - `ip` is set at creation and never changes.
/// - enrichment is written at most once, as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    username: Username,
    email: EmailAddress,
    ip: IpAddr,
    enrichment: Option<UserEnrichment>,
}

impl User {
    /// Create a freshly signed-up user with a random identifier and no
    /// enrichment.
    pub fn register(username: Username, email: EmailAddress, ip: IpAddr) -> Self {
        Self {
            id: UserId::random(),
            username,
            email,
            ip,
            enrichment: None,
        }
    }

    /// Rebuild a user from stored components.
    pub fn from_parts(
        id: UserId,
        username: Username,
        email: EmailAddress,
        ip: IpAddr,
        enrichment: Option<UserEnrichment>,
    ) -> Self {
        Self {
            id,
            username,
            email,
            ip,
            enrichment,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Login name.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Email address accepted at signup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Address the signup request originated from.
    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    /// Enrichment data, if the background run has completed.
    pub fn enrichment(&self) -> Option<&UserEnrichment> {
        self.enrichment.as_ref()
    }

    /// City, or `None` while unenriched or when the service did not know it.
    pub fn city(&self) -> Option<&str> {
        self.enrichment.as_ref().and_then(|e| e.city.as_deref())
    }

    /// Region, or `None` while unenriched or when the service did not know it.
    pub fn region(&self) -> Option<&str> {
        self.enrichment.as_ref().and_then(|e| e.region.as_deref())
    }

    /// Country, or `None` while unenriched.
    pub fn country(&self) -> Option<CountryCode> {
        self.enrichment.as_ref().map(|e| e.country)
    }

    /// Tri-state holiday flag: `None` while unenriched.
    pub fn signup_at_holiday(&self) -> Option<bool> {
        self.enrichment.as_ref().map(|e| e.signup_at_holiday)
    }

    /// Attach enrichment data.
    ///
    /// # Errors
    ///
    /// Returns [`EnrichmentError::AlreadyEnriched`] when data is already
    /// present; enrichment is immutable once written.
    pub fn enrich(&mut self, enrichment: UserEnrichment) -> Result<(), EnrichmentError> {
        if self.enrichment.is_some() {
            return Err(EnrichmentError::AlreadyEnriched { user_id: self.id });
        }
        self.enrichment = Some(enrichment);
        Ok(())
    }
}
