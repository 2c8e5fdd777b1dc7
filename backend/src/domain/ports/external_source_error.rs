//! Error shape shared by the third-party lookup ports.
//!
//! Email validation, geolocation, and holiday adapters all speak plain HTTP
//! to a hosted API. Their failures fall into the same buckets, and the retry
//! policy only needs to know whether a failure is transient.

use super::define_port_error;

define_port_error! {
    /// Errors surfaced while calling an external lookup service.
    pub enum ExternalSourceError {
        /// The service answered with a 5xx status.
        ServerError { status: u16, message: String } =>
            "external service returned {status}: {message}",
        /// The service rejected the request with a 4xx status.
        ClientError { status: u16, message: String } =>
            "external service rejected request with {status}: {message}",
        /// The request failed before a response arrived.
        Transport { message: String } =>
            "external service transport failed: {message}",
        /// The request exceeded its timeout.
        Timeout { message: String } =>
            "external service timed out: {message}",
        /// The response body did not match the expected contract.
        MalformedResponse { message: String } =>
            "external service response malformed: {message}",
    }
}

impl ExternalSourceError {
    /// Return whether retrying this error is expected to help.
    ///
    /// # Examples
    /// ```
    /// use social_backend::domain::ports::ExternalSourceError;
    ///
    /// assert!(ExternalSourceError::server_error(503_u16, "unavailable").is_transient());
    /// assert!(!ExternalSourceError::client_error(401_u16, "bad key").is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ServerError { .. } | Self::Transport { .. } | Self::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ExternalSourceError::server_error(500_u16, "boom"), true)]
    #[case(ExternalSourceError::server_error(503_u16, "busy"), true)]
    #[case(ExternalSourceError::transport("reset"), true)]
    #[case(ExternalSourceError::timeout("10s"), true)]
    #[case(ExternalSourceError::client_error(400_u16, "bad"), false)]
    #[case(ExternalSourceError::client_error(429_u16, "quota"), false)]
    #[case(ExternalSourceError::malformed_response("no field"), false)]
    fn transient_classification(#[case] error: ExternalSourceError, #[case] expected: bool) {
        assert_eq!(error.is_transient(), expected);
    }

    #[test]
    fn messages_include_status() {
        let error = ExternalSourceError::server_error(503_u16, "Service Unavailable");
        assert_eq!(
            error.to_string(),
            "external service returned 503: Service Unavailable"
        );
    }
}
