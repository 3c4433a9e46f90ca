//! Error types for the Data API.

use std::fmt;

use crate::reference_id::ReferenceId;

/// Result type alias for Data API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for Data API operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The response body did not have the shape expected for its status code.
    pub fn unexpected_payload(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedPayload(message.into()))
    }

    /// A required record field was absent.
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingField(message.into()))
    }

    /// Returns true if the transport reported a condition worth retrying
    /// (timeouts, dropped connections). This crate never retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Client { retryable: true, .. })
    }

    /// Returns the server-reported errors, if this is a REST API error.
    pub fn api_errors(&self) -> Option<&[InnerSalesforceRestApiError]> {
        match &self.kind {
            ErrorKind::RestApi(err) => Some(&err.api_errors),
            _ => None,
        }
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The transport call itself failed (connection, timeout, protocol).
    #[error("Client error: {message}")]
    Client { message: String, retryable: bool },

    /// The decoded body does not match what the request expects.
    #[error("Unexpected REST API response payload: {0}")]
    UnexpectedPayload(String),

    /// Salesforce answered with a well-formed error list.
    #[error("{0}")]
    RestApi(SalesforceRestApiError),

    /// A record is missing a field the operation requires.
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A request could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<heroku_applink_client::Error> for Error {
    fn from(err: heroku_applink_client::Error) -> Self {
        let kind = ErrorKind::Client {
            message: err.to_string(),
            retryable: err.is_retryable(),
        };
        Error::with_source(kind, err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::UnexpectedPayload(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

impl From<SalesforceRestApiError> for Error {
    fn from(err: SalesforceRestApiError) -> Self {
        Error::new(ErrorKind::RestApi(err))
    }
}

/// One or more errors reported by the Salesforce REST API.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SalesforceRestApiError {
    pub api_errors: Vec<InnerSalesforceRestApiError>,
}

impl SalesforceRestApiError {
    pub fn new(api_errors: Vec<InnerSalesforceRestApiError>) -> Self {
        Self { api_errors }
    }
}

impl fmt::Display for SalesforceRestApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salesforce REST API reported the following error(s):")?;
        for api_error in &self.api_errors {
            write!(f, "\n{}", api_error)?;
        }
        Ok(())
    }
}

impl std::error::Error for SalesforceRestApiError {}

/// A single entry of a Salesforce error list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerSalesforceRestApiError {
    pub message: String,
    pub error_code: String,
    pub fields: Vec<String>,
    /// The composite sub-request this error belongs to, if any.
    pub reference_id: Option<ReferenceId>,
}

impl InnerSalesforceRestApiError {
    pub fn new(
        message: impl Into<String>,
        error_code: impl Into<String>,
        fields: Vec<String>,
    ) -> Self {
        Self {
            message: message.into(),
            error_code: error_code.into(),
            fields,
            reference_id: None,
        }
    }

    /// Attribute this error to a composite sub-request.
    pub fn with_reference_id(mut self, reference_id: ReferenceId) -> Self {
        self.reference_id = Some(reference_id);
        self
    }
}

impl fmt::Display for InnerSalesforceRestApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref reference_id) = self.reference_id {
            write!(f, "[{}] ", reference_id)?;
        }
        write!(f, "{} error: {}", self.error_code, self.message)?;
        if self.fields.is_empty() {
            write!(f, " (fields: none)")
        } else {
            write!(f, " (fields: {})", self.fields.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inner_error_display() {
        let error = InnerSalesforceRestApiError::new(
            "Invalid field",
            "INVALID_FIELD",
            vec!["Name".to_string()],
        );
        let display = error.to_string();
        assert!(display.contains("INVALID_FIELD error"));
        assert!(display.contains("Invalid field"));
        assert!(display.contains("(fields: Name)"));
    }

    #[test]
    fn test_rest_api_error_enumerates_every_entry() {
        let err = Error::from(SalesforceRestApiError::new(vec![
            InnerSalesforceRestApiError::new("Error1", "ERR1", vec![]),
            InnerSalesforceRestApiError::new("Error2", "ERR2", vec!["A".into(), "B".into()]),
        ]));
        let output = err.to_string();

        assert!(output.starts_with("Salesforce REST API reported the following error(s):"));
        assert!(output.contains("\nERR1 error: Error1 (fields: none)"));
        assert!(output.contains("\nERR2 error: Error2 (fields: A, B)"));
        assert_eq!(err.api_errors().map(|e| e.len()), Some(2));
    }

    #[test]
    fn test_reference_id_prefix() {
        let error = InnerSalesforceRestApiError::new("Required", "REQUIRED_FIELD_MISSING", vec![])
            .with_reference_id(ReferenceId::new("referenceId1"));
        assert!(error
            .to_string()
            .starts_with("[referenceId1] REQUIRED_FIELD_MISSING error"));
    }

    #[test]
    fn test_missing_field_and_unexpected_payload() {
        let err = Error::missing_field("Record has no Id");
        assert!(err.to_string().contains("Record has no Id"));
        assert!(err.api_errors().is_none());

        let err = Error::unexpected_payload("Bad JSON format");
        assert!(err.to_string().contains("Bad JSON format"));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_from_client_error() {
        let client_err = heroku_applink_client::Error::new(heroku_applink_client::ErrorKind::Timeout);
        let err: Error = client_err.into();
        assert!(matches!(err.kind, ErrorKind::Client { .. }));
        assert!(err.is_retryable());
        assert!(err.to_string().contains("Request timeout"));
        assert!(err.source.is_some());

        let client_err = heroku_applink_client::Error::new(
            heroku_applink_client::ErrorKind::Other("Connection failed".into()),
        );
        let err: Error = client_err.into();
        assert!(!err.is_retryable());
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("not-valid-json").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err.kind, ErrorKind::UnexpectedPayload(_)));
    }
}
