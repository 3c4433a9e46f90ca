//! Error types for applink-context.
//!
//! Error messages never include the decoded header, which carries an access
//! token.

/// Result type alias for context operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for context operations.
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

    pub(crate) fn invalid_header(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidHeader(message.into()))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The `x-client-context` header is missing, not base64, or not the
    /// expected JSON document.
    #[error("Invalid x-client-context header: {0}")]
    InvalidHeader(String),

    /// The request-scoped Data API could not be built.
    #[error("Data API error: {0}")]
    DataApi(String),
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::with_source(
            ErrorKind::InvalidHeader(format!("not valid base64: {}", err)),
            err,
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(
            ErrorKind::InvalidHeader(format!("not valid JSON: {}", err)),
            err,
        )
    }
}

impl From<heroku_applink_data_api::Error> for Error {
    fn from(err: heroku_applink_data_api::Error) -> Self {
        Error::with_source(ErrorKind::DataApi(err.to_string()), err)
    }
}
