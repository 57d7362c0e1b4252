//! Error types for groundwork
//!
//! Every contract reports failures through [`Error`]. Callers that need to
//! branch on the failure class match on [`Error::kind`] instead of comparing
//! messages.

use thiserror::Error;

/// Closed set of failure classes shared by all contracts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The addressed resource does not exist. Not an operational fault.
    NotFound,
    /// A cache key exists but holds the nil sentinel
    NilValue,
    /// Backend-local failure (connect, upload, download, stats)
    OperationFailed,
    /// The governing context was cancelled or its deadline passed
    Cancellation,
    /// The caller passed something the contract rejects
    MalformedInput,
    /// The instance was closed before the call
    Closed,
    /// Settings could not be loaded or are invalid
    Configuration,
    /// Anything else
    Internal,
}

/// General groundwork error type
#[derive(Debug, Error)]
pub enum Error {
    #[error("{scope}: not found: {name}")]
    NotFound { scope: &'static str, name: String },

    #[error("cache: nil")]
    CacheNil,

    #[error("{scope}: connect is failed: {reason}")]
    ConnectFailed { scope: &'static str, reason: String },

    #[error("bucket: failed to upload '{name}': {reason}")]
    UploadFailed { name: String, reason: String },

    #[error("bucket: failed to download '{name}': {reason}")]
    DownloadFailed { name: String, reason: String },

    #[error("bucket: failed to get stats for '{name}': {reason}")]
    StatsFailed { name: String, reason: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}: already closed")]
    Closed(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<Error>),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::NotFound`]
    pub fn not_found(scope: &'static str, name: impl Into<String>) -> Self {
        Error::NotFound {
            scope,
            name: name.into(),
        }
    }

    /// Shorthand for [`Error::InvalidInput`]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput(reason.into())
    }

    /// Failure class of this error.
    ///
    /// For [`Error::Multiple`] the kind of the first error wins.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound { .. } => ErrorKind::NotFound,
            Error::CacheNil => ErrorKind::NilValue,
            Error::ConnectFailed { .. }
            | Error::UploadFailed { .. }
            | Error::DownloadFailed { .. }
            | Error::StatsFailed { .. }
            | Error::Io(_) => ErrorKind::OperationFailed,
            Error::Cancelled | Error::DeadlineExceeded => ErrorKind::Cancellation,
            Error::InvalidInput(_) => ErrorKind::MalformedInput,
            Error::Closed(_) => ErrorKind::Closed,
            Error::Config(_) | Error::Json(_) | Error::Yaml(_) => ErrorKind::Configuration,
            Error::Multiple(errors) => errors
                .first()
                .map(Error::kind)
                .unwrap_or(ErrorKind::Internal),
            Error::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may reasonably retry
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::OperationFailed
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_cancellation(&self) -> bool {
        self.kind() == ErrorKind::Cancellation
    }

    /// Collapse a list of errors: none is `Ok`, one is itself, more become
    /// [`Error::Multiple`].
    pub fn collect(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multiple(errors)),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds() {
        assert_eq!(Error::not_found("cache", "k").kind(), ErrorKind::NotFound);
        assert_eq!(Error::CacheNil.kind(), ErrorKind::NilValue);
        assert_eq!(Error::DeadlineExceeded.kind(), ErrorKind::Cancellation);
        assert_eq!(Error::invalid_input("odd").kind(), ErrorKind::MalformedInput);
        assert_eq!(Error::Closed("cache").kind(), ErrorKind::Closed);
    }

    #[test]
    fn test_operation_failures_are_retryable() {
        let err = Error::UploadFailed {
            name: "a.txt".to_string(),
            reason: "short read".to_string(),
        };
        assert!(err.is_retryable());
        assert!(!Error::not_found("bucket", "a.txt").is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::CacheNil.to_string(), "cache: nil");
        assert_eq!(
            Error::not_found("bucket", "img.png").to_string(),
            "bucket: not found: img.png"
        );
    }

    #[test]
    fn test_collect() {
        assert!(Error::collect(vec![]).is_ok());

        let single = Error::collect(vec![Error::Cancelled]).unwrap_err();
        assert!(matches!(single, Error::Cancelled));

        let many = Error::collect(vec![Error::Closed("a"), Error::Cancelled]).unwrap_err();
        assert_eq!(many.kind(), ErrorKind::Closed);
        assert_eq!(many.to_string(), "a: already closed; operation cancelled");
    }
}
