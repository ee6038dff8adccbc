use std::borrow::Cow;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// SQL Server error number raised when a statement violates a foreign-key
/// (or other referential) constraint.
pub const REFERENCE_CONFLICT_CODE: u32 = 547;

pub(crate) const CONNECTION_ERROR_MESSAGE: &str = "DB server connection error";
pub(crate) const QUERY_ERROR_MESSAGE: &str = "SQL query error";
pub(crate) const NO_DATA_MESSAGE: &str = "No data found";
pub(crate) const DELETION_CONFLICT_MESSAGE: &str =
    "Delete failed: record is referenced by other data";

/// Closed set of outcomes callers of the executor have to handle.
///
/// The HTTP boundary maps these to status codes; nothing in this crate does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The database could not be reached.
    ConnectionError,
    /// The statement failed, or the driver answered with an unexpected shape.
    QueryError,
    /// The statement succeeded but produced nothing where something was required.
    NoData,
    /// A mutation was blocked by a referential-integrity rule.
    DeletionConflict,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::QueryError => "QueryError",
            ErrorKind::NoData => "NoData",
            ErrorKind::DeletionConflict => "DeletionConflict",
        }
    }

    /// The fixed, human-readable message attached to every error of this kind.
    #[must_use]
    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::ConnectionError => CONNECTION_ERROR_MESSAGE,
            ErrorKind::QueryError => QUERY_ERROR_MESSAGE,
            ErrorKind::NoData => NO_DATA_MESSAGE,
            ErrorKind::DeletionConflict => DELETION_CONFLICT_MESSAGE,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified failure, the only error the executor hands back.
///
/// Built once where the raw driver signal is interpreted and passed through
/// unchanged afterwards; there are no setters.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{code}: {message}")]
pub struct SystemError {
    code: ErrorKind,
    message: Cow<'static, str>,
}

impl SystemError {
    /// Create an error carrying the fixed message for `kind`.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            code: kind,
            message: Cow::Borrowed(kind.default_message()),
        }
    }

    /// Create an error with a caller-supplied message.
    ///
    /// An empty message falls back to the kind's fixed message so a surfaced
    /// error is never blank.
    #[must_use]
    pub fn with_message(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            return Self::new(kind);
        }
        Self {
            code: kind,
            message,
        }
    }

    #[must_use]
    pub fn connection() -> Self {
        Self::new(ErrorKind::ConnectionError)
    }

    #[must_use]
    pub fn query() -> Self {
        Self::new(ErrorKind::QueryError)
    }

    #[must_use]
    pub fn no_data() -> Self {
        Self::new(ErrorKind::NoData)
    }

    #[must_use]
    pub fn deletion_conflict() -> Self {
        Self::new(ErrorKind::DeletionConflict)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.code
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Raw, unclassified failures reported by a driver adapter.
///
/// These never leave the crate through the executor; they are classified into
/// a [`SystemError`] first.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error(transparent)]
    Mssql(#[from] tiberius::error::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Server error {code}: {message}")]
    Server { code: u32, message: String },

    #[error("SQL execution error: {0}")]
    ExecutionError(String),

    #[error("Row mapping error: {0}")]
    RowMapping(String),
}

impl DriverError {
    /// The driver's native error number, when the failure came from the server.
    #[must_use]
    pub fn native_code(&self) -> Option<u32> {
        match self {
            DriverError::Server { code, .. } => Some(*code),
            DriverError::Mssql(err) => err.code(),
            _ => None,
        }
    }
}
