//! The single place where raw driver failures become [`SystemError`]s.
//!
//! Driver diagnostics are logged here and then dropped, so the error surface
//! seen by callers stays fixed.

use tracing::warn;

use crate::error::{DriverError, ErrorKind, REFERENCE_CONFLICT_CODE, SystemError};

pub(crate) fn connection_failure(err: &DriverError) -> SystemError {
    warn!(error = %err, "database connection failed");
    SystemError::new(ErrorKind::ConnectionError)
}

pub(crate) fn query_failure(err: &DriverError) -> SystemError {
    warn!(error = %err, code = ?err.native_code(), "query failed");
    SystemError::new(ErrorKind::QueryError)
}

/// Mutations additionally recognise the referential-integrity conflict code.
pub(crate) fn mutation_failure(err: &DriverError) -> SystemError {
    match err.native_code() {
        Some(REFERENCE_CONFLICT_CODE) => {
            warn!(error = %err, "mutation blocked by a reference constraint");
            SystemError::new(ErrorKind::DeletionConflict)
        }
        _ => query_failure(err),
    }
}

/// The driver answered without error but not in the shape the mode requires.
pub(crate) fn malformed(reason: &str) -> SystemError {
    warn!(reason, "unexpected driver response");
    SystemError::new(ErrorKind::QueryError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_code_only_matters_for_mutations() {
        let fk = DriverError::Server {
            code: REFERENCE_CONFLICT_CODE,
            message: "The DELETE statement conflicted with the REFERENCE constraint".into(),
        };
        assert_eq!(mutation_failure(&fk).kind(), ErrorKind::DeletionConflict);
        assert_eq!(query_failure(&fk).kind(), ErrorKind::QueryError);
    }

    #[test]
    fn other_codes_are_query_errors() {
        let dup = DriverError::Server {
            code: 2627,
            message: "Violation of PRIMARY KEY constraint".into(),
        };
        let err = mutation_failure(&dup);
        assert_eq!(err.kind(), ErrorKind::QueryError);
        assert_eq!(err.message(), "SQL query error");
    }

    #[test]
    fn wrapped_driver_errors_without_a_server_code_are_query_errors() {
        let err = DriverError::Mssql(tiberius::error::Error::Conversion("nvarchar to int".into()));
        assert_eq!(mutation_failure(&err).kind(), ErrorKind::QueryError);
        assert_eq!(query_failure(&err).kind(), ErrorKind::QueryError);
    }

    #[test]
    fn connection_failures_keep_fixed_message() {
        let err = connection_failure(&DriverError::ConnectionError("refused".into()));
        assert_eq!(err.kind(), ErrorKind::ConnectionError);
        assert!(!err.message().contains("refused"));
    }
}
