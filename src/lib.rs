//! Async data-access helper for SQL Server.
//!
//! [`QueryExecutor`] opens a fresh connection per call, runs one
//! parameterized statement (or insert batch) and adapts the driver's answer
//! into one of four result shapes. Every failure comes back as a
//! [`SystemError`] whose [`ErrorKind`] is the only contract callers (for
//! example an HTTP layer) need to branch on.

pub mod driver;
pub mod entity;
pub mod error;
pub mod executor;
pub mod mssql;
pub mod prelude;
pub mod results;
pub mod translation;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use driver::{ConnectionProvider, DriverEvent, DriverSession, EventStream};
pub use entity::{EntityWithId, FromRow};
pub use error::{DriverError, ErrorKind, REFERENCE_CONFLICT_CODE, SystemError};
pub use executor::QueryExecutor;
pub use results::{CustomDbRow, ResultSet};
pub use types::RowValues;
