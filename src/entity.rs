//! Mapping of driver rows into caller types.

use crate::error::DriverError;
use crate::results::CustomDbRow;

/// Build a value of `Self` from one result row.
///
/// Any error returned here is reported to the caller as a query error.
///
/// ```rust
/// use sql_helper::prelude::*;
///
/// struct Board {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for Board {
///     fn from_row(row: &CustomDbRow) -> Result<Self, DriverError> {
///         Ok(Board {
///             id: row.column_int("id")?,
///             name: row.column_text("name")?.to_string(),
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// # Errors
    ///
    /// Returns `DriverError::RowMapping` when the row does not have the expected shape.
    fn from_row(row: &CustomDbRow) -> Result<Self, DriverError>;
}

impl FromRow for CustomDbRow {
    fn from_row(row: &CustomDbRow) -> Result<Self, DriverError> {
        Ok(row.clone())
    }
}

impl FromRow for serde_json::Value {
    fn from_row(row: &CustomDbRow) -> Result<Self, DriverError> {
        Ok(row.to_json())
    }
}

/// A domain record whose integer identity is generated by the database on insert.
///
/// The id starts out unset and is written exactly once, by
/// [`QueryExecutor::create_new`](crate::executor::QueryExecutor::create_new).
pub trait EntityWithId {
    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
}

impl CustomDbRow {
    /// Required integer column, for use inside [`FromRow`] impls.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::RowMapping` if the column is missing or not a whole number.
    pub fn column_int(&self, column: &str) -> Result<i64, DriverError> {
        self.get(column)
            .and_then(crate::types::RowValues::as_whole_number)
            .ok_or_else(|| DriverError::RowMapping(format!("column `{column}` is not an integer")))
    }

    /// Required text column, for use inside [`FromRow`] impls.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::RowMapping` if the column is missing or not text.
    pub fn column_text(&self, column: &str) -> Result<&str, DriverError> {
        self.get(column)
            .and_then(crate::types::RowValues::as_text)
            .ok_or_else(|| DriverError::RowMapping(format!("column `{column}` is not text")))
    }
}
