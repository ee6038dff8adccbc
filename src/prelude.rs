//! Convenient imports for common functionality.

pub use crate::driver::{ConnectionProvider, DriverEvent, DriverSession, EventStream};
pub use crate::entity::{EntityWithId, FromRow};
pub use crate::error::{DriverError, ErrorKind, REFERENCE_CONFLICT_CODE, SystemError};
pub use crate::executor::QueryExecutor;
pub use crate::mssql::{MssqlOptions, MssqlOptionsBuilder, MssqlProvider};
pub use crate::results::{CustomDbRow, ResultSet};
pub use crate::types::RowValues;
