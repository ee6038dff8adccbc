//! Query execution: one fresh connection per call, four result shapes, and
//! a classified [`SystemError`] for every failure.
//!
//! Every call runs `open → submit → adapt` and resolves exactly once. A
//! connection failure stops the call before anything is submitted.

mod classify;
mod gate;

use futures_util::StreamExt;
use tracing::debug;

use crate::driver::{ConnectionProvider, DriverEvent, DriverSession, EventStream};
use crate::entity::{EntityWithId, FromRow};
use crate::error::SystemError;
use crate::results::ResultSet;
use crate::types::RowValues;

use gate::{MutationGate, StatementCounter};

/// Statement appended to inserts so the generated identity comes back in the
/// same batch, and therefore the same session scope, as the insert.
pub const SELECT_IDENTITY: &str = "SELECT SCOPE_IDENTITY() AS id";

/// Column the identity statement reports the generated value under.
pub const IDENTITY_COLUMN: &str = "id";

const IDENTITY_BATCH_STATEMENTS: usize = 2;

/// Runs parameterized statements through a [`ConnectionProvider`].
///
/// The executor holds no state between calls; share it freely (for instance
/// behind an `Arc`) and call it concurrently.
///
/// ```rust,no_run
/// use sql_helper::prelude::*;
///
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = MssqlProvider::new(MssqlOptions::from_env()?)?;
/// let executor = QueryExecutor::new(provider);
/// let board: serde_json::Value = executor
///     .execute_single("SELECT * FROM boards WHERE id = ?", &[42.into()])
///     .await?;
/// # let _ = board;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct QueryExecutor<P> {
    provider: P,
}

impl<P: ConnectionProvider> QueryExecutor<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    async fn connect(&self) -> Result<P::Session, SystemError> {
        self.provider
            .open()
            .await
            .map_err(|err| classify::connection_failure(&err))
    }

    /// Run `query` and map every returned row.
    ///
    /// A driver that reports no result set at all yields an empty list.
    ///
    /// # Errors
    ///
    /// `ConnectionError` if no connection could be opened, `QueryError` for
    /// any driver or row-mapping failure.
    pub async fn execute_list<T: FromRow>(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<Vec<T>, SystemError> {
        let mut session = self.connect().await?;
        debug!(mode = "list", params = params.len(), "submitting query");
        let rows = first_result(session.query(query, params)).await?;

        match rows {
            Some(set) => map_rows(&set),
            None => Ok(Vec::new()),
        }
    }

    /// Run `query` and map its first row.
    ///
    /// Extra rows are tolerated and ignored; callers are trusted to select at
    /// most one row.
    ///
    /// # Errors
    ///
    /// `ConnectionError` if no connection could be opened, `QueryError` for
    /// any driver or row-mapping failure, `NoData` when there is no row (or no
    /// result set).
    pub async fn execute_single<T: FromRow>(
        &self,
        query: &str,
        params: &[RowValues],
    ) -> Result<T, SystemError> {
        let mut session = self.connect().await?;
        debug!(mode = "single", params = params.len(), "submitting query");
        let rows = first_result(session.query(query, params)).await?;

        let Some(set) = rows else {
            return Err(SystemError::no_data());
        };
        let Some(row) = set.first() else {
            return Err(SystemError::no_data());
        };
        if set.len() > 1 {
            debug!(rows = set.len(), "single-row query returned several rows, using the first");
        }
        T::from_row(row).map_err(|err| classify::query_failure(&err))
    }

    /// Run a mutation and check its affected-row count.
    ///
    /// Success is only reported after both the statement completion and the
    /// row count have been seen; a failure resolves as soon as it arrives.
    ///
    /// # Errors
    ///
    /// `ConnectionError` if no connection could be opened, `DeletionConflict`
    /// for a referential-integrity violation, `QueryError` for any other driver
    /// failure, `NoData` when zero rows were affected and
    /// `ignore_no_rows_affected` is false.
    pub async fn execute_void(
        &self,
        query: &str,
        ignore_no_rows_affected: bool,
        params: &[RowValues],
    ) -> Result<(), SystemError> {
        let mut session = self.connect().await?;
        debug!(mode = "void", params = params.len(), "submitting mutation");
        let mut events = session.execute(query, params);
        let mut gate = MutationGate::new(ignore_no_rows_affected);

        while let Some(event) = events.next().await {
            if let Some(outcome) = gate.observe(event) {
                return outcome;
            }
        }
        gate.finish()
    }

    /// Run an insert followed by [`SELECT_IDENTITY`] in one batch and write the
    /// generated identity into `original`.
    ///
    /// On failure `original` is left untouched.
    ///
    /// # Errors
    ///
    /// `ConnectionError` if no connection could be opened; `QueryError` for a
    /// driver failure at either statement, or when the identity result is
    /// missing or does not hold exactly one row.
    pub async fn create_new<'e, E: EntityWithId>(
        &self,
        query: &str,
        original: &'e mut E,
        params: &[RowValues],
    ) -> Result<&'e mut E, SystemError> {
        let batch = identity_batch(query);
        let mut session = self.connect().await?;
        debug!(mode = "create", params = params.len(), "submitting insert batch");
        let mut events = session.query(&batch, params);
        let mut counter = StatementCounter::new(IDENTITY_BATCH_STATEMENTS);

        let rows = loop {
            match events.next().await {
                Some(event) => {
                    if let Some(outcome) = counter.observe(event) {
                        break outcome?;
                    }
                }
                None => return Err(counter.finish()),
            }
        };

        let id = identity_from(rows.as_ref())?;
        original.set_id(id);
        debug!(id, "insert produced identity");
        Ok(original)
    }
}

/// Wait for the first result set of a row-producing query.
///
/// Statements without a result set are skipped. `Ok(None)` means the stream
/// ended without any statement reporting one.
async fn first_result(mut events: EventStream<'_>) -> Result<Option<ResultSet>, SystemError> {
    while let Some(event) = events.next().await {
        match event {
            DriverEvent::Failed(err) => return Err(classify::query_failure(&err)),
            DriverEvent::StatementDone { rows: Some(set) } => return Ok(Some(set)),
            DriverEvent::StatementDone { rows: None } | DriverEvent::RowCount(_) => {}
        }
    }
    Ok(None)
}

fn map_rows<T: FromRow>(set: &ResultSet) -> Result<Vec<T>, SystemError> {
    set.results
        .iter()
        .map(T::from_row)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| classify::query_failure(&err))
}

fn identity_batch(query: &str) -> String {
    let statement = query.trim_end().trim_end_matches(';').trim_end();
    format!("{statement}\n;{SELECT_IDENTITY}")
}

fn identity_from(rows: Option<&ResultSet>) -> Result<i64, SystemError> {
    let Some(set) = rows else {
        return Err(classify::malformed("identity statement returned no result set"));
    };
    if set.len() != 1 {
        return Err(classify::malformed("identity result did not hold exactly one row"));
    }
    set.first()
        .and_then(|row| row.get(IDENTITY_COLUMN))
        .and_then(RowValues::as_whole_number)
        .ok_or_else(|| classify::malformed("identity value missing or not an integer"))
}
