//! The opaque driver capability the executor runs against.
//!
//! A driver adapter only has to open sessions and turn one submitted batch
//! into a stream of [`DriverEvent`]s. Everything about interpreting those
//! events lives in [`crate::executor`].

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::DriverError;
use crate::results::ResultSet;
use crate::types::RowValues;

/// Notifications a driver reports for one submitted batch.
#[derive(Debug)]
pub enum DriverEvent {
    /// A statement of the batch finished, in submission order. `rows` is
    /// `None` when the driver reported no result set for it.
    StatementDone { rows: Option<ResultSet> },
    /// Affected-row count. Delivered on its own channel, so it may arrive
    /// before or after the matching `StatementDone`.
    RowCount(u64),
    /// Driver-level failure. Nothing after it is meaningful.
    Failed(DriverError),
}

/// Events of one submission. The end of the stream is itself a signal: the
/// driver has nothing more to say about the batch.
pub type EventStream<'a> = BoxStream<'a, DriverEvent>;

/// A single-use connection owned by one executor call.
pub trait DriverSession: Send {
    /// Submit a batch expected to produce result sets.
    fn query<'a>(&'a mut self, sql: &'a str, params: &'a [RowValues]) -> EventStream<'a>;

    /// Submit a mutation; the interesting signal is the affected-row count.
    fn execute<'a>(&'a mut self, sql: &'a str, params: &'a [RowValues]) -> EventStream<'a>;
}

/// Opens a fresh session per call. Implementations must not pool or retry.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    type Session: DriverSession;

    /// # Errors
    ///
    /// Returns a `DriverError` when the connection cannot be established.
    async fn open(&self) -> Result<Self::Session, DriverError>;
}

#[async_trait]
impl<P: ConnectionProvider + ?Sized> ConnectionProvider for std::sync::Arc<P> {
    type Session = P::Session;

    async fn open(&self) -> Result<Self::Session, DriverError> {
        (**self).open().await
    }
}
