use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;

use crate::driver::{ConnectionProvider, DriverEvent, DriverSession, EventStream};
use crate::error::DriverError;
use crate::results::ResultSet;
use crate::types::RowValues;

#[derive(Debug, Clone)]
enum ScriptedEvent {
    Statement(Option<ResultSet>),
    RowCount(u64),
    ServerError { code: u32, message: String },
    Error(String),
}

impl ScriptedEvent {
    fn to_event(&self) -> DriverEvent {
        match self {
            ScriptedEvent::Statement(rows) => DriverEvent::StatementDone { rows: rows.clone() },
            ScriptedEvent::RowCount(count) => DriverEvent::RowCount(*count),
            ScriptedEvent::ServerError { code, message } => DriverEvent::Failed(DriverError::Server {
                code: *code,
                message: message.clone(),
            }),
            ScriptedEvent::Error(message) => {
                DriverEvent::Failed(DriverError::ExecutionError(message.clone()))
            }
        }
    }
}

/// The events one session will report, in order.
#[derive(Debug, Clone, Default)]
pub struct Script {
    events: Vec<ScriptedEvent>,
    stall: bool,
}

impl Script {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A statement completing with the given result set.
    #[must_use]
    pub fn rows(mut self, set: ResultSet) -> Self {
        self.events.push(ScriptedEvent::Statement(Some(set)));
        self
    }

    /// Shorthand for [`Script::rows`] from plain columns and values.
    #[must_use]
    pub fn table(self, columns: &[&str], rows: Vec<Vec<RowValues>>) -> Self {
        let columns = columns.iter().map(|c| (*c).to_string()).collect();
        self.rows(ResultSet::from_rows(columns, rows))
    }

    /// A statement completing without any result set.
    #[must_use]
    pub fn no_result_set(mut self) -> Self {
        self.events.push(ScriptedEvent::Statement(None));
        self
    }

    #[must_use]
    pub fn row_count(mut self, count: u64) -> Self {
        self.events.push(ScriptedEvent::RowCount(count));
        self
    }

    /// A server error carrying a native error number.
    #[must_use]
    pub fn server_error(mut self, code: u32, message: &str) -> Self {
        self.events.push(ScriptedEvent::ServerError {
            code,
            message: message.to_string(),
        });
        self
    }

    /// A driver error without a native code.
    #[must_use]
    pub fn error(mut self, message: &str) -> Self {
        self.events.push(ScriptedEvent::Error(message.to_string()));
        self
    }

    /// Keep the stream open forever after the scripted events, like a driver
    /// that never reports anything else.
    #[must_use]
    pub fn stall(mut self) -> Self {
        self.stall = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionKind {
    Query,
    Execute,
}

/// What a session was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub kind: SubmissionKind,
    pub sql: String,
    pub params: Vec<RowValues>,
}

#[derive(Debug, Default)]
struct MockState {
    unreachable: bool,
    scripts: Mutex<VecDeque<Script>>,
    repeat: Option<Script>,
    submissions: Mutex<Vec<Submission>>,
    opens: AtomicUsize,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Fake [`ConnectionProvider`] driven by queued scripts.
///
/// Clones share state, so a test can keep one handle for assertions.
#[derive(Debug, Clone, Default)]
pub struct MockProvider {
    state: Arc<MockState>,
}

impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `open` fails with a connection error.
    #[must_use]
    pub fn unreachable() -> Self {
        Self {
            state: Arc::new(MockState {
                unreachable: true,
                ..MockState::default()
            }),
        }
    }

    /// Every `open` replays the same script.
    #[must_use]
    pub fn repeating(script: Script) -> Self {
        Self {
            state: Arc::new(MockState {
                repeat: Some(script),
                ..MockState::default()
            }),
        }
    }

    /// Queue a script for the next unscripted `open`.
    #[must_use]
    pub fn with_script(self, script: Script) -> Self {
        self.push_script(script);
        self
    }

    pub fn push_script(&self, script: Script) {
        lock(&self.state.scripts).push_back(script);
    }

    /// Number of connections opened (or attempted) so far.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn submissions(&self) -> Vec<Submission> {
        lock(&self.state.submissions).clone()
    }
}

#[async_trait]
impl ConnectionProvider for MockProvider {
    type Session = MockSession;

    async fn open(&self) -> Result<MockSession, DriverError> {
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.state.unreachable {
            return Err(DriverError::ConnectionError(
                "mock server is unreachable".to_string(),
            ));
        }

        let script = lock(&self.state.scripts)
            .pop_front()
            .or_else(|| self.state.repeat.clone())
            .unwrap_or_default();
        Ok(MockSession {
            script,
            state: Arc::clone(&self.state),
        })
    }
}

/// Session handed out by [`MockProvider`].
#[derive(Debug)]
pub struct MockSession {
    script: Script,
    state: Arc<MockState>,
}

impl MockSession {
    fn replay<'a>(&'a mut self, kind: SubmissionKind, sql: &str, params: &[RowValues]) -> EventStream<'a> {
        lock(&self.state.submissions).push(Submission {
            kind,
            sql: sql.to_string(),
            params: params.to_vec(),
        });

        let events: Vec<DriverEvent> = self.script.events.iter().map(ScriptedEvent::to_event).collect();
        let replay = stream::iter(events).then(|event| async move {
            tokio::task::yield_now().await;
            event
        });

        if self.script.stall {
            replay.chain(stream::pending()).boxed()
        } else {
            replay.boxed()
        }
    }
}

impl DriverSession for MockSession {
    fn query<'a>(&'a mut self, sql: &'a str, params: &'a [RowValues]) -> EventStream<'a> {
        self.replay(SubmissionKind::Query, sql, params)
    }

    fn execute<'a>(&'a mut self, sql: &'a str, params: &'a [RowValues]) -> EventStream<'a> {
        self.replay(SubmissionKind::Execute, sql, params)
    }
}
