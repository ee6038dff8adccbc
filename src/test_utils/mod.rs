//! Scripted stand-in for a database, for tests and benches.
//!
//! Each `open` consumes the next queued [`Script`]; the session replays it as
//! driver events no matter what SQL is submitted, and records the submission.

mod mock;

pub use mock::{MockProvider, MockSession, Script, Submission, SubmissionKind};
