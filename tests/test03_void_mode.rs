use std::time::Duration;

use sql_helper::prelude::*;
use sql_helper::test_utils::{MockProvider, Script, SubmissionKind};

async fn run_void(script: Script, ignore_no_rows_affected: bool) -> Result<(), SystemError> {
    let executor = QueryExecutor::new(MockProvider::new().with_script(script));
    executor
        .execute_void("DELETE FROM boards WHERE id = ?", ignore_no_rows_affected, &[1.into()])
        .await
}

#[tokio::test]
async fn affected_rows_succeed() {
    let provider = MockProvider::new().with_script(Script::new().no_result_set().row_count(1));
    let executor = QueryExecutor::new(provider.clone());

    let outcome = executor
        .execute_void("UPDATE boards SET name = ? WHERE id = ?", false, &["Y".into(), 1.into()])
        .await;
    assert_eq!(outcome, Ok(()));
    assert_eq!(provider.submissions()[0].kind, SubmissionKind::Execute);
}

#[tokio::test]
async fn zero_rows_is_no_data_unless_ignored() {
    let script = Script::new().no_result_set().row_count(0);

    let strict = run_void(script.clone(), false).await.unwrap_err();
    assert_eq!(strict.kind(), ErrorKind::NoData);
    assert_eq!(strict.message(), "No data found");

    assert_eq!(run_void(script, true).await, Ok(()));
}

#[tokio::test]
async fn row_count_before_completion_still_resolves() {
    let script = Script::new().row_count(0).no_result_set();
    let err = run_void(script, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoData);
}

#[tokio::test]
async fn reference_conflict_is_a_deletion_conflict() {
    let script = Script::new().server_error(
        REFERENCE_CONFLICT_CODE,
        "The DELETE statement conflicted with the REFERENCE constraint \"FK_school_board\".",
    );
    let err = run_void(script, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeletionConflict);
    assert!(!err.message().contains("FK_school_board"));
}

#[tokio::test]
async fn other_server_codes_are_query_errors() {
    let err = run_void(Script::new().server_error(2627, "duplicate key"), true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);

    let err = run_void(Script::new().error("connection reset"), true)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);
}

#[tokio::test]
async fn error_preempts_an_already_observed_row_count() {
    let script = Script::new().row_count(3).server_error(547, "conflict");
    let err = run_void(script, false).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DeletionConflict);
}

#[tokio::test]
async fn error_resolves_without_waiting_for_row_count() {
    // the driver never reports anything after the error
    let script = Script::new().error("syntax error").stall();
    let outcome = tokio::time::timeout(Duration::from_secs(5), run_void(script, false)).await;
    let err = outcome.expect("error must resolve immediately").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);
}

#[tokio::test]
async fn success_waits_for_the_row_count() {
    // statement completed but the row count never arrives
    let script = Script::new().no_result_set().stall();
    let outcome = tokio::time::timeout(Duration::from_millis(100), run_void(script, true)).await;
    assert!(outcome.is_err(), "call resolved before the row count arrived");
}

#[tokio::test]
async fn closed_stream_without_row_count_is_a_query_error() {
    let err = run_void(Script::new().no_result_set(), true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);
}
