mod common;

use common::{BOARD_COLUMNS, Board, board_row};
use sql_helper::prelude::*;
use sql_helper::test_utils::{MockProvider, Script, SubmissionKind};

#[tokio::test]
async fn list_returns_rows_in_driver_order() -> Result<(), SystemError> {
    let provider = MockProvider::new().with_script(Script::new().table(
        BOARD_COLUMNS,
        vec![board_row(3, "C"), board_row(1, "A"), board_row(2, "B")],
    ));
    let executor = QueryExecutor::new(provider.clone());

    let boards: Vec<Board> = executor
        .execute_list("SELECT id, name FROM boards", &[])
        .await?;

    let names: Vec<&str> = boards.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["C", "A", "B"]);
    assert_eq!(boards[0].id, Some(3));

    let submissions = provider.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].kind, SubmissionKind::Query);
    Ok(())
}

#[tokio::test]
async fn empty_result_set_is_an_empty_list() -> Result<(), SystemError> {
    let provider = MockProvider::new().with_script(Script::new().table(BOARD_COLUMNS, vec![]));
    let executor = QueryExecutor::new(provider);

    let boards: Vec<Board> = executor.execute_list("SELECT * FROM boards", &[]).await?;
    assert!(boards.is_empty());
    Ok(())
}

#[tokio::test]
async fn missing_result_set_is_an_empty_list() -> Result<(), SystemError> {
    let executor = QueryExecutor::new(MockProvider::new().with_script(Script::new().no_result_set()));
    let boards: Vec<Board> = executor.execute_list("EXEC dbo.noop", &[]).await?;
    assert!(boards.is_empty());

    // a driver that closes the batch without reporting any statement
    let executor = QueryExecutor::new(MockProvider::new().with_script(Script::new()));
    let rows: Vec<CustomDbRow> = executor.execute_list("EXEC dbo.noop", &[]).await?;
    assert!(rows.is_empty());
    Ok(())
}

#[tokio::test]
async fn driver_error_is_a_query_error_without_diagnostics() {
    let provider = MockProvider::new()
        .with_script(Script::new().server_error(208, "Invalid object name 'bords'."));
    let executor = QueryExecutor::new(provider);

    let err = executor
        .execute_list::<Board>("SELECT * FROM bords", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);
    assert_eq!(err.message(), "SQL query error");
}

#[tokio::test]
async fn unmappable_row_is_a_query_error() {
    let provider = MockProvider::new().with_script(
        Script::new().table(&["id", "title"], vec![vec![RowValues::Int(1), RowValues::Text("x".into())]]),
    );
    let executor = QueryExecutor::new(provider);

    let err = executor
        .execute_list::<Board>("SELECT id, title FROM boards", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::QueryError);
}

#[tokio::test]
async fn params_are_passed_through_positionally() -> Result<(), SystemError> {
    let provider = MockProvider::new().with_script(Script::new().table(BOARD_COLUMNS, vec![]));
    let executor = QueryExecutor::new(provider.clone());

    let _: Vec<serde_json::Value> = executor
        .execute_list(
            "SELECT * FROM boards WHERE name = ? AND id > ?",
            &["Whiteboard".into(), 10.into()],
        )
        .await?;

    let submission = &provider.submissions()[0];
    assert_eq!(submission.sql, "SELECT * FROM boards WHERE name = ? AND id > ?");
    assert_eq!(
        submission.params,
        vec![RowValues::Text("Whiteboard".into()), RowValues::Int(10)]
    );
    Ok(())
}

#[tokio::test]
async fn rowless_statement_before_the_rows_is_skipped() -> Result<(), SystemError> {
    let provider = MockProvider::new().with_script(
        Script::new()
            .no_result_set()
            .table(BOARD_COLUMNS, vec![board_row(1, "A"), board_row(2, "B")]),
    );
    let executor = QueryExecutor::new(provider);

    let boards: Vec<Board> = executor
        .execute_list(
            "SELECT id, name FROM boards; UPDATE audit SET n = n + 1",
            &[],
        )
        .await?;
    assert_eq!(boards.len(), 2);
    assert_eq!(boards[1].name, "B");
    Ok(())
}
