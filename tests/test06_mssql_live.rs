//! Runs against a real SQL Server when `TESTING_MSSQL_CONNECTION_STRING` is set,
//! e.g. `Server=tcp:localhost,1433;User Id=sa;Password=...;TrustServerCertificate=true`.

mod common;

use common::Board;
use sql_helper::prelude::*;

fn live_executor() -> Option<QueryExecutor<MssqlProvider>> {
    let opts = MssqlOptions::from_env_var("TESTING_MSSQL_CONNECTION_STRING").ok()?;
    let provider = MssqlProvider::new(opts.with_trust_cert(true)).ok()?;
    Some(QueryExecutor::new(provider))
}

#[tokio::test]
async fn live_round_trip() -> Result<(), SystemError> {
    let Some(executor) = live_executor() else {
        eprintln!("TESTING_MSSQL_CONNECTION_STRING not set, skipping");
        return Ok(());
    };

    executor
        .execute_void(
            "IF OBJECT_ID('dbo.sql_helper_child') IS NOT NULL DROP TABLE dbo.sql_helper_child; \
             IF OBJECT_ID('dbo.sql_helper_boards') IS NOT NULL DROP TABLE dbo.sql_helper_boards; \
             CREATE TABLE dbo.sql_helper_boards (id INT IDENTITY(1,1) PRIMARY KEY, name NVARCHAR(50) NOT NULL); \
             CREATE TABLE dbo.sql_helper_child (board_id INT NOT NULL REFERENCES dbo.sql_helper_boards(id));",
            true,
            &[],
        )
        .await?;

    let mut board = Board::unsaved("Glass");
    executor
        .create_new("INSERT INTO dbo.sql_helper_boards (name) VALUES (?)", &mut board, &["Glass".into()])
        .await?;
    let id = board.id.expect("identity assigned");

    let fetched: Board = executor
        .execute_single("SELECT id, name FROM dbo.sql_helper_boards WHERE id = ?", &[id.into()])
        .await?;
    assert_eq!(fetched, board);

    let all: Vec<Board> = executor
        .execute_list("SELECT id, name FROM dbo.sql_helper_boards ORDER BY id", &[])
        .await?;
    assert_eq!(all.len(), 1);

    // the trailing UPDATE reports no result set and must not hide the rows
    let with_trailer: Vec<Board> = executor
        .execute_list(
            "SELECT id, name FROM dbo.sql_helper_boards; \
             UPDATE dbo.sql_helper_boards SET name = name WHERE 1 = 0",
            &[],
        )
        .await?;
    assert_eq!(with_trailer, all);

    let missing = executor
        .execute_single::<Board>("SELECT id, name FROM dbo.sql_helper_boards WHERE id = ?", &[(id + 1000).into()])
        .await
        .unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NoData);

    executor
        .execute_void("INSERT INTO dbo.sql_helper_child (board_id) VALUES (?)", false, &[id.into()])
        .await?;
    let conflict = executor
        .execute_void("DELETE FROM dbo.sql_helper_boards WHERE id = ?", false, &[id.into()])
        .await
        .unwrap_err();
    assert_eq!(conflict.kind(), ErrorKind::DeletionConflict);

    let nothing = executor
        .execute_void("DELETE FROM dbo.sql_helper_child WHERE board_id = ?", false, &[(id + 1000).into()])
        .await
        .unwrap_err();
    assert_eq!(nothing.kind(), ErrorKind::NoData);

    executor
        .execute_void(
            "DROP TABLE dbo.sql_helper_child; DROP TABLE dbo.sql_helper_boards;",
            true,
            &[],
        )
        .await?;
    Ok(())
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let opts = MssqlOptions::new("Server=tcp:127.0.0.1,1;User Id=sa;Password=x");
    let executor = QueryExecutor::new(MssqlProvider::new(opts).expect("valid connection string"));

    let err = executor
        .execute_list::<CustomDbRow>("SELECT 1 AS one", &[])
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConnectionError);
}
