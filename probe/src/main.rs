mod args;
mod logging;

use clap::Parser;
use serde_json::{Value, json};
use sql_helper::prelude::*;
use tracing::Level;

use crate::args::{Args, Mode};
use crate::logging::LogWriter;

/// Stand-in entity for `create`: only the generated identity matters.
#[derive(Debug, Default)]
struct Inserted {
    id: Option<i64>,
}

impl EntityWithId for Inserted {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();
    let writer = LogWriter::new(args.log_file.clone()).unwrap_or_else(|err| {
        eprintln!("failed to open log file: {err}");
        std::process::exit(1);
    });

    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    let provider = match MssqlOptions::from_env()
        .map(|opts| opts.with_trust_cert(args.trust_cert))
        .and_then(MssqlProvider::new)
    {
        Ok(provider) => provider,
        Err(err) => {
            eprintln!("configuration error: {err}");
            std::process::exit(1);
        }
    };
    let executor = QueryExecutor::new(provider);

    match run(&executor, args.mode).await {
        Ok(output) => println!("{}", pretty(&output)),
        Err(err) => {
            tracing::info!(kind = %err.kind(), "call failed");
            println!("{}", pretty(&json!(err)));
            std::process::exit(2);
        }
    }
}

async fn run(executor: &QueryExecutor<MssqlProvider>, mode: Mode) -> Result<Value, SystemError> {
    match mode {
        Mode::List(stmt) => {
            let rows: Vec<Value> = executor.execute_list(&stmt.sql, &stmt.params).await?;
            Ok(Value::Array(rows))
        }
        Mode::Single(stmt) => executor.execute_single(&stmt.sql, &stmt.params).await,
        Mode::Void {
            statement,
            ignore_no_rows,
        } => {
            executor
                .execute_void(&statement.sql, ignore_no_rows, &statement.params)
                .await?;
            Ok(json!({ "ok": true }))
        }
        Mode::Create(stmt) => {
            let mut inserted = Inserted::default();
            executor
                .create_new(&stmt.sql, &mut inserted, &stmt.params)
                .await?;
            Ok(json!({ "id": inserted.id }))
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
