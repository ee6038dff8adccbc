use clap::{Parser, Subcommand};
use sql_helper::RowValues;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one sql-helper call against DB_CONNECTION_STRING")]
pub(crate) struct Args {
    #[command(subcommand)]
    pub(crate) mode: Mode,
    /// Also write logs to this file.
    #[arg(long, global = true)]
    pub(crate) log_file: Option<PathBuf>,
    /// Log at debug level instead of info.
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,
    /// Accept the server certificate without validation.
    #[arg(long, global = true)]
    pub(crate) trust_cert: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Mode {
    /// Print every returned row.
    List(Statement),
    /// Print the first returned row.
    Single(Statement),
    /// Run a mutation and require affected rows.
    Void {
        #[command(flatten)]
        statement: Statement,
        /// Succeed even when no rows were affected.
        #[arg(long)]
        ignore_no_rows: bool,
    },
    /// Run an insert and print the generated identity.
    Create(Statement),
}

#[derive(clap::Args, Debug)]
pub(crate) struct Statement {
    /// SQL text with `?` positional placeholders.
    #[arg(long)]
    pub(crate) sql: String,
    /// Positional parameter; repeat for several. Integers and floats are
    /// detected, anything else is sent as text.
    #[arg(long = "param", value_parser = parse_param)]
    pub(crate) params: Vec<RowValues>,
}

fn parse_param(raw: &str) -> Result<RowValues, String> {
    if let Ok(i) = raw.parse::<i64>() {
        return Ok(RowValues::Int(i));
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Ok(RowValues::Float(f));
    }
    Ok(RowValues::Text(raw.to_string()))
}
