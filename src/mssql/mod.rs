// MSSQL module - SQL Server driver adapter built on tiberius
//
// - config: connection options and tiberius config construction
// - client: connection provider and the per-call session
// - params: binding of middleware values onto tiberius queries
// - query: turning tiberius responses into driver events

pub mod client;
pub mod config;
pub mod params;
pub mod query;

pub use client::{MssqlClient, MssqlProvider, MssqlSession, create_mssql_client};
pub use config::{CONNECTION_STRING_ENV, MssqlOptions, MssqlOptionsBuilder};
pub use params::bind_query_params;
pub use query::build_result_sets;
