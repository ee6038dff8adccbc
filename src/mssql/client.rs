use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream;
use tiberius::{Client, Config as TiberiusConfig, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::debug;

use super::config::{MssqlOptions, build_tiberius_config};
use super::query::{execute_events, query_events};
use crate::driver::{ConnectionProvider, DriverEvent, DriverSession, EventStream};
use crate::error::DriverError;
use crate::translation::translate_placeholders;
use crate::types::RowValues;

/// Type alias for SQL Server client
pub type MssqlClient = Client<Compat<TcpStream>>;

/// Opens one SQL Server connection per call.
///
/// The connection string is parsed once here; `open` only clones the parsed
/// config.
#[derive(Debug, Clone)]
pub struct MssqlProvider {
    config: TiberiusConfig,
    translate_placeholders: bool,
}

impl MssqlProvider {
    /// # Errors
    ///
    /// Returns `DriverError::ConfigError` if the connection string cannot be parsed.
    pub fn new(opts: MssqlOptions) -> Result<Self, DriverError> {
        Ok(Self {
            config: build_tiberius_config(&opts)?,
            translate_placeholders: opts.translate_placeholders,
        })
    }
}

#[async_trait]
impl ConnectionProvider for MssqlProvider {
    type Session = MssqlSession;

    async fn open(&self) -> Result<MssqlSession, DriverError> {
        debug!(addr = %self.config.get_addr(), "opening SQL Server connection");
        let client = create_mssql_client(self.config.clone()).await?;
        Ok(MssqlSession {
            client,
            translate_placeholders: self.translate_placeholders,
        })
    }
}

/// Helper function to create a new MSSQL connection
///
/// Named instances are resolved through the SQL Browser service.
///
/// # Errors
/// Returns `DriverError::ConnectionError` if the MSSQL connection fails.
pub async fn create_mssql_client(config: TiberiusConfig) -> Result<MssqlClient, DriverError> {
    let tcp = TcpStream::connect_named(&config)
        .await
        .map_err(|e| DriverError::ConnectionError(format!("TCP connection error: {e}")))?;
    tcp.set_nodelay(true)
        .map_err(|e| DriverError::ConnectionError(format!("TCP configuration error: {e}")))?;

    Client::connect(config, tcp.compat_write())
        .await
        .map_err(|e| DriverError::ConnectionError(format!("SQL Server connection error: {e}")))
}

/// A live SQL Server connection, closed when dropped.
pub struct MssqlSession {
    client: MssqlClient,
    translate_placeholders: bool,
}

impl std::fmt::Debug for MssqlSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlSession")
            .field("client", &"<tiberius::Client>")
            .field("translate_placeholders", &self.translate_placeholders)
            .finish()
    }
}

impl DriverSession for MssqlSession {
    fn query<'a>(&'a mut self, sql: &'a str, params: &'a [RowValues]) -> EventStream<'a> {
        let sql = translate_placeholders(sql, self.translate_placeholders);
        let client = &mut self.client;
        stream::once(async move {
            query_events(client, sql, params)
                .await
                .unwrap_or_else(|err| vec![DriverEvent::Failed(err)])
        })
        .flat_map(stream::iter)
        .boxed()
    }

    fn execute<'a>(&'a mut self, sql: &'a str, params: &'a [RowValues]) -> EventStream<'a> {
        let sql = translate_placeholders(sql, self.translate_placeholders);
        let client = &mut self.client;
        stream::once(async move {
            execute_events(client, sql, params)
                .await
                .unwrap_or_else(|err| vec![DriverEvent::Failed(err)])
        })
        .flat_map(stream::iter)
        .boxed()
    }
}
