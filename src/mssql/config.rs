use tiberius::Config as TiberiusConfig;

use crate::error::DriverError;

use super::client::MssqlProvider;

/// Environment variable holding the ADO.NET-style connection string.
pub const CONNECTION_STRING_ENV: &str = "DB_CONNECTION_STRING";

/// Options for connecting to SQL Server.
#[derive(Debug, Clone)]
pub struct MssqlOptions {
    /// ADO.NET-style connection string, e.g.
    /// `Server=tcp:localhost,1433;Database=school;User Id=sa;Password=...`
    pub connection_string: String,
    /// Accept the server certificate without validation.
    pub trust_cert: bool,
    /// Rewrite `?` placeholders into `@P1..@Pn` before submission.
    pub translate_placeholders: bool,
}

impl MssqlOptions {
    #[must_use]
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            trust_cert: false,
            translate_placeholders: true,
        }
    }

    /// Read the connection string from [`CONNECTION_STRING_ENV`].
    ///
    /// # Errors
    ///
    /// Returns `DriverError::ConfigError` if the variable is unset or blank.
    pub fn from_env() -> Result<Self, DriverError> {
        Self::from_env_var(CONNECTION_STRING_ENV)
    }

    /// Read the connection string from the named environment variable.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::ConfigError` if the variable is unset or blank.
    pub fn from_env_var(name: &str) -> Result<Self, DriverError> {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Ok(Self::new(value)),
            Ok(_) => Err(DriverError::ConfigError(format!("{name} is empty"))),
            Err(e) => Err(DriverError::ConfigError(format!("{name}: {e}"))),
        }
    }

    #[must_use]
    pub fn with_trust_cert(mut self, trust_cert: bool) -> Self {
        self.trust_cert = trust_cert;
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translate_placeholders: bool) -> Self {
        self.translate_placeholders = translate_placeholders;
        self
    }
}

/// Fluent builder composing a connection string from its parts.
#[derive(Debug, Clone)]
pub struct MssqlOptionsBuilder {
    server: String,
    database: String,
    user: String,
    password: String,
    port: Option<u16>,
    instance_name: Option<String>,
    trust_cert: bool,
    translate_placeholders: bool,
}

impl MssqlOptionsBuilder {
    #[must_use]
    pub fn new(server: String, database: String, user: String, password: String) -> Self {
        Self {
            server,
            database,
            user,
            password,
            port: None,
            instance_name: None,
            trust_cert: false,
            translate_placeholders: true,
        }
    }

    #[must_use]
    pub fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    #[must_use]
    pub fn instance_name(mut self, instance_name: Option<String>) -> Self {
        self.instance_name = instance_name;
        self
    }

    #[must_use]
    pub fn trust_cert(mut self, trust_cert: bool) -> Self {
        self.trust_cert = trust_cert;
        self
    }

    #[must_use]
    pub fn translation(mut self, translate_placeholders: bool) -> Self {
        self.translate_placeholders = translate_placeholders;
        self
    }

    #[must_use]
    pub fn finish(self) -> MssqlOptions {
        let mut server = format!("tcp:{}", self.server);
        if let Some(instance) = &self.instance_name {
            server.push('\\');
            server.push_str(instance);
        }
        if let Some(port) = self.port {
            server.push_str(&format!(",{port}"));
        }

        let connection_string = [
            ("Server", server.as_str()),
            ("Database", self.database.as_str()),
            ("User Id", self.user.as_str()),
            ("Password", self.password.as_str()),
        ]
        .iter()
        .map(|(key, value)| format!("{key}={}", quote_ado_value(value)))
        .collect::<Vec<_>>()
        .join(";");

        MssqlOptions {
            connection_string,
            trust_cert: self.trust_cert,
            translate_placeholders: self.translate_placeholders,
        }
    }

    /// Build the connection provider directly.
    ///
    /// # Errors
    ///
    /// Returns `DriverError::ConfigError` if the composed connection string is rejected.
    pub fn build(self) -> Result<MssqlProvider, DriverError> {
        MssqlProvider::new(self.finish())
    }
}

fn quote_ado_value(value: &str) -> String {
    if value.contains([';', '"', '\'']) || value != value.trim() {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

pub(crate) fn build_tiberius_config(opts: &MssqlOptions) -> Result<TiberiusConfig, DriverError> {
    let mut config = TiberiusConfig::from_ado_string(&opts.connection_string)
        .map_err(|e| DriverError::ConfigError(format!("Invalid SQL Server connection string: {e}")))?;
    if opts.trust_cert {
        config.trust_cert();
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_composes_connection_string() {
        let opts = MssqlOptionsBuilder::new(
            "db.local".into(),
            "school".into(),
            "sa".into(),
            "p;ss".into(),
        )
        .port(Some(1444))
        .trust_cert(true)
        .finish();

        assert_eq!(
            opts.connection_string,
            "Server=tcp:db.local,1444;Database=school;User Id=sa;Password=\"p;ss\""
        );
        assert!(opts.trust_cert);
        assert!(opts.translate_placeholders);
    }

    #[test]
    fn connection_string_parses_into_tiberius_config() {
        let opts = MssqlOptions::new("Server=tcp:db.local,1444;Database=school;User Id=sa;Password=x");
        let config = build_tiberius_config(&opts).unwrap();
        assert_eq!(config.get_addr(), "db.local:1444");
    }

    #[test]
    fn missing_env_var_is_a_config_error() {
        let err = MssqlOptions::from_env_var("SQL_HELPER_SURELY_UNSET_VARIABLE").unwrap_err();
        assert!(matches!(err, DriverError::ConfigError(_)));
    }
}
