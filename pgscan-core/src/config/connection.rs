//! Database connection configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the catalog connection.
///
/// # Security
/// This struct intentionally does NOT store passwords. Credentials travel
/// separately in [`crate::security::Credentials`] and are never logged or
/// serialized.
///
/// # Example
/// ```rust
/// use pgscan_core::ConnectionConfig;
///
/// let config = ConnectionConfig::new("localhost".to_string())
///     .with_port(5432)
///     .with_database("mydb".to_string());
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.to_string(), "ConnectionConfig(localhost:5432/mydb)");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Database name
    pub database: Option<String>,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Reported to the server as `application_name`
    pub application_name: String,
    /// Whether to enforce read-only transactions on the session
    pub read_only: bool,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: None,
            connect_timeout: Duration::from_secs(30),
            application_name: format!("pgscan-{}", env!("CARGO_PKG_VERSION")),
            read_only: true,
        }
    }
}

impl std::fmt::Display for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ConnectionConfig({}:{}{})",
            self.host,
            self.port,
            self.database
                .as_ref()
                .map_or_else(String::new, |db| format!("/{}", db))
        )
    }
}

impl ConnectionConfig {
    /// Creates a configuration for the given host with default settings.
    pub fn new(host: String) -> Self {
        Self {
            host,
            ..Default::default()
        }
    }

    /// Sets the port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Sets the database name.
    pub fn with_database(mut self, database: String) -> Self {
        self.database = Some(database);
        self
    }

    /// Sets the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Validates connection configuration parameters.
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.is_empty() {
            return Err(crate::error::ScanError::configuration(
                "host cannot be empty",
            ));
        }

        if self.port == 0 {
            return Err(crate::error::ScanError::configuration(
                "port must be greater than 0",
            ));
        }

        if let Some(database) = &self.database
            && database.is_empty()
        {
            return Err(crate::error::ScanError::configuration(
                "database name cannot be empty",
            ));
        }

        if self.connect_timeout.as_secs() == 0 {
            return Err(crate::error::ScanError::configuration(
                "connect_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
