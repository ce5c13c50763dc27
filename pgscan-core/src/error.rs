//! Error types with credential sanitization.
//!
//! Passwords never appear in error messages. Connection targets are named
//! through [`crate::ConnectionConfig`]'s `Display`, which carries no
//! credentials.

use thiserror::Error;

/// Main error type for pgscan operations.
///
/// # Security
/// All error messages are sanitized to prevent credential leakage.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Database connection failed (credentials sanitized)
    #[error("Database connection failed: {context}")]
    Connection {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A catalog query failed
    #[error("Catalog query failed: {context}")]
    Catalog {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration or validation error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Insufficient privileges for a catalog read
    #[error("Insufficient privileges: {required}")]
    InsufficientPrivileges { required: String },

    /// Script template could not be loaded or is malformed
    #[error("Template error: {message}")]
    Template { message: String },

    /// I/O operation failed
    #[error("I/O operation failed: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// Serialization or deserialization failed
    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results with ScanError
pub type Result<T> = std::result::Result<T, ScanError>;

/// SQLSTATE for `insufficient_privilege`.
pub(crate) const SQLSTATE_INSUFFICIENT_PRIVILEGE: &str = "42501";

impl ScanError {
    /// Creates a connection error carrying the cause's message
    pub fn connection_failed<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: error.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates a connection error naming the target and the cause.
    ///
    /// `target` must not contain credentials; pass a
    /// [`crate::ConnectionConfig`], whose `Display` omits them.
    pub fn connection_failed_to<E>(target: impl std::fmt::Display, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Connection {
            context: format!("cannot connect to {}: {}", target, error),
            source: Box::new(error),
        }
    }

    /// Creates a catalog error with context
    pub fn catalog_failed<E>(context: impl Into<String>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Catalog {
            context: context.into(),
            source: Box::new(error),
        }
    }

    /// Creates a parsing error for a catalog result column
    pub fn parse_field<E>(field_name: &str, table_context: Option<&str>, error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        let context = match table_context {
            Some(table) => format!(
                "Failed to parse field '{}' from result for '{}'",
                field_name, table
            ),
            None => format!("Failed to parse field '{}' from catalog result", field_name),
        };
        Self::Catalog {
            context,
            source: Box::new(error),
        }
    }

    /// Maps a sqlx error from a catalog query, recognising privilege failures.
    pub fn from_catalog_query(resource: &str, error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_err)
                if db_err.code().as_deref() == Some(SQLSTATE_INSUFFICIENT_PRIVILEGE) =>
            {
                Self::insufficient_privileges(format!(
                    "Cannot access {} - insufficient privileges",
                    resource
                ))
            }
            _ => Self::catalog_failed(format!("Failed to query {}", resource), error),
        }
    }

    /// Creates a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an insufficient privileges error
    pub fn insufficient_privileges(required: impl Into<String>) -> Self {
        Self::InsufficientPrivileges {
            required: required.into(),
        }
    }

    /// Creates a template error
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template {
            message: message.into(),
        }
    }

    /// Creates an I/O error that names the path involved
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_names_target_and_cause() {
        let config = crate::ConnectionConfig::new("db.internal".to_string())
            .with_port(6432)
            .with_database("shop".to_string());
        let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");

        let message = ScanError::connection_failed_to(&config, cause).to_string();
        assert_eq!(
            message,
            "Database connection failed: cannot connect to ConnectionConfig(db.internal:6432/shop): connection refused"
        );
    }

    #[test]
    fn test_connection_error_keeps_cause_message() {
        let cause = std::io::Error::new(std::io::ErrorKind::TimedOut, "pool timed out");
        let error = ScanError::connection_failed(cause);
        assert_eq!(error.to_string(), "Database connection failed: pool timed out");
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_creation() {
        let error = ScanError::configuration("batch_size must be greater than 0");
        assert!(error.to_string().contains("batch_size"));

        let error = ScanError::insufficient_privileges("SELECT on pg_tables");
        assert!(error.to_string().contains("SELECT on pg_tables"));

        let error = ScanError::template("missing {END_SEQ}");
        assert_eq!(error.to_string(), "Template error: missing {END_SEQ}");
    }

    #[test]
    fn test_io_error_keeps_context() {
        let source = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = ScanError::io("Failed to write batches/batch_001_0001_0002.sql", source);
        assert!(error.to_string().contains("batch_001_0001_0002.sql"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
