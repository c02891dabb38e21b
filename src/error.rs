use thiserror::Error;

/// Custom Result type for tabledb operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause kept on execution failures
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for tabledb
#[derive(Debug, Error)]
pub enum Error {
    /// Table is not registered
    #[error("table {0} does not exist")]
    NotFound(String),
    /// Argument has the wrong shape or kind
    #[error("type error: {0}")]
    Type(String),
    /// Argument has an invalid value or cardinality
    #[error("value error: {0}")]
    Value(String),
    /// Engine or file failure, with the original cause attached
    #[error("{message}")]
    Execution {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl Error {
    pub fn execution(message: impl Into<String>, source: impl Into<Cause>) -> Self {
        Error::Execution {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Wraps any error into a generic execution failure, keeping it as the cause
    pub fn context(self, message: impl Into<String>) -> Self {
        Error::execution(message, self)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        Error::execution(value.to_string(), value)
    }
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::execution(format!("delimited file error: {}", value), value)
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::execution(value.to_string(), value)
    }
}
