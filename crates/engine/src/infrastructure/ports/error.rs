//! Error types for port operations.

/// Failures surfaced by a [`super::SqlPort`].
///
/// Every variant displays as its bare description so callers can prefix it
/// with the name of the lookup that failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The statement reached the server but could not be executed or read.
    #[error("{0}")]
    Execution(String),

    /// The data-source endpoint is malformed or rejected by the driver.
    #[error("{0}")]
    Endpoint(String),

    /// The driver or its connection could not be brought up.
    #[error("{0}")]
    DriverInstantiation(String),

    /// The driver exists but the connection cannot be used.
    #[error("{0}")]
    DriverAccess(String),
}

impl QueryError {
    pub fn execution(message: impl ToString) -> Self {
        Self::Execution(message.to_string())
    }

    pub fn endpoint(message: impl ToString) -> Self {
        Self::Endpoint(message.to_string())
    }

    pub fn driver_instantiation(message: impl ToString) -> Self {
        Self::DriverInstantiation(message.to_string())
    }

    pub fn driver_access(message: impl ToString) -> Self {
        Self::DriverAccess(message.to_string())
    }

    /// Short tag for structured logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Execution(_) => "execution",
            Self::Endpoint(_) => "endpoint",
            Self::DriverInstantiation(_) => "driver_instantiation",
            Self::DriverAccess(_) => "driver_access",
        }
    }
}

impl From<sqlx::Error> for QueryError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::Configuration(_) => Self::endpoint(error),
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => Self::driver_access(error),
            sqlx::Error::Protocol(_) | sqlx::Error::WorkerCrashed => {
                Self::driver_instantiation(error)
            }
            other => Self::execution(other),
        }
    }
}
