use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Failure reported by a staging or catalog store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[source] BoxError),

    #[error("stored record {context} is malformed: {reason}")]
    Malformed { context: String, reason: String },
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Failure reported by a message queue client.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("could not connect to queue backend: {0}")]
    Connect(#[source] BoxError),

    #[error("queue backend error: {0}")]
    Backend(#[source] BoxError),
}

impl QueueError {
    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

/// Failure reported by the unique-ID service.
#[derive(Debug, Error)]
pub enum IdError {
    #[error("id service unavailable: {0}")]
    Unavailable(#[source] BoxError),

    #[error("id service returned an invalid id for {kind}: {reason}")]
    Invalid { kind: String, reason: String },
}
