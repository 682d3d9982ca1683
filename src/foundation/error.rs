/// Result alias used throughout `routecast`.
pub type RoutecastResult<T> = Result<T, RoutecastError>;

/// Crate-wide error type.
#[derive(thiserror::Error, Debug)]
pub enum RoutecastError {
    /// Invalid input or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A drawable could not be produced.
    #[error("render error: {0}")]
    Render(String),

    /// Stream capture or encoder failure.
    #[error("capture error: {0}")]
    Capture(String),

    /// External collaborator failure that could not be degraded locally.
    #[error("service error: {0}")]
    Service(String),

    /// (De)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other error, with its source chain preserved.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RoutecastError {
    /// Build a [`RoutecastError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`RoutecastError::Render`].
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`RoutecastError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`RoutecastError::Service`].
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Build a [`RoutecastError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

impl From<serde_json::Error> for RoutecastError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
