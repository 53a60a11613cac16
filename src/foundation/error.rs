/// Convenience result type used across Subraster.
pub type SubrasterResult<T> = Result<T, SubrasterError>;

/// Top-level error taxonomy used by overlay APIs.
#[derive(thiserror::Error, Debug)]
pub enum SubrasterError {
    /// Invalid caller-provided data or configuration.
    #[error("validation error: {0}")]
    Validation(String),

    /// A scratch array or pixel buffer could not be reserved.
    ///
    /// Recoverable: the current pass produces no regions.
    #[error("allocation error: {0}")]
    Allocation(String),

    /// Region geometry broke an internal invariant (non-positive or oversized region).
    #[error("geometry error: {0}")]
    Geometry(String),

    /// Errors when serializing or deserializing fixtures and configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SubrasterError {
    /// Build a [`SubrasterError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SubrasterError::Allocation`] value.
    pub fn allocation(msg: impl Into<String>) -> Self {
        Self::Allocation(msg.into())
    }

    /// Build a [`SubrasterError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`SubrasterError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures the caller may recover from by dropping the current pass.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Allocation(_))
    }
}

impl From<std::collections::TryReserveError> for SubrasterError {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::Allocation(err.to_string())
    }
}

impl From<serde_json::Error> for SubrasterError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
