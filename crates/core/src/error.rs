//! Error types for meander

use thiserror::Error;

/// Main error type for meander operations.
///
/// Only argument errors surface here. Data-quality conditions (invalid
/// polygons, disconnected skeletons, skipped transects) are recorded in a
/// [`Diagnostics`](crate::Diagnostics) instead and show up as empty or
/// `None` results.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Bank '{0}' has no points")]
    EmptyBank(&'static str),

    #[error("Unknown ellipsoid: {0}")]
    UnknownEllipsoid(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for meander operations
pub type Result<T> = std::result::Result<T, Error>;
