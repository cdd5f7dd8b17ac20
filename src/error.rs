//! Error types for stopgrid.

use crate::id::Id;
use stopgrid_types::GeoError;
use thiserror::Error;

/// Errors raised while building or querying a [`Database`](crate::Database).
#[derive(Debug, Error)]
pub enum StopgridError {
    #[error(transparent)]
    Geo(#[from] GeoError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("Not a {expected} id: {id}")]
    TypeMismatch { id: Id, expected: &'static str },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid snapshot format")]
    InvalidFormat,
}

pub type Result<T> = std::result::Result<T, StopgridError>;

#[cfg(feature = "snapshot")]
impl From<bincode::Error> for StopgridError {
    fn from(err: bincode::Error) -> Self {
        StopgridError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for StopgridError {
    fn from(err: serde_json::Error) -> Self {
        StopgridError::Serialization(err.to_string())
    }
}
