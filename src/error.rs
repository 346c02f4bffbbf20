//! Error taxonomy shared by every container in the crate.

use crate::type_tag::TypeTag;
use thiserror::Error;

/// Failure states of container operations.
///
/// Every fallible operation validates its arguments first and returns one of
/// these before touching any state. Nothing is retried internally.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("allocation failed")]
    NoMemory,
    #[error("object not found in container")]
    NotFound,
    #[error("container is empty")]
    ContainerEmpty,
    #[error("operation not supported for type {0:?}")]
    NotSupported(TypeTag),
    #[error("container is at capacity")]
    ContainerAtCapacity,
    #[error("internal invariant violated: {0}")]
    Internal(&'static str),
}

pub type Result<T> = core::result::Result<T, ContainerError>;

impl From<std::collections::TryReserveError> for ContainerError {
    fn from(_: std::collections::TryReserveError) -> Self {
        ContainerError::NoMemory
    }
}
