//! Server errors.

use screenlock_core::LockError;
use screenlock_proto::{ClientId, ObjectId, ProtocolError};
use thiserror::Error;

/// Why a request was dropped.
///
/// Nothing here is fatal. Callers log and carry on; resource exhaustion has
/// already been reported to the client by the time it is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServerError {
    /// Malformed or misdirected request
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Rejected by the lock state machine
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Request on an object whose backing state is gone
    #[error("{client} {object} is inert")]
    InertObject {
        /// Issuing client
        client: ClientId,
        /// Inert object
        object: ObjectId,
    },
}

impl ServerError {
    /// Whether the request failed for lack of resources.
    pub fn is_resource_exhausted(&self) -> bool {
        matches!(self, Self::Lock(err) if !err.is_misuse())
    }
}
