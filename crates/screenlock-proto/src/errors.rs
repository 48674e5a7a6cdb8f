//! Protocol-level errors.

use thiserror::Error;

use crate::{ClientId, Interface, ObjectId, SurfaceId};

/// Result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Malformed or misdirected requests.
///
/// None of these are fatal to the server. The runtime logs them and drops the
/// offending request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Numeric opcode does not name a request
    #[error("unknown opcode {0:#06x}")]
    UnknownOpcode(u16),

    /// Client tried to create an object under an id it already uses
    #[error("{client} already uses {object}")]
    ObjectInUse {
        /// Issuing client
        client: ClientId,
        /// Reused id
        object: ObjectId,
    },

    /// Request targets an object the client never created
    #[error("{client} has no {object}")]
    UnknownObject {
        /// Issuing client
        client: ClientId,
        /// Missing id
        object: ObjectId,
    },

    /// Request targets an object of a different interface
    #[error("{client} {object} is not a {expected}")]
    WrongInterface {
        /// Issuing client
        client: ClientId,
        /// Target id
        object: ObjectId,
        /// Interface the request belongs to
        expected: Interface,
    },

    /// Surface is not known to exist
    #[error("{0} does not exist")]
    UnknownSurface(SurfaceId),
}
