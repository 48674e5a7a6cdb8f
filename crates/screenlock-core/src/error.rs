//! Lock state machine errors.

use std::fmt;

use screenlock_proto::ClientId;
use thiserror::Error;

use crate::{LockerId, SessionId, VisibilityId};

/// Kind of handle that ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Control object registrations
    Locker,
    /// Visibility handles
    Visibility,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locker => f.write_str("locker"),
            Self::Visibility => f.write_str("visibility handle"),
        }
    }
}

/// Errors returned by [`crate::LockManager`] and its registries.
///
/// None of these change lock state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LockError {
    /// Lock object was rejected, superseded, or its session already ended
    #[error("{0} is inert")]
    InertSession(SessionId),

    /// Unlock attempted by a client that does not own the session
    #[error("{client} does not own {session}")]
    NotOwner {
        /// Target lock object
        session: SessionId,
        /// Acting client
        client: ClientId,
    },

    /// Locker is not registered
    #[error("{0} is not registered")]
    UnknownLocker(LockerId),

    /// Visibility handle was destroyed or its surface is gone
    #[error("{0} is inert")]
    InertVisibility(VisibilityId),

    /// A capacity limit was reached
    #[error("out of {resource}s (limit {limit})")]
    ResourceExhausted {
        /// Exhausted resource
        resource: Resource,
        /// Configured limit
        limit: usize,
    },
}

impl LockError {
    /// Whether this is client misuse (ignored) rather than exhaustion
    /// (reported to the client).
    pub fn is_misuse(&self) -> bool {
        !matches!(self, Self::ResourceExhausted { .. })
    }
}
