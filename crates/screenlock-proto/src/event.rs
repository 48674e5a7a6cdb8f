//! Server-to-client events.

use std::fmt;

use serde_repr::{Deserialize_repr, Serialize_repr};

/// Events delivered to every bound control object.
///
/// Subscribers only ever see these three transitions. A lock recovered from
/// an abandoned state is not reported as a new `Locked`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum LockerEvent {
    /// The session became locked
    Locked = 0,
    /// The session became unlocked
    Unlocked = 1,
    /// The lock owner died while persistence was requested
    LockAbandoned = 2,
}

/// Direct reply to a lock request, sent on the new lock object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum LockEvent {
    /// The requester now owns the session lock
    Locked = 0,
    /// Another client owns the session lock; the object is inert
    Rejected = 1,
}

impl fmt::Display for LockerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Locked => "locked",
            Self::Unlocked => "unlocked",
            Self::LockAbandoned => "lock_abandoned",
        };
        f.write_str(name)
    }
}

impl fmt::Display for LockEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Locked => "locked",
            Self::Rejected => "rejected",
        };
        f.write_str(name)
    }
}
