//! Actions produced by the lock state machine.
//!
//! The runtime executes these in order. Seat actions apply to every seat.

use screenlock_proto::{ClientId, LockEvent, LockerEvent};

use crate::{LockerId, SessionId};

/// Identity granted exclusive input on every seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExclusiveTarget {
    /// Only this client receives input
    Client(ClientId),
    /// Reserved identity matching no client: all input is blocked
    Permalock,
}

/// Actions returned by [`crate::LockManager`] transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LockAction {
    /// Send an event to one bound control object
    NotifyLocker {
        /// Subscriber
        locker: LockerId,
        /// Event to deliver
        event: LockerEvent,
    },

    /// Reply on a lock object
    NotifySession {
        /// Lock object
        session: SessionId,
        /// Reply to deliver
        event: LockEvent,
    },

    /// Set (or clear, with `None`) exclusive input on every seat
    SetExclusive {
        /// New exclusive identity
        target: Option<ExclusiveTarget>,
    },

    /// Re-apply each seat's previous focus
    ///
    /// Re-focusing the current target is a no-op for seats, so the runtime
    /// must clear focus first and then set it back.
    RestoreFocus,

    /// Damage every output
    RequestRedraw,
}
