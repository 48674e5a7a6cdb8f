//! Collaborators supplied by the host compositor.
//!
//! The lock server never touches seats, outputs or client connections
//! directly. The host implements these traits over its own types; tests
//! implement them with recording fakes.

use screenlock_core::ExclusiveTarget;
use screenlock_proto::{ClientId, LockEvent, LockerEvent, ObjectId};

/// One input seat.
pub trait Seat {
    /// Whatever the seat keeps keyboard/pointer focus on.
    type Focus;

    /// Restrict input to `target`, or lift the restriction with `None`.
    fn set_exclusive(&mut self, target: Option<ExclusiveTarget>);

    /// Current focus.
    fn focus(&self) -> Option<Self::Focus>;

    /// Move focus. Setting the current focus again must be a no-op.
    fn set_focus(&mut self, focus: Option<Self::Focus>);
}

/// Host-side effects of lock transitions.
pub trait Compositor {
    /// Seat type.
    type Seat: Seat;

    /// Event delivery error. Failing one delivery never stops the others.
    type Error: std::error::Error;

    /// Send an event on a bound control object.
    fn send_locker_event(
        &mut self,
        client: ClientId,
        control: ObjectId,
        event: LockerEvent,
    ) -> Result<(), Self::Error>;

    /// Send the reply on a lock object.
    fn send_lock_event(
        &mut self,
        client: ClientId,
        lock: ObjectId,
        event: LockEvent,
    ) -> Result<(), Self::Error>;

    /// Every seat.
    fn seats_mut(&mut self) -> impl Iterator<Item = &mut Self::Seat>;

    /// Schedule a full redraw of every output.
    fn damage_all_outputs(&mut self);

    /// Tell the client its request failed for lack of resources.
    fn post_no_memory(&mut self, client: ClientId);
}
