//! Recording collaborators.
//!
//! [`RecordingCompositor`] implements the server's collaborator traits
//! without any display behind them. Every event it is asked to deliver, every
//! exclusive-input change and every redraw is kept so tests can assert on
//! exactly what the server did.

use std::{collections::BTreeSet, fmt};

use screenlock_core::ExclusiveTarget;
use screenlock_proto::{ClientId, LockEvent, LockerEvent, ObjectId, SurfaceId};
use screenlock_server::{Compositor, Seat};

/// One event handed to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivered {
    /// Broadcast or snapshot event on a control object
    Locker {
        /// Receiving client
        client: ClientId,
        /// Control object
        control: ObjectId,
        /// Event
        event: LockerEvent,
    },
    /// Reply on a lock object
    Lock {
        /// Receiving client
        client: ClientId,
        /// Lock object
        lock: ObjectId,
        /// Event
        event: LockEvent,
    },
}

impl Delivered {
    /// Receiving client.
    pub fn client(&self) -> ClientId {
        match self {
            Self::Locker { client, .. } | Self::Lock { client, .. } => *client,
        }
    }
}

/// Delivery to a client that has gone away.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unreachable(pub ClientId);

impl fmt::Display for Unreachable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is unreachable", self.0)
    }
}

impl std::error::Error for Unreachable {}

/// Seat that remembers its exclusive target and every focus change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordingSeat {
    exclusive: Option<ExclusiveTarget>,
    focus: Option<SurfaceId>,
    focus_log: Vec<Option<SurfaceId>>,
}

impl RecordingSeat {
    /// Seat whose keyboard focus is on `surface`.
    pub fn focused(surface: SurfaceId) -> Self {
        Self { focus: Some(surface), ..Self::default() }
    }

    /// Current exclusive-input target.
    pub fn exclusive(&self) -> Option<ExclusiveTarget> {
        self.exclusive
    }

    /// Every focus change in order.
    pub fn focus_log(&self) -> &[Option<SurfaceId>] {
        &self.focus_log
    }
}

impl Seat for RecordingSeat {
    type Focus = SurfaceId;

    fn set_exclusive(&mut self, target: Option<ExclusiveTarget>) {
        self.exclusive = target;
    }

    fn focus(&self) -> Option<SurfaceId> {
        self.focus
    }

    fn set_focus(&mut self, focus: Option<SurfaceId>) {
        self.focus_log.push(focus);
        self.focus = focus;
    }
}

/// Compositor that records instead of rendering.
#[derive(Debug, Clone, Default)]
pub struct RecordingCompositor {
    seats: Vec<RecordingSeat>,
    deliveries: Vec<Delivered>,
    unreachable: BTreeSet<ClientId>,
    undelivered: usize,
    redraws: usize,
    no_memory: Vec<ClientId>,
}

impl RecordingCompositor {
    /// Compositor with `count` unfocused seats.
    pub fn new(count: usize) -> Self {
        Self::with_seats(vec![RecordingSeat::default(); count])
    }

    /// Compositor with the given seats.
    pub fn with_seats(seats: Vec<RecordingSeat>) -> Self {
        Self { seats, ..Self::default() }
    }

    /// All seats.
    pub fn seats(&self) -> &[RecordingSeat] {
        &self.seats
    }

    /// Exclusive target shared by every seat, or `None` if seats disagree or
    /// none is set.
    pub fn exclusive(&self) -> Option<ExclusiveTarget> {
        let first = self.seats.first()?.exclusive;
        self.seats.iter().all(|seat| seat.exclusive == first).then_some(first).flatten()
    }

    /// Whether every seat has the same exclusive target.
    pub fn seats_agree(&self) -> bool {
        self.seats.windows(2).all(|pair| pair[0].exclusive == pair[1].exclusive)
    }

    /// Every delivered event in order.
    pub fn deliveries(&self) -> &[Delivered] {
        &self.deliveries
    }

    /// Events delivered to one client, in order.
    pub fn deliveries_to(&self, client: ClientId) -> Vec<Delivered> {
        self.deliveries.iter().filter(|delivered| delivered.client() == client).copied().collect()
    }

    /// Locker events delivered on one control object, in order.
    pub fn locker_events(&self, client: ClientId, control: ObjectId) -> Vec<LockerEvent> {
        self.deliveries
            .iter()
            .filter_map(|delivered| match *delivered {
                Delivered::Locker { client: c, control: o, event } if c == client && o == control => {
                    Some(event)
                },
                _ => None,
            })
            .collect()
    }

    /// Lock events delivered on one lock object, in order.
    pub fn lock_events(&self, client: ClientId, lock: ObjectId) -> Vec<LockEvent> {
        self.deliveries
            .iter()
            .filter_map(|delivered| match *delivered {
                Delivered::Lock { client: c, lock: o, event } if c == client && o == lock => {
                    Some(event)
                },
                _ => None,
            })
            .collect()
    }

    /// Drain the delivery log.
    pub fn take_deliveries(&mut self) -> Vec<Delivered> {
        std::mem::take(&mut self.deliveries)
    }

    /// Fail every future delivery to `client`.
    pub fn set_unreachable(&mut self, client: ClientId) {
        self.unreachable.insert(client);
    }

    /// Deliveries that failed.
    pub fn undelivered(&self) -> usize {
        self.undelivered
    }

    /// Full redraws requested.
    pub fn redraws(&self) -> usize {
        self.redraws
    }

    /// Clients sent a no-memory error, in order.
    pub fn no_memory(&self) -> &[ClientId] {
        &self.no_memory
    }

    fn deliver(&mut self, delivered: Delivered) -> Result<(), Unreachable> {
        let client = delivered.client();
        if self.unreachable.contains(&client) {
            self.undelivered += 1;
            return Err(Unreachable(client));
        }
        self.deliveries.push(delivered);
        Ok(())
    }
}

impl Compositor for RecordingCompositor {
    type Seat = RecordingSeat;
    type Error = Unreachable;

    fn send_locker_event(
        &mut self,
        client: ClientId,
        control: ObjectId,
        event: LockerEvent,
    ) -> Result<(), Unreachable> {
        self.deliver(Delivered::Locker { client, control, event })
    }

    fn send_lock_event(
        &mut self,
        client: ClientId,
        lock: ObjectId,
        event: LockEvent,
    ) -> Result<(), Unreachable> {
        self.deliver(Delivered::Lock { client, lock, event })
    }

    fn seats_mut(&mut self) -> impl Iterator<Item = &mut RecordingSeat> {
        self.seats.iter_mut()
    }

    fn damage_all_outputs(&mut self) {
        self.redraws += 1;
    }

    fn post_no_memory(&mut self, client: ClientId) {
        self.no_memory.push(client);
    }
}
