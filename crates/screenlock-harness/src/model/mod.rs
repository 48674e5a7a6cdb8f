//! Reference model of the lock server.
//!
//! [`ModelWorld`] re-derives every observable consequence of an
//! [`Operation`] with plain collections and no handles: a lock object is
//! live exactly when it is the one recorded in the phase, a visibility
//! object is live exactly when its surface has not been destroyed since it
//! was created. [`RealWorld`] runs the same operations through
//! [`screenlock_server::LockServer`] with a [`crate::RecordingCompositor`].
//! Both expose an [`ObservableState`] so tests can compare them after every
//! step.
//!
//! ```text
//! proptest / soak generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld      RealWorld       Compare
//!      (reference)     (server)        states
//! ```

mod operation;
mod real;
mod world;

pub use operation::{
    ModelObjectId, ModelSurfaceId, Operation, OperationError, OperationResult, client_id,
    object_id, surface_id,
};
pub use real::RealWorld;
use screenlock_core::{ExclusiveTarget, Phase};
use screenlock_proto::ClientId;
pub use world::ModelWorld;

use crate::Delivered;

/// Client index within a world, `0..clients`.
pub type ModelClientId = u8;

/// Everything a test may compare between the model and the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Lock phase
    pub phase: Phase,
    /// Crash persistence of the live session (false when none)
    pub persist_on_crash: bool,
    /// Registered lock-state subscribers
    pub lockers: usize,
    /// Live visibility handles
    pub visibility_handles: usize,
    /// Protocol objects held by all clients, inert ones included
    pub objects: usize,
    /// Every delivered event in order
    pub deliveries: Vec<Delivered>,
    /// Full redraws requested
    pub redraws: usize,
    /// Exclusive-input target on every seat
    pub exclusive: Option<ExclusiveTarget>,
    /// Clients sent a no-memory error, in order
    pub no_memory: Vec<ClientId>,
}
