//! Screenlock core logic
//!
//! Pure state machines for the session-lock protocol, decoupled from the
//! protocol runtime, the seats, and the renderer.
//!
//! # Architecture
//!
//! The lock state is an explicitly constructed [`LockManager`] handed to
//! every handler; there is no global state. Transitions return declarative
//! [`LockAction`]s (notify a subscriber, grant exclusive input, restore
//! focus, redraw) which the runtime executes against its collaborators. The
//! same code therefore runs in a compositor and against recording fakes.
//!
//! Handles issued by this crate ([`LockerId`], [`SessionId`],
//! [`VisibilityId`]) are plain identifiers. A handle whose record is gone is
//! *inert*: every operation on it is a checked no-op, which is how both
//! sides of a mutual teardown (lock object vs. owner death, visibility
//! object vs. surface) stay free of dangling references.
//!
//! # Components
//!
//! - [`lock`]: Lock state machine (unlocked, locked, permalocked)
//! - [`lockers`]: Subscriber registry and broadcast fan-out
//! - [`visibility`]: Per-surface visibility registry
//! - [`action`]: Actions produced by transitions
//! - [`config`]: Capacity limits
//! - [`error`]: Misuse and exhaustion errors

pub mod action;
pub mod config;
pub mod error;
pub mod handle;
pub mod lock;
pub mod lockers;
pub mod visibility;

pub use action::{ExclusiveTarget, LockAction};
pub use config::LockConfig;
pub use error::{LockError, Resource};
pub use handle::{LockerId, SessionId, VisibilityId};
pub use lock::{LockManager, Phase};
pub use lockers::LockerRegistry;
pub use visibility::{VisibilityEntry, VisibilityRegistry};
