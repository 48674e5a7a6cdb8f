//! Protocol vocabulary for the screenlock session-lock protocol.
//!
//! Everything a client can ask of the lock server, and everything the server
//! can tell a client, expressed independently of any wire encoding. The
//! surrounding protocol runtime owns framing and object bookkeeping; it
//! decodes into [`Request`] and encodes [`LockerEvent`] / [`LockEvent`].
//!
//! Three interfaces exist:
//!
//! - **control**: the global a client binds to observe lock state and to ask
//!   for a lock. Bound controls receive [`LockerEvent`]s.
//! - **lock**: one per lock request. Receives a single [`LockEvent`] and
//!   carries `unlock` / `set_persistent` / `set_temporary`.
//! - **visibility**: per-surface attribute deciding whether a surface stays
//!   drawable while the session is locked.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod event;
pub mod ids;
pub mod opcodes;
pub mod request;
pub mod visibility;

pub use errors::{ProtocolError, Result};
pub use event::{LockEvent, LockerEvent};
pub use ids::{ClientId, Interface, ObjectId, SurfaceId};
pub use opcodes::Opcode;
pub use request::Request;
pub use visibility::VisibilityMode;
