//! Screenlock server runtime
//!
//! Glue between a host compositor's protocol runtime and the pure state
//! machines in [`screenlock_core`]. [`LockServer`] owns the lock state, maps
//! client protocol objects to core handles, and executes the resulting
//! actions against an injected [`Compositor`].
//!
//! # Components
//!
//! - [`LockServer`]: Request dispatch and action execution
//! - [`Compositor`] / [`Seat`]: Collaborators supplied by the host
//! - [`PermalockOverlay`]: Cached permalock message through a [`TextRenderer`]
//! - [`ServerConfig`]: Font, markup and capacity settings
//! - [`commands`]: Line-oriented request scripts for `screenlockd`
//! - [`console`]: Logging collaborators used by `screenlockd`

#![forbid(unsafe_code)]

pub mod commands;
pub mod compositor;
pub mod config;
pub mod console;
pub mod error;
pub mod overlay;
pub mod server;

pub use compositor::{Compositor, Seat};
pub use config::ServerConfig;
pub use error::ServerError;
pub use overlay::{PERMALOCK_MESSAGE, PermalockOverlay, TextRenderer};
pub use screenlock_core::{ExclusiveTarget, LockConfig, Phase};
pub use server::LockServer;
