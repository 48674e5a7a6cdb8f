//! Scenario-based testing framework.
//!
//! A scenario names its clients, lists the requests they make in order, and
//! must end in an oracle that checks the resulting [`World`]. A scenario
//! without an oracle cannot be run.
//!
//! ```ignore
//! Scenario::new("crash while persistent")
//!     .client("locker")
//!     .client("shell")
//!     .bind("shell", 1)
//!     .bind("locker", 1)
//!     .lock("locker", 1, 2)
//!     .persist("locker", 2)
//!     .crash("locker")
//!     .oracle(oracle::permalocked())
//!     .run()
//! ```

mod builder;
pub mod oracle;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::World;

/// Final-state check for a scenario.
pub type OracleFn = Box<dyn FnOnce(&World) -> Result<(), String>>;
