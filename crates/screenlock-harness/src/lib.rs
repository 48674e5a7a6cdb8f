//! Test harness for the screenlock session-lock server.
//!
//! Recording collaborators stand in for the compositor, a reference model
//! predicts what the server should do for any operation sequence, and the
//! scenario builder drives named clients through scripted steps that end in
//! a mandatory oracle.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fake;
pub mod model;
pub mod scenario;
pub mod soak;

pub use fake::{Delivered, RecordingCompositor, RecordingSeat};
pub use model::{
    ModelClientId, ModelWorld, ObservableState, Operation, OperationError, OperationResult,
    RealWorld,
};
pub use soak::{SoakReport, soak};
