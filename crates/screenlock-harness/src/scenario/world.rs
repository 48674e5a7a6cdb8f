//! World state for scenario execution.
//!
//! The World owns the server under test, maps client names to ids and keeps
//! the outcome of every step for oracles to inspect.

use std::collections::BTreeMap;

use screenlock_core::Phase;
use screenlock_proto::{ClientId, LockEvent, LockerEvent, ObjectId, SurfaceId};
use screenlock_server::{LockServer, ServerError};

use crate::RecordingCompositor;

/// Outcome of one scenario step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// Step description
    pub step: String,
    /// Server verdict
    pub result: Result<(), ServerError>,
}

/// Server under test plus scenario bookkeeping.
#[derive(Debug)]
pub struct World {
    server: LockServer<RecordingCompositor>,
    clients: BTreeMap<String, ClientId>,
    outcomes: Vec<StepOutcome>,
}

impl World {
    /// World around `server` with no clients.
    pub fn new(server: LockServer<RecordingCompositor>) -> Self {
        Self { server, clients: BTreeMap::new(), outcomes: Vec::new() }
    }

    /// Register a named client. Ids are assigned in order from 1.
    pub fn add_client(&mut self, name: String) -> ClientId {
        let id = ClientId(self.clients.len() as u64 + 1);
        self.clients.insert(name, id);
        id
    }

    /// Id of a named client.
    pub fn client(&self, name: &str) -> Option<ClientId> {
        self.clients.get(name).copied()
    }

    /// Server under test.
    pub fn server(&self) -> &LockServer<RecordingCompositor> {
        &self.server
    }

    /// Server under test, mutably.
    pub fn server_mut(&mut self) -> &mut LockServer<RecordingCompositor> {
        &mut self.server
    }

    /// Recording collaborators.
    pub fn compositor(&self) -> &RecordingCompositor {
        self.server.compositor()
    }

    /// Current lock phase.
    pub fn phase(&self) -> Phase {
        self.server.phase()
    }

    /// Record a step outcome.
    pub fn record(&mut self, step: String, result: Result<(), ServerError>) {
        self.outcomes.push(StepOutcome { step, result });
    }

    /// Every step outcome in order.
    pub fn outcomes(&self) -> &[StepOutcome] {
        &self.outcomes
    }

    /// Steps the server refused.
    pub fn rejections(&self) -> impl Iterator<Item = &StepOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }

    /// Locker events a named client received on `control`.
    pub fn locker_events(&self, name: &str, control: u32) -> Vec<LockerEvent> {
        self.client(name)
            .map(|client| self.compositor().locker_events(client, ObjectId(control)))
            .unwrap_or_default()
    }

    /// Lock events a named client received on `lock`.
    pub fn lock_events(&self, name: &str, lock: u32) -> Vec<LockEvent> {
        self.client(name)
            .map(|client| self.compositor().lock_events(client, ObjectId(lock)))
            .unwrap_or_default()
    }

    /// Whether a named client's object is inert.
    pub fn is_inert(&self, name: &str, object: u32) -> bool {
        self.client(name).is_some_and(|client| self.server.is_inert(client, ObjectId(object)))
    }

    /// Whether `surface` may be drawn.
    pub fn drawable(&self, surface: u64) -> bool {
        self.server.surface_drawable(SurfaceId(surface))
    }
}
