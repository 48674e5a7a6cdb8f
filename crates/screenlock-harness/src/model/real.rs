//! Real server wrapper mirroring [`super::ModelWorld`]'s interface.

use screenlock_core::LockConfig;
use screenlock_server::{LockServer, ServerConfig};

use super::{ModelSurfaceId, ObservableState, Operation, OperationResult, client_id, surface_id};
use crate::RecordingCompositor;

/// [`LockServer`] driven by model operations.
#[derive(Debug)]
pub struct RealWorld {
    clients: u8,
    server: LockServer<RecordingCompositor>,
}

impl RealWorld {
    /// Server with `clients` clients and `seats` recording seats.
    pub fn new(clients: u8, config: LockConfig, seats: usize) -> Self {
        let config = ServerConfig { lock: config, ..ServerConfig::default() };
        let server = LockServer::new(&config, RecordingCompositor::new(seats.max(1)));
        Self { clients: clients.max(1), server }
    }

    /// Apply one operation. The acting client is clamped into range first.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let request = op.clamped(self.clients).to_request();
        self.server.dispatch(request).into()
    }

    /// Underlying server.
    pub fn server(&self) -> &LockServer<RecordingCompositor> {
        &self.server
    }

    /// Whether the server would draw `surface`.
    pub fn drawable(&self, surface: ModelSurfaceId) -> bool {
        self.server.surface_drawable(surface_id(surface))
    }

    /// Observed state.
    pub fn observable_state(&self) -> ObservableState {
        let manager = self.server.manager();
        let compositor = self.server.compositor();

        ObservableState {
            phase: manager.phase(),
            persist_on_crash: manager.persist_on_crash(),
            lockers: manager.lockers().len(),
            visibility_handles: manager.visibility().len(),
            objects: (0..self.clients).map(|c| self.server.object_count(client_id(c))).sum(),
            deliveries: compositor.deliveries().to_vec(),
            redraws: compositor.redraws(),
            exclusive: compositor.exclusive(),
            no_memory: compositor.no_memory().to_vec(),
        }
    }
}
