//! Surface visibility registry.
//!
//! A visibility handle and its surface can each be destroyed first. Whichever
//! goes first detaches the handle from the registry and from the surface's
//! destroy watch, so the later teardown finds nothing and does nothing.
//!
//! Visibility changes never trigger a redraw on their own; the renderer picks
//! them up on its next frame.

use std::collections::HashMap;

use screenlock_proto::{ClientId, SurfaceId, VisibilityMode};
use tracing::debug;

use crate::{LockError, Resource, VisibilityId};

/// State of one live visibility handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibilityEntry {
    client: ClientId,
    surface: SurfaceId,
    mode: VisibilityMode,
}

impl VisibilityEntry {
    /// Client that created the handle.
    pub fn client(&self) -> ClientId {
        self.client
    }

    /// Surface the handle controls.
    pub fn surface(&self) -> SurfaceId {
        self.surface
    }

    /// Current level.
    pub fn mode(&self) -> VisibilityMode {
        self.mode
    }
}

/// Live visibility handles and the per-surface destroy watches.
#[derive(Debug, Clone)]
pub struct VisibilityRegistry {
    entries: HashMap<VisibilityId, VisibilityEntry>,
    /// Handles to detach when a surface is destroyed, in creation order.
    watches: HashMap<SurfaceId, Vec<VisibilityId>>,
    next_id: u64,
    capacity: usize,
}

impl VisibilityRegistry {
    /// Empty registry holding at most `capacity` live handles.
    pub fn new(capacity: usize) -> Self {
        Self { entries: HashMap::new(), watches: HashMap::new(), next_id: 1, capacity }
    }

    /// Create a handle for `surface` at [`VisibilityMode::HIDDEN`] and watch
    /// the surface for destruction.
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` once `capacity` handles are live. Existing handles
    /// are unaffected.
    pub fn get(&mut self, client: ClientId, surface: SurfaceId) -> Result<VisibilityId, LockError> {
        if self.entries.len() >= self.capacity {
            return Err(LockError::ResourceExhausted {
                resource: Resource::Visibility,
                limit: self.capacity,
            });
        }

        let id = VisibilityId::new(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, VisibilityEntry { client, surface, mode: VisibilityMode::HIDDEN });
        self.watches.entry(surface).or_default().push(id);
        debug!(%id, %client, %surface, "visibility handle created");
        Ok(id)
    }

    /// Store a new level.
    ///
    /// # Errors
    ///
    /// `InertVisibility` if the handle or its surface is gone.
    pub fn set(&mut self, id: VisibilityId, mode: VisibilityMode) -> Result<(), LockError> {
        let entry = self.entries.get_mut(&id).ok_or(LockError::InertVisibility(id))?;
        entry.mode = mode;
        debug!(%id, %mode, "visibility changed");
        Ok(())
    }

    /// Tear down from the handle side.
    ///
    /// Returns `false` if the surface side already detached it.
    pub fn destroy(&mut self, id: VisibilityId) -> bool {
        let Some(entry) = self.entries.remove(&id) else {
            return false;
        };

        if let Some(watch) = self.watches.get_mut(&entry.surface) {
            watch.retain(|&watched| watched != id);
            if watch.is_empty() {
                self.watches.remove(&entry.surface);
            }
        }
        debug!(%id, surface = %entry.surface, "visibility handle destroyed");
        true
    }

    /// Tear down from the surface side.
    ///
    /// Returns the handles that became inert. Their protocol objects stay
    /// alive until the client destroys them.
    pub fn surface_destroyed(&mut self, surface: SurfaceId) -> Vec<VisibilityId> {
        let detached = self.watches.remove(&surface).unwrap_or_default();
        for id in &detached {
            self.entries.remove(id);
        }
        if !detached.is_empty() {
            debug!(%surface, handles = detached.len(), "visibility handles detached from surface");
        }
        detached
    }

    /// Whether the handle is live.
    pub fn is_live(&self, id: VisibilityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Live handle state.
    pub fn entry(&self, id: VisibilityId) -> Option<&VisibilityEntry> {
        self.entries.get(&id)
    }

    /// Level of a live handle.
    pub fn mode(&self, id: VisibilityId) -> Option<VisibilityMode> {
        self.entries.get(&id).map(VisibilityEntry::mode)
    }

    /// Most visible level any live handle assigns to `surface`.
    pub fn surface_mode(&self, surface: SurfaceId) -> Option<VisibilityMode> {
        self.watches
            .get(&surface)?
            .iter()
            .filter_map(|id| self.entries.get(id))
            .map(VisibilityEntry::mode)
            .max()
    }

    /// Number of handles watching `surface`.
    pub fn watch_count(&self, surface: SurfaceId) -> usize {
        self.watches.get(&surface).map_or(0, Vec::len)
    }

    /// Number of surfaces with at least one watch.
    pub fn watched_surfaces(&self) -> usize {
        self.watches.len()
    }

    /// Number of live handles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no handle is live.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
