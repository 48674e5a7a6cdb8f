//! Reference model.

use std::collections::BTreeMap;

use screenlock_core::{ExclusiveTarget, LockConfig, Phase};
use screenlock_proto::{ClientId, LockEvent, LockerEvent};

use super::{
    ModelClientId, ModelObjectId, ModelSurfaceId, ObservableState, Operation, OperationError,
    OperationResult, client_id, object_id,
};
use crate::Delivered;

type Key = (ModelClientId, ModelObjectId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Control,
    Lock,
    Visibility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelObject {
    Control,
    Lock,
    Visibility { surface: ModelSurfaceId, mode: u8, live: bool },
}

impl ModelObject {
    fn kind(self) -> Kind {
        match self {
            Self::Control => Kind::Control,
            Self::Lock => Kind::Lock,
            Self::Visibility { .. } => Kind::Visibility,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelPhase {
    Unlocked,
    Locked { lock: Key, persist: bool },
    Permalocked,
}

/// Reference implementation of the lock server.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    clients: u8,
    config: LockConfig,
    phase: ModelPhase,
    objects: BTreeMap<Key, ModelObject>,
    /// Control objects in bind order
    lockers: Vec<Key>,
    surfaces: BTreeMap<ModelSurfaceId, ModelClientId>,
    deliveries: Vec<Delivered>,
    redraws: usize,
    exclusive: Option<ExclusiveTarget>,
    no_memory: Vec<ClientId>,
}

impl ModelWorld {
    /// Unlocked world with `clients` clients.
    pub fn new(clients: u8, config: LockConfig) -> Self {
        Self {
            clients: clients.max(1),
            config,
            phase: ModelPhase::Unlocked,
            objects: BTreeMap::new(),
            lockers: Vec::new(),
            surfaces: BTreeMap::new(),
            deliveries: Vec::new(),
            redraws: 0,
            exclusive: None,
            no_memory: Vec::new(),
        }
    }

    /// Number of clients.
    pub fn clients(&self) -> u8 {
        self.clients
    }

    /// Expected lock phase.
    pub fn phase(&self) -> Phase {
        match self.phase {
            ModelPhase::Unlocked => Phase::Unlocked,
            ModelPhase::Locked { lock: (client, _), .. } => Phase::Locked(client_id(client)),
            ModelPhase::Permalocked => Phase::Permalocked,
        }
    }

    /// Whether `surface` should be drawable.
    pub fn drawable(&self, surface: ModelSurfaceId) -> bool {
        let raised = self.objects.values().any(|object| {
            matches!(object, ModelObject::Visibility { surface: s, mode, live: true }
                if *s == surface && *mode > 0)
        });

        match self.phase {
            ModelPhase::Unlocked => true,
            ModelPhase::Locked { lock: (owner, _), .. } => {
                raised || self.surfaces.get(&surface) == Some(&owner)
            },
            ModelPhase::Permalocked => raised,
        }
    }

    /// Expected observable state.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            phase: self.phase(),
            persist_on_crash: matches!(self.phase, ModelPhase::Locked { persist: true, .. }),
            lockers: self.lockers.len(),
            visibility_handles: self.live_visibility(),
            objects: self.objects.len(),
            deliveries: self.deliveries.clone(),
            redraws: self.redraws,
            exclusive: self.exclusive,
            no_memory: self.no_memory.clone(),
        }
    }

    /// Apply one operation. The acting client is clamped into range first.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        let result = match op.clamped(self.clients) {
            Operation::Bind { client, control } => self.bind((client, control)),
            Operation::Unbind { client, control } => self.unbind((client, control)),
            Operation::Lock { client, control, lock } => self.lock(client, control, lock),
            Operation::Unlock { client, lock } => self.unlock((client, lock)),
            Operation::SetPersistent { client, lock } => self.set_persist((client, lock), true),
            Operation::SetTemporary { client, lock } => self.set_persist((client, lock), false),
            Operation::DestroyLock { client, lock } => self.destroy_lock((client, lock)),
            Operation::CreateSurface { client, surface } => {
                if self.surfaces.insert(surface, client).is_some() {
                    self.detach(surface);
                }
                Ok(())
            },
            Operation::DestroySurface { surface } => self.destroy_surface(surface),
            Operation::GetVisibility { client, visibility, surface } => {
                self.get_visibility((client, visibility), surface)
            },
            Operation::SetVisibility { client, visibility, mode } => {
                self.set_visibility((client, visibility), mode)
            },
            Operation::DestroyVisibility { client, visibility } => {
                self.destroy_visibility((client, visibility))
            },
            Operation::Disconnect { client } => {
                self.disconnect(client);
                Ok(())
            },
        };

        match result {
            Ok(()) => OperationResult::Ok,
            Err(err) => OperationResult::Error(err),
        }
    }

    fn bind(&mut self, key: Key) -> Result<(), OperationError> {
        self.claim(key)?;
        if self.lockers.len() >= self.config.max_lockers {
            self.no_memory.push(client_id(key.0));
            return Err(OperationError::ResourceExhausted);
        }

        self.objects.insert(key, ModelObject::Control);
        self.lockers.push(key);

        let snapshot: &[LockerEvent] = match self.phase {
            ModelPhase::Unlocked => &[LockerEvent::Unlocked],
            ModelPhase::Locked { .. } => &[LockerEvent::Locked],
            ModelPhase::Permalocked => &[LockerEvent::Locked, LockerEvent::LockAbandoned],
        };
        for &event in snapshot {
            self.deliver_locker(key, event);
        }
        Ok(())
    }

    fn unbind(&mut self, key: Key) -> Result<(), OperationError> {
        self.lookup(key, Kind::Control)?;
        self.remove_control(key);
        Ok(())
    }

    fn remove_control(&mut self, key: Key) {
        self.objects.remove(&key);
        self.lockers.retain(|&locker| locker != key);
    }

    fn lock(
        &mut self,
        client: ModelClientId,
        control: ModelObjectId,
        lock: ModelObjectId,
    ) -> Result<(), OperationError> {
        self.lookup((client, control), Kind::Control)?;
        self.claim((client, lock))?;
        self.objects.insert((client, lock), ModelObject::Lock);

        let was_unlocked = match self.phase {
            ModelPhase::Locked { lock: (owner, _), .. } if owner != client => {
                self.deliver_lock((client, lock), LockEvent::Rejected);
                return Ok(());
            },
            ModelPhase::Locked { .. } | ModelPhase::Permalocked => false,
            ModelPhase::Unlocked => true,
        };

        self.phase = ModelPhase::Locked { lock: (client, lock), persist: false };
        self.deliver_lock((client, lock), LockEvent::Locked);
        if was_unlocked {
            self.broadcast(LockerEvent::Locked);
        }
        self.exclusive = Some(ExclusiveTarget::Client(client_id(client)));
        Ok(())
    }

    fn unlock(&mut self, key: Key) -> Result<(), OperationError> {
        self.live_lock(key)?;
        self.release();
        Ok(())
    }

    fn set_persist(&mut self, key: Key, value: bool) -> Result<(), OperationError> {
        self.live_lock(key)?;
        if let ModelPhase::Locked { persist, .. } = &mut self.phase {
            *persist = value;
        }
        Ok(())
    }

    fn destroy_lock(&mut self, key: Key) -> Result<(), OperationError> {
        self.lookup(key, Kind::Lock)?;
        self.remove_lock(key);
        Ok(())
    }

    fn remove_lock(&mut self, key: Key) {
        self.objects.remove(&key);
        match self.phase {
            ModelPhase::Locked { lock, persist: false } if lock == key => self.release(),
            ModelPhase::Locked { lock, persist: true } if lock == key => {
                self.phase = ModelPhase::Permalocked;
                self.broadcast(LockerEvent::LockAbandoned);
                self.exclusive = Some(ExclusiveTarget::Permalock);
                self.redraws += 1;
            },
            _ => {},
        }
    }

    fn release(&mut self) {
        self.phase = ModelPhase::Unlocked;
        self.broadcast(LockerEvent::Unlocked);
        self.exclusive = None;
        self.redraws += 1;
    }

    fn destroy_surface(&mut self, surface: ModelSurfaceId) -> Result<(), OperationError> {
        if self.surfaces.remove(&surface).is_none() {
            return Err(OperationError::UnknownSurface);
        }
        self.detach(surface);
        Ok(())
    }

    fn detach(&mut self, surface: ModelSurfaceId) {
        for object in self.objects.values_mut() {
            if let ModelObject::Visibility { surface: s, live, .. } = object {
                if *s == surface {
                    *live = false;
                }
            }
        }
    }

    fn get_visibility(&mut self, key: Key, surface: ModelSurfaceId) -> Result<(), OperationError> {
        self.claim(key)?;
        if !self.surfaces.contains_key(&surface) {
            return Err(OperationError::UnknownSurface);
        }
        if self.live_visibility() >= self.config.max_visibility_handles {
            self.no_memory.push(client_id(key.0));
            return Err(OperationError::ResourceExhausted);
        }

        self.objects.insert(key, ModelObject::Visibility { surface, mode: 0, live: true });
        Ok(())
    }

    fn set_visibility(&mut self, key: Key, value: u8) -> Result<(), OperationError> {
        self.lookup(key, Kind::Visibility)?;
        match self.objects.get_mut(&key) {
            Some(ModelObject::Visibility { mode, live: true, .. }) => {
                *mode = value;
                Ok(())
            },
            _ => Err(OperationError::Inert),
        }
    }

    fn destroy_visibility(&mut self, key: Key) -> Result<(), OperationError> {
        self.lookup(key, Kind::Visibility)?;
        self.objects.remove(&key);
        Ok(())
    }

    fn disconnect(&mut self, client: ModelClientId) {
        let owned: Vec<(Key, ModelObject)> = self
            .objects
            .range((client, 0)..=(client, ModelObjectId::MAX))
            .map(|(key, object)| (*key, *object))
            .collect();

        for (key, object) in &owned {
            match object {
                ModelObject::Control => self.remove_control(*key),
                ModelObject::Visibility { .. } => {
                    self.objects.remove(key);
                },
                ModelObject::Lock => {},
            }
        }

        let surfaces: Vec<ModelSurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, owner)| **owner == client)
            .map(|(surface, _)| *surface)
            .collect();
        for surface in surfaces {
            self.surfaces.remove(&surface);
            self.detach(surface);
        }

        for (key, object) in owned {
            if object == ModelObject::Lock {
                self.remove_lock(key);
            }
        }
    }

    fn claim(&self, key: Key) -> Result<(), OperationError> {
        if self.objects.contains_key(&key) {
            return Err(OperationError::ObjectInUse);
        }
        Ok(())
    }

    fn lookup(&self, key: Key, kind: Kind) -> Result<ModelObject, OperationError> {
        let object = *self.objects.get(&key).ok_or(OperationError::UnknownObject)?;
        if object.kind() != kind {
            return Err(OperationError::WrongInterface);
        }
        Ok(object)
    }

    fn live_lock(&self, key: Key) -> Result<(), OperationError> {
        self.lookup(key, Kind::Lock)?;
        match self.phase {
            ModelPhase::Locked { lock, .. } if lock == key => Ok(()),
            _ => Err(OperationError::Inert),
        }
    }

    fn live_visibility(&self) -> usize {
        self.objects
            .values()
            .filter(|object| matches!(object, ModelObject::Visibility { live: true, .. }))
            .count()
    }

    fn broadcast(&mut self, event: LockerEvent) {
        for locker in self.lockers.clone() {
            self.deliver_locker(locker, event);
        }
    }

    fn deliver_locker(&mut self, (client, control): Key, event: LockerEvent) {
        self.deliveries.push(Delivered::Locker {
            client: client_id(client),
            control: object_id(control),
            event,
        });
    }

    fn deliver_lock(&mut self, (client, lock): Key, event: LockEvent) {
        self.deliveries.push(Delivered::Lock {
            client: client_id(client),
            lock: object_id(lock),
            event,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> ModelWorld {
        ModelWorld::new(3, LockConfig::default())
    }

    #[test]
    fn persistent_crash_permalocks() {
        let mut model = world();
        model.apply(&Operation::Bind { client: 0, control: 1 });
        model.apply(&Operation::Lock { client: 0, control: 1, lock: 2 });
        model.apply(&Operation::SetPersistent { client: 0, lock: 2 });
        model.apply(&Operation::Disconnect { client: 0 });

        assert_eq!(model.phase(), Phase::Permalocked);
        assert_eq!(model.observable_state().exclusive, Some(ExclusiveTarget::Permalock));
    }

    #[test]
    fn rejected_lock_is_inert() {
        let mut model = world();
        model.apply(&Operation::Bind { client: 0, control: 1 });
        model.apply(&Operation::Bind { client: 1, control: 1 });
        model.apply(&Operation::Lock { client: 0, control: 1, lock: 2 });
        model.apply(&Operation::Lock { client: 1, control: 1, lock: 2 });

        assert_eq!(
            model.apply(&Operation::Unlock { client: 1, lock: 2 }),
            OperationResult::Error(OperationError::Inert)
        );
        assert_eq!(model.phase(), Phase::Locked(client_id(0)));
    }

    #[test]
    fn detached_visibility_stops_raising() {
        let mut model = world();
        model.apply(&Operation::CreateSurface { client: 1, surface: 4 });
        model.apply(&Operation::GetVisibility { client: 1, visibility: 1, surface: 4 });
        model.apply(&Operation::SetVisibility { client: 1, visibility: 1, mode: 1 });
        model.apply(&Operation::Bind { client: 0, control: 1 });
        model.apply(&Operation::Lock { client: 0, control: 1, lock: 2 });
        assert!(model.drawable(4));

        model.apply(&Operation::DestroySurface { surface: 4 });
        model.apply(&Operation::CreateSurface { client: 1, surface: 4 });
        assert!(!model.drawable(4));
        assert_eq!(model.observable_state().visibility_handles, 0);
    }

    #[test]
    fn live_surface_recreate_detaches_old_watch() {
        let mut model = ModelWorld::new(3, LockConfig::default());
        model.apply(&Operation::CreateSurface { client: 0, surface: 2 });
        model.apply(&Operation::GetVisibility { client: 0, visibility: 1, surface: 2 });
        model.apply(&Operation::SetVisibility { client: 0, visibility: 1, mode: 1 });

        assert!(model.apply(&Operation::CreateSurface { client: 1, surface: 2 }).is_ok());
        model.apply(&Operation::Bind { client: 2, control: 1 });
        model.apply(&Operation::Lock { client: 2, control: 1, lock: 2 });

        assert!(!model.drawable(2));
        assert_eq!(model.observable_state().visibility_handles, 0);
        assert_eq!(
            model.apply(&Operation::SetVisibility { client: 0, visibility: 1, mode: 1 }),
            OperationResult::Error(OperationError::Inert)
        );
    }
}
