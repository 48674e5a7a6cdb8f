//! Request dispatch.
//!
//! [`LockServer`] is the single owner of the lock state. The host feeds it
//! every [`Request`] from its dispatch loop, one at a time; each call runs to
//! completion, including every collaborator call it triggers.
//!
//! # Objects
//!
//! Client objects map to core handles. An object outlives its handle when the
//! other side of the pairing goes first (session ended, surface destroyed).
//! Such objects stay addressable but inert until the client destroys them.
//!
//! # Disconnect
//!
//! A departing client's objects are torn down in a fixed order: control
//! objects, visibility objects, surfaces, then lock objects. The client's own
//! subscriptions are therefore gone before its lock ends, and only the
//! remaining subscribers hear about it.

use std::collections::{BTreeMap, HashMap};

use screenlock_core::{
    LockAction, LockError, LockManager, LockerId, Phase, SessionId, VisibilityId,
};
use screenlock_proto::{ClientId, Interface, ObjectId, ProtocolError, Request, SurfaceId};
use tracing::{debug, trace, warn};

use crate::{Compositor, Seat, ServerConfig, ServerError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Object {
    Control(LockerId),
    Lock(SessionId),
    Visibility(VisibilityId),
    /// Backing state is gone; only destroy is meaningful
    Inert(Interface),
}

impl Object {
    fn interface(self) -> Interface {
        match self {
            Self::Control(_) => Interface::Control,
            Self::Lock(_) => Interface::Lock,
            Self::Visibility(_) => Interface::Visibility,
            Self::Inert(interface) => interface,
        }
    }
}

type ObjectKey = (ClientId, ObjectId);

/// Session-lock protocol server.
#[derive(Debug)]
pub struct LockServer<C> {
    manager: LockManager,
    compositor: C,
    objects: BTreeMap<ObjectKey, Object>,
    /// Reply channels for core handles
    locker_objects: HashMap<LockerId, ObjectKey>,
    session_objects: HashMap<SessionId, ObjectKey>,
    visibility_objects: HashMap<VisibilityId, ObjectKey>,
    /// Live surfaces and their owners
    surfaces: HashMap<SurfaceId, ClientId>,
}

impl<C: Compositor> LockServer<C> {
    /// Unlocked server driving `compositor`.
    pub fn new(config: &ServerConfig, compositor: C) -> Self {
        Self {
            manager: LockManager::new(config.lock),
            compositor,
            objects: BTreeMap::new(),
            locker_objects: HashMap::new(),
            session_objects: HashMap::new(),
            visibility_objects: HashMap::new(),
            surfaces: HashMap::new(),
        }
    }

    /// Current lock phase.
    pub fn phase(&self) -> Phase {
        self.manager.phase()
    }

    /// Lock state.
    pub fn manager(&self) -> &LockManager {
        &self.manager
    }

    /// Host collaborators.
    pub fn compositor(&self) -> &C {
        &self.compositor
    }

    /// Host collaborators, mutably.
    pub fn compositor_mut(&mut self) -> &mut C {
        &mut self.compositor
    }

    /// Number of objects `client` currently holds, inert ones included.
    pub fn object_count(&self, client: ClientId) -> usize {
        self.client_objects(client).len()
    }

    /// Whether `client`'s `object` exists and has lost its backing state.
    ///
    /// Lock objects turn inert when rejected or when their session ends;
    /// visibility objects when their surface is destroyed.
    pub fn is_inert(&self, client: ClientId, object: ObjectId) -> bool {
        match self.objects.get(&(client, object)) {
            Some(Object::Inert(_)) => true,
            Some(Object::Lock(session)) => !self.manager.is_live(*session),
            Some(Object::Visibility(id)) => !self.manager.visibility().is_live(*id),
            Some(Object::Control(_)) | None => false,
        }
    }

    /// Whether `surface` may be drawn in the current phase.
    ///
    /// Everything is drawable while unlocked. While locked, the owner's
    /// surfaces and surfaces raised above [`screenlock_proto::VisibilityMode::HIDDEN`]
    /// are. While permalocked only the latter are.
    pub fn surface_drawable(&self, surface: SurfaceId) -> bool {
        let raised = self
            .manager
            .visibility()
            .surface_mode(surface)
            .is_some_and(|mode| !mode.is_hidden());

        match self.manager.phase() {
            Phase::Unlocked => true,
            Phase::Locked(owner) => raised || self.surfaces.get(&surface) == Some(&owner),
            Phase::Permalocked => raised,
        }
    }

    /// Handle one request, logging and dropping it if it is rejected.
    pub fn handle(&mut self, request: Request) {
        let opcode = request.opcode();
        if let Err(err) = self.dispatch(request) {
            if err.is_resource_exhausted() {
                warn!(?opcode, error = %err, "request failed");
            } else {
                warn!(?opcode, error = %err, "invalid request ignored");
            }
        }
    }

    /// Handle one request.
    ///
    /// # Errors
    ///
    /// Any error leaves lock state untouched. On resource exhaustion the
    /// client has already been sent a no-memory error.
    pub fn dispatch(&mut self, request: Request) -> Result<(), ServerError> {
        trace!(?request, "dispatch");

        match request {
            Request::BindControl { client, id } => self.bind_control(client, id),
            Request::DestroyControl { client, control } => self.destroy_control(client, control),
            Request::RequestLock { client, control, id } => self.request_lock(client, control, id),
            Request::Unlock { client, lock } => {
                let session = self.session(client, lock)?;
                let actions = self.manager.unlock(session, client)?;
                self.execute(actions);
                Ok(())
            },
            Request::SetPersistent { client, lock } => {
                let session = self.session(client, lock)?;
                Ok(self.manager.set_persistent(session)?)
            },
            Request::SetTemporary { client, lock } => {
                let session = self.session(client, lock)?;
                Ok(self.manager.set_temporary(session)?)
            },
            Request::DestroyLock { client, lock } => self.destroy_lock(client, lock),
            Request::GetVisibility { client, id, surface } => {
                self.get_visibility(client, id, surface)
            },
            Request::SetVisibility { client, visibility, mode } => {
                match self.lookup(client, visibility, Interface::Visibility)? {
                    Object::Visibility(id) => Ok(self.manager.visibility_mut().set(id, mode)?),
                    _ => Err(ServerError::InertObject { client, object: visibility }),
                }
            },
            Request::DestroyVisibility { client, visibility } => {
                self.lookup(client, visibility, Interface::Visibility)?;
                self.destroy_visibility((client, visibility));
                Ok(())
            },
            Request::SurfaceCreated { client, surface } => {
                if let Some(previous) = self.surfaces.insert(surface, client) {
                    // Watches on the replaced surface do not carry over
                    debug!(%surface, %previous, %client, "surface id reused while live");
                    self.destroy_surface(surface);
                }
                Ok(())
            },
            Request::SurfaceDestroyed { surface } => {
                if self.surfaces.remove(&surface).is_none() {
                    return Err(ProtocolError::UnknownSurface(surface).into());
                }
                self.destroy_surface(surface);
                Ok(())
            },
            Request::Disconnect { client } => {
                self.disconnect(client);
                Ok(())
            },
        }
    }

    fn bind_control(&mut self, client: ClientId, id: ObjectId) -> Result<(), ServerError> {
        self.claim(client, id)?;
        let (locker, actions) = match self.manager.bind_locker(client) {
            Ok(bound) => bound,
            Err(err) => return Err(self.reject(client, err)),
        };

        self.objects.insert((client, id), Object::Control(locker));
        self.locker_objects.insert(locker, (client, id));
        self.execute(actions);
        Ok(())
    }

    fn destroy_control(&mut self, client: ClientId, control: ObjectId) -> Result<(), ServerError> {
        self.lookup(client, control, Interface::Control)?;
        self.remove_control((client, control))
    }

    fn remove_control(&mut self, key: ObjectKey) -> Result<(), ServerError> {
        match self.objects.remove(&key) {
            Some(Object::Control(locker)) => {
                self.locker_objects.remove(&locker);
                Ok(self.manager.unbind_locker(locker)?)
            },
            _ => Ok(()),
        }
    }

    fn request_lock(
        &mut self,
        client: ClientId,
        control: ObjectId,
        id: ObjectId,
    ) -> Result<(), ServerError> {
        self.lookup(client, control, Interface::Control)?;
        self.claim(client, id)?;

        let (session, actions) = self.manager.request_lock(client);
        self.objects.insert((client, id), Object::Lock(session));
        self.session_objects.insert(session, (client, id));
        self.execute(actions);
        Ok(())
    }

    fn destroy_lock(&mut self, client: ClientId, lock: ObjectId) -> Result<(), ServerError> {
        self.lookup(client, lock, Interface::Lock)?;
        self.remove_lock((client, lock));
        Ok(())
    }

    fn remove_lock(&mut self, key: ObjectKey) {
        if let Some(Object::Lock(session)) = self.objects.remove(&key) {
            self.session_objects.remove(&session);
            let actions = self.manager.session_destroyed(session);
            self.execute(actions);
        }
    }

    fn get_visibility(
        &mut self,
        client: ClientId,
        id: ObjectId,
        surface: SurfaceId,
    ) -> Result<(), ServerError> {
        self.claim(client, id)?;
        if !self.surfaces.contains_key(&surface) {
            return Err(ProtocolError::UnknownSurface(surface).into());
        }

        let visibility = match self.manager.visibility_mut().get(client, surface) {
            Ok(visibility) => visibility,
            Err(err) => return Err(self.reject(client, err)),
        };
        self.objects.insert((client, id), Object::Visibility(visibility));
        self.visibility_objects.insert(visibility, (client, id));
        Ok(())
    }

    fn destroy_visibility(&mut self, key: ObjectKey) {
        if let Some(Object::Visibility(id)) = self.objects.remove(&key) {
            self.visibility_objects.remove(&id);
            self.manager.visibility_mut().destroy(id);
        }
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        for id in self.manager.visibility_mut().surface_destroyed(surface) {
            if let Some(key) = self.visibility_objects.remove(&id) {
                self.objects.insert(key, Object::Inert(Interface::Visibility));
            }
        }
    }

    fn disconnect(&mut self, client: ClientId) {
        let owned = self.client_objects(client);
        debug!(%client, objects = owned.len(), "client disconnected");

        for (key, object) in &owned {
            match object {
                Object::Control(_) => {
                    if let Err(err) = self.remove_control(*key) {
                        warn!(%client, error = %err, "stale control object");
                    }
                },
                Object::Visibility(_) => self.destroy_visibility(*key),
                Object::Inert(_) => {
                    self.objects.remove(key);
                },
                Object::Lock(_) => {},
            }
        }

        let surfaces: Vec<SurfaceId> = self
            .surfaces
            .iter()
            .filter(|(_, owner)| **owner == client)
            .map(|(surface, _)| *surface)
            .collect();
        for surface in surfaces {
            self.surfaces.remove(&surface);
            self.destroy_surface(surface);
        }

        for (key, object) in owned {
            if let Object::Lock(_) = object {
                self.remove_lock(key);
            }
        }
    }

    /// Objects of one client in id order.
    fn client_objects(&self, client: ClientId) -> Vec<(ObjectKey, Object)> {
        self.objects
            .range((client, ObjectId(0))..=(client, ObjectId(u32::MAX)))
            .map(|(key, object)| (*key, *object))
            .collect()
    }

    fn claim(&self, client: ClientId, object: ObjectId) -> Result<(), ProtocolError> {
        if self.objects.contains_key(&(client, object)) {
            return Err(ProtocolError::ObjectInUse { client, object });
        }
        Ok(())
    }

    fn lookup(
        &self,
        client: ClientId,
        object: ObjectId,
        expected: Interface,
    ) -> Result<Object, ProtocolError> {
        let found = *self
            .objects
            .get(&(client, object))
            .ok_or(ProtocolError::UnknownObject { client, object })?;
        if found.interface() != expected {
            return Err(ProtocolError::WrongInterface { client, object, expected });
        }
        Ok(found)
    }

    fn session(&self, client: ClientId, lock: ObjectId) -> Result<SessionId, ServerError> {
        match self.lookup(client, lock, Interface::Lock)? {
            Object::Lock(session) => Ok(session),
            _ => Err(ServerError::InertObject { client, object: lock }),
        }
    }

    fn reject(&mut self, client: ClientId, err: LockError) -> ServerError {
        if !err.is_misuse() {
            self.compositor.post_no_memory(client);
        }
        err.into()
    }

    /// Run actions in order against the collaborators.
    fn execute(&mut self, actions: Vec<LockAction>) {
        for action in actions {
            match action {
                LockAction::NotifyLocker { locker, event } => {
                    let Some(&(client, control)) = self.locker_objects.get(&locker) else {
                        warn!(%locker, "no control object for locker");
                        continue;
                    };
                    if let Err(err) = self.compositor.send_locker_event(client, control, event) {
                        warn!(
                            %client, %control, %event, error = %err,
                            "locker event not delivered"
                        );
                    }
                },
                LockAction::NotifySession { session, event } => {
                    let Some(&(client, lock)) = self.session_objects.get(&session) else {
                        warn!(%session, "no lock object for session");
                        continue;
                    };
                    if let Err(err) = self.compositor.send_lock_event(client, lock, event) {
                        warn!(%client, %lock, %event, error = %err, "lock event not delivered");
                    }
                },
                LockAction::SetExclusive { target } => {
                    for seat in self.compositor.seats_mut() {
                        seat.set_exclusive(target);
                    }
                },
                LockAction::RestoreFocus => {
                    for seat in self.compositor.seats_mut() {
                        if let Some(previous) = seat.focus() {
                            seat.set_focus(None);
                            seat.set_focus(Some(previous));
                        }
                    }
                },
                LockAction::RequestRedraw => self.compositor.damage_all_outputs(),
            }
        }
    }
}
