//! Lock state machine.
//!
//! # State Machine
//!
//! ```text
//!                 request_lock
//! ┌──────────┐ ───────────────> ┌───────────────┐
//! │ Unlocked │                  │ Locked(owner) │
//! └──────────┘ <─────────────── └───────────────┘
//!          unlock, or owner died     │      ↑
//!          while temporary           │      │ request_lock
//!                    owner died while│      │ (no `locked`
//!                    persistent      ↓      │  broadcast)
//!                           ┌─────────────┐ │
//!                           │ Permalocked │─┘
//!                           └─────────────┘
//! ```
//!
//! # Sessions
//!
//! At most one lock object is live: the one named by the current
//! [`Phase::Locked`] session. Every other [`SessionId`] is inert. Ending a
//! session (unlock, owner death, or a superseding request by the same owner)
//! replaces the state, which makes the old id inert without touching any
//! protocol object. The runtime reports lock object destruction through
//! [`LockManager::session_destroyed`]; for an inert id that is a no-op.
//!
//! # Broadcasts
//!
//! Subscribers see `locked` only for `Unlocked → Locked`. Recovering from
//! `Permalocked` is not a new lock for them, they already saw
//! `lock_abandoned`. The requester always gets its own `locked` reply.

use screenlock_proto::{ClientId, LockEvent, LockerEvent};
use tracing::{debug, info, warn};

use crate::{
    ExclusiveTarget, LockAction, LockConfig, LockError, LockerId, LockerRegistry, SessionId,
    VisibilityRegistry,
};

/// Externally visible lock phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No lock held
    Unlocked,
    /// The client holds the only live session
    Locked(ClientId),
    /// The owner died while persistence was requested; input is blocked
    /// until some client locks again
    Permalocked,
}

/// The live session. Exists only while locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveSession {
    id: SessionId,
    client: ClientId,
    persist_on_crash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Unlocked,
    Locked(ActiveSession),
    Permalocked,
}

/// Session lock state: phase, live session, subscribers, and visibility
/// handles.
///
/// Constructed once by the runtime and passed to every handler.
#[derive(Debug, Clone)]
pub struct LockManager {
    state: State,
    lockers: LockerRegistry,
    visibility: VisibilityRegistry,
    next_session: u64,
}

impl LockManager {
    /// Unlocked manager with no subscribers.
    pub fn new(config: LockConfig) -> Self {
        Self {
            state: State::Unlocked,
            lockers: LockerRegistry::new(config.max_lockers),
            visibility: VisibilityRegistry::new(config.max_visibility_handles),
            next_session: 1,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Unlocked => Phase::Unlocked,
            State::Locked(active) => Phase::Locked(active.client),
            State::Permalocked => Phase::Permalocked,
        }
    }

    /// Whether the session is locked or permalocked.
    pub fn is_locked(&self) -> bool {
        !matches!(self.state, State::Unlocked)
    }

    /// Client holding the live session.
    pub fn owner(&self) -> Option<ClientId> {
        match self.state {
            State::Locked(active) => Some(active.client),
            _ => None,
        }
    }

    /// The live session, if any.
    pub fn active_session(&self) -> Option<SessionId> {
        match self.state {
            State::Locked(active) => Some(active.id),
            _ => None,
        }
    }

    /// Whether `session` is the live session.
    pub fn is_live(&self, session: SessionId) -> bool {
        self.active_session() == Some(session)
    }

    /// Whether the owner asked to permalock on death. Always `false` when not
    /// locked.
    pub fn persist_on_crash(&self) -> bool {
        match self.state {
            State::Locked(active) => active.persist_on_crash,
            _ => false,
        }
    }

    /// Subscribers.
    pub fn lockers(&self) -> &LockerRegistry {
        &self.lockers
    }

    /// Visibility handles.
    pub fn visibility(&self) -> &VisibilityRegistry {
        &self.visibility
    }

    /// Visibility handles, for the visibility requests.
    pub fn visibility_mut(&mut self) -> &mut VisibilityRegistry {
        &mut self.visibility
    }

    /// Register a subscriber and replay the current phase to it alone.
    ///
    /// `Unlocked` replays `unlocked`; `Locked` replays `locked`;
    /// `Permalocked` replays `locked` then `lock_abandoned`.
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` when the subscriber limit is reached.
    pub fn bind_locker(
        &mut self,
        client: ClientId,
    ) -> Result<(LockerId, Vec<LockAction>), LockError> {
        let locker = self.lockers.add(client)?;

        let snapshot: &[LockerEvent] = match self.state {
            State::Unlocked => &[LockerEvent::Unlocked],
            State::Locked(_) => &[LockerEvent::Locked],
            State::Permalocked => &[LockerEvent::Locked, LockerEvent::LockAbandoned],
        };
        let actions: Vec<LockAction> =
            snapshot.iter().map(|&event| LockAction::NotifyLocker { locker, event }).collect();

        Ok((locker, actions))
    }

    /// Unregister a subscriber. No broadcast.
    ///
    /// # Errors
    ///
    /// `UnknownLocker` if it was never registered or already removed.
    pub fn unbind_locker(&mut self, locker: LockerId) -> Result<(), LockError> {
        self.lockers.remove(locker).map(|_| ()).ok_or(LockError::UnknownLocker(locker))
    }

    /// Ask for the session lock on behalf of `client`.
    ///
    /// Always issues a new session id. If another client holds the lock the
    /// id is inert and the only action is the `rejected` reply. Otherwise the
    /// id becomes the live session, any previous session of the same owner
    /// becomes inert, and exclusive input moves to `client`.
    pub fn request_lock(&mut self, client: ClientId) -> (SessionId, Vec<LockAction>) {
        let session = SessionId::new(self.next_session);
        self.next_session += 1;

        let was_unlocked = match self.state {
            State::Locked(active) if active.client != client => {
                debug!(%session, %client, owner = %active.client, "lock request rejected");
                let reply = LockAction::NotifySession { session, event: LockEvent::Rejected };
                return (session, vec![reply]);
            },
            State::Locked(active) => {
                debug!(%client, superseded = %active.id, "owner locked again");
                false
            },
            State::Permalocked => {
                info!(%client, "recovering from permalock");
                false
            },
            State::Unlocked => true,
        };

        self.state =
            State::Locked(ActiveSession { id: session, client, persist_on_crash: false });

        let mut actions = vec![LockAction::NotifySession { session, event: LockEvent::Locked }];
        if was_unlocked {
            actions.extend(self.lockers.broadcast(LockerEvent::Locked));
        }
        actions.push(LockAction::SetExclusive { target: Some(ExclusiveTarget::Client(client)) });

        info!(%session, %client, "session locked");
        (session, actions)
    }

    /// Release the lock.
    ///
    /// # Errors
    ///
    /// `InertSession` if `session` is not live, `NotOwner` if `client` does
    /// not hold it. Neither changes state.
    pub fn unlock(
        &mut self,
        session: SessionId,
        client: ClientId,
    ) -> Result<Vec<LockAction>, LockError> {
        let active = self.live(session)?;
        if active.client != client {
            return Err(LockError::NotOwner { session, client });
        }

        info!(%session, %client, "session unlocked");
        Ok(self.release())
    }

    /// Permalock if the owner dies.
    ///
    /// # Errors
    ///
    /// `InertSession` if `session` is not live.
    pub fn set_persistent(&mut self, session: SessionId) -> Result<(), LockError> {
        self.set_persist_on_crash(session, true)
    }

    /// Unlock if the owner dies.
    ///
    /// # Errors
    ///
    /// `InertSession` if `session` is not live.
    pub fn set_temporary(&mut self, session: SessionId) -> Result<(), LockError> {
        self.set_persist_on_crash(session, false)
    }

    /// A lock object was destroyed without unlocking, by request or because
    /// its client disconnected.
    ///
    /// Inert sessions produce no actions. For the live session the owner is
    /// considered dead: persistent sessions permalock, temporary sessions
    /// unlock exactly as [`LockManager::unlock`] would.
    pub fn session_destroyed(&mut self, session: SessionId) -> Vec<LockAction> {
        let Ok(active) = self.live(session) else {
            debug!(%session, "inert lock object destroyed");
            return Vec::new();
        };

        if !active.persist_on_crash {
            warn!(%session, client = %active.client, "lock owner died, unlocking");
            return self.release();
        }

        warn!(%session, client = %active.client, "lock owner died, permalocking");
        self.state = State::Permalocked;

        let mut actions = self.lockers.broadcast(LockerEvent::LockAbandoned);
        actions.push(LockAction::SetExclusive { target: Some(ExclusiveTarget::Permalock) });
        actions.push(LockAction::RequestRedraw);
        actions
    }

    fn live(&self, session: SessionId) -> Result<ActiveSession, LockError> {
        match self.state {
            State::Locked(active) if active.id == session => Ok(active),
            _ => Err(LockError::InertSession(session)),
        }
    }

    fn set_persist_on_crash(&mut self, session: SessionId, persist: bool) -> Result<(), LockError> {
        match &mut self.state {
            State::Locked(active) if active.id == session => {
                active.persist_on_crash = persist;
                debug!(%session, persist, "crash persistence changed");
                Ok(())
            },
            _ => Err(LockError::InertSession(session)),
        }
    }

    /// Unlocked transition shared by unlock and temporary owner death.
    fn release(&mut self) -> Vec<LockAction> {
        self.state = State::Unlocked;

        let mut actions = self.lockers.broadcast(LockerEvent::Unlocked);
        actions.push(LockAction::SetExclusive { target: None });
        actions.push(LockAction::RestoreFocus);
        actions.push(LockAction::RequestRedraw);
        actions
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::new(LockConfig::default())
    }
}
