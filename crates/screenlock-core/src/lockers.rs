//! Locker broadcast registry.
//!
//! Every bound control object is a subscriber. A broadcast produces one
//! [`LockAction::NotifyLocker`] per subscriber, in registration order, within
//! the same transition that caused it. Delivery happens in the runtime, which
//! treats a failed delivery as that subscriber's problem only.

use std::collections::BTreeMap;

use screenlock_proto::{ClientId, LockerEvent};
use tracing::debug;

use crate::{LockAction, LockError, LockerId, Resource};

/// Registered subscribers, keyed by creation-ordered id.
#[derive(Debug, Clone)]
pub struct LockerRegistry {
    entries: BTreeMap<LockerId, ClientId>,
    next_id: u64,
    capacity: usize,
}

impl LockerRegistry {
    /// Empty registry holding at most `capacity` subscribers.
    pub fn new(capacity: usize) -> Self {
        Self { entries: BTreeMap::new(), next_id: 1, capacity }
    }

    /// Register a subscriber owned by `client`.
    ///
    /// # Errors
    ///
    /// `ResourceExhausted` once `capacity` subscribers are registered.
    pub fn add(&mut self, client: ClientId) -> Result<LockerId, LockError> {
        if self.entries.len() >= self.capacity {
            return Err(LockError::ResourceExhausted {
                resource: Resource::Locker,
                limit: self.capacity,
            });
        }

        let id = LockerId::new(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, client);
        debug!(%id, %client, "locker registered");
        Ok(id)
    }

    /// Unregister a subscriber. Returns its owner if it was registered.
    pub fn remove(&mut self, id: LockerId) -> Option<ClientId> {
        let client = self.entries.remove(&id);
        if client.is_some() {
            debug!(%id, "locker removed");
        }
        client
    }

    /// Whether `id` is registered.
    pub fn contains(&self, id: LockerId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Owner of a registered subscriber.
    pub fn client(&self, id: LockerId) -> Option<ClientId> {
        self.entries.get(&id).copied()
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribers in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (LockerId, ClientId)> + '_ {
        self.entries.iter().map(|(id, client)| (*id, *client))
    }

    /// Fan `event` out to every subscriber.
    pub fn broadcast(&self, event: LockerEvent) -> Vec<LockAction> {
        debug!(%event, subscribers = self.entries.len(), "broadcast");
        self.entries.keys().map(|&locker| LockAction::NotifyLocker { locker, event }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_follows_registration_order() {
        let mut registry = LockerRegistry::new(8);
        let a = registry.add(ClientId(3)).unwrap();
        let b = registry.add(ClientId(1)).unwrap();
        let c = registry.add(ClientId(2)).unwrap();

        let actions = registry.broadcast(LockerEvent::Unlocked);
        let order: Vec<LockerId> = actions
            .iter()
            .map(|action| match action {
                LockAction::NotifyLocker { locker, .. } => *locker,
                other => panic!("unexpected action {other:?}"),
            })
            .collect();
        assert_eq!(order, vec![a, b, c]);
    }

    #[test]
    fn removed_locker_receives_nothing() {
        let mut registry = LockerRegistry::new(8);
        let a = registry.add(ClientId(1)).unwrap();
        let b = registry.add(ClientId(2)).unwrap();

        assert_eq!(registry.remove(a), Some(ClientId(1)));
        assert_eq!(registry.remove(a), None);

        let actions = registry.broadcast(LockerEvent::Locked);
        assert_eq!(actions, vec![LockAction::NotifyLocker {
            locker: b,
            event: LockerEvent::Locked
        }]);
    }

    #[test]
    fn capacity_limits_registrations() {
        let mut registry = LockerRegistry::new(1);
        registry.add(ClientId(1)).unwrap();

        let result = registry.add(ClientId(2));
        assert_eq!(
            result,
            Err(LockError::ResourceExhausted { resource: Resource::Locker, limit: 1 })
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn ids_are_not_reused() {
        let mut registry = LockerRegistry::new(8);
        let a = registry.add(ClientId(1)).unwrap();
        registry.remove(a);
        let b = registry.add(ClientId(1)).unwrap();
        assert_ne!(a, b);
        assert!(!registry.contains(a));
        assert!(registry.contains(b));
    }

    #[test]
    fn empty_registry_broadcasts_nothing() {
        let registry = LockerRegistry::new(8);
        assert!(registry.is_empty());
        assert!(registry.broadcast(LockerEvent::LockAbandoned).is_empty());
    }
}
