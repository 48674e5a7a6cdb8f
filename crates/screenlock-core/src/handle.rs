//! Handles issued by the core.
//!
//! Ids are allocated from per-registry counters and never reused, so ordering
//! by id is ordering by creation.

use std::fmt;

/// A bound control object registered for broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockerId(u64);

/// A lock object, live or inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

/// A visibility object, live or inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisibilityId(u64);

impl LockerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl SessionId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl VisibilityId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value, for logging.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LockerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "locker#{}", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session#{}", self.0)
    }
}

impl fmt::Display for VisibilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "visibility#{}", self.0)
    }
}
