//! Surface visibility levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Visibility level of a surface while the session is locked.
///
/// The value is opaque to the lock server apart from one rule: the default,
/// [`VisibilityMode::HIDDEN`], is the least visible level. Any other level
/// keeps the surface drawable while locked.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VisibilityMode(pub u32);

impl VisibilityMode {
    /// Least visible level; assigned to every new visibility handle.
    pub const HIDDEN: Self = Self(0);

    /// Whether this is the least visible level.
    pub fn is_hidden(self) -> bool {
        self == Self::HIDDEN
    }
}

impl fmt::Display for VisibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_hidden() {
        assert!(VisibilityMode::default().is_hidden());
        assert!(!VisibilityMode(1).is_hidden());
        assert!(VisibilityMode(1) > VisibilityMode::HIDDEN);
    }
}
