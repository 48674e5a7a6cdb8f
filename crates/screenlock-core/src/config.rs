//! Capacity limits.

/// Limits on handles the core will allocate.
///
/// Exceeding a limit fails only the request that hit it with
/// [`crate::LockError::ResourceExhausted`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockConfig {
    /// Maximum bound control objects across all clients
    pub max_lockers: usize,
    /// Maximum live visibility handles across all clients
    pub max_visibility_handles: usize,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self { max_lockers: 64, max_visibility_handles: 4096 }
    }
}
