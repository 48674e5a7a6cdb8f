//! Server configuration.
//!
//! Loading configuration files belongs to the host; this is only the shape
//! the host (or `screenlockd`'s command line) fills in.

use screenlock_core::LockConfig;

/// Settings for [`crate::LockServer`] and [`crate::PermalockOverlay`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Core capacity limits
    pub lock: LockConfig,
    /// Font description used for the permalock message
    pub font: String,
    /// Interpret the permalock message as Pango markup
    pub pango_markup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { lock: LockConfig::default(), font: "monospace 10".to_string(), pango_markup: false }
    }
}
