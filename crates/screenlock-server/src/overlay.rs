//! Permalock message overlay.
//!
//! While permalocked nothing can receive input, so outputs show a short
//! explanation instead of a blank screen. Rendering belongs to the host;
//! this caches one image per output scale and only hands it out while
//! permalocked.

use std::collections::HashMap;

use screenlock_core::Phase;
use tracing::{info, warn};

use crate::ServerConfig;

/// Message shown on every output while permalocked.
pub const PERMALOCK_MESSAGE: &str =
    "Lock screen crashed. Can only unlock by running lock_screen again.";

/// Host text renderer.
pub trait TextRenderer {
    /// Opaque drawable produced by the renderer.
    type Image;

    /// Rendering failure.
    type Error: std::error::Error;

    /// Render `text` at `scale` using the `font` description. With `markup`,
    /// `text` is Pango markup rather than plain text.
    fn render_text(
        &mut self,
        text: &str,
        font: &str,
        scale: f64,
        markup: bool,
    ) -> Result<Self::Image, Self::Error>;
}

/// Lazily rendered permalock message, one image per scale.
#[derive(Debug)]
pub struct PermalockOverlay<I> {
    font: String,
    markup: bool,
    images: HashMap<u64, I>,
}

impl<I> PermalockOverlay<I> {
    /// Empty overlay using the configured font and markup mode.
    pub fn new(config: &ServerConfig) -> Self {
        Self { font: config.font.clone(), markup: config.pango_markup, images: HashMap::new() }
    }

    /// Image to draw over an output of the given scale.
    ///
    /// `None` unless `phase` is [`Phase::Permalocked`]. A rendering failure
    /// is logged, yields `None`, and is retried on the next call.
    pub fn image<R>(&mut self, phase: Phase, renderer: &mut R, scale: f64) -> Option<&I>
    where
        R: TextRenderer<Image = I>,
    {
        if phase != Phase::Permalocked {
            return None;
        }

        let key = scale.to_bits();
        if !self.images.contains_key(&key) {
            match renderer.render_text(PERMALOCK_MESSAGE, &self.font, scale, self.markup) {
                Ok(image) => {
                    info!(scale, font = %self.font, "rendered permalock message");
                    self.images.insert(key, image);
                },
                Err(err) => {
                    warn!(scale, error = %err, "failed to render permalock message");
                    return None;
                },
            }
        }
        self.images.get(&key)
    }

    /// Drop every cached image, e.g. after the font changed.
    pub fn reconfigure(&mut self, config: &ServerConfig) {
        self.font.clone_from(&config.font);
        self.markup = config.pango_markup;
        self.images.clear();
    }

    /// Number of cached images.
    pub fn cached(&self) -> usize {
        self.images.len()
    }
}
