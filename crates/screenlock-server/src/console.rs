//! Logging collaborators.
//!
//! Stand-ins for a real compositor that report every effect as a structured
//! `tracing` event. `screenlockd` uses them to replay request scripts.

use std::convert::Infallible;

use screenlock_core::ExclusiveTarget;
use screenlock_proto::{ClientId, LockEvent, LockerEvent, ObjectId};
use tracing::{info, warn};

use crate::{Compositor, Seat, TextRenderer};

/// Seat that logs exclusivity and focus changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleSeat {
    name: String,
    exclusive: Option<ExclusiveTarget>,
    focus: Option<String>,
}

impl ConsoleSeat {
    /// Seat focused on `focus`.
    pub fn new(name: impl Into<String>, focus: Option<String>) -> Self {
        Self { name: name.into(), exclusive: None, focus }
    }

    /// Current exclusive identity.
    pub fn exclusive(&self) -> Option<ExclusiveTarget> {
        self.exclusive
    }
}

impl Seat for ConsoleSeat {
    type Focus = String;

    fn set_exclusive(&mut self, target: Option<ExclusiveTarget>) {
        info!(seat = %self.name, ?target, "exclusive input");
        self.exclusive = target;
    }

    fn focus(&self) -> Option<String> {
        self.focus.clone()
    }

    fn set_focus(&mut self, focus: Option<String>) {
        if self.focus == focus {
            return;
        }
        info!(seat = %self.name, ?focus, "focus");
        self.focus = focus;
    }
}

/// Compositor that logs every effect.
#[derive(Debug, Clone, Default)]
pub struct ConsoleCompositor {
    seats: Vec<ConsoleSeat>,
    redraws: u64,
}

impl ConsoleCompositor {
    /// Compositor with `count` seats named `seat0`, `seat1`, ...
    pub fn with_seats(count: usize) -> Self {
        let seats = (0..count)
            .map(|index| ConsoleSeat::new(format!("seat{index}"), Some(format!("desktop{index}"))))
            .collect();
        Self { seats, redraws: 0 }
    }

    /// Seats.
    pub fn seats(&self) -> &[ConsoleSeat] {
        &self.seats
    }

    /// Full redraws requested so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}

impl Compositor for ConsoleCompositor {
    type Seat = ConsoleSeat;
    type Error = Infallible;

    fn send_locker_event(
        &mut self,
        client: ClientId,
        control: ObjectId,
        event: LockerEvent,
    ) -> Result<(), Infallible> {
        info!(%client, %control, %event, "control event");
        Ok(())
    }

    fn send_lock_event(
        &mut self,
        client: ClientId,
        lock: ObjectId,
        event: LockEvent,
    ) -> Result<(), Infallible> {
        info!(%client, %lock, %event, "lock event");
        Ok(())
    }

    fn seats_mut(&mut self) -> impl Iterator<Item = &mut ConsoleSeat> {
        self.seats.iter_mut()
    }

    fn damage_all_outputs(&mut self) {
        self.redraws += 1;
        info!(redraws = self.redraws, "redraw all outputs");
    }

    fn post_no_memory(&mut self, client: ClientId) {
        warn!(%client, "no memory");
    }
}

/// Renderer producing the message as plain text, wrapped by scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleRenderer;

impl ConsoleRenderer {
    /// Columns available at scale 1.
    const COLUMNS: f64 = 80.0;
}

impl TextRenderer for ConsoleRenderer {
    type Image = Vec<String>;
    type Error = Infallible;

    fn render_text(
        &mut self,
        text: &str,
        _font: &str,
        scale: f64,
        _markup: bool,
    ) -> Result<Vec<String>, Infallible> {
        let columns = (Self::COLUMNS / scale.max(1.0)).floor().max(1.0) as usize;
        let mut lines = Vec::new();
        let mut line = String::new();
        for word in text.split_whitespace() {
            if !line.is_empty() && line.len() + 1 + word.len() > columns {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seat_ignores_same_focus() {
        let mut seat = ConsoleSeat::new("seat0", Some("term".into()));
        seat.set_focus(Some("term".into()));
        assert_eq!(seat.focus(), Some("term".to_string()));
        seat.set_focus(None);
        assert_eq!(seat.focus(), None);
    }

    #[test]
    fn renderer_wraps_by_scale() {
        let mut renderer = ConsoleRenderer;
        let wide = renderer.render_text("aaaa bbbb cccc", "mono", 1.0, false).unwrap();
        assert_eq!(wide, vec!["aaaa bbbb cccc".to_string()]);

        let narrow = renderer.render_text("aaaa bbbb cccc", "mono", 8.0, false).unwrap();
        assert_eq!(narrow, vec!["aaaa bbbb".to_string(), "cccc".to_string()]);
    }
}
