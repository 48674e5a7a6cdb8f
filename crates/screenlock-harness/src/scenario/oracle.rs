//! Reusable oracles.

use screenlock_core::{ExclusiveTarget, Phase};
use screenlock_proto::LockerEvent;

use crate::scenario::{OracleFn, World};

/// Run every oracle in order, failing on the first failure.
pub fn all_of(oracles: Vec<OracleFn>) -> OracleFn {
    check(move |world| {
        for oracle in oracles {
            oracle(world)?;
        }
        Ok(())
    })
}

/// Session is unlocked and no seat has an exclusive client.
pub fn unlocked() -> OracleFn {
    check(|world| {
        if world.phase() != Phase::Unlocked {
            return Err(format!("expected unlocked, got {:?}", world.phase()));
        }
        if world.compositor().seats().iter().any(|seat| seat.exclusive().is_some()) {
            return Err("a seat still has an exclusive client".to_string());
        }
        Ok(())
    })
}

/// Session is locked by `owner` and every seat routes input to it.
pub fn locked_by(owner: &'static str) -> OracleFn {
    check(move |world| {
        let client = world.client(owner).ok_or_else(|| format!("unknown client {owner}"))?;
        if world.phase() != Phase::Locked(client) {
            return Err(format!("expected locked by {owner}, got {:?}", world.phase()));
        }
        if !world.compositor().seats_agree()
            || world.compositor().exclusive() != Some(ExclusiveTarget::Client(client))
        {
            return Err(format!("seats do not route input to {owner}"));
        }
        Ok(())
    })
}

/// Session is permalocked and every seat shows the permalock.
pub fn permalocked() -> OracleFn {
    check(|world| {
        if world.phase() != Phase::Permalocked {
            return Err(format!("expected permalocked, got {:?}", world.phase()));
        }
        if world.compositor().exclusive() != Some(ExclusiveTarget::Permalock) {
            return Err("seats are not held by the permalock".to_string());
        }
        Ok(())
    })
}

/// `name` received exactly `expected` on control object `control`.
pub fn locker_saw(name: &'static str, control: u32, expected: Vec<LockerEvent>) -> OracleFn {
    check(move |world| {
        let seen = world.locker_events(name, control);
        if seen != expected {
            return Err(format!("{name} control {control}: expected {expected:?}, got {seen:?}"));
        }
        Ok(())
    })
}

/// The server accepted every step.
pub fn no_rejections() -> OracleFn {
    check(|world| match world.rejections().next() {
        Some(outcome) => Err(format!("step '{}' rejected: {:?}", outcome.step, outcome.result)),
        None => Ok(()),
    })
}

/// Ad-hoc oracle, for composing with [`all_of`].
pub fn check(oracle: impl FnOnce(&World) -> Result<(), String> + 'static) -> OracleFn {
    Box::new(oracle)
}
