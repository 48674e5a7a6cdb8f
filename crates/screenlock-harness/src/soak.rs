//! Seeded random walks against the model.
//!
//! A soak run draws operations from a [`ChaCha8Rng`] and applies each one to
//! both [`ModelWorld`] and [`RealWorld`], comparing results and observable
//! state after every step. Same seed, same walk.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use screenlock_core::{LockConfig, Phase};
use tracing::debug;

use crate::{ModelWorld, Operation, RealWorld};

/// Object ids drawn per client.
const OBJECT_IDS: u8 = 6;

/// Surface ids drawn.
const SURFACE_IDS: u8 = 4;

/// Counters from a finished walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SoakReport {
    /// Operations applied
    pub steps: usize,
    /// Operations the server accepted
    pub accepted: usize,
    /// Transitions into the permalocked phase
    pub permalocks: usize,
    /// Transitions from unlocked to locked
    pub locks: usize,
}

/// Draw one operation.
pub fn random_operation(rng: &mut ChaCha8Rng, clients: u8) -> Operation {
    let client = rng.gen_range(0..clients.max(1));
    let object = rng.gen_range(0..OBJECT_IDS);
    let other = rng.gen_range(0..OBJECT_IDS);
    let surface = rng.gen_range(0..SURFACE_IDS);

    // Weighted towards the lock lifecycle
    match rng.gen_range(0..20) {
        0..=2 => Operation::Bind { client, control: object },
        3 => Operation::Unbind { client, control: object },
        4..=6 => Operation::Lock { client, control: object, lock: other },
        7 | 8 => Operation::Unlock { client, lock: object },
        9 => Operation::SetPersistent { client, lock: object },
        10 => Operation::SetTemporary { client, lock: object },
        11 => Operation::DestroyLock { client, lock: object },
        12 => Operation::CreateSurface { client, surface },
        13 => Operation::DestroySurface { surface },
        14 => Operation::GetVisibility { client, visibility: object, surface },
        15 => Operation::SetVisibility { client, visibility: object, mode: rng.gen_range(0..3) },
        16 => Operation::DestroyVisibility { client, visibility: object },
        _ => Operation::Disconnect { client },
    }
}

/// Walk `steps` random operations from `seed`.
///
/// # Errors
///
/// Describes the first step where the server and the model disagree.
pub fn soak(
    seed: u64,
    clients: u8,
    steps: usize,
    config: LockConfig,
) -> Result<SoakReport, String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut model = ModelWorld::new(clients, config);
    let mut real = RealWorld::new(clients, config, 2);
    let mut report = SoakReport::default();

    for step in 0..steps {
        let op = random_operation(&mut rng, clients);
        let before = real.server().phase();

        let expected = model.apply(&op);
        let result = real.apply(&op);
        if expected != result {
            return Err(format!(
                "seed {seed} step {step}: {op:?} returned {result:?}, model expected {expected:?}"
            ));
        }

        let expected = model.observable_state();
        let actual = real.observable_state();
        if expected != actual {
            return Err(format!(
                "seed {seed} step {step}: state diverged after {op:?}\n\
                 model: {expected:?}\nreal:  {actual:?}"
            ));
        }

        for surface in 0..SURFACE_IDS {
            if model.drawable(surface) != real.drawable(surface) {
                return Err(format!(
                    "seed {seed} step {step}: surface {surface} drawability diverged after {op:?}"
                ));
            }
        }

        report.steps += 1;
        if result.is_ok() {
            report.accepted += 1;
        }
        match (before, actual.phase) {
            (Phase::Unlocked, Phase::Locked(_)) => report.locks += 1,
            (Phase::Unlocked | Phase::Locked(_), Phase::Permalocked) => report.permalocks += 1,
            _ => {},
        }
    }

    debug!(seed, ?report, "soak finished");
    Ok(report)
}
