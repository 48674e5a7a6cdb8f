//! Arbitrary operation sequences against the reference model.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use screenlock_core::{LockConfig, Phase};
use screenlock_harness::{ModelWorld, Operation, RealWorld};

#[derive(Debug, Arbitrary)]
struct Input {
    clients: u8,
    max_lockers: u8,
    max_visibility_handles: u8,
    ops: Vec<Operation>,
}

fuzz_target!(|input: Input| {
    let clients = input.clients % 6 + 1;
    let config = LockConfig {
        max_lockers: usize::from(input.max_lockers % 8) + 1,
        max_visibility_handles: usize::from(input.max_visibility_handles % 8) + 1,
    };
    let mut model = ModelWorld::new(clients, config);
    let mut real = RealWorld::new(clients, config, 2);

    for op in input.ops.iter().take(256) {
        assert_eq!(model.apply(op), real.apply(op), "{op:?}");

        let state = real.observable_state();
        assert_eq!(model.observable_state(), state, "{op:?}");

        let live = real.server().manager().active_session().is_some();
        assert_eq!(live, matches!(state.phase, Phase::Locked(_)));
        assert!(state.lockers <= config.max_lockers);
        assert!(state.visibility_handles <= config.max_visibility_handles);
        assert!(real.server().compositor().seats_agree());
    }
});
