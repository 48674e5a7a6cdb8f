//! Scenario tests for lock lifecycles.

use screenlock_core::{LockConfig, Phase};
use screenlock_harness::scenario::{Scenario, oracle};
use screenlock_proto::{LockEvent, LockerEvent};

#[test]
fn scenario_crash_and_recovery() {
    // Subscriber sees one lock/unlock pair plus the abandonment, never a
    // second locked for the recovery.
    let result = Scenario::new("crash and recovery")
        .client("l1")
        .client("c1")
        .client("c2")
        .bind("l1", 1)
        .bind("c1", 1)
        .lock("c1", 1, 2)
        .persist("c1", 2)
        .crash("c1")
        .bind("c2", 1)
        .lock("c2", 1, 2)
        .unlock("c2", 2)
        .oracle(oracle::all_of(vec![
            oracle::no_rejections(),
            oracle::unlocked(),
            oracle::locker_saw("l1", 1, vec![
                LockerEvent::Unlocked,
                LockerEvent::Locked,
                LockerEvent::LockAbandoned,
                LockerEvent::Unlocked,
            ]),
            oracle::locker_saw("c2", 1, vec![
                LockerEvent::Locked,
                LockerEvent::LockAbandoned,
                LockerEvent::Unlocked,
            ]),
            oracle::check(|world| {
                if world.lock_events("c1", 2) != [LockEvent::Locked] {
                    return Err(format!("c1 lock saw {:?}", world.lock_events("c1", 2)));
                }
                if world.lock_events("c2", 2) != [LockEvent::Locked] {
                    return Err(format!("c2 lock saw {:?}", world.lock_events("c2", 2)));
                }
                Ok(())
            }),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_contended_lock_is_rejected() {
    let result = Scenario::new("contended lock")
        .client("c1")
        .client("c2")
        .bind("c1", 1)
        .bind("c2", 1)
        .lock("c1", 1, 2)
        .lock("c2", 1, 2)
        .unlock("c2", 2)
        .persist("c2", 2)
        .destroy_lock("c2", 2)
        .oracle(oracle::all_of(vec![
            oracle::locked_by("c1"),
            oracle::check(|world| {
                if world.lock_events("c2", 2) != [LockEvent::Rejected] {
                    return Err(format!("c2 lock saw {:?}", world.lock_events("c2", 2)));
                }
                if world.server().object_count(world.client("c2").ok_or("no c2")?) != 1 {
                    return Err("only the control object should remain".to_string());
                }
                // Unlock and persist on the inert object both fail
                if world.rejections().count() != 2 {
                    return Err(format!("expected 2 rejections, got {:?}", world.outcomes()));
                }
                Ok(())
            }),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_temporary_crash_unlocks_once() {
    let result = Scenario::new("temporary crash")
        .client("l1")
        .client("c1")
        .bind("l1", 1)
        .bind("c1", 1)
        .lock("c1", 1, 2)
        .persist("c1", 2)
        .temporary("c1", 2)
        .crash("c1")
        .oracle(oracle::all_of(vec![
            oracle::no_rejections(),
            oracle::unlocked(),
            oracle::locker_saw("l1", 1, vec![
                LockerEvent::Unlocked,
                LockerEvent::Locked,
                LockerEvent::Unlocked,
            ]),
            oracle::check(|world| {
                if world.compositor().redraws() != 1 {
                    return Err(format!("expected 1 redraw, got {}", world.compositor().redraws()));
                }
                Ok(())
            }),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_bind_during_permalock_sees_both_events() {
    let result = Scenario::new("late subscriber")
        .client("c1")
        .client("late")
        .bind("c1", 1)
        .lock("c1", 1, 2)
        .persist("c1", 2)
        .destroy_lock("c1", 2)
        .bind("late", 7)
        .oracle(oracle::all_of(vec![
            oracle::permalocked(),
            oracle::locker_saw("late", 7, vec![LockerEvent::Locked, LockerEvent::LockAbandoned]),
            oracle::locker_saw("c1", 1, vec![
                LockerEvent::Unlocked,
                LockerEvent::Locked,
                LockerEvent::LockAbandoned,
            ]),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_owner_relock_supersedes() {
    let result = Scenario::new("owner relock")
        .client("l1")
        .client("c1")
        .bind("l1", 1)
        .bind("c1", 1)
        .lock("c1", 1, 2)
        .persist("c1", 2)
        .lock("c1", 1, 3)
        .destroy_lock("c1", 2)
        .crash("c1")
        .oracle(oracle::all_of(vec![
            oracle::no_rejections(),
            // New session started temporary, so the crash unlocked
            oracle::unlocked(),
            oracle::locker_saw("l1", 1, vec![
                LockerEvent::Unlocked,
                LockerEvent::Locked,
                LockerEvent::Unlocked,
            ]),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_unsubscribed_locker_hears_nothing() {
    let result = Scenario::new("unbind")
        .client("l1")
        .client("c1")
        .bind("l1", 1)
        .unbind("l1", 1)
        .bind("c1", 1)
        .lock("c1", 1, 2)
        .unlock("c1", 2)
        .oracle(oracle::all_of(vec![
            oracle::no_rejections(),
            oracle::locker_saw("l1", 1, vec![LockerEvent::Unlocked]),
        ]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_locker_capacity() {
    let result = Scenario::new("locker capacity")
        .config(LockConfig { max_lockers: 2, ..LockConfig::default() })
        .client("a")
        .client("b")
        .client("c")
        .bind("a", 1)
        .bind("b", 1)
        .bind("c", 1)
        .unbind("a", 1)
        .bind("c", 1)
        .oracle(oracle::check(|world| {
            let c = world.client("c").ok_or("no c")?;
            if world.compositor().no_memory() != [c] {
                return Err(format!("no-memory sent to {:?}", world.compositor().no_memory()));
            }
            if world.server().manager().lockers().len() != 2 {
                return Err("expected two subscribers".to_string());
            }
            if world.phase() != Phase::Unlocked {
                return Err("phase changed".to_string());
            }
            Ok(())
        }))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}

#[test]
fn scenario_lock_without_control_is_ignored() {
    let result = Scenario::new("missing control")
        .client("c1")
        .lock("c1", 1, 2)
        .oracle(oracle::all_of(vec![oracle::unlocked(), oracle::check(|world| {
            if world.rejections().count() != 1 {
                return Err("lock without a control object should be rejected".to_string());
            }
            Ok(())
        })]))
        .run();

    assert!(result.is_ok(), "scenario should succeed: {result:?}");
}
