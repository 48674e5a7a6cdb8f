//! Dual-teardown tests.
//!
//! Lock objects against owner death and visibility objects against surface
//! destruction can be torn down in either order. Whichever goes second must be
//! a no-op that leaves no registry entry behind.

use screenlock_core::Phase;
use screenlock_harness::RecordingCompositor;
use screenlock_proto::{ClientId, ObjectId, Request, SurfaceId, VisibilityMode};
use screenlock_server::{LockServer, ServerConfig, ServerError};

const OWNER: ClientId = ClientId(1);
const OTHER: ClientId = ClientId(2);
const SURFACE: SurfaceId = SurfaceId(40);
const VISIBILITY: ObjectId = ObjectId(9);

fn server() -> LockServer<RecordingCompositor> {
    LockServer::new(&ServerConfig::default(), RecordingCompositor::new(1))
}

fn watched_surface(server: &mut LockServer<RecordingCompositor>) {
    server.dispatch(Request::SurfaceCreated { client: OWNER, surface: SURFACE }).unwrap();
    server
        .dispatch(Request::GetVisibility { client: OWNER, id: VISIBILITY, surface: SURFACE })
        .unwrap();
    server
        .dispatch(Request::SetVisibility {
            client: OWNER,
            visibility: VISIBILITY,
            mode: VisibilityMode(1),
        })
        .unwrap();
}

#[test]
fn visibility_destroyed_before_surface() {
    let mut server = server();
    watched_surface(&mut server);

    server.dispatch(Request::DestroyVisibility { client: OWNER, visibility: VISIBILITY }).unwrap();
    assert_eq!(server.manager().visibility().watch_count(SURFACE), 0);
    assert!(server.manager().visibility().is_empty());

    server.dispatch(Request::SurfaceDestroyed { surface: SURFACE }).unwrap();
    assert!(server.manager().visibility().is_empty());
    assert_eq!(server.object_count(OWNER), 0);
}

#[test]
fn surface_destroyed_before_visibility() {
    let mut server = server();
    watched_surface(&mut server);

    server.dispatch(Request::SurfaceDestroyed { surface: SURFACE }).unwrap();
    assert!(server.manager().visibility().is_empty());
    assert!(server.is_inert(OWNER, VISIBILITY));

    // Set on the inert object is refused and stores nothing
    let result = server.dispatch(Request::SetVisibility {
        client: OWNER,
        visibility: VISIBILITY,
        mode: VisibilityMode(2),
    });
    assert_eq!(result, Err(ServerError::InertObject { client: OWNER, object: VISIBILITY }));

    server.dispatch(Request::DestroyVisibility { client: OWNER, visibility: VISIBILITY }).unwrap();
    assert_eq!(server.object_count(OWNER), 0);
    assert!(server.manager().visibility().is_empty());
}

#[test]
fn surface_reuse_does_not_revive_handle() {
    let mut server = server();
    watched_surface(&mut server);
    server.dispatch(Request::SurfaceDestroyed { surface: SURFACE }).unwrap();
    server.dispatch(Request::SurfaceCreated { client: OTHER, surface: SURFACE }).unwrap();

    assert_eq!(server.manager().visibility().surface_mode(SURFACE), None);
    assert!(server.is_inert(OWNER, VISIBILITY));
}

#[test]
fn live_surface_recreate_detaches_old_handle() {
    let mut server = server();
    watched_surface(&mut server);
    server.dispatch(Request::SurfaceCreated { client: OTHER, surface: SURFACE }).unwrap();

    assert!(server.is_inert(OWNER, VISIBILITY));
    assert_eq!(server.manager().visibility().watch_count(SURFACE), 0);

    // The new surface is not raised above a lock held by a third client
    let locker = ClientId(3);
    server.dispatch(Request::BindControl { client: locker, id: ObjectId(1) }).unwrap();
    server
        .dispatch(Request::RequestLock { client: locker, control: ObjectId(1), id: ObjectId(2) })
        .unwrap();
    assert_eq!(server.phase(), Phase::Locked(locker));
    assert!(!server.surface_drawable(SURFACE));
}

#[test]
fn owner_disconnect_with_watched_surface() {
    let mut server = server();
    watched_surface(&mut server);
    server
        .dispatch(Request::GetVisibility { client: OTHER, id: ObjectId(3), surface: SURFACE })
        .unwrap();

    server.dispatch(Request::Disconnect { client: OWNER }).unwrap();

    // The other client's handle lost its surface with the owner
    assert!(server.is_inert(OTHER, ObjectId(3)));
    assert!(server.manager().visibility().is_empty());
    assert_eq!(server.object_count(OWNER), 0);
}

#[test]
fn unlocked_lock_destroyed_later_is_noop() {
    let mut server = server();
    server.dispatch(Request::BindControl { client: OWNER, id: ObjectId(1) }).unwrap();
    server
        .dispatch(Request::RequestLock { client: OWNER, control: ObjectId(1), id: ObjectId(2) })
        .unwrap();
    server.dispatch(Request::Unlock { client: OWNER, lock: ObjectId(2) }).unwrap();
    let redraws = server.compositor().redraws();

    server.dispatch(Request::DestroyLock { client: OWNER, lock: ObjectId(2) }).unwrap();
    server.dispatch(Request::Disconnect { client: OWNER }).unwrap();

    assert_eq!(server.phase(), Phase::Unlocked);
    assert_eq!(server.compositor().redraws(), redraws);
}

#[test]
fn disconnect_after_destroying_live_lock_is_noop() {
    let mut server = server();
    server.dispatch(Request::BindControl { client: OTHER, id: ObjectId(1) }).unwrap();
    server.dispatch(Request::BindControl { client: OWNER, id: ObjectId(1) }).unwrap();
    server
        .dispatch(Request::RequestLock { client: OWNER, control: ObjectId(1), id: ObjectId(2) })
        .unwrap();
    server.dispatch(Request::DestroyLock { client: OWNER, lock: ObjectId(2) }).unwrap();
    let deliveries = server.compositor().deliveries().len();

    server.dispatch(Request::Disconnect { client: OWNER }).unwrap();

    assert_eq!(server.phase(), Phase::Unlocked);
    assert_eq!(server.compositor().deliveries().len(), deliveries);
}
