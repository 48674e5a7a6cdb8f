//! Seat behaviour across lock transitions.

use screenlock_core::ExclusiveTarget;
use screenlock_harness::{RecordingCompositor, RecordingSeat};
use screenlock_proto::{ClientId, ObjectId, Request, SurfaceId};
use screenlock_server::{LockServer, ServerConfig};

const OWNER: ClientId = ClientId(1);

fn locked_server(seats: Vec<RecordingSeat>) -> LockServer<RecordingCompositor> {
    let mut server =
        LockServer::new(&ServerConfig::default(), RecordingCompositor::with_seats(seats));
    server.dispatch(Request::BindControl { client: OWNER, id: ObjectId(1) }).unwrap();
    server
        .dispatch(Request::RequestLock { client: OWNER, control: ObjectId(1), id: ObjectId(2) })
        .unwrap();
    server
}

#[test]
fn unlock_refocuses_every_focused_seat() {
    let seats = vec![
        RecordingSeat::focused(SurfaceId(10)),
        RecordingSeat::default(),
        RecordingSeat::focused(SurfaceId(30)),
    ];
    let mut server = locked_server(seats);

    server.dispatch(Request::Unlock { client: OWNER, lock: ObjectId(2) }).unwrap();

    let seats = server.compositor().seats();
    assert_eq!(seats[0].focus_log(), [None, Some(SurfaceId(10))]);
    assert!(seats[1].focus_log().is_empty());
    assert_eq!(seats[2].focus_log(), [None, Some(SurfaceId(30))]);
    assert!(seats.iter().all(|seat| seat.exclusive().is_none()));
}

#[test]
fn temporary_crash_refocuses_like_unlock() {
    let mut server = locked_server(vec![RecordingSeat::focused(SurfaceId(10))]);

    server.dispatch(Request::Disconnect { client: OWNER }).unwrap();

    let seat = &server.compositor().seats()[0];
    assert_eq!(seat.focus_log(), [None, Some(SurfaceId(10))]);
    assert_eq!(seat.exclusive(), None);
}

#[test]
fn permalock_keeps_focus_and_holds_input() {
    let mut server = locked_server(vec![RecordingSeat::focused(SurfaceId(10)); 2]);
    server.dispatch(Request::SetPersistent { client: OWNER, lock: ObjectId(2) }).unwrap();

    server.dispatch(Request::Disconnect { client: OWNER }).unwrap();

    for seat in server.compositor().seats() {
        assert!(seat.focus_log().is_empty());
        assert_eq!(seat.exclusive(), Some(ExclusiveTarget::Permalock));
    }
    assert_eq!(server.compositor().redraws(), 1);
}

#[test]
fn recovery_moves_input_to_new_owner() {
    let mut server = locked_server(vec![RecordingSeat::default(); 2]);
    server.dispatch(Request::SetPersistent { client: OWNER, lock: ObjectId(2) }).unwrap();
    server.dispatch(Request::Disconnect { client: OWNER }).unwrap();

    let rescuer = ClientId(2);
    server.dispatch(Request::BindControl { client: rescuer, id: ObjectId(1) }).unwrap();
    server
        .dispatch(Request::RequestLock { client: rescuer, control: ObjectId(1), id: ObjectId(2) })
        .unwrap();

    assert_eq!(server.compositor().exclusive(), Some(ExclusiveTarget::Client(rescuer)));
    assert!(server.compositor().seats_agree());
}
