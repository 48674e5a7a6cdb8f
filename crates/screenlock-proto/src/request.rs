//! Client-to-server requests.
//!
//! Object-creating requests carry the client-chosen id of the new object.
//! Requests on an existing object carry that object's id. The runtime is
//! responsible for turning wire messages and connection teardown into these
//! values; the lock server never sees raw bytes.

use serde::{Deserialize, Serialize};

use crate::{ClientId, ObjectId, Opcode, SurfaceId, VisibilityMode};

/// A request delivered by the protocol runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Bind the control global as a new object.
    BindControl {
        /// Issuing client
        client: ClientId,
        /// New control object
        id: ObjectId,
    },

    /// Destroy a control object.
    DestroyControl {
        /// Issuing client
        client: ClientId,
        /// Control object
        control: ObjectId,
    },

    /// Ask for the session lock through a bound control object.
    RequestLock {
        /// Issuing client
        client: ClientId,
        /// Control object the request arrives on
        control: ObjectId,
        /// New lock object
        id: ObjectId,
    },

    /// Release the session lock.
    Unlock {
        /// Issuing client
        client: ClientId,
        /// Lock object
        lock: ObjectId,
    },

    /// Permalock instead of unlocking if the owner dies.
    SetPersistent {
        /// Issuing client
        client: ClientId,
        /// Lock object
        lock: ObjectId,
    },

    /// Unlock if the owner dies (the default).
    SetTemporary {
        /// Issuing client
        client: ClientId,
        /// Lock object
        lock: ObjectId,
    },

    /// Destroy a lock object. Destroying a live lock without unlocking is
    /// treated as the owner dying.
    DestroyLock {
        /// Issuing client
        client: ClientId,
        /// Lock object
        lock: ObjectId,
    },

    /// Create a visibility handle bound to a surface.
    GetVisibility {
        /// Issuing client
        client: ClientId,
        /// New visibility object
        id: ObjectId,
        /// Surface the handle controls
        surface: SurfaceId,
    },

    /// Change the visibility level of a handle's surface.
    SetVisibility {
        /// Issuing client
        client: ClientId,
        /// Visibility object
        visibility: ObjectId,
        /// New level
        mode: VisibilityMode,
    },

    /// Destroy a visibility handle.
    DestroyVisibility {
        /// Issuing client
        client: ClientId,
        /// Visibility object
        visibility: ObjectId,
    },

    /// Host notification: a client created a surface.
    SurfaceCreated {
        /// Owning client
        client: ClientId,
        /// New surface
        surface: SurfaceId,
    },

    /// Host notification: a surface was destroyed.
    SurfaceDestroyed {
        /// Destroyed surface
        surface: SurfaceId,
    },

    /// The client's connection closed. Every object it owned is destroyed.
    Disconnect {
        /// Departing client
        client: ClientId,
    },
}

impl Request {
    /// Opcode of this request.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::BindControl { .. } => Opcode::BindControl,
            Self::DestroyControl { .. } => Opcode::DestroyControl,
            Self::RequestLock { .. } => Opcode::RequestLock,
            Self::Unlock { .. } => Opcode::Unlock,
            Self::SetPersistent { .. } => Opcode::SetPersistent,
            Self::SetTemporary { .. } => Opcode::SetTemporary,
            Self::DestroyLock { .. } => Opcode::DestroyLock,
            Self::GetVisibility { .. } => Opcode::GetVisibility,
            Self::SetVisibility { .. } => Opcode::SetVisibility,
            Self::DestroyVisibility { .. } => Opcode::DestroyVisibility,
            Self::SurfaceCreated { .. } => Opcode::SurfaceCreated,
            Self::SurfaceDestroyed { .. } => Opcode::SurfaceDestroyed,
            Self::Disconnect { .. } => Opcode::Disconnect,
        }
    }

    /// Issuing client. `None` for host notifications not tied to a client.
    pub fn client(&self) -> Option<ClientId> {
        match self {
            Self::BindControl { client, .. }
            | Self::DestroyControl { client, .. }
            | Self::RequestLock { client, .. }
            | Self::Unlock { client, .. }
            | Self::SetPersistent { client, .. }
            | Self::SetTemporary { client, .. }
            | Self::DestroyLock { client, .. }
            | Self::GetVisibility { client, .. }
            | Self::SetVisibility { client, .. }
            | Self::DestroyVisibility { client, .. }
            | Self::SurfaceCreated { client, .. }
            | Self::Disconnect { client } => Some(*client),
            Self::SurfaceDestroyed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_destroyed_has_no_client() {
        let request = Request::SurfaceDestroyed { surface: SurfaceId(3) };
        assert_eq!(request.client(), None);
        assert_eq!(request.opcode(), Opcode::SurfaceDestroyed);
    }

    #[test]
    fn lock_requests_name_their_client() {
        let request = Request::Unlock { client: ClientId(7), lock: ObjectId(2) };
        assert_eq!(request.client(), Some(ClientId(7)));
        assert_eq!(request.opcode().interface(), Some(crate::Interface::Lock));
    }
}
