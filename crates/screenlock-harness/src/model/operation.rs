//! Operations shared by the model and the real server.

use arbitrary::Arbitrary;
use screenlock_proto::{ClientId, ObjectId, Request, SurfaceId, VisibilityMode};
use screenlock_server::ServerError;

use super::ModelClientId;

/// Object id within one client, kept small so collisions are common.
pub type ModelObjectId = u8;

/// Surface id, shared across clients.
pub type ModelSurfaceId = u8;

/// One client-visible step.
///
/// Every variant maps to exactly one [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum Operation {
    /// Bind the control global
    Bind {
        /// Acting client
        client: ModelClientId,
        /// New control object
        control: ModelObjectId,
    },
    /// Destroy a control object
    Unbind {
        /// Acting client
        client: ModelClientId,
        /// Control object
        control: ModelObjectId,
    },
    /// Ask for a lock through a control object
    Lock {
        /// Acting client
        client: ModelClientId,
        /// Control object
        control: ModelObjectId,
        /// New lock object
        lock: ModelObjectId,
    },
    /// Unlock through a lock object
    Unlock {
        /// Acting client
        client: ModelClientId,
        /// Lock object
        lock: ModelObjectId,
    },
    /// Keep the session locked if the owner dies
    SetPersistent {
        /// Acting client
        client: ModelClientId,
        /// Lock object
        lock: ModelObjectId,
    },
    /// Unlock if the owner dies
    SetTemporary {
        /// Acting client
        client: ModelClientId,
        /// Lock object
        lock: ModelObjectId,
    },
    /// Destroy a lock object
    DestroyLock {
        /// Acting client
        client: ModelClientId,
        /// Lock object
        lock: ModelObjectId,
    },
    /// Create (or take over) a surface
    CreateSurface {
        /// Owning client
        client: ModelClientId,
        /// Surface
        surface: ModelSurfaceId,
    },
    /// Destroy a surface
    DestroySurface {
        /// Surface
        surface: ModelSurfaceId,
    },
    /// Create a visibility object for a surface
    GetVisibility {
        /// Acting client
        client: ModelClientId,
        /// New visibility object
        visibility: ModelObjectId,
        /// Watched surface
        surface: ModelSurfaceId,
    },
    /// Change a visibility level
    SetVisibility {
        /// Acting client
        client: ModelClientId,
        /// Visibility object
        visibility: ModelObjectId,
        /// New level
        mode: u8,
    },
    /// Destroy a visibility object
    DestroyVisibility {
        /// Acting client
        client: ModelClientId,
        /// Visibility object
        visibility: ModelObjectId,
    },
    /// Drop the connection, crashing if it held the lock
    Disconnect {
        /// Departing client
        client: ModelClientId,
    },
}

impl Operation {
    /// Acting client, if the operation has one.
    pub fn client(&self) -> Option<ModelClientId> {
        match *self {
            Self::Bind { client, .. }
            | Self::Unbind { client, .. }
            | Self::Lock { client, .. }
            | Self::Unlock { client, .. }
            | Self::SetPersistent { client, .. }
            | Self::SetTemporary { client, .. }
            | Self::DestroyLock { client, .. }
            | Self::CreateSurface { client, .. }
            | Self::GetVisibility { client, .. }
            | Self::SetVisibility { client, .. }
            | Self::DestroyVisibility { client, .. }
            | Self::Disconnect { client } => Some(client),
            Self::DestroySurface { .. } => None,
        }
    }

    /// Same operation with the acting client folded into `0..clients`.
    #[must_use]
    pub fn clamped(mut self, clients: u8) -> Self {
        let clients = clients.max(1);
        match &mut self {
            Self::Bind { client, .. }
            | Self::Unbind { client, .. }
            | Self::Lock { client, .. }
            | Self::Unlock { client, .. }
            | Self::SetPersistent { client, .. }
            | Self::SetTemporary { client, .. }
            | Self::DestroyLock { client, .. }
            | Self::CreateSurface { client, .. }
            | Self::GetVisibility { client, .. }
            | Self::SetVisibility { client, .. }
            | Self::DestroyVisibility { client, .. }
            | Self::Disconnect { client } => *client %= clients,
            Self::DestroySurface { .. } => {},
        }
        self
    }

    /// Server request for this operation.
    pub fn to_request(&self) -> Request {
        match *self {
            Self::Bind { client, control } => {
                Request::BindControl { client: client_id(client), id: object_id(control) }
            },
            Self::Unbind { client, control } => {
                Request::DestroyControl { client: client_id(client), control: object_id(control) }
            },
            Self::Lock { client, control, lock } => Request::RequestLock {
                client: client_id(client),
                control: object_id(control),
                id: object_id(lock),
            },
            Self::Unlock { client, lock } => {
                Request::Unlock { client: client_id(client), lock: object_id(lock) }
            },
            Self::SetPersistent { client, lock } => {
                Request::SetPersistent { client: client_id(client), lock: object_id(lock) }
            },
            Self::SetTemporary { client, lock } => {
                Request::SetTemporary { client: client_id(client), lock: object_id(lock) }
            },
            Self::DestroyLock { client, lock } => {
                Request::DestroyLock { client: client_id(client), lock: object_id(lock) }
            },
            Self::CreateSurface { client, surface } => {
                Request::SurfaceCreated { client: client_id(client), surface: surface_id(surface) }
            },
            Self::DestroySurface { surface } => {
                Request::SurfaceDestroyed { surface: surface_id(surface) }
            },
            Self::GetVisibility { client, visibility, surface } => Request::GetVisibility {
                client: client_id(client),
                id: object_id(visibility),
                surface: surface_id(surface),
            },
            Self::SetVisibility { client, visibility, mode } => Request::SetVisibility {
                client: client_id(client),
                visibility: object_id(visibility),
                mode: VisibilityMode(u32::from(mode)),
            },
            Self::DestroyVisibility { client, visibility } => Request::DestroyVisibility {
                client: client_id(client),
                visibility: object_id(visibility),
            },
            Self::Disconnect { client } => Request::Disconnect { client: client_id(client) },
        }
    }
}

/// Real client id of a model client. Zero is never used.
pub fn client_id(client: ModelClientId) -> ClientId {
    ClientId(u64::from(client) + 1)
}

/// Real object id of a model object.
pub fn object_id(object: ModelObjectId) -> ObjectId {
    ObjectId(u32::from(object))
}

/// Real surface id of a model surface.
pub fn surface_id(surface: ModelSurfaceId) -> SurfaceId {
    SurfaceId(u64::from(surface))
}

/// Coarse outcome class, comparable between model and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationError {
    /// Object id already taken by the client
    ObjectInUse,
    /// No such object
    UnknownObject,
    /// Object exists with another interface
    WrongInterface,
    /// Object's backing state is gone
    Inert,
    /// Session belongs to someone else
    NotOwner,
    /// No such surface
    UnknownSurface,
    /// Capacity limit reached
    ResourceExhausted,
    /// Unrecognised request
    Malformed,
}

impl From<&ServerError> for OperationError {
    fn from(err: &ServerError) -> Self {
        use screenlock_core::LockError;
        use screenlock_proto::ProtocolError;

        match err {
            ServerError::Protocol(ProtocolError::ObjectInUse { .. }) => Self::ObjectInUse,
            ServerError::Protocol(ProtocolError::UnknownObject { .. })
            | ServerError::Lock(LockError::UnknownLocker(_)) => Self::UnknownObject,
            ServerError::Protocol(ProtocolError::WrongInterface { .. }) => Self::WrongInterface,
            ServerError::Protocol(ProtocolError::UnknownSurface(_)) => Self::UnknownSurface,
            ServerError::Protocol(ProtocolError::UnknownOpcode(_)) => Self::Malformed,
            ServerError::InertObject { .. }
            | ServerError::Lock(LockError::InertSession(_) | LockError::InertVisibility(_)) => {
                Self::Inert
            },
            ServerError::Lock(LockError::NotOwner { .. }) => Self::NotOwner,
            ServerError::Lock(LockError::ResourceExhausted { .. }) => Self::ResourceExhausted,
        }
    }
}

/// Result of applying one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationResult {
    /// Accepted
    Ok,
    /// Rejected, state unchanged
    Error(OperationError),
}

impl OperationResult {
    /// Whether the operation was accepted.
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Whether the operation was rejected.
    pub fn is_err(&self) -> bool {
        !self.is_ok()
    }
}

impl From<Result<(), ServerError>> for OperationResult {
    fn from(result: Result<(), ServerError>) -> Self {
        match result {
            Ok(()) => Self::Ok,
            Err(err) => Self::Error(OperationError::from(&err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_folds_clients() {
        let op = Operation::Bind { client: 7, control: 1 }.clamped(3);
        assert_eq!(op, Operation::Bind { client: 1, control: 1 });

        let op = Operation::DestroySurface { surface: 9 }.clamped(3);
        assert_eq!(op, Operation::DestroySurface { surface: 9 });
    }

    #[test]
    fn client_zero_maps_to_nonzero_id() {
        assert_eq!(client_id(0), ClientId(1));
        assert_eq!(Operation::Disconnect { client: 0 }.to_request().client(), Some(ClientId(1)));
    }
}
