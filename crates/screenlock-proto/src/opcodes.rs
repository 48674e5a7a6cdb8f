//! Request opcodes.
//!
//! Stable numeric codes for every [`crate::Request`] variant, grouped by the
//! interface they arrive on: `0x01..` control, `0x10..` lock, `0x20..`
//! visibility, `0x30..` host surface notifications, `0x40` connection.

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::{Interface, ProtocolError, Result};

/// Request opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize_repr, Deserialize_repr)]
#[repr(u16)]
pub enum Opcode {
    /// Bind the control global
    BindControl = 0x01,
    /// Destroy a control object
    DestroyControl = 0x02,
    /// Ask for the session lock
    RequestLock = 0x03,

    /// Release the session lock
    Unlock = 0x10,
    /// Permalock if the owner dies
    SetPersistent = 0x11,
    /// Unlock if the owner dies
    SetTemporary = 0x12,
    /// Destroy a lock object
    DestroyLock = 0x13,

    /// Create a visibility handle for a surface
    GetVisibility = 0x20,
    /// Change a surface's visibility level
    SetVisibility = 0x21,
    /// Destroy a visibility handle
    DestroyVisibility = 0x22,

    /// Host created a client surface
    SurfaceCreated = 0x30,
    /// Host destroyed a client surface
    SurfaceDestroyed = 0x31,

    /// Client connection closed
    Disconnect = 0x40,
}

impl Opcode {
    /// Numeric code.
    pub fn to_u16(self) -> u16 {
        self as u16
    }

    /// Decode a numeric code.
    pub fn from_u16(value: u16) -> Result<Self> {
        let opcode = match value {
            0x01 => Self::BindControl,
            0x02 => Self::DestroyControl,
            0x03 => Self::RequestLock,
            0x10 => Self::Unlock,
            0x11 => Self::SetPersistent,
            0x12 => Self::SetTemporary,
            0x13 => Self::DestroyLock,
            0x20 => Self::GetVisibility,
            0x21 => Self::SetVisibility,
            0x22 => Self::DestroyVisibility,
            0x30 => Self::SurfaceCreated,
            0x31 => Self::SurfaceDestroyed,
            0x40 => Self::Disconnect,
            other => return Err(ProtocolError::UnknownOpcode(other)),
        };
        Ok(opcode)
    }

    /// Interface the request is addressed to, if it targets a protocol object.
    pub fn interface(self) -> Option<Interface> {
        match self {
            Self::BindControl | Self::DestroyControl | Self::RequestLock => {
                Some(Interface::Control)
            },
            Self::Unlock | Self::SetPersistent | Self::SetTemporary | Self::DestroyLock => {
                Some(Interface::Lock)
            },
            Self::GetVisibility | Self::SetVisibility | Self::DestroyVisibility => {
                Some(Interface::Visibility)
            },
            Self::SurfaceCreated | Self::SurfaceDestroyed | Self::Disconnect => None,
        }
    }
}
