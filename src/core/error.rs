//=========================================================================
// Arbitration Errors
//=========================================================================
//
// Rejection values for every public mutating operation.
//
// Rejections are always values, never panics, and never leave partial
// state behind: each operation validates first and mutates only on the
// success path. A preference list that yields no match is NOT an error —
// the user simply ends the pass holding nothing.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use super::arbitration::roster::UserHandle;
use super::device::DeviceId;

//=== ArbiterError ========================================================

/// Rejection reasons for arbitration operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArbiterError {
    /// The device id is not in the registry.
    UnknownDevice(DeviceId),

    /// The device id is already registered.
    DuplicateDevice(DeviceId),

    /// The user handle is not in the roster (never issued, or already
    /// deregistered).
    UnknownUser(UserHandle),

    /// The device is exclusively held by a different user.
    DeviceHeldByOther(DeviceId, UserHandle),

    /// The user already holds this device.
    AlreadyHolds(UserHandle, DeviceId),

    /// The user is not a holder of this device.
    NotHolder(UserHandle, DeviceId),

    /// The operation requires an arbitrated (preferred) user.
    NotArbitrated(UserHandle),
}

impl std::fmt::Display for ArbiterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownDevice(id) => write!(f, "{} is not registered", id),
            Self::DuplicateDevice(id) => write!(f, "{} is already registered", id),
            Self::UnknownUser(user) => write!(f, "{} is not registered", user),
            Self::DeviceHeldByOther(id, holder) => {
                write!(f, "{} is exclusively held by {}", id, holder)
            }
            Self::AlreadyHolds(user, id) => write!(f, "{} already holds {}", user, id),
            Self::NotHolder(user, id) => write!(f, "{} does not hold {}", user, id),
            Self::NotArbitrated(user) => write!(f, "{} is not an arbitrated user", user),
        }
    }
}

impl std::error::Error for ArbiterError {}

//=========================================================================
// Unit Tests
//=========================================================================
