//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use device_arbiter::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Arbiter facade
pub use crate::arbiter::Arbiter;

// Device vocabulary
pub use crate::core::device::{DeviceClass, DeviceId, DeviceKind, HolderMask};

// Users
pub use crate::core::arbitration::{AccessMode, UserHandle};

// Observers and errors
pub use crate::core::device::registry::DeviceObserver;
pub use crate::core::error::ArbiterError;

// Host bridge
pub use crate::core::host_bridge::{BridgeControl, EventCollector, HostEvent};
