//=========================================================================
// Host Bridge Interface
//=========================================================================
//
// Host-to-arbiter interface types.
//
// Defines the contract for hotplug notifications crossing from the
// host's device-watching thread into the arbiter's owning thread.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::device::{DeviceClass, DeviceId};

//=== HostEvent ===========================================================

/// Hotplug notifications sent from the host over the bridge channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// A physical device appeared.
    DeviceConnected { id: DeviceId, class: DeviceClass },

    /// A physical device went away.
    DeviceDisconnected { id: DeviceId },

    /// The host is shutting the feed down.
    Shutdown,
}

//=== BridgeControl =======================================================

/// Outcome of draining the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeControl {
    /// Keep pumping on future ticks.
    Continue,

    /// The feed ended (explicit shutdown or sender dropped).
    Shutdown,
}
