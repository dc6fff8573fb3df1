//=========================================================================
// Core Systems
//=========================================================================
//
// Engine internals: device vocabulary, occupancy tracking, arbitration
// policy, and the host event bridge.
//
// Architecture:
//   device        — identity/kind types, registry, occupancy index
//   arbitration   — roster, matcher, controller
//   host_bridge   — channel-fed hotplug ingestion
//   error         — rejection taxonomy shared by all of the above
//
// Normal application code goes through the top-level `Arbiter` facade;
// `core` is exposed publicly for host-level extensibility.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod arbitration;
pub mod device;
pub mod error;
pub mod host_bridge;

//=== Public API ==========================================================

pub use arbitration::{AccessMode, ArbitrationController, TopologyEvent, UserHandle};
pub use device::occupancy::OccupancyIndex;
pub use device::registry::{DeviceObserver, DeviceRegistry};
pub use device::{DeviceClass, DeviceId, DeviceKind, HolderMask};
pub use error::ArbiterError;
pub use host_bridge::{BridgeControl, EventCollector, HostEvent};
