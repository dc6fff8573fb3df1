//=========================================================================
// Host Bridge
//=========================================================================
//
// Channel-based hotplug feed from the host into the arbiter.
//
// Flow:
//   host thread → Sender<HostEvent> → EventCollector → Arbiter::pump()
//
// The bridge is the only cross-thread touch point of the crate, and it
// is a channel endpoint rather than shared state: the arbiter itself is
// mutated exclusively by the thread that pumps it.
//
//=========================================================================

//=== Module Declarations =================================================

mod event_collector;
mod interface;

//=== Public API ==========================================================

pub use event_collector::EventCollector;
pub use interface::{BridgeControl, HostEvent};
