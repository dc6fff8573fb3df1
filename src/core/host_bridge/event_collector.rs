//=========================================================================
// Event Collector
//=========================================================================
//
// Host event collector with bounded polling and shutdown detection.
//
// Architecture:
//   Receiver<HostEvent> → collect() → pending batch → BridgeControl
//
// Bounded polling prevents a hotplug storm from starving the host's
// tick. The collector never blocks: an empty channel yields an empty
// batch and Continue.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::{Receiver, TryRecvError};
use log::warn;

//=== Internal Dependencies ===============================================

use super::{BridgeControl, HostEvent};

//=== EventCollector ======================================================

/// Drains host hotplug events in bounded batches.
pub struct EventCollector {
    receiver: Receiver<HostEvent>,
    pending: Vec<HostEvent>,
}

impl EventCollector {
    pub fn new(receiver: Receiver<HostEvent>) -> Self {
        Self {
            receiver,
            pending: Vec::with_capacity(4),
        }
    }

    /// Collects pending host events (bounded to prevent starvation).
    ///
    /// Returns `Shutdown` on an explicit [`HostEvent::Shutdown`] or when
    /// the sending side has disconnected; events drained before the
    /// shutdown remain available via [`take_batch`](Self::take_batch).
    pub fn collect(&mut self) -> BridgeControl {
        const MAX_EVENTS_PER_TICK: usize = 64;

        self.pending.clear();
        let mut drained = 0;

        while drained < MAX_EVENTS_PER_TICK {
            match self.receiver.try_recv() {
                Ok(HostEvent::Shutdown) => return BridgeControl::Shutdown,
                Ok(event) => {
                    self.pending.push(event);
                    drained += 1;
                }
                Err(TryRecvError::Disconnected) => return BridgeControl::Shutdown,
                Err(TryRecvError::Empty) => break,
            }
        }

        if drained >= MAX_EVENTS_PER_TICK {
            warn!("Hotplug backlog: drained {} events this tick", drained);
        }

        BridgeControl::Continue
    }

    /// Takes ownership of the collected batch, leaving an empty one.
    pub fn take_batch(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Returns the collected batch without consuming it.
    pub fn batch(&self) -> &[HostEvent] {
        &self.pending
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
