//=========================================================================
// Device Arbiter
//
// Main entry point and coordinator for device arbitration.
//
// Architecture:
// ```text
//     Arbiter
//       ├─ DeviceRegistry        (live device set, observers)
//       ├─ OccupancyIndex        (device → holder records)
//       ├─ Roster                (users, preferences, holdings)
//       └─ ArbitrationController (full match pass per topology event)
//
//     host ──register/deregister──► Arbiter ◄──pump── EventCollector
// ```
//
// The arbiter is an explicitly constructed instance owned by whatever
// top-level context the host provides — there is no ambient singleton.
// All calls are synchronous and single-threaded; the host bridge is the
// only cross-thread entry and it is drained on the owning thread via
// `pump()`.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{info, warn};

//=== Internal Dependencies ===============================================

use crate::core::arbitration::roster::AccessMode;
use crate::core::arbitration::{ArbitrationController, Roster, TopologyEvent, UserHandle};
use crate::core::device::occupancy::OccupancyIndex;
use crate::core::device::registry::{DeviceObserver, DeviceRegistry};
use crate::core::device::{DeviceClass, DeviceId, DeviceKind, HolderMask};
use crate::core::error::ArbiterError;
use crate::core::host_bridge::{BridgeControl, EventCollector, HostEvent};

//=== Arbiter =============================================================

/// Device arbitration engine.
///
/// Owns the full arbitration state and exposes the host-facing surface:
/// device churn, user churn, occupancy queries, and the hotplug bridge.
/// Every mutating call re-arbitrates before returning, so holdings are
/// always current when a call completes.
///
/// # Examples
///
/// ```
/// use device_arbiter::prelude::*;
///
/// let mut arbiter = Arbiter::new();
///
/// let player = arbiter.register_user(vec![DeviceKind::Gamepad, DeviceKind::KeyboardMouse]);
/// arbiter.register_device(DeviceId::new(1), DeviceClass::Gamepad).unwrap();
///
/// assert_eq!(arbiter.held_devices(player).unwrap(), &[DeviceId::new(1)]);
/// ```
pub struct Arbiter {
    registry: DeviceRegistry,
    occupancy: OccupancyIndex,
    roster: Roster,
    controller: ArbitrationController,
}

impl Arbiter {
    //--- Construction -----------------------------------------------------

    /// Creates an empty arbiter: no devices, no users.
    pub fn new() -> Self {
        info!("Arbiter created");
        Self {
            registry: DeviceRegistry::new(),
            occupancy: OccupancyIndex::new(),
            roster: Roster::new(),
            controller: ArbitrationController::new(),
        }
    }

    //--- Device Churn -----------------------------------------------------

    /// Registers a device and re-arbitrates.
    ///
    /// Listeners join the device immediately; arbitrated users compete
    /// for it in the triggered match pass.
    pub fn register_device(&mut self, id: DeviceId, class: DeviceClass) -> Result<(), ArbiterError> {
        self.registry.register(id, class)?;

        // Catch-all listeners see every device unconditionally.
        let listeners: Vec<UserHandle> = self.roster.listeners().collect();
        for listener in listeners {
            if self.occupancy.join_shared(listener, id).is_ok() {
                self.roster.record_grant(listener, id);
            }
        }

        self.dispatch(TopologyEvent::DeviceAdded(id));
        Ok(())
    }

    /// Deregisters a device, revoking it from every holder, and
    /// re-arbitrates.
    pub fn deregister_device(&mut self, id: DeviceId) -> Result<(), ArbiterError> {
        self.registry.deregister(id)?;

        let (exclusive, shared) = self.occupancy.forget_device(id);
        if let Some(holder) = exclusive {
            self.roster.record_release(holder, id);
            info!("{} revoked from {} (device lost)", id, holder);
        }
        for listener in shared {
            self.roster.record_release(listener, id);
        }

        self.dispatch(TopologyEvent::DeviceRemoved(id));
        Ok(())
    }

    //--- User Churn -------------------------------------------------------

    /// Registers an arbitrated user with a priority-ordered preference
    /// list (highest first) and re-arbitrates.
    ///
    /// An empty list is legal; such a user never matches anything.
    pub fn register_user(&mut self, preferences: Vec<DeviceKind>) -> UserHandle {
        let handle = self.roster.register_arbitrated(preferences);
        self.dispatch(TopologyEvent::UserAdded(handle));
        handle
    }

    /// Registers a catch-all listener that holds every live device via
    /// the shared relation.
    pub fn register_listener(&mut self) -> UserHandle {
        let handle = self.roster.register_listener();

        let devices: Vec<DeviceId> = self.registry.devices().to_vec();
        for device in devices {
            if self.occupancy.join_shared(handle, device).is_ok() {
                self.roster.record_grant(handle, device);
            }
        }

        self.dispatch(TopologyEvent::UserAdded(handle));
        handle
    }

    /// Deregisters a user, releasing all of its holdings back to the
    /// pool, and re-arbitrates.
    ///
    /// A second call on the same handle is rejected with no side
    /// effects — handles are never reused.
    pub fn deregister_user(&mut self, handle: UserHandle) -> Result<(), ArbiterError> {
        let slot = self.roster.deregister(handle)?;

        for &device in &slot.held {
            let released = match slot.mode {
                AccessMode::Arbitrated => self.occupancy.release(handle, device),
                AccessMode::Listener => self.occupancy.leave_shared(handle, device),
            };
            if let Err(err) = released {
                warn!("Cleanup of {} for departing {} failed: {}", device, handle, err);
            }
        }

        self.dispatch(TopologyEvent::UserRemoved(handle));
        Ok(())
    }

    /// Explicitly releases one held device and re-arbitrates.
    ///
    /// Only arbitrated users release; listeners hold everything by
    /// definition. Note the triggered pass may immediately re-grant the
    /// device to the same user if it is still their best match.
    pub fn release_device(&mut self, handle: UserHandle, id: DeviceId) -> Result<(), ArbiterError> {
        match self.roster.mode_of(handle) {
            None => {
                warn!("Rejected release: {} is not registered", handle);
                return Err(ArbiterError::UnknownUser(handle));
            }
            Some(AccessMode::Listener) => {
                warn!("Rejected release: {} is a listener", handle);
                return Err(ArbiterError::NotArbitrated(handle));
            }
            Some(AccessMode::Arbitrated) => {}
        }

        self.occupancy.release(handle, id)?;
        self.roster.record_release(handle, id);

        self.dispatch(TopologyEvent::UserReleased(handle));
        Ok(())
    }

    //--- Queries ----------------------------------------------------------

    /// Returns the devices held by a user, in grant order.
    ///
    /// For listeners this is their shared holdings; for arbitrated
    /// users their exclusive match group.
    pub fn held_devices(&self, handle: UserHandle) -> Result<&[DeviceId], ArbiterError> {
        self.roster.held(handle)
    }

    /// Counts holders of a registered device under `mask`.
    pub fn holder_count(&self, id: DeviceId, mask: HolderMask) -> Result<usize, ArbiterError> {
        if !self.registry.contains(id) {
            return Err(ArbiterError::UnknownDevice(id));
        }
        Ok(self.occupancy.holder_count(id, mask))
    }

    /// Returns the number of live devices.
    pub fn device_count(&self) -> usize {
        self.registry.len()
    }

    /// Returns the number of live users (arbitrated and listeners).
    pub fn user_count(&self) -> usize {
        self.roster.len()
    }

    //--- Observers --------------------------------------------------------

    /// Attaches a device churn observer.
    pub fn add_observer(&mut self, observer: Box<dyn DeviceObserver>) {
        self.registry.add_observer(observer);
    }

    //--- Host Bridge ------------------------------------------------------

    /// Drains the host bridge and applies the drained hotplug batch.
    ///
    /// Rejected events (duplicate connect, unknown disconnect) are
    /// logged and skipped; the rest of the batch still applies. Returns
    /// `Shutdown` once the feed ends.
    pub fn pump(&mut self, collector: &mut EventCollector) -> BridgeControl {
        let control = collector.collect();

        for event in collector.take_batch() {
            let outcome = match event {
                HostEvent::DeviceConnected { id, class } => self.register_device(id, class),
                HostEvent::DeviceDisconnected { id } => self.deregister_device(id),
                // Collector reports shutdown via control flow.
                HostEvent::Shutdown => Ok(()),
            };
            if let Err(err) = outcome {
                warn!("Dropped host event {:?}: {}", event, err);
            }
        }

        control
    }

    //--- Internal Helpers -------------------------------------------------

    fn dispatch(&mut self, event: TopologyEvent) {
        self.controller
            .handle_event(event, &self.registry, &mut self.roster, &mut self.occupancy);
    }
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    //--- Test Helpers -----------------------------------------------------

    fn dev(raw: u32) -> DeviceId {
        DeviceId::new(raw)
    }

    //=====================================================================
    // End-to-End Scenarios
    //=====================================================================

    #[test]
    fn single_gamepad_goes_to_first_registered_user() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad, DeviceKind::KeyboardMouse]);
        let b = arbiter.register_user(vec![DeviceKind::Gamepad]);

        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);
        assert!(arbiter.held_devices(b).unwrap().is_empty());
    }

    #[test]
    fn satisfied_user_keeps_its_match_when_lower_preferences_appear() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad, DeviceKind::KeyboardMouse]);
        let b = arbiter.register_user(vec![DeviceKind::Gamepad]);
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        arbiter.register_device(dev(2), DeviceClass::Keyboard).unwrap();
        arbiter.register_device(dev(3), DeviceClass::Mouse).unwrap();

        // A's first preference is already satisfied — no demotion to the
        // pair. B has no KeyboardMouse in its own list and stays empty.
        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);
        assert!(arbiter.held_devices(b).unwrap().is_empty());
    }

    #[test]
    fn keyboard_and_mouse_arrive_as_one_pair_match() {
        let mut arbiter = Arbiter::new();
        let c = arbiter.register_user(vec![DeviceKind::KeyboardMouse]);

        arbiter.register_device(dev(1), DeviceClass::Keyboard).unwrap();
        arbiter.register_device(dev(2), DeviceClass::Mouse).unwrap();

        assert_eq!(arbiter.held_devices(c).unwrap(), &[dev(1), dev(2)]);
    }

    #[test]
    fn removing_a_held_device_empties_the_user_without_fallback() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad, DeviceKind::KeyboardMouse]);
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();
        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);

        arbiter.deregister_device(dev(1)).unwrap();

        // No other gamepad, no keyboard/mouse pair: A ends empty.
        assert!(arbiter.held_devices(a).unwrap().is_empty());
        assert_eq!(arbiter.device_count(), 0);
    }

    #[test]
    fn removed_device_becomes_claimable_by_the_next_eligible_user() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad]);
        let b = arbiter.register_user(vec![DeviceKind::Gamepad]);
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();
        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);

        arbiter.deregister_user(a).unwrap();

        assert_eq!(arbiter.held_devices(b).unwrap(), &[dev(1)]);
    }

    //=====================================================================
    // User Lifecycle
    //=====================================================================

    #[test]
    fn deregister_user_twice_is_rejected_without_side_effects() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad]);
        let b = arbiter.register_user(vec![DeviceKind::Gamepad]);
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        arbiter.deregister_user(a).unwrap();
        let err = arbiter.deregister_user(a);

        assert_eq!(err, Err(ArbiterError::UnknownUser(a)));
        // B's holding from the first deregistration is untouched.
        assert_eq!(arbiter.held_devices(b).unwrap(), &[dev(1)]);
        assert_eq!(arbiter.user_count(), 1);
    }

    #[test]
    fn explicit_release_re_arbitrates_and_may_re_grant() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad]);
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        arbiter.release_device(a, dev(1)).unwrap();

        // The pad went back to the pool and the triggered pass handed
        // it straight back — A is still the best match for it.
        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);
    }

    #[test]
    fn release_of_unheld_device_is_rejected() {
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad]);
        let b = arbiter.register_user(vec![DeviceKind::Gamepad]);
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        assert_eq!(
            arbiter.release_device(b, dev(1)),
            Err(ArbiterError::NotHolder(b, dev(1)))
        );
        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);
    }

    #[test]
    fn release_by_listener_is_rejected() {
        let mut arbiter = Arbiter::new();
        let listener = arbiter.register_listener();
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        assert_eq!(
            arbiter.release_device(listener, dev(1)),
            Err(ArbiterError::NotArbitrated(listener))
        );
    }

    //=====================================================================
    // Listeners & Holder Counting
    //=====================================================================

    #[test]
    fn listener_holds_existing_and_future_devices() {
        let mut arbiter = Arbiter::new();
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        let listener = arbiter.register_listener();
        assert_eq!(arbiter.held_devices(listener).unwrap(), &[dev(1)]);

        arbiter.register_device(dev(2), DeviceClass::Touch).unwrap();
        assert_eq!(arbiter.held_devices(listener).unwrap(), &[dev(1), dev(2)]);
    }

    #[test]
    fn holder_count_mixes_exclusive_and_shared_populations() {
        let mut arbiter = Arbiter::new();
        let _player = arbiter.register_user(vec![DeviceKind::Gamepad]);
        let _watcher = arbiter.register_listener();
        let _other_watcher = arbiter.register_listener();
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        assert_eq!(arbiter.holder_count(dev(1), HolderMask::EXCLUSIVE).unwrap(), 1);
        assert_eq!(arbiter.holder_count(dev(1), HolderMask::SHARED).unwrap(), 2);
        assert_eq!(arbiter.holder_count(dev(1), HolderMask::ANY).unwrap(), 3);
    }

    #[test]
    fn holder_count_on_unknown_device_is_rejected() {
        let arbiter = Arbiter::new();
        assert_eq!(
            arbiter.holder_count(dev(9), HolderMask::ANY),
            Err(ArbiterError::UnknownDevice(dev(9)))
        );
    }

    #[test]
    fn departing_listener_leaves_shared_sets() {
        let mut arbiter = Arbiter::new();
        let listener = arbiter.register_listener();
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();
        assert_eq!(arbiter.holder_count(dev(1), HolderMask::SHARED).unwrap(), 1);

        arbiter.deregister_user(listener).unwrap();

        assert_eq!(arbiter.holder_count(dev(1), HolderMask::SHARED).unwrap(), 0);
    }

    //=====================================================================
    // Determinism
    //=====================================================================

    #[test]
    fn identical_call_sequences_build_identical_holdings() {
        let build = || {
            let mut arbiter = Arbiter::new();
            let a = arbiter.register_user(vec![DeviceKind::Gamepad, DeviceKind::KeyboardMouse]);
            let b = arbiter.register_user(vec![DeviceKind::KeyboardMouse, DeviceKind::Other]);
            arbiter.register_device(dev(1), DeviceClass::Keyboard).unwrap();
            arbiter.register_device(dev(2), DeviceClass::Other).unwrap();
            arbiter.register_device(dev(3), DeviceClass::Mouse).unwrap();
            arbiter.register_device(dev(4), DeviceClass::Gamepad).unwrap();
            (
                arbiter.held_devices(a).unwrap().to_vec(),
                arbiter.held_devices(b).unwrap().to_vec(),
            )
        };

        assert_eq!(build(), build());
    }

    //=====================================================================
    // Host Bridge
    //=====================================================================

    #[test]
    fn pump_applies_connects_and_disconnects() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut arbiter = Arbiter::new();
        let a = arbiter.register_user(vec![DeviceKind::Gamepad]);

        tx.send(HostEvent::DeviceConnected {
            id: dev(1),
            class: DeviceClass::Gamepad,
        })
        .unwrap();
        assert_eq!(arbiter.pump(&mut collector), BridgeControl::Continue);
        assert_eq!(arbiter.held_devices(a).unwrap(), &[dev(1)]);

        tx.send(HostEvent::DeviceDisconnected { id: dev(1) }).unwrap();
        assert_eq!(arbiter.pump(&mut collector), BridgeControl::Continue);
        assert!(arbiter.held_devices(a).unwrap().is_empty());
    }

    #[test]
    fn pump_skips_rejected_events_and_applies_the_rest() {
        let (tx, rx) = unbounded();
        let mut collector = EventCollector::new(rx);
        let mut arbiter = Arbiter::new();
        arbiter.register_device(dev(1), DeviceClass::Gamepad).unwrap();

        // Duplicate connect is dropped; the fresh one still lands.
        tx.send(HostEvent::DeviceConnected {
            id: dev(1),
            class: DeviceClass::Gamepad,
        })
        .unwrap();
        tx.send(HostEvent::DeviceConnected {
            id: dev(2),
            class: DeviceClass::Touch,
        })
        .unwrap();

        assert_eq!(arbiter.pump(&mut collector), BridgeControl::Continue);
        assert_eq!(arbiter.device_count(), 2);
    }

    #[test]
    fn pump_reports_shutdown_when_the_feed_ends() {
        let (tx, rx) = unbounded::<HostEvent>();
        let mut collector = EventCollector::new(rx);
        let mut arbiter = Arbiter::new();

        drop(tx);

        assert_eq!(arbiter.pump(&mut collector), BridgeControl::Shutdown);
    }
}
