//=========================================================================
// Device Registry
//=========================================================================
//
// Tracks the live set of devices and notifies observers of churn.
//
// Architecture:
//   DeviceRegistry
//     ├─ classes: HashMap<DeviceId, DeviceClass>
//     ├─ order:   Vec<DeviceId>               (registration order)
//     └─ observers: Vec<Box<dyn DeviceObserver>>
//
// Registration order is load-bearing: it is the scan order of the
// matcher, so two registries built from the same call sequence produce
// identical assignments.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::{DeviceClass, DeviceId};
use crate::core::error::ArbiterError;

//=== DeviceObserver ======================================================

/// Receives device connect/disconnect notifications.
///
/// Observers are registered on the registry as boxed trait objects and
/// fired synchronously after the registry has been mutated. Both hooks
/// have default empty implementations, so an observer only overrides
/// what it cares about.
pub trait DeviceObserver: Send {
    /// Called after a device enters the registry.
    ///
    /// Default implementation does nothing.
    fn device_added(&mut self, _id: DeviceId, _class: DeviceClass) {}

    /// Called after a device leaves the registry.
    ///
    /// Default implementation does nothing.
    fn device_removed(&mut self, _id: DeviceId) {}
}

//=== DeviceRegistry ======================================================

/// Registration-ordered set of live devices.
///
/// The registry never creates or destroys devices; the host registers
/// and deregisters them, and the engine only indexes what is live.
pub struct DeviceRegistry {
    classes: HashMap<DeviceId, DeviceClass>,
    order: Vec<DeviceId>,
    observers: Vec<Box<dyn DeviceObserver>>,
}

impl DeviceRegistry {
    //--- Construction -----------------------------------------------------

    /// Creates an empty registry with no observers.
    pub fn new() -> Self {
        Self {
            classes: HashMap::new(),
            order: Vec::new(),
            observers: Vec::new(),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a device, making it visible to matching.
    ///
    /// Rejects ids already present. Observers fire after the registry
    /// has been updated.
    pub fn register(&mut self, id: DeviceId, class: DeviceClass) -> Result<(), ArbiterError> {
        if self.classes.contains_key(&id) {
            warn!("Rejected registration: {} is already registered", id);
            return Err(ArbiterError::DuplicateDevice(id));
        }

        debug!("Registered {} as {:?}", id, class);
        self.classes.insert(id, class);
        self.order.push(id);

        for observer in &mut self.observers {
            observer.device_added(id, class);
        }

        Ok(())
    }

    /// Deregisters a device, returning its class.
    ///
    /// Rejects unknown ids. Observers fire after the registry has been
    /// updated. Occupancy cleanup is the controller's job — the registry
    /// only forgets the identity.
    pub fn deregister(&mut self, id: DeviceId) -> Result<DeviceClass, ArbiterError> {
        let Some(class) = self.classes.remove(&id) else {
            warn!("Rejected deregistration: {} is not registered", id);
            return Err(ArbiterError::UnknownDevice(id));
        };

        self.order.retain(|&d| d != id);
        debug!("Deregistered {} ({:?})", id, class);

        for observer in &mut self.observers {
            observer.device_removed(id);
        }

        Ok(class)
    }

    //--- Observers --------------------------------------------------------

    /// Attaches an observer. Fired for all future churn, in attach order.
    pub fn add_observer(&mut self, observer: Box<dyn DeviceObserver>) {
        self.observers.push(observer);
    }

    //--- Queries ----------------------------------------------------------

    /// Returns `true` if the device is registered.
    pub fn contains(&self, id: DeviceId) -> bool {
        self.classes.contains_key(&id)
    }

    /// Returns the class of a registered device.
    pub fn class_of(&self, id: DeviceId) -> Option<DeviceClass> {
        self.classes.get(&id).copied()
    }

    /// Returns all live devices in registration order.
    pub fn devices(&self) -> &[DeviceId] {
        &self.order
    }

    /// Returns the number of live devices.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no devices are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for DeviceRegistry {
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
    use std::sync::{Arc, Mutex};

    //--- Test Observer ----------------------------------------------------

    /// Records every notification it receives.
    struct RecordingObserver {
        events: Arc<Mutex<Vec<String>>>,
    }

    impl DeviceObserver for RecordingObserver {
        fn device_added(&mut self, id: DeviceId, class: DeviceClass) {
            self.events
                .lock()
                .unwrap()
                .push(format!("added {} {:?}", id, class));
        }

        fn device_removed(&mut self, id: DeviceId) {
            self.events.lock().unwrap().push(format!("removed {}", id));
        }
    }

    fn recording(registry: &mut DeviceRegistry) -> Arc<Mutex<Vec<String>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        registry.add_observer(Box::new(RecordingObserver {
            events: Arc::clone(&events),
        }));
        events
    }

    //--- Tests ------------------------------------------------------------

    #[test]
    fn register_makes_device_visible() {
        let mut registry = DeviceRegistry::new();

        registry
            .register(DeviceId::new(1), DeviceClass::Gamepad)
            .unwrap();

        assert!(registry.contains(DeviceId::new(1)));
        assert_eq!(registry.class_of(DeviceId::new(1)), Some(DeviceClass::Gamepad));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn duplicate_registration_is_rejected_without_side_effects() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(DeviceId::new(1), DeviceClass::Gamepad)
            .unwrap();

        let err = registry.register(DeviceId::new(1), DeviceClass::Mouse);

        assert_eq!(err, Err(ArbiterError::DuplicateDevice(DeviceId::new(1))));
        // Original class untouched
        assert_eq!(registry.class_of(DeviceId::new(1)), Some(DeviceClass::Gamepad));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn deregister_unknown_is_rejected() {
        let mut registry = DeviceRegistry::new();
        let err = registry.deregister(DeviceId::new(9));
        assert_eq!(err, Err(ArbiterError::UnknownDevice(DeviceId::new(9))));
    }

    #[test]
    fn deregister_returns_class_and_forgets_identity() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(DeviceId::new(1), DeviceClass::Touch)
            .unwrap();

        let class = registry.deregister(DeviceId::new(1)).unwrap();

        assert_eq!(class, DeviceClass::Touch);
        assert!(!registry.contains(DeviceId::new(1)));
        assert!(registry.is_empty());
    }

    #[test]
    fn devices_preserve_registration_order() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(DeviceId::new(3), DeviceClass::Gamepad)
            .unwrap();
        registry
            .register(DeviceId::new(1), DeviceClass::Mouse)
            .unwrap();
        registry
            .register(DeviceId::new(2), DeviceClass::Keyboard)
            .unwrap();

        assert_eq!(
            registry.devices(),
            &[DeviceId::new(3), DeviceId::new(1), DeviceId::new(2)]
        );

        // Removal keeps the relative order of survivors
        registry.deregister(DeviceId::new(1)).unwrap();
        assert_eq!(registry.devices(), &[DeviceId::new(3), DeviceId::new(2)]);
    }

    #[test]
    fn reregistering_a_removed_id_is_a_fresh_device() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(DeviceId::new(1), DeviceClass::Gamepad)
            .unwrap();
        registry
            .register(DeviceId::new(2), DeviceClass::Touch)
            .unwrap();
        registry.deregister(DeviceId::new(1)).unwrap();

        registry
            .register(DeviceId::new(1), DeviceClass::Mouse)
            .unwrap();

        // New registration lands at the back of the scan order
        assert_eq!(registry.devices(), &[DeviceId::new(2), DeviceId::new(1)]);
        assert_eq!(registry.class_of(DeviceId::new(1)), Some(DeviceClass::Mouse));
    }

    #[test]
    fn observers_fire_on_churn() {
        let mut registry = DeviceRegistry::new();
        let events = recording(&mut registry);

        registry
            .register(DeviceId::new(1), DeviceClass::Gamepad)
            .unwrap();
        registry.deregister(DeviceId::new(1)).unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            events.as_slice(),
            &["added device#1 Gamepad".to_string(), "removed device#1".to_string()]
        );
    }

    #[test]
    fn observers_do_not_fire_on_rejected_calls() {
        let mut registry = DeviceRegistry::new();
        registry
            .register(DeviceId::new(1), DeviceClass::Gamepad)
            .unwrap();
        let events = recording(&mut registry);

        let _ = registry.register(DeviceId::new(1), DeviceClass::Gamepad);
        let _ = registry.deregister(DeviceId::new(5));

        assert!(events.lock().unwrap().is_empty());
    }
}
