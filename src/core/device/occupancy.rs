//=========================================================================
// Occupancy Index
//=========================================================================
//
// Maps devices to their current holders.
//
// Two independent relations:
//   exclusive: HashMap<DeviceId, UserHandle>        (at most one holder)
//   shared:    HashMap<DeviceId, HashSet<UserHandle>> (any number)
//
// The matcher and controller write only the exclusive map. Listener
// users live entirely in the shared map. Holder counting can mix both
// populations under a HolderMask.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::{HashMap, HashSet};

use log::warn;

//=== Internal Dependencies ===============================================

use super::{DeviceId, HolderMask};
use crate::core::arbitration::roster::UserHandle;
use crate::core::error::ArbiterError;

//=== OccupancyIndex ======================================================

/// Device → holder relation with O(1) occupancy queries.
///
/// The index does not know about the registry; callers are expected to
/// validate device identity before touching occupancy. Every mutation
/// here validates its own holder-state preconditions and rejects
/// without partial effects.
pub struct OccupancyIndex {
    exclusive: HashMap<DeviceId, UserHandle>,
    shared: HashMap<DeviceId, HashSet<UserHandle>>,
}

impl OccupancyIndex {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            exclusive: HashMap::new(),
            shared: HashMap::new(),
        }
    }

    //--- Exclusive Holding ------------------------------------------------

    /// Records `user` as the exclusive holder of `device`.
    ///
    /// Rejects if the device already has a different exclusive holder,
    /// or if `user` already holds it.
    pub fn claim(&mut self, user: UserHandle, device: DeviceId) -> Result<(), ArbiterError> {
        match self.exclusive.get(&device) {
            Some(&holder) if holder == user => {
                warn!("Rejected claim: {} already holds {}", user, device);
                Err(ArbiterError::AlreadyHolds(user, device))
            }
            Some(&holder) => {
                warn!("Rejected claim: {} is held by {}", device, holder);
                Err(ArbiterError::DeviceHeldByOther(device, holder))
            }
            None => {
                self.exclusive.insert(device, user);
                Ok(())
            }
        }
    }

    /// Clears the exclusive record of `device` held by `user`.
    ///
    /// Rejects if `user` is not the current exclusive holder.
    pub fn release(&mut self, user: UserHandle, device: DeviceId) -> Result<(), ArbiterError> {
        match self.exclusive.get(&device) {
            Some(&holder) if holder == user => {
                self.exclusive.remove(&device);
                Ok(())
            }
            _ => {
                warn!("Rejected release: {} does not hold {}", user, device);
                Err(ArbiterError::NotHolder(user, device))
            }
        }
    }

    /// Returns the exclusive holder of `device`, if any.
    pub fn exclusive_holder(&self, device: DeviceId) -> Option<UserHandle> {
        self.exclusive.get(&device).copied()
    }

    //--- Shared Holding ---------------------------------------------------

    /// Adds `user` to the shared holder set of `device`.
    pub fn join_shared(&mut self, user: UserHandle, device: DeviceId) -> Result<(), ArbiterError> {
        let holders = self.shared.entry(device).or_default();
        if !holders.insert(user) {
            warn!("Rejected shared join: {} already holds {}", user, device);
            return Err(ArbiterError::AlreadyHolds(user, device));
        }
        Ok(())
    }

    /// Removes `user` from the shared holder set of `device`.
    pub fn leave_shared(&mut self, user: UserHandle, device: DeviceId) -> Result<(), ArbiterError> {
        let removed = self
            .shared
            .get_mut(&device)
            .map(|holders| holders.remove(&user))
            .unwrap_or(false);

        if !removed {
            warn!("Rejected shared leave: {} does not hold {}", user, device);
            return Err(ArbiterError::NotHolder(user, device));
        }

        if self.shared.get(&device).is_some_and(HashSet::is_empty) {
            self.shared.remove(&device);
        }
        Ok(())
    }

    //--- Queries ----------------------------------------------------------

    /// Counts holders of `device` across the populations selected by
    /// `mask`.
    pub fn holder_count(&self, device: DeviceId, mask: HolderMask) -> usize {
        let mut count = 0;

        if mask.exclusive && self.exclusive.contains_key(&device) {
            count += 1;
        }
        if mask.shared {
            count += self.shared.get(&device).map_or(0, HashSet::len);
        }

        count
    }

    //--- Device Teardown --------------------------------------------------

    /// Erases every record of `device`, returning who was affected.
    ///
    /// Used when a device leaves the registry: the exclusive holder (if
    /// any) and all shared holders must have their held lists pruned by
    /// the caller.
    pub fn forget_device(&mut self, device: DeviceId) -> (Option<UserHandle>, Vec<UserHandle>) {
        let exclusive = self.exclusive.remove(&device);
        let shared = self
            .shared
            .remove(&device)
            .map(|holders| holders.into_iter().collect())
            .unwrap_or_default();
        (exclusive, shared)
    }
}

impl Default for OccupancyIndex {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
