//=========================================================================
// Arbitration Controller
//=========================================================================
//
// Turns topology churn into occupancy updates.
//
// Flow:
//   TopologyEvent → run_full_match() → reconcile per user:
//     release holdings not in the new group,
//     grant the new group (revoking from any current holder)
//
// Every event triggers a full recomputation over all arbitrated users —
// there is no incremental re-match. O(users × preferences × devices)
// per event; the intended scale is a handful of local players and
// devices, so a full pass is cheaper than being clever.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::matcher::compute_assignment;
use super::roster::{Roster, UserHandle};
use crate::core::device::occupancy::OccupancyIndex;
use crate::core::device::registry::DeviceRegistry;
use crate::core::device::DeviceId;

//=== TopologyEvent =======================================================

/// Changes that invalidate the current assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyEvent {
    /// A device entered the registry.
    DeviceAdded(DeviceId),

    /// A device left the registry (already revoked from its holders).
    DeviceRemoved(DeviceId),

    /// An arbitrated user joined the roster.
    UserAdded(UserHandle),

    /// A user left the roster (its holdings already released).
    UserRemoved(UserHandle),

    /// A user explicitly released a device.
    UserReleased(UserHandle),
}

//=== ArbitrationController ===============================================

/// Runs full match passes and reconciles them against occupancy.
///
/// The controller is the only writer of the exclusive occupancy map.
/// It owns no topology itself — the registry and roster are passed in
/// per event, keeping the controller trivially restartable.
pub struct ArbitrationController {
    passes: u64,
}

impl ArbitrationController {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self { passes: 0 }
    }

    //--- Event Handling ---------------------------------------------------

    /// Processes one topology event with a full match pass.
    pub fn handle_event(
        &mut self,
        event: TopologyEvent,
        registry: &DeviceRegistry,
        roster: &mut Roster,
        occupancy: &mut OccupancyIndex,
    ) {
        debug!("Topology event: {:?}", event);
        self.run_full_match(registry, roster, occupancy);
    }

    /// Returns how many match passes have run.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    //--- Internal Helpers -------------------------------------------------

    /// Recomputes the assignment and applies it to occupancy and roster.
    ///
    /// Reconciliation runs per user in registration order. Granting a
    /// device still held by a later user revokes it from them first —
    /// the last writer within the pass wins that device.
    fn run_full_match(
        &mut self,
        registry: &DeviceRegistry,
        roster: &mut Roster,
        occupancy: &mut OccupancyIndex,
    ) {
        self.passes += 1;
        let assignment = compute_assignment(registry, roster);
        debug!(
            "Match pass {}: {} of {} users matched",
            self.passes,
            assignment.matched_users(),
            roster.users().len()
        );

        let groups: Vec<(UserHandle, Vec<DeviceId>)> = assignment
            .iter()
            .map(|(user, group)| (user, group.to_vec()))
            .collect();

        for (user, group) in groups {
            // Release whatever the user holds that the pass did not
            // re-award.
            let stale: Vec<DeviceId> = roster
                .held(user)
                .map(<[DeviceId]>::to_vec)
                .unwrap_or_default()
                .into_iter()
                .filter(|device| !group.contains(device))
                .collect();
            for device in stale {
                Self::revoke(user, device, roster, occupancy);
            }

            // Grant the new group, evicting any current holder.
            for device in group {
                if roster.held(user).is_ok_and(|held| held.contains(&device)) {
                    continue; // kept across the pass, nothing to do
                }

                if let Some(holder) = occupancy.exclusive_holder(device) {
                    debug!("Preempting {}: {} goes to {}", holder, device, user);
                    Self::revoke(holder, device, roster, occupancy);
                }

                match occupancy.claim(user, device) {
                    Ok(()) => {
                        roster.record_grant(user, device);
                        debug!("Granted {} to {}", device, user);
                    }
                    Err(err) => {
                        // Unreachable while the indices agree; recorded
                        // rather than trusted.
                        warn!("Grant of {} to {} failed: {}", device, user, err);
                    }
                }
            }
        }
    }

    /// Removes one holding from both sides of the bookkeeping.
    fn revoke(user: UserHandle, device: DeviceId, roster: &mut Roster, occupancy: &mut OccupancyIndex) {
        if let Err(err) = occupancy.release(user, device) {
            warn!("Revocation of {} from {} failed: {}", device, user, err);
            return;
        }
        roster.record_release(user, device);
        debug!("Revoked {} from {}", device, user);
    }
}

impl Default for ArbitrationController {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
