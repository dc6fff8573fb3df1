//=========================================================================
// Allocation Matcher
//=========================================================================
//
// Computes a best-effort device assignment from preference lists.
//
// Algorithm (greedy, priority-first):
//   for user in registration order:
//     for kind in user preferences, highest priority first:
//       scan devices in registration order for the first unclaimed
//       match; paired kinds need both halves unclaimed, taken
//       atomically or not at all
//     first hit ends the user's scan (one match group per pass)
//
// The matcher is pure: it reads the registry and roster and returns a
// provisional assignment. Current holdings do not reserve — whoever
// holds a device before the pass neither blocks nor benefits; the
// controller reconciles the result against occupancy afterwards.
//
// Deliberately no fairness or back-off: a user early in registration
// order with a high-priority preference preempts later users every
// pass. Cost is O(users × preferences × devices), acceptable for the
// intended scale (a handful of local players and devices).
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashSet;

//=== Internal Dependencies ===============================================

use super::roster::{Roster, UserHandle};
use crate::core::device::registry::DeviceRegistry;
use crate::core::device::{DeviceClass, DeviceId, DeviceKind};

//=== Assignment ==========================================================

/// Provisional user → device-group map produced by one match pass.
///
/// Groups appear in user registration order. A group is empty when no
/// preference of that user could be satisfied; a paired match yields a
/// two-device group.
pub struct Assignment {
    groups: Vec<(UserHandle, Vec<DeviceId>)>,
}

impl Assignment {
    /// Returns the devices provisionally matched to `user` this pass.
    pub fn group(&self, user: UserHandle) -> &[DeviceId] {
        self.groups
            .iter()
            .find(|(handle, _)| *handle == user)
            .map(|(_, group)| group.as_slice())
            .unwrap_or(&[])
    }

    /// Iterates match groups in user registration order.
    pub fn iter(&self) -> impl Iterator<Item = (UserHandle, &[DeviceId])> {
        self.groups
            .iter()
            .map(|(handle, group)| (*handle, group.as_slice()))
    }

    /// Returns the number of users that received a non-empty group.
    pub fn matched_users(&self) -> usize {
        self.groups.iter().filter(|(_, group)| !group.is_empty()).count()
    }
}

//=== Matching ============================================================

/// Computes one full assignment pass.
///
/// Deterministic: identical registry and roster contents (including
/// their registration orders) always yield the identical assignment.
pub fn compute_assignment(registry: &DeviceRegistry, roster: &Roster) -> Assignment {
    let mut claimed: HashSet<DeviceId> = HashSet::new();
    let mut groups = Vec::new();

    for (user, preferences) in roster.arbitrated() {
        let group = match_one_user(registry, &mut claimed, preferences);
        groups.push((user, group));
    }

    Assignment { groups }
}

/// Resolves a single user's preference list against unclaimed devices.
///
/// Returns the first satisfiable match group, claiming its devices, or
/// an empty group if nothing in the list can be satisfied.
fn match_one_user(
    registry: &DeviceRegistry,
    claimed: &mut HashSet<DeviceId>,
    preferences: &[DeviceKind],
) -> Vec<DeviceId> {
    for &kind in preferences {
        if let Some((first_half, second_half)) = kind.pair_halves() {
            // Both halves must be free before either is claimed.
            let first = find_unclaimed(registry, claimed, first_half);
            let second = find_unclaimed(registry, claimed, second_half);

            if let (Some(first), Some(second)) = (first, second) {
                claimed.insert(first);
                claimed.insert(second);
                return vec![first, second];
            }
        } else if let Some(device) = registry
            .devices()
            .iter()
            .copied()
            .find(|&d| !claimed.contains(&d) && registry.class_of(d).is_some_and(|c| kind.matches(c)))
        {
            claimed.insert(device);
            return vec![device];
        }
    }

    Vec::new()
}

/// Finds the first unclaimed device of `class` in registration order.
fn find_unclaimed(
    registry: &DeviceRegistry,
    claimed: &HashSet<DeviceId>,
    class: DeviceClass,
) -> Option<DeviceId> {
    registry
        .devices()
        .iter()
        .copied()
        .find(|&d| !claimed.contains(&d) && registry.class_of(d) == Some(class))
}

//=========================================================================
// Unit Tests
//=========================================================================
