//=========================================================================
// User Roster
//=========================================================================
//
// Registration-ordered table of consumers.
//
// Architecture:
//   Roster
//     ├─ slots: HashMap<UserHandle, UserSlot>
//     ├─ order: Vec<UserHandle>            (registration order)
//     └─ next_handle: u64                  (monotonic, never reused)
//
// Registration order is the matcher's user iteration order and the
// only tie-break between users — there is no global priority.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use crate::core::device::{DeviceId, DeviceKind};
use crate::core::error::ArbiterError;

//=== UserHandle ==========================================================

/// Opaque identity of a registered user.
///
/// Handles are monotonic and never reused, so a deregistered handle
/// stays invalid forever — a second deregistration of the same handle
/// is detectably rejected rather than hitting an unrelated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserHandle(u64);

impl UserHandle {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for UserHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user#{}", self.0)
    }
}

//=== AccessMode ==========================================================

/// How a user participates in device access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    /// Competes for exclusive holdings through the matcher, ranked by
    /// its preference list.
    Arbitrated,

    /// Catch-all listener: joins the shared holder set of every live
    /// device unconditionally. Never touched by the matcher.
    Listener,
}

//=== UserSlot ============================================================

/// Per-user bookkeeping.
pub(crate) struct UserSlot {
    pub(crate) mode: AccessMode,

    /// Preference list, highest priority first. Empty for listeners.
    pub(crate) preferences: Vec<DeviceKind>,

    /// Currently held devices, in grant order.
    pub(crate) held: Vec<DeviceId>,
}

//=== Roster ==============================================================

/// Registration-ordered user table.
pub struct Roster {
    slots: HashMap<UserHandle, UserSlot>,
    order: Vec<UserHandle>,
    next_handle: u64,
}

impl Roster {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self {
            slots: HashMap::new(),
            order: Vec::new(),
            next_handle: 0,
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers an arbitrated user with the given preference list.
    ///
    /// An empty list is legal and matches nothing.
    pub fn register_arbitrated(&mut self, preferences: Vec<DeviceKind>) -> UserHandle {
        self.register(AccessMode::Arbitrated, preferences)
    }

    /// Registers a catch-all listener user.
    pub fn register_listener(&mut self) -> UserHandle {
        self.register(AccessMode::Listener, Vec::new())
    }

    fn register(&mut self, mode: AccessMode, preferences: Vec<DeviceKind>) -> UserHandle {
        let handle = UserHandle(self.next_handle);
        self.next_handle += 1;

        debug!("Registered {} as {:?} with {:?}", handle, mode, preferences);
        self.slots.insert(
            handle,
            UserSlot {
                mode,
                preferences,
                held: Vec::new(),
            },
        );
        self.order.push(handle);
        handle
    }

    /// Removes a user, returning its slot for occupancy cleanup.
    ///
    /// Rejects unknown (including already-deregistered) handles.
    pub(crate) fn deregister(&mut self, handle: UserHandle) -> Result<UserSlot, ArbiterError> {
        let Some(slot) = self.slots.remove(&handle) else {
            warn!("Rejected deregistration: {} is not registered", handle);
            return Err(ArbiterError::UnknownUser(handle));
        };

        self.order.retain(|&u| u != handle);
        debug!("Deregistered {} holding {:?}", handle, slot.held);
        Ok(slot)
    }

    //--- Held-List Bookkeeping (controller only) --------------------------

    // The occupancy index is the authority on who holds what; these
    // mirrors exist so `held()` is O(1) per user. The controller updates
    // both sides of every grant/revocation.

    pub(crate) fn record_grant(&mut self, handle: UserHandle, device: DeviceId) {
        if let Some(slot) = self.slots.get_mut(&handle) {
            debug_assert!(!slot.held.contains(&device));
            slot.held.push(device);
        }
    }

    pub(crate) fn record_release(&mut self, handle: UserHandle, device: DeviceId) {
        if let Some(slot) = self.slots.get_mut(&handle) {
            slot.held.retain(|&d| d != device);
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Returns `true` if the handle is live.
    pub fn contains(&self, handle: UserHandle) -> bool {
        self.slots.contains_key(&handle)
    }

    /// Returns the access mode of a live user.
    pub fn mode_of(&self, handle: UserHandle) -> Option<AccessMode> {
        self.slots.get(&handle).map(|slot| slot.mode)
    }

    /// Returns the devices currently held by a user, in grant order.
    pub fn held(&self, handle: UserHandle) -> Result<&[DeviceId], ArbiterError> {
        self.slots
            .get(&handle)
            .map(|slot| slot.held.as_slice())
            .ok_or(ArbiterError::UnknownUser(handle))
    }

    /// Returns all live users in registration order.
    pub fn users(&self) -> &[UserHandle] {
        &self.order
    }

    /// Iterates arbitrated users in registration order with their
    /// preference lists.
    pub fn arbitrated(&self) -> impl Iterator<Item = (UserHandle, &[DeviceKind])> {
        self.order.iter().filter_map(|&handle| {
            let slot = &self.slots[&handle];
            match slot.mode {
                AccessMode::Arbitrated => Some((handle, slot.preferences.as_slice())),
                AccessMode::Listener => None,
            }
        })
    }

    /// Iterates listener users in registration order.
    pub fn listeners(&self) -> impl Iterator<Item = UserHandle> + '_ {
        self.order
            .iter()
            .copied()
            .filter(|&handle| self.slots[&handle].mode == AccessMode::Listener)
    }

    /// Returns the number of live users.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no users are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

impl Default for Roster {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
