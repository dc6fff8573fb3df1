//=========================================================================
// Device Identity & Kind Types
//
// Defines the stable vocabulary of the arbitration engine.
//
// This module abstracts away host-specific device representations
// (e.g. evdev nodes, HID handles, SDL joystick ids) into a unified,
// engine-friendly format used by the registry and the matcher.
//
// Responsibilities:
// - Represent device identity in a stable, portable way (`DeviceId`)
// - Categorize devices into a closed set of classes (`DeviceClass`)
// - Express what users ask for, including paired requests (`DeviceKind`)
// - Select holder populations for occupancy queries (`HolderMask`)
//
// Design:
// All types here are:
// - Copy-cheap (no heap allocations)
// - Hash-stable for efficient HashSet/HashMap usage
// - Closed tagged unions — new categories are added as variants, never
//   discovered dynamically
//
// Data Flow:
// ```text
// Host Layer (OS input backend)
//         ↓
//    DeviceId + DeviceClass (this module)
//         ↓
//    DeviceRegistry (tracks the live set)
//         ↓
//    Matcher (resolves DeviceKind preferences against classes)
// ```
//
//=========================================================================

//=== Submodules ==========================================================

pub mod occupancy;
pub mod registry;

//=== Standard Library Imports ============================================

use std::fmt;

//=== DeviceId ============================================================

/// Opaque identity of a registered device.
///
/// Ids are assigned by the host (typically whatever handle its input
/// backend hands out) and are never minted by the engine. The engine
/// only indexes them.
///
/// Two devices with the same id cannot coexist in the registry;
/// re-registering a deregistered id is allowed and treats it as a brand
/// new device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(pub u32);

impl DeviceId {
    /// Creates a device id from a raw host handle.
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw host handle.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

//=== DeviceClass =========================================================

/// Physical category of a connected device.
///
/// Abstracts host-specific device types (e.g. an evdev gamepad node, a
/// HID keyboard) into a stable, portable enum.
///
/// The `Other` variant covers devices the host cannot classify: exotic
/// controllers, MIDI boards, anything without a dedicated variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceClass {
    /// A gamepad / joystick style controller.
    Gamepad,

    /// A keyboard. Half of the `KeyboardMouse` paired kind.
    Keyboard,

    /// A pointing device. The other half of the `KeyboardMouse` pair.
    Mouse,

    /// A touch surface.
    Touch,

    /// Any device not otherwise classified.
    Other,
}

//=== DeviceKind ==========================================================

/// Category a user can ask for in its preference list.
///
/// Kinds are what preference lists are made of; classes are what
/// devices carry. Most kinds map to a single class, but `KeyboardMouse`
/// is a *paired* kind: it is only satisfiable by one `Keyboard` and one
/// `Mouse` device together, and the pair is granted and revoked as a
/// single unit — never half of it.
///
/// `Other` is the catch-all kind: it matches any device the host left
/// unclassified (class `Other`), and nothing else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// One gamepad.
    Gamepad,

    /// One keyboard and one mouse, granted together or not at all.
    KeyboardMouse,

    /// One touch surface.
    Touch,

    /// One unclassified device.
    Other,
}

impl DeviceKind {
    /// Returns `true` if a single device of `class` satisfies this kind.
    ///
    /// Always `false` for paired kinds — those are resolved through
    /// [`pair_halves`](Self::pair_halves) instead.
    #[inline]
    pub fn matches(self, class: DeviceClass) -> bool {
        matches!(
            (self, class),
            (DeviceKind::Gamepad, DeviceClass::Gamepad)
                | (DeviceKind::Touch, DeviceClass::Touch)
                | (DeviceKind::Other, DeviceClass::Other)
        )
    }

    /// Returns the two complementary classes of a paired kind.
    ///
    /// `None` for simple kinds.
    #[inline]
    pub fn pair_halves(self) -> Option<(DeviceClass, DeviceClass)> {
        match self {
            DeviceKind::KeyboardMouse => Some((DeviceClass::Keyboard, DeviceClass::Mouse)),
            _ => None,
        }
    }
}

//=== HolderMask ==========================================================

/// Selects which holder populations an occupancy query counts.
///
/// A device can be held two independent ways: exclusively (by at most
/// one arbitrated user) and shared (by any number of listeners). Hosts
/// that need mixed accounting — "how many consumers see this device at
/// all?" — pass `ANY`; hosts checking arbitration state alone pass
/// `EXCLUSIVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HolderMask {
    /// Count the exclusive holder (0 or 1).
    pub exclusive: bool,

    /// Count shared listener holders.
    pub shared: bool,
}

//--- Mask Constants ------------------------------------------------------

impl HolderMask {
    /// Counts nobody. Useful as a neutral default.
    pub const NONE: Self = Self {
        exclusive: false,
        shared: false,
    };

    /// Counts only the exclusive holder.
    pub const EXCLUSIVE: Self = Self {
        exclusive: true,
        shared: false,
    };

    /// Counts only shared listener holders.
    pub const SHARED: Self = Self {
        exclusive: false,
        shared: true,
    };

    /// Counts every holder of either population.
    pub const ANY: Self = Self {
        exclusive: true,
        shared: true,
    };
}

impl Default for HolderMask {
    fn default() -> Self {
        Self::ANY
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
