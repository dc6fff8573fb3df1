//=========================================================================
// Device Arbiter — Library Root
//
// This crate defines the public API surface of the arbitration engine.
//
// Responsibilities:
// - Expose the top-level facade (`Arbiter`)
// - Provide clean separation between the facade and the lower-level
//   subsystems (registry, occupancy, matching, host bridge)
//
// Typical usage:
// ```no_run
// use device_arbiter::prelude::*;
//
// fn main() {
//     let mut arbiter = Arbiter::new();
//     let player = arbiter.register_user(vec![DeviceKind::Gamepad]);
//     arbiter
//         .register_device(DeviceId::new(1), DeviceClass::Gamepad)
//         .unwrap();
//     assert_eq!(arbiter.held_devices(player).unwrap().len(), 1);
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains all internal engine systems and logic (device
// registry, occupancy index, arbitration policy, host bridge). It is
// exposed publicly for host-level extensibility, but normal application
// code will mostly use the top-level `Arbiter` facade.
//
pub mod core;

//--- Internal Modules ----------------------------------------------------
//
// `arbiter` defines the facade that owns and coordinates the core
// subsystems.
//
mod arbiter;

pub mod prelude;

//--- Public Exports ------------------------------------------------------
//
// Re-exports the `Arbiter` struct as the main entry point, so users can
// simply `use device_arbiter::Arbiter;` without having to know the
// internal module structure.
//
pub use arbiter::Arbiter;
