//=========================================================================
// Arbitration System
//=========================================================================
//
// Decides who holds what.
//
// Architecture:
//   Roster (who wants what)
//       ↓
//   Matcher (greedy priority-first assignment, pure)
//       ↓
//   Controller (reconciles the assignment into the occupancy index)
//
// Every topology change — device or user churn, explicit release —
// funnels through the controller as a TopologyEvent and triggers one
// full match pass.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod controller;
pub mod matcher;
pub mod roster;

//=== Public API ==========================================================

pub use controller::{ArbitrationController, TopologyEvent};
pub use matcher::{compute_assignment, Assignment};
pub use roster::{AccessMode, Roster, UserHandle};
