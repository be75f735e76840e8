//! Switch device model
//!
//! [`Switch`] is what a configuration front end holds: the register
//! interface, the selected family state machine and the logical
//! configuration ([`SwitchState`]) it reconciles against the hardware.

mod device;
mod state;

pub use device::Switch;
pub use state::{PortConfig, SwitchState, VlanEntry, VlanPort};
