//! Switch chip identification
//!
//! This module describes the supported BCM53xx variants and how to tell
//! them apart from the management registers.

mod detect;
mod types;

pub use detect::*;
pub use types::*;
