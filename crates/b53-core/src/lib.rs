//! b53-core - Core library for Broadcom B53 (BCM53xx) switch cores
//!
//! This crate turns a narrow management transport into a uniform
//! register-level interface and drives the per-family configuration state
//! machines on top of it.
//!
//! # Layers
//!
//! - [`bus`] - raw transport traits (`MdioBus`, `SpiBus`) implemented by the
//!   backend crates
//! - [`access`] - the Register Access Engine: turns a logical
//!   `(page, register, width)` access into the transport's multi-step
//!   protocol, one bus lock per access
//! - [`chip`] - chip identification
//! - [`family`] - FE (BCM5325) and GE (BCM539x/BCM531xx) state machines
//! - [`switch`] - the logical switch state and the calls a configuration
//!   front end makes
//!
//! # Example
//!
//! ```ignore
//! use b53_core::access::SpiAccess;
//! use b53_core::switch::{Switch, VlanPort};
//!
//! let mut sw = Switch::register(SpiAccess::new(spi_bus))?;
//! println!("Found: {}", sw.identity());
//!
//! sw.set_vlan_enabled(true);
//! sw.set_vlan_ports(1, &[VlanPort::untagged(0), VlanPort::tagged(8)])?;
//! sw.apply_config()?;
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod access;
pub mod bus;
pub mod chip;
pub mod error;
pub mod family;
pub mod link;
pub mod regs;
pub mod switch;

#[cfg(test)]
mod testing;

pub use access::{RegisterAddress, RegisterIo, Width};
pub use chip::{probe, ChipFamily, ChipId, ChipIdentity};
pub use error::{Error, Result};
pub use link::{Duplex, PortLink, Speed};
pub use switch::{PortConfig, Switch, SwitchState, VlanEntry, VlanPort};
