//! b53-linux-mdio - Linux MII ioctl transport
//!
//! Reaches a B53 switch hanging off the MDIO bus of a network interface,
//! the usual setup on routers where the switch's CPU port is wired to the
//! SoC Ethernet MAC.
//!
//! # Example
//!
//! ```no_run
//! use b53_core::access::MdioAccess;
//! use b53_core::Switch;
//! use b53_linux_mdio::{LinuxMdio, LinuxMdioConfig};
//!
//! let config = LinuxMdioConfig::new("eth0");
//! let bus = LinuxMdio::open(&config)?;
//! let mut switch = Switch::register(MdioAccess::new(bus).with_phy(config.phy))?;
//! println!("{}", switch.port_link(0)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - An Ethernet driver implementing `SIOCGMIIREG`/`SIOCSMIIREG`
//! - `CAP_NET_ADMIN` for register writes

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxMdio, LinuxMdioConfig, DEFAULT_PHY};
pub use error::{LinuxMdioError, Result};

use b53_core::access::MdioAccess;

/// Open an interface's MDIO bus and wrap it in the pseudo PHY access engine
///
/// # Options
///
/// - `iface=eth0` - Required: network interface
/// - `phy=0x1e` - Optional: switch MDIO address (default: 0x1e)
pub fn open_linux_mdio(
    options: &[(&str, &str)],
) -> std::result::Result<MdioAccess<LinuxMdio>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let bus = LinuxMdio::open(&config)?;
    Ok(MdioAccess::new(bus).with_phy(config.phy))
}
