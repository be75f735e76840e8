//! MII ioctl bus master
//!
//! Network drivers that own an MDIO bus export it through the
//! `SIOCGMIIREG`/`SIOCSMIIREG` ioctls on any socket, addressed by interface
//! name. [`LinuxMdio`] implements [`MdioBus`] on top of them.

use crate::error::{LinuxMdioError, Result};

use b53_core::bus::MdioBus;

use nix::sys::socket::{socket, AddressFamily, SockFlag, SockType};

use std::io;
use std::os::fd::{AsRawFd, OwnedFd};
use std::time::Duration;

/// Default MDIO address of the switch register interface
pub const DEFAULT_PHY: u8 = 0x1e;

/// Highest MDIO address on a clause 22 bus
const MAX_PHY: u8 = 0x1f;

mod ioctl {
    use nix::{ioctl_readwrite_bad, ioctl_write_ptr_bad};

    const SIOCGMIIREG: libc::c_ulong = 0x8948;
    const SIOCSMIIREG: libc::c_ulong = 0x8949;

    ioctl_readwrite_bad!(mii_read, SIOCGMIIREG, super::MiiIfreq);
    ioctl_write_ptr_bad!(mii_write, SIOCSMIIREG, super::MiiIfreq);
}

/// Kernel `struct mii_ioctl_data`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct MiiIoctlData {
    phy_id: u16,
    reg_num: u16,
    val_in: u16,
    val_out: u16,
}

/// `struct ifreq` carrying MII data in its union
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct MiiIfreq {
    name: [libc::c_char; libc::IFNAMSIZ],
    data: MiiIoctlData,
    _pad: [u8; 16],
}

/// Configuration for the MII ioctl transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxMdioConfig {
    /// Network interface owning the MDIO bus (e.g., "eth0")
    pub interface: String,
    /// MDIO address the switch answers on
    pub phy: u8,
}

impl Default for LinuxMdioConfig {
    fn default() -> Self {
        Self {
            interface: String::new(),
            phy: DEFAULT_PHY,
        }
    }
}

impl LinuxMdioConfig {
    /// Create a configuration for the given interface
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
            ..Default::default()
        }
    }

    /// Set the switch's MDIO address
    pub fn with_phy(mut self, phy: u8) -> Self {
        self.phy = phy;
        self
    }
}

/// MDIO bus of a network interface
pub struct LinuxMdio {
    sock: OwnedFd,
    ifreq: MiiIfreq,
    interface: String,
}

impl LinuxMdio {
    /// Open the MDIO bus behind `config.interface`
    ///
    /// Reads one register of the configured address to make sure the
    /// driver implements the MII ioctls.
    pub fn open(config: &LinuxMdioConfig) -> Result<Self> {
        if config.interface.is_empty() {
            return Err(LinuxMdioError::NoInterface);
        }
        let name = config.interface.as_bytes();
        if name.len() >= libc::IFNAMSIZ || name.contains(&0) {
            return Err(LinuxMdioError::InterfaceName(config.interface.clone()));
        }

        let mut ifreq = MiiIfreq::default();
        for (dst, src) in ifreq.name.iter_mut().zip(name) {
            *dst = *src as libc::c_char;
        }

        let sock = socket(
            AddressFamily::Inet,
            SockType::Datagram,
            SockFlag::SOCK_CLOEXEC,
            None,
        )
        .map_err(|e| LinuxMdioError::Socket(e.into()))?;

        let mut mdio = Self {
            sock,
            ifreq,
            interface: config.interface.clone(),
        };

        // MII_PHYSID1
        let id = mdio
            .read(config.phy, 2)
            .map_err(|source| LinuxMdioError::NoMii {
                iface: config.interface.clone(),
                source,
            })?;

        log::info!(
            "linux_mdio: Opened {} (phy {:#04x}, id {:#06x})",
            config.interface,
            config.phy,
            id
        );
        Ok(mdio)
    }

    /// Interface name
    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl MdioBus for LinuxMdio {
    fn read(&mut self, phy: u8, reg: u8) -> io::Result<u16> {
        self.ifreq.data = MiiIoctlData {
            phy_id: u16::from(phy),
            reg_num: u16::from(reg),
            ..Default::default()
        };
        // SAFETY: the socket is open and `ifreq` matches the layout the
        // kernel copies in and out
        unsafe { ioctl::mii_read(self.sock.as_raw_fd(), &mut self.ifreq) }?;
        Ok(self.ifreq.data.val_out)
    }

    fn write(&mut self, phy: u8, reg: u8, value: u16) -> io::Result<()> {
        self.ifreq.data = MiiIoctlData {
            phy_id: u16::from(phy),
            reg_num: u16::from(reg),
            val_in: value,
            val_out: 0,
        };
        // SAFETY: as above, the kernel only reads the request
        unsafe { ioctl::mii_write(self.sock.as_raw_fd(), &self.ifreq) }?;
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// Parse backend options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxMdioConfig, String> {
    let mut config = LinuxMdioConfig::default();

    for (key, value) in options {
        match *key {
            "iface" => {
                config.interface = value.to_string();
            }
            "phy" => {
                let phy = parse_u8(value).ok_or_else(|| format!("Invalid phy value: {}", value))?;
                if phy > MAX_PHY {
                    return Err(format!("Invalid MDIO address: {} (must be 0-31)", phy));
                }
                config.phy = phy;
            }
            _ => {
                log::warn!("linux_mdio: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.interface.is_empty() {
        return Err("No interface specified. Use iface=<netdev>".to_string());
    }

    Ok(config)
}

fn parse_u8(s: &str) -> Option<u8> {
    match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}
