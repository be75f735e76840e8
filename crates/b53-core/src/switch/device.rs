//! Switch - a detected chip with its logical configuration

use crate::access::{RegisterAddress, RegisterIo};
use crate::chip::{probe, ChipFamily, ChipId, ChipIdentity};
use crate::error::{Error, Result};
use crate::family::{Family, SwitchFamily};
use crate::link::PortLink;

use super::state::{SwitchState, VlanPort};

/// Largest 802.1Q VLAN id
const VID_MAX: u16 = 0xfff;

/// A registered switch
///
/// Setters only change the logical configuration and validate their input
/// before touching it. Nothing reaches the hardware until
/// [`apply_config`](Self::apply_config) or
/// [`reset_switch`](Self::reset_switch).
///
/// Calls are not serialized beyond the per-access bus lock; share a
/// `Switch` between threads only behind a lock of your own.
pub struct Switch<A: RegisterIo> {
    io: A,
    family: Family,
    state: SwitchState,
}

impl<A: RegisterIo> Switch<A> {
    /// Detect the chip behind `io` and bring it to its baseline
    ///
    /// Fails with [`Error::UnknownChip`] when no variant matches and with
    /// [`Error::ResetFailed`] when forwarding cannot be enabled.
    pub fn register(mut io: A) -> Result<Self> {
        let identity = probe(&mut io)?;
        let family = Family::for_chip(identity.chip_id);

        family.reset(&mut io)?;
        log::debug!("{}: registered", identity.chip_id);

        Ok(Self {
            io,
            family,
            state: SwitchState::new(identity),
        })
    }

    /// Detected chip
    pub fn identity(&self) -> ChipIdentity {
        self.state.identity
    }

    /// Detected variant
    pub fn chip(&self) -> ChipId {
        self.state.identity.chip_id
    }

    /// Logical configuration
    pub fn state(&self) -> &SwitchState {
        &self.state
    }

    /// Whether 802.1Q VLAN mode is configured
    pub fn vlan_enabled(&self) -> bool {
        self.state.vlan_enabled
    }

    /// Configure 802.1Q VLAN mode
    pub fn set_vlan_enabled(&mut self, enable: bool) {
        self.state.vlan_enabled = enable;
    }

    /// VLAN id offset
    pub fn vlan_base(&self) -> u16 {
        self.state.vlan_base
    }

    /// Set the VLAN id offset, rounded down to a multiple of the table size
    pub fn set_vlan_base(&mut self, base: u16) -> Result<()> {
        let chip = self.chip();
        if chip.family() == ChipFamily::Gigabit && base != 0 {
            return Err(Error::Unsupported("VLAN base"));
        }
        if base > VID_MAX {
            return Err(Error::InvalidVlanId {
                vid: base,
                max: VID_MAX,
            });
        }
        self.state.vlan_base = base & !(chip.num_vlans() - 1);
        Ok(())
    }

    /// VLAN assigned to untagged ingress on `port`
    pub fn port_pvid(&self, port: u8) -> Result<u16> {
        self.check_port(port)?;
        Ok(self.state.ports[usize::from(port)].pvid)
    }

    /// Assign untagged ingress on `port` to `vid`
    pub fn set_port_pvid(&mut self, port: u8, vid: u16) -> Result<()> {
        self.check_port(port)?;
        let max = self.chip().max_vid();
        if vid > max {
            return Err(Error::InvalidVlanId { vid, max });
        }
        self.state.ports[usize::from(port)].pvid = vid;
        Ok(())
    }

    /// Members of VLAN table entry `index`
    ///
    /// An invalid entry has no members.
    pub fn vlan_ports(&self, index: u16) -> Result<Vec<VlanPort>> {
        self.check_vlan_index(index)?;

        let entry = &self.state.vlans[usize::from(index)];
        if !entry.valid {
            return Ok(Vec::new());
        }

        Ok((0u8..)
            .zip(&self.state.ports)
            .filter(|(port, _)| entry.members & (1u16 << port) != 0)
            .map(|(port, config)| VlanPort {
                port,
                tagged: config.egress_tagged,
            })
            .collect())
    }

    /// Replace the members of VLAN table entry `index`
    ///
    /// Untagged members also get `index` as their pvid; tagged members are
    /// switched to tagged egress. The whole list is validated first.
    pub fn set_vlan_ports(&mut self, index: u16, ports: &[VlanPort]) -> Result<()> {
        self.check_vlan_index(index)?;
        if index == 0 && self.chip().family() == ChipFamily::Gigabit {
            return Err(Error::ReservedVlan { index });
        }
        for p in ports {
            self.check_port(p.port)?;
        }

        let mut members = 0u16;
        for p in ports {
            members |= 1u16 << p.port;
            let config = &mut self.state.ports[usize::from(p.port)];
            if p.tagged {
                config.egress_tagged = true;
            } else {
                config.egress_tagged = false;
                config.pvid = index;
            }
        }

        let entry = &mut self.state.vlans[usize::from(index)];
        entry.members = members;
        entry.valid = members != 0;
        Ok(())
    }

    /// Reconcile the hardware with the logical configuration
    pub fn apply_config(&mut self) -> Result<()> {
        log::debug!(
            "{}: applying configuration (vlan {})",
            self.chip(),
            if self.state.vlan_enabled { "on" } else { "off" }
        );
        self.family.apply(&mut self.io, &self.state)
    }

    /// Return to the default configuration and push it to the hardware
    pub fn reset_switch(&mut self) -> Result<()> {
        self.state.clear();
        self.family.reset(&mut self.io)?;
        self.apply_config()
    }

    /// Link summary of `port`
    pub fn port_link(&mut self, port: u8) -> Result<PortLink> {
        self.family.port_link(&mut self.io, port)
    }

    /// Toggle managed mode without touching the VLAN controls
    pub fn set_managed(&mut self, enable: bool) -> Result<()> {
        self.family.set_managed(&mut self.io, enable, false)
    }

    /// Read any register
    pub fn read_register(&mut self, addr: RegisterAddress) -> Result<u64> {
        self.io.read(addr)
    }

    /// Write any register
    pub fn write_register(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        self.io.write(addr, value)
    }

    /// Release the register interface
    pub fn into_inner(self) -> A {
        self.io
    }

    fn check_port(&self, port: u8) -> Result<()> {
        let ports = self.chip().num_ports();
        if port >= ports {
            return Err(Error::InvalidPort { port, ports });
        }
        Ok(())
    }

    fn check_vlan_index(&self, index: u16) -> Result<()> {
        let count = self.chip().num_vlans();
        if index >= count {
            return Err(Error::InvalidVlanIndex { index, count });
        }
        Ok(())
    }
}
