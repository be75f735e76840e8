//! BCM539x / BCM531xx (Gigabit) family

use crate::access::RegisterIo;
use crate::chip::ChipId;
use crate::error::{Error, Result};
use crate::link::PortLink;
use crate::regs::{arlio, ctrl, page, stat, vlan};
use crate::switch::SwitchState;

use super::SwitchFamily;

/// State machine for the 9-port gigabit variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gigabit {
    chip: ChipId,
    vt: arlio::VtRegs,
}

impl Gigabit {
    /// State machine for `chip`
    pub const fn new(chip: ChipId) -> Self {
        let vt = if chip.uses_9798_vlan_regs() {
            arlio::VtRegs::BCM9798
        } else {
            arlio::VtRegs::STANDARD
        };
        Self { chip, vt }
    }

    /// VLAN table register offsets used by this chip
    pub const fn vt_regs(&self) -> arlio::VtRegs {
        self.vt
    }

    fn write_entry(
        &self,
        io: &mut dyn RegisterIo,
        index: u16,
        members: u16,
        untag: u16,
    ) -> Result<()> {
        io.write16(page::ARLIO, self.vt.index, index)?;
        io.write32(page::ARLIO, self.vt.entry, arlio::encode_entry(members, untag))?;
        io.write8(page::ARLIO, self.vt.access, arlio::VtAccess::START.bits())
    }
}

impl SwitchFamily for Gigabit {
    fn reset(&self, io: &mut dyn RegisterIo) -> Result<()> {
        super::enable_forwarding(io, self.chip)?;

        if self.chip.has_port_override() {
            let current = io.read8(page::CTRL, ctrl::PORT_OVERRIDE)?;
            let forced = ctrl::PortOverride::from_bits_retain(current)
                | ctrl::PortOverride::ENABLE
                | ctrl::PortOverride::LINK;
            io.write8(page::CTRL, ctrl::PORT_OVERRIDE, forced.bits())?;
        }
        Ok(())
    }

    fn apply(&self, io: &mut dyn RegisterIo, state: &SwitchState) -> Result<()> {
        super::set_managed(io, state.vlan_enabled, true)?;

        if state.vlan_enabled {
            let untag = state.untag_mask();
            for (port, config) in (0u8..).zip(&state.ports) {
                if !config.egress_tagged {
                    io.write16(page::VLAN, vlan::def_tag(port), config.pvid)?;
                }
            }

            // Entry 0 is reserved
            for (index, entry) in (0u16..).zip(&state.vlans).skip(1) {
                self.write_entry(io, index, entry.members, untag & entry.members)?;
            }
        } else {
            for index in 1..self.chip.num_vlans() {
                self.write_entry(io, index, 0, 0)?;
            }

            for port in 0..=self.chip.last_phy_port() {
                io.write8(page::CTRL, ctrl::port_ctrl(port), 0)?;
            }
            io.write8(page::CTRL, ctrl::IMP_CTRL, 0)?;

            for port in 0..self.chip.num_ports() {
                io.write16(page::VLAN, vlan::def_tag(port), 0)?;
            }
        }

        Ok(())
    }

    fn set_managed(&self, io: &mut dyn RegisterIo, enable: bool, vlan: bool) -> Result<()> {
        super::set_managed(io, enable, vlan)
    }

    fn program_vlan_entry(
        &self,
        io: &mut dyn RegisterIo,
        index: u16,
        members: u16,
        untag: u16,
    ) -> Result<()> {
        super::check_vlan_index(self.chip, index)?;
        if index == 0 {
            return Err(Error::ReservedVlan { index });
        }
        self.write_entry(io, index, members, untag)
    }

    fn port_link(&self, io: &mut dyn RegisterIo, port: u8) -> Result<PortLink> {
        super::check_link_port(self.chip, port)?;

        let link = io.read16(page::STAT, stat::LINK)?;
        let speed = io.read32(page::STAT, stat::SPEED)?;
        let duplex = io.read16(page::STAT, stat::DUPLEX_GE)?;

        super::decode_link(port, link, stat::speed_ge(speed, port), duplex)
    }
}
