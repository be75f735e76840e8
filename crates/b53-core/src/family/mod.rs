//! Chip family state machines
//!
//! The two families share one capability set ([`SwitchFamily`]) but encode
//! their VLAN tables differently:
//!
//! - [`FastEthernet`] (BCM5325): 6 ports, table written through the VLAN
//!   page with the entry and the index/command in separate registers
//! - [`Gigabit`] (BCM539x, BCM531xx): 9 ports, table written through the
//!   ARL access page, at chip-dependent offsets; entry 0 is reserved
//!
//! [`Family`] selects the implementation for a detected chip.
//!
//! The state machines do not keep hardware state of their own; every call
//! gets the register interface and, for `apply`, the logical
//! configuration.

mod fe;
mod ge;

pub use fe::FastEthernet;
pub use ge::Gigabit;

use crate::access::RegisterIo;
use crate::chip::{ChipFamily, ChipId};
use crate::error::{Error, Result};
use crate::link::{Duplex, PortLink, Speed};
use crate::regs::{ctrl, page, stat, vlan};
use crate::switch::SwitchState;

use ctrl::SwitchMode;

/// Operations every family provides
pub trait SwitchFamily {
    /// Bring the switch to a forwarding baseline
    ///
    /// A no-op when forwarding is already enabled.
    fn reset(&self, io: &mut dyn RegisterIo) -> Result<()>;

    /// Reconcile the hardware with `state`
    fn apply(&self, io: &mut dyn RegisterIo, state: &SwitchState) -> Result<()>;

    /// Toggle managed mode; with `vlan` set, also program the VLAN control
    /// registers to the enforced pattern (or clear them)
    fn set_managed(&self, io: &mut dyn RegisterIo, enable: bool, vlan: bool) -> Result<()>;

    /// Write one VLAN table entry
    fn program_vlan_entry(
        &self,
        io: &mut dyn RegisterIo,
        index: u16,
        members: u16,
        untag: u16,
    ) -> Result<()>;

    /// Link summary of a front port
    fn port_link(&self, io: &mut dyn RegisterIo, port: u8) -> Result<PortLink>;
}

/// Family implementation selected by chip id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// BCM5325
    FastEthernet(FastEthernet),
    /// BCM539x and BCM531xx
    Gigabit(Gigabit),
}

impl Family {
    /// Implementation for `chip`
    pub const fn for_chip(chip: ChipId) -> Self {
        match chip.family() {
            ChipFamily::FastEthernet => Family::FastEthernet(FastEthernet::new(chip)),
            ChipFamily::Gigabit => Family::Gigabit(Gigabit::new(chip)),
        }
    }

    fn inner(&self) -> &dyn SwitchFamily {
        match self {
            Family::FastEthernet(fe) => fe as &dyn SwitchFamily,
            Family::Gigabit(ge) => ge as &dyn SwitchFamily,
        }
    }
}

impl SwitchFamily for Family {
    fn reset(&self, io: &mut dyn RegisterIo) -> Result<()> {
        self.inner().reset(io)
    }

    fn apply(&self, io: &mut dyn RegisterIo, state: &SwitchState) -> Result<()> {
        self.inner().apply(io, state)
    }

    fn set_managed(&self, io: &mut dyn RegisterIo, enable: bool, vlan: bool) -> Result<()> {
        self.inner().set_managed(io, enable, vlan)
    }

    fn program_vlan_entry(
        &self,
        io: &mut dyn RegisterIo,
        index: u16,
        members: u16,
        untag: u16,
    ) -> Result<()> {
        self.inner().program_vlan_entry(io, index, members, untag)
    }

    fn port_link(&self, io: &mut dyn RegisterIo, port: u8) -> Result<PortLink> {
        self.inner().port_link(io, port)
    }
}

/// Enable forwarding if it is off, then zero the port control registers
///
/// Ports `0..=chip.last_phy_port()` and the IMP port are cleared.
fn enable_forwarding(io: &mut dyn RegisterIo, chip: ChipId) -> Result<()> {
    let mode = SwitchMode::from_bits_retain(io.read8(page::CTRL, ctrl::SWITCH_MODE)?);
    if mode.contains(SwitchMode::FORWARD_EN) {
        log::debug!("{}: forwarding already enabled", chip);
        return Ok(());
    }

    let mode = mode.difference(SwitchMode::MANAGED) | SwitchMode::FORWARD_EN;
    io.write8(page::CTRL, ctrl::SWITCH_MODE, mode.bits())?;

    let mode = SwitchMode::from_bits_retain(io.read8(page::CTRL, ctrl::SWITCH_MODE)?);
    if !mode.contains(SwitchMode::FORWARD_EN) {
        log::error!("{}: failed to enable switch forwarding", chip);
        return Err(Error::ResetFailed);
    }

    for port in 0..=chip.last_phy_port() {
        io.write8(page::CTRL, ctrl::port_ctrl(port), 0)?;
    }
    io.write8(page::CTRL, ctrl::IMP_CTRL, 0)
}

/// Managed mode and VLAN control programming, shared by both families
fn set_managed(io: &mut dyn RegisterIo, enable: bool, with_vlan: bool) -> Result<()> {
    let mut mode = SwitchMode::from_bits_retain(io.read8(page::CTRL, ctrl::SWITCH_MODE)?);
    mode.set(SwitchMode::MANAGED, enable);

    if with_vlan {
        let (c0, c1, c4, c5) = if enable {
            (
                vlan::VlanCtrl0::ENFORCED.bits(),
                vlan::VlanCtrl1::ENFORCED.bits(),
                vlan::ctrl4(vlan::IngressVidCheck::Drop),
                vlan::VlanCtrl5::DROP_VTABLE_MISS.bits(),
            )
        } else {
            (0, 0, 0, 0)
        };
        io.write8(page::VLAN, vlan::CTRL0, c0)?;
        io.write8(page::VLAN, vlan::CTRL1, c1)?;
        io.write8(page::VLAN, vlan::CTRL4, c4)?;
        io.write8(page::VLAN, vlan::CTRL5, c5)?;
    }

    io.write8(page::CTRL, ctrl::SWITCH_MODE, mode.bits())
}

/// Reject ports without a PHY status
fn check_link_port(chip: ChipId, port: u8) -> Result<()> {
    let ports = chip.num_ports();
    if port >= ports {
        return Err(Error::InvalidPort { port, ports });
    }
    if port > chip.last_phy_port() {
        return Err(Error::NoPhyStatus { port });
    }
    Ok(())
}

/// Assemble a link summary from the per-port status fields
///
/// Speed and duplex are only decoded for ports whose link is up.
fn decode_link(port: u8, link: u16, speed: u8, duplex: u16) -> Result<PortLink> {
    if !stat::port_bit(link, port) {
        return Ok(PortLink {
            port,
            link: false,
            speed: Speed::Mbps10,
            duplex: Duplex::Half,
        });
    }
    let speed = match speed {
        stat::SPEED_10M => Speed::Mbps10,
        stat::SPEED_100M => Speed::Mbps100,
        stat::SPEED_1000M => Speed::Mbps1000,
        bits => return Err(Error::InvalidSpeed { port, bits }),
    };
    let duplex = if stat::port_bit(duplex, port) {
        Duplex::Full
    } else {
        Duplex::Half
    };
    Ok(PortLink {
        port,
        link: true,
        speed,
        duplex,
    })
}

/// Bounds check for a VLAN table index
fn check_vlan_index(chip: ChipId, index: u16) -> Result<()> {
    let count = chip.num_vlans();
    if index >= count {
        return Err(Error::InvalidVlanIndex { index, count });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RegisterFile;

    #[test]
    fn test_for_chip() {
        assert!(matches!(
            Family::for_chip(ChipId::Bcm5325M),
            Family::FastEthernet(_)
        ));
        for chip in [ChipId::Bcm5395, ChipId::Bcm5398, ChipId::Bcm53125] {
            assert!(matches!(Family::for_chip(chip), Family::Gigabit(_)));
        }
    }

    #[test]
    fn test_reset_noop_when_forwarding() {
        let mut regs = RegisterFile::new();
        regs.preset(page::CTRL, ctrl::SWITCH_MODE, 0x03);

        Family::for_chip(ChipId::Bcm5395).reset(&mut regs).unwrap();
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn test_reset_enables_forwarding() {
        let mut regs = RegisterFile::new();
        regs.preset(page::CTRL, ctrl::SWITCH_MODE, 0x01);
        regs.preset(page::CTRL, ctrl::port_ctrl(2), 0x03);

        Family::for_chip(ChipId::Bcm5325E).reset(&mut regs).unwrap();
        assert_eq!(regs.writes_to(page::CTRL, ctrl::SWITCH_MODE), vec![0x02]);
        assert_eq!(regs.value(page::CTRL, ctrl::port_ctrl(2)), 0);
        // FE clears ports 0..=4 and the IMP port
        assert_eq!(regs.writes().len(), 1 + 5 + 1);
        assert_eq!(regs.writes_to(page::CTRL, ctrl::IMP_CTRL), vec![0]);
    }

    #[test]
    fn test_reset_fails_when_forwarding_does_not_latch() {
        let mut regs = RegisterFile::new();
        regs.set_read_only(page::CTRL, ctrl::SWITCH_MODE);

        let err = Family::for_chip(ChipId::Bcm5397)
            .reset(&mut regs)
            .unwrap_err();
        assert!(matches!(err, Error::ResetFailed));
        assert!(regs.writes_to(page::CTRL, ctrl::IMP_CTRL).is_empty());
    }

    #[test]
    fn test_set_managed_programs_vlan_controls() {
        let mut regs = RegisterFile::new();
        regs.preset(page::CTRL, ctrl::SWITCH_MODE, 0x02);
        let family = Family::for_chip(ChipId::Bcm5395);

        family.set_managed(&mut regs, true, true).unwrap();
        assert_eq!(regs.value(page::CTRL, ctrl::SWITCH_MODE), 0x03);
        assert_eq!(regs.value(page::VLAN, vlan::CTRL0), 0xe0);
        assert_eq!(regs.value(page::VLAN, vlan::CTRL1), 0x0e);
        assert_eq!(regs.value(page::VLAN, vlan::CTRL4), 0x40);
        assert_eq!(regs.value(page::VLAN, vlan::CTRL5), 0x08);

        family.set_managed(&mut regs, false, true).unwrap();
        assert_eq!(regs.value(page::CTRL, ctrl::SWITCH_MODE), 0x02);
        for reg in [vlan::CTRL0, vlan::CTRL1, vlan::CTRL4, vlan::CTRL5] {
            assert_eq!(regs.value(page::VLAN, reg), 0);
        }
    }

    #[test]
    fn test_set_managed_mode_only() {
        let mut regs = RegisterFile::new();
        regs.preset(page::CTRL, ctrl::SWITCH_MODE, 0x02);

        Family::for_chip(ChipId::Bcm5325F)
            .set_managed(&mut regs, true, false)
            .unwrap();
        assert_eq!(regs.writes().len(), 1);
        assert_eq!(regs.value(page::CTRL, ctrl::SWITCH_MODE), 0x03);
    }

    #[test]
    fn test_decode_link_rejects_reserved_speed() {
        let err = decode_link(1, 0x02, 3, 0x02).unwrap_err();
        assert!(matches!(err, Error::InvalidSpeed { port: 1, bits: 3 }));
    }

    #[test]
    fn test_decode_link_down_skips_speed() {
        let link = decode_link(1, 0x01, 3, 0x02).unwrap();
        assert!(!link.link);
        assert_eq!(link.to_string(), "port:1 link:down");
    }
}
