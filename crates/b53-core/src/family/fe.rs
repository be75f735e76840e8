//! BCM5325 (Fast Ethernet) family

use crate::access::RegisterIo;
use crate::chip::ChipId;
use crate::error::Result;
use crate::link::PortLink;
use crate::regs::{ctrl, page, stat, vlan};
use crate::switch::SwitchState;

use super::SwitchFamily;

/// Entry that spans every port untagged while VLANs are off
const FLAT_VLAN: u16 = 1;

/// State machine for the 6-port BCM5325 variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FastEthernet {
    chip: ChipId,
}

impl FastEthernet {
    /// State machine for `chip`
    pub const fn new(chip: ChipId) -> Self {
        Self { chip }
    }

    /// Write entry `index` with the upper VID bits of the VLAN base
    ///
    /// An empty member set is written as an all-zero (invalid) entry.
    pub fn write_entry(
        &self,
        io: &mut dyn RegisterIo,
        index: u16,
        members: u16,
        untag: u16,
        vid_high: u8,
    ) -> Result<()> {
        super::check_vlan_index(self.chip, index)?;

        let entry = if members == 0 {
            0
        } else {
            vlan::FeEntry {
                members,
                untag,
                vid_high,
                valid: true,
            }
            .encode()
        };
        io.write32(page::VLAN, vlan::WRITE, entry)?;
        io.write16(page::VLAN, vlan::TABLE_ACCESS, vlan::table_write(index as u8))
    }
}

impl SwitchFamily for FastEthernet {
    fn reset(&self, io: &mut dyn RegisterIo) -> Result<()> {
        super::enable_forwarding(io, self.chip)
    }

    fn apply(&self, io: &mut dyn RegisterIo, state: &SwitchState) -> Result<()> {
        super::set_managed(io, state.vlan_enabled, true)?;

        if state.vlan_enabled {
            let untag = state.untag_mask();
            for (port, config) in (0u8..).zip(&state.ports) {
                if !config.egress_tagged {
                    io.write16(
                        page::VLAN,
                        vlan::def_tag(port),
                        config.pvid + state.vlan_base,
                    )?;
                }
            }

            let vid_high = (state.vlan_base >> 4) as u8;
            for (index, entry) in (0u16..).zip(&state.vlans) {
                self.write_entry(io, index, entry.members, untag & entry.members, vid_high)?;
            }
        } else {
            for index in 0..self.chip.num_vlans() {
                self.write_entry(io, index, 0, 0, 0)?;
            }
            self.write_entry(io, FLAT_VLAN, vlan::MEMBER_MASK, vlan::MEMBER_MASK, 0)?;

            for port in 0..self.chip.cpu_port() {
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
        self.write_entry(io, index, members, untag, 0)
    }

    fn port_link(&self, io: &mut dyn RegisterIo, port: u8) -> Result<PortLink> {
        super::check_link_port(self.chip, port)?;

        let link = io.read16(page::STAT, stat::LINK)?;
        let speed = io.read16(page::STAT, stat::SPEED)?;
        let duplex = io.read16(page::STAT, stat::DUPLEX_FE)?;

        super::decode_link(port, link, stat::speed_fe(speed, port), duplex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::ChipIdentity;
    use crate::error::Error;
    use crate::link::{Duplex, Speed};
    use crate::testing::RegisterFile;

    fn state() -> SwitchState {
        SwitchState::new(ChipIdentity {
            chip_id: ChipId::Bcm5325E,
            core_revision: 0,
        })
    }

    fn fe() -> FastEthernet {
        FastEthernet::new(ChipId::Bcm5325E)
    }

    #[test]
    fn test_entry_encoding() {
        let mut regs = RegisterFile::new();

        fe().program_vlan_entry(&mut regs, 3, 0x21, 0x01).unwrap();
        assert_eq!(regs.writes_to(page::VLAN, vlan::WRITE), vec![0x0010_0061]);
        assert_eq!(
            regs.writes_to(page::VLAN, vlan::TABLE_ACCESS),
            vec![0x3003]
        );
        assert_eq!(regs.table_entry(3), Some(0x0010_0061));
    }

    #[test]
    fn test_empty_entry_is_zero() {
        let mut regs = RegisterFile::new();

        fe().program_vlan_entry(&mut regs, 2, 0, 0x3f).unwrap();
        assert_eq!(regs.table_entry(2), Some(0));
    }

    #[test]
    fn test_entry_index_checked() {
        let mut regs = RegisterFile::new();

        let err = fe().program_vlan_entry(&mut regs, 16, 1, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidVlanIndex {
                index: 16,
                count: 16
            }
        ));
        assert!(regs.writes().is_empty());
    }

    #[test]
    fn test_apply_vlan_enabled() {
        let mut regs = RegisterFile::new();
        let mut state = state();
        state.vlan_enabled = true;
        state.ports[0].pvid = 1;
        state.ports[1].pvid = 2;
        state.ports[5].egress_tagged = true;
        state.vlans[1].members = 0b10_0001;
        state.vlans[1].valid = true;
        state.vlans[2].members = 0b10_0010;
        state.vlans[2].valid = true;

        fe().apply(&mut regs, &state).unwrap();

        assert_eq!(regs.value(page::VLAN, vlan::def_tag(0)), 1);
        assert_eq!(regs.value(page::VLAN, vlan::def_tag(1)), 2);
        // Tagged port keeps no default tag
        assert!(regs.writes_to(page::VLAN, vlan::def_tag(5)).is_empty());

        assert_eq!(regs.table_entry(0), Some(0));
        assert_eq!(regs.table_entry(1), Some(0x0010_0061));
        assert_eq!(regs.table_entry(2), Some(0x0010_00a2));
        for index in 3..16 {
            assert_eq!(regs.table_entry(index), Some(0));
        }
        assert_eq!(regs.value(page::VLAN, vlan::CTRL0), 0xe0);
        assert_eq!(regs.value(page::CTRL, ctrl::SWITCH_MODE) & 0x01, 0x01);
    }

    #[test]
    fn test_apply_with_vlan_base() {
        let mut regs = RegisterFile::new();
        let mut state = state();
        state.vlan_enabled = true;
        state.vlan_base = 0x20;
        state.ports[0].pvid = 1;
        state.vlans[1].members = 0x01;
        state.vlans[1].valid = true;

        fe().apply(&mut regs, &state).unwrap();

        assert_eq!(regs.value(page::VLAN, vlan::def_tag(0)), 0x21);
        let entry = vlan::FeEntry::decode(regs.table_entry(1).unwrap());
        assert_eq!(entry.vid_high, 0x02);
        assert_eq!(entry.members, 0x01);
        assert_eq!(entry.untag, 0x01);
        assert!(entry.valid);
    }

    #[test]
    fn test_apply_vlan_disabled() {
        let mut regs = RegisterFile::new();
        regs.preset(page::VLAN, vlan::def_tag(3), 7);
        regs.preset(page::CTRL, ctrl::port_ctrl(4), 0x03);

        fe().apply(&mut regs, &state()).unwrap();

        for index in 0..16 {
            let expected = if index == FLAT_VLAN { 0x0010_0fff } else { 0 };
            assert_eq!(regs.table_entry(index), Some(expected));
        }
        for port in 0..6 {
            assert_eq!(regs.value(page::VLAN, vlan::def_tag(port)), 0);
        }
        assert_eq!(regs.value(page::CTRL, ctrl::port_ctrl(4)), 0);
        assert_eq!(regs.writes_to(page::CTRL, ctrl::IMP_CTRL), vec![0]);
        assert_eq!(regs.value(page::VLAN, vlan::CTRL0), 0);
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut regs = RegisterFile::new();
        let mut state = state();
        state.vlan_enabled = true;
        state.vlans[4].members = 0x3c;
        state.vlans[4].valid = true;

        fe().apply(&mut regs, &state).unwrap();
        let first = regs.writes().to_vec();
        regs.clear_log();
        fe().apply(&mut regs, &state).unwrap();

        assert_eq!(regs.writes(), first.as_slice());
    }

    #[test]
    fn test_port_link() {
        let mut regs = RegisterFile::new();
        regs.preset(page::STAT, stat::LINK, 0b0_1010);
        regs.preset(page::STAT, stat::SPEED, 0b0_1000);
        regs.preset(page::STAT, stat::DUPLEX_FE, 0b0_0010);

        let link = fe().port_link(&mut regs, 3).unwrap();
        assert!(link.link);
        assert_eq!(link.speed, Speed::Mbps100);
        assert_eq!(link.duplex, Duplex::Half);

        let link = fe().port_link(&mut regs, 1).unwrap();
        assert_eq!(link.speed, Speed::Mbps10);
        assert_eq!(link.duplex, Duplex::Full);

        assert!(!fe().port_link(&mut regs, 0).unwrap().link);
    }

    #[test]
    fn test_port_link_cpu_port() {
        let mut regs = RegisterFile::new();

        assert!(matches!(
            fe().port_link(&mut regs, 5),
            Err(Error::NoPhyStatus { port: 5 })
        ));
        assert!(matches!(
            fe().port_link(&mut regs, 6),
            Err(Error::InvalidPort { port: 6, ports: 6 })
        ));
        assert!(regs.writes().is_empty());
    }
}
