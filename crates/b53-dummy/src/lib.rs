//! b53-dummy - Simulated B53 switch for testing
//!
//! This crate provides a switch chip that lives in memory and answers both
//! management transports the real parts offer:
//!
//! - the pseudo PHY protocol on MDIO address 0x1e ([`MdioBus`])
//! - the command/status byte protocol on SPI ([`SpiBus`])
//!
//! Registers are kept per `(page, offset)`. The VLAN table, the forwarding
//! enable bit and the status summaries behave like the hardware closely
//! enough to run the family state machines against it. [`Faults`] injects
//! the failure modes the access engines have to cope with.
//!
//! Delays are accounted, not slept.

use std::collections::HashMap;
use std::io;

use b53_core::bus::{MdioBus, SpiBus};
use b53_core::chip::{ChipFamily, ChipId};
use b53_core::link::{Duplex, Speed};
use b53_core::regs::{arlio, ctrl, mgmt, page, stat, vlan};

// MDIO pseudo PHY
const PSEUDO_PHY: u8 = 0x1e;
const MDIO_PAGE: u8 = 0x10;
const MDIO_ADDR: u8 = 0x11;
const MDIO_DATA0: u8 = 0x18;
const MDIO_OP_WRITE: u16 = 1;
const MDIO_OP_READ: u16 = 2;
const MDIO_OP_MASK: u16 = 3;

// SPI
const SPI_CMD_READ: u8 = 0x60;
const SPI_CMD_WRITE: u8 = 0x61;
const SPI_DATA0: u8 = 0xf0;
const SPI_STATUS: u8 = 0xfe;
const SPI_PAGE: u8 = 0xff;
const SPI_STATUS_RACK: u8 = 1 << 5;

/// Failure injection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Faults {
    /// MDIO operations never clear their op bits
    pub stall_mdio: bool,
    /// SPI reads are never acknowledged
    pub never_ack_spi: bool,
    /// The forwarding enable bit does not latch
    pub forward_stuck: bool,
}

/// Configuration for the simulated switch
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Value of the device id register (16 bit)
    pub device_id: u16,
    /// VLAN control 4 reset value (BCM5325 sub-variant)
    pub vc4: u8,
    /// Core revision register
    pub core_revision: u8,
    /// Device id reads that return zero before the real id shows up
    pub zero_id_reads: u32,
    /// Injected failures
    pub faults: Faults,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self::for_chip(ChipId::Bcm5395)
    }
}

impl DummyConfig {
    /// Simulate `chip`
    pub fn for_chip(chip: ChipId) -> Self {
        Self::with_device_id(chip.device_id(), chip.vc4())
    }

    /// Simulate whatever answers with `device_id`
    pub fn with_device_id(device_id: u16, vc4: u8) -> Self {
        Self {
            device_id,
            vc4,
            core_revision: 0,
            zero_id_reads: 0,
            faults: Faults::default(),
        }
    }

    /// Set the core revision
    pub fn with_core_revision(mut self, rev: u8) -> Self {
        self.core_revision = rev;
        self
    }

    /// Inject failures
    pub fn with_faults(mut self, faults: Faults) -> Self {
        self.faults = faults;
        self
    }

    /// Chip the id registers resolve to, if any
    pub fn chip(&self) -> Option<ChipId> {
        let id8 = self.device_id as u8;
        if ChipId::is_ambiguous_id(id8) {
            Some(ChipId::from_vc4(self.vc4))
        } else {
            ChipId::from_device_id8(id8).or(ChipId::from_device_id16(self.device_id))
        }
    }
}

/// Simulated switch chip
///
/// Implements both [`MdioBus`] and [`SpiBus`]; pick one per test.
pub struct DummySwitch {
    config: DummyConfig,
    chip: Option<ChipId>,
    regs: HashMap<(u8, u8), u64>,
    vlan_table: HashMap<u16, u32>,
    id_reads: u32,

    mdio_page: u8,
    mdio_addr: u16,
    mdio_busy: u16,
    mdio_data: [u16; 4],
    mdio_dirty: u8,

    spi_page: u8,
    spi_data: [u8; 8],
    spi_rack: bool,

    mdio_polls: u32,
    spi_polls: u32,
    elapsed_us: u64,
    writes: Vec<(u8, u8, u64)>,
}

impl DummySwitch {
    /// Create a switch with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let chip = config.chip();
        let mut regs = HashMap::new();
        regs.insert((page::MGMT, mgmt::DEVICE_ID), u64::from(config.device_id));
        regs.insert((page::VLAN, vlan::CTRL4), u64::from(config.vc4));
        regs.insert((page::STAT, stat::CORE_REV), u64::from(config.core_revision));

        Self {
            config,
            chip,
            regs,
            vlan_table: HashMap::new(),
            id_reads: 0,
            mdio_page: 0,
            mdio_addr: 0,
            mdio_busy: 0,
            mdio_data: [0; 4],
            mdio_dirty: 0,
            spi_page: 0,
            spi_data: [0; 8],
            spi_rack: false,
            mdio_polls: 0,
            spi_polls: 0,
            elapsed_us: 0,
            writes: Vec::new(),
        }
    }

    /// Create a BCM5395
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Current value of a register
    pub fn register(&self, page: u8, reg: u8) -> u64 {
        self.regs.get(&(page, reg)).copied().unwrap_or(0)
    }

    /// Set a register without side effects
    pub fn set_register(&mut self, page: u8, reg: u8, value: u64) {
        self.regs.insert((page, reg), value);
    }

    /// VLAN table entry as last written by a table command
    pub fn vlan_entry(&self, index: u16) -> Option<u32> {
        self.vlan_table.get(&index).copied()
    }

    /// Set the link, speed and duplex status of `port`
    pub fn set_link(&mut self, port: u8, up: bool, speed: Speed, duplex: Duplex) {
        let bit = 1u64 << port;
        let link = self.register(page::STAT, stat::LINK);
        self.set_register(
            page::STAT,
            stat::LINK,
            if up { link | bit } else { link & !bit },
        );

        let gigabit = self.chip.map(ChipId::family) == Some(ChipFamily::Gigabit);
        let speed_reg = self.register(page::STAT, stat::SPEED);
        let speed_reg = if gigabit {
            let field = match speed {
                Speed::Mbps10 => stat::SPEED_10M,
                Speed::Mbps100 => stat::SPEED_100M,
                Speed::Mbps1000 => stat::SPEED_1000M,
            };
            let shift = 2 * u32::from(port);
            (speed_reg & !(3 << shift)) | u64::from(field) << shift
        } else if speed == Speed::Mbps10 {
            speed_reg & !bit
        } else {
            speed_reg | bit
        };
        self.set_register(page::STAT, stat::SPEED, speed_reg);

        let duplex_reg = if gigabit {
            stat::DUPLEX_GE
        } else {
            stat::DUPLEX_FE
        };
        let value = self.register(page::STAT, duplex_reg);
        let value = match duplex {
            Duplex::Full => value | bit,
            Duplex::Half => value & !bit,
        };
        self.set_register(page::STAT, duplex_reg, value);
    }

    /// Address register polls seen on MDIO
    pub fn mdio_polls(&self) -> u32 {
        self.mdio_polls
    }

    /// Status register polls seen on SPI
    pub fn spi_polls(&self) -> u32 {
        self.spi_polls
    }

    /// Total delay requested by the bus master
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Register writes in order, as `(page, reg, value)`
    pub fn writes(&self) -> &[(u8, u8, u64)] {
        &self.writes
    }

    /// Forget recorded writes and counters
    pub fn clear_log(&mut self) {
        self.writes.clear();
        self.mdio_polls = 0;
        self.spi_polls = 0;
        self.elapsed_us = 0;
    }

    fn read_reg(&mut self, page: u8, reg: u8) -> u64 {
        if (page, reg) == (page::MGMT, mgmt::DEVICE_ID) && self.id_reads < self.config.zero_id_reads
        {
            self.id_reads += 1;
            return 0;
        }
        let value = self.register(page, reg);
        log::trace!("dummy: read {:02x}:{:02x} = {:#x}", page, reg, value);
        value
    }

    fn write_reg(&mut self, page: u8, reg: u8, mut value: u64) {
        log::trace!("dummy: write {:02x}:{:02x} = {:#x}", page, reg, value);
        self.writes.push((page, reg, value));

        if (page, reg) == (page::CTRL, ctrl::SWITCH_MODE) && self.config.faults.forward_stuck {
            value &= !u64::from(ctrl::SwitchMode::FORWARD_EN.bits());
        }
        self.regs.insert((page, reg), value);

        let Some(chip) = self.chip else {
            return;
        };
        match chip.family() {
            ChipFamily::FastEthernet if (page, reg) == (page::VLAN, vlan::TABLE_ACCESS) => {
                let cmd = vlan::TableAccess::from_bits_truncate(value as u16);
                if cmd.contains(vlan::TableAccess::START) {
                    if cmd.contains(vlan::TableAccess::WRITE) {
                        let entry = self.register(page::VLAN, vlan::WRITE) as u32;
                        self.vlan_table.insert(value as u16 & 0xff, entry);
                    }
                    let done = value & !u64::from(vlan::TableAccess::START.bits());
                    self.regs.insert((page, reg), done);
                }
            }
            ChipFamily::Gigabit => {
                let vt = if chip.uses_9798_vlan_regs() {
                    arlio::VtRegs::BCM9798
                } else {
                    arlio::VtRegs::STANDARD
                };
                let start = u64::from(arlio::VtAccess::START.bits());
                if (page, reg) == (page::ARLIO, vt.access) && value & start != 0 {
                    let index = self.register(page::ARLIO, vt.index) as u16;
                    let entry = self.register(page::ARLIO, vt.entry) as u32;
                    self.vlan_table.insert(index, entry);
                    self.regs.insert((page, reg), value & !start);
                }
            }
            _ => {}
        }
    }
}

impl MdioBus for DummySwitch {
    fn read(&mut self, phy: u8, reg: u8) -> io::Result<u16> {
        if phy != PSEUDO_PHY {
            return Ok(0xffff);
        }
        Ok(match reg {
            MDIO_PAGE => u16::from(self.mdio_page) << 8 | 1,
            MDIO_ADDR => {
                self.mdio_polls += 1;
                self.mdio_addr | self.mdio_busy
            }
            r if (MDIO_DATA0..MDIO_DATA0 + 4).contains(&r) => {
                self.mdio_data[usize::from(r - MDIO_DATA0)]
            }
            _ => 0,
        })
    }

    fn write(&mut self, phy: u8, reg: u8, value: u16) -> io::Result<()> {
        if phy != PSEUDO_PHY {
            return Ok(());
        }
        match reg {
            MDIO_PAGE => {
                self.mdio_page = (value >> 8) as u8;
            }
            MDIO_ADDR => {
                let target = (value >> 8) as u8;
                let op = value & MDIO_OP_MASK;
                self.mdio_addr = value & 0xff00;

                match op {
                    MDIO_OP_READ => {
                        let v = self.read_reg(self.mdio_page, target);
                        for (i, chunk) in self.mdio_data.iter_mut().enumerate() {
                            *chunk = (v >> (16 * i)) as u16;
                        }
                    }
                    MDIO_OP_WRITE => {
                        let v = (0..4)
                            .filter(|i| self.mdio_dirty & (1 << i) != 0)
                            .fold(0u64, |v, i| v | u64::from(self.mdio_data[i]) << (16 * i));
                        self.write_reg(self.mdio_page, target, v);
                    }
                    _ => {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidInput,
                            format!("unknown MDIO op {}", op),
                        ))
                    }
                }

                self.mdio_dirty = 0;
                self.mdio_busy = if self.config.faults.stall_mdio { op } else { 0 };
            }
            r if (MDIO_DATA0..MDIO_DATA0 + 4).contains(&r) => {
                let i = r - MDIO_DATA0;
                self.mdio_data[usize::from(i)] = value;
                self.mdio_dirty |= 1 << i;
            }
            _ => {}
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }
}

impl SpiBus for DummySwitch {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        match data {
            [SPI_CMD_WRITE, SPI_PAGE, page] => {
                self.spi_page = *page;
                Ok(())
            }
            [SPI_CMD_WRITE, reg, value @ ..] if !value.is_empty() && value.len() <= 8 => {
                let mut bytes = [0u8; 8];
                bytes[..value.len()].copy_from_slice(value);
                self.write_reg(self.spi_page, *reg, u64::from_le_bytes(bytes));
                Ok(())
            }
            _ => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "malformed SPI write frame",
            )),
        }
    }

    fn write_then_read(&mut self, write: &[u8], read: &mut [u8]) -> io::Result<()> {
        let &[SPI_CMD_READ, reg] = write else {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "malformed SPI read frame",
            ));
        };
        read.fill(0);
        let Some(first) = read.first_mut() else {
            return Ok(());
        };

        match reg {
            SPI_STATUS => {
                self.spi_polls += 1;
                if self.spi_rack {
                    *first = SPI_STATUS_RACK;
                }
            }
            r if (SPI_DATA0..SPI_DATA0 + 8).contains(&r) => {
                *first = self.spi_data[usize::from(r - SPI_DATA0)];
            }
            _ => {
                self.spi_data = self.read_reg(self.spi_page, reg).to_le_bytes();
                self.spi_rack = !self.config.faults.never_ack_spi;
            }
        }
        Ok(())
    }

    fn delay_us(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }
}
