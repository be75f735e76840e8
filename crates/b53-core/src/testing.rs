//! Recording register file for unit tests

use std::collections::{HashMap, HashSet};

use crate::access::{RegisterAddress, RegisterIo};
use crate::error::Result;
use crate::regs::{arlio, page, vlan};

/// Flat register store that logs every access
///
/// Writing a start command to either VLAN table interface copies the
/// staged entry into [`RegisterFile::table_entry`], the way the hardware
/// latches it.
#[derive(Debug, Default)]
pub struct RegisterFile {
    regs: HashMap<(u8, u8), u64>,
    read_only: HashSet<(u8, u8)>,
    reads: Vec<RegisterAddress>,
    writes: Vec<(RegisterAddress, u64)>,
    table: HashMap<u16, u32>,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register without logging a write
    pub fn preset(&mut self, page: u8, reg: u8, value: u64) {
        self.regs.insert((page, reg), value);
    }

    /// Current register value
    pub fn value(&self, page: u8, reg: u8) -> u64 {
        self.regs.get(&(page, reg)).copied().unwrap_or(0)
    }

    /// Drop writes to this register
    pub fn set_read_only(&mut self, page: u8, reg: u8) {
        self.read_only.insert((page, reg));
    }

    pub fn read_count(&self, page: u8, reg: u8) -> usize {
        self.reads
            .iter()
            .filter(|a| a.page == page && a.reg == reg)
            .count()
    }

    pub fn writes(&self) -> &[(RegisterAddress, u64)] {
        &self.writes
    }

    /// Values written to one register, in order
    pub fn writes_to(&self, page: u8, reg: u8) -> Vec<u64> {
        self.writes
            .iter()
            .filter(|(a, _)| a.page == page && a.reg == reg)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn clear_log(&mut self) {
        self.reads.clear();
        self.writes.clear();
    }

    /// Latched VLAN table entry
    pub fn table_entry(&self, index: u16) -> Option<u32> {
        self.table.get(&index).copied()
    }

    fn latch_table(&mut self, addr: RegisterAddress, value: u64) {
        if addr.page == page::VLAN && addr.reg == vlan::TABLE_ACCESS {
            let cmd = vlan::TableAccess::from_bits_truncate(value as u16);
            if cmd.contains(vlan::TableAccess::START | vlan::TableAccess::WRITE) {
                let index = value as u16 & 0xff;
                let entry = self.value(page::VLAN, vlan::WRITE) as u32;
                self.table.insert(index, entry);
            }
        }

        if addr.page == page::ARLIO && value as u8 & arlio::VtAccess::START.bits() != 0 {
            for vt in [arlio::VtRegs::STANDARD, arlio::VtRegs::BCM9798] {
                if addr.reg == vt.access {
                    let index = self.value(page::ARLIO, vt.index) as u16;
                    let entry = self.value(page::ARLIO, vt.entry) as u32;
                    self.table.insert(index, entry);
                }
            }
        }
    }
}

impl RegisterIo for RegisterFile {
    fn read(&mut self, addr: RegisterAddress) -> Result<u64> {
        self.reads.push(addr);
        Ok(self.value(addr.page, addr.reg) & addr.width.mask())
    }

    fn write(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        let value = value & addr.width.mask();
        self.writes.push((addr, value));
        if self.read_only.contains(&(addr.page, addr.reg)) {
            return Ok(());
        }
        self.regs.insert((addr.page, addr.reg), value);
        self.latch_table(addr, value);
        Ok(())
    }
}
