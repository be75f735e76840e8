//! Pseudo PHY register access over MDIO
//!
//! The switch answers on MDIO address [`PSEUDO_PHY`]. A paged access is:
//!
//! 1. write `page << 8 | 1` to the page register
//! 2. for writes, load the value into the data registers, least significant
//!    16-bit chunk first
//! 3. write `reg << 8 | op` to the address register
//! 4. poll the address register until the op bits clear
//! 5. for reads, collect the data registers
//!
//! A poll that never completes is treated as a soft failure by default:
//! it is logged and counted and the access carries on, which is what the
//! hardware tolerates in practice. [`MdioAccess::strict_timeouts`] turns it
//! into an error.

use crate::bus::{shared, MdioBus, SharedBus};
use crate::error::{Error, Result};

use super::{RegisterAddress, RegisterIo, Width};

/// MDIO address of the switch's register interface
pub const PSEUDO_PHY: u8 = 0x1e;

const REG_PAGE: u8 = 0x10;
const REG_ADDR: u8 = 0x11;
const REG_DATA0: u8 = 0x18;

const PAGE_ACCESS_EN: u16 = 1;
const OP_WRITE: u16 = 1;
const OP_READ: u16 = 2;
const OP_MASK: u16 = 3;

/// Address register polls before giving up
pub const POLL_RETRIES: u32 = 5;
/// Delay after each unsuccessful poll
pub const POLL_DELAY_US: u32 = 10;

/// Register access engine for MDIO-attached switches
pub struct MdioAccess<B: MdioBus> {
    bus: SharedBus<B>,
    phy: u8,
    strict: bool,
    timeouts: u32,
}

impl<B: MdioBus> MdioAccess<B> {
    /// Take ownership of a bus
    pub fn new(bus: B) -> Self {
        Self::with_shared(shared(bus))
    }

    /// Use a bus that other clients also hold
    pub fn with_shared(bus: SharedBus<B>) -> Self {
        Self {
            bus,
            phy: PSEUDO_PHY,
            strict: false,
            timeouts: 0,
        }
    }

    /// Override the pseudo PHY address
    pub fn with_phy(mut self, phy: u8) -> Self {
        self.phy = phy;
        self
    }

    /// Fail accesses whose completion poll times out
    pub fn strict_timeouts(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The shared bus handle
    pub fn bus(&self) -> &SharedBus<B> {
        &self.bus
    }

    /// Number of completion polls that timed out so far
    pub fn timeouts(&self) -> u32 {
        self.timeouts
    }

    fn chunks(width: Width) -> u8 {
        match width {
            Width::Bits8 | Width::Bits16 => 1,
            Width::Bits32 => 2,
            Width::Bits48 => 3,
            Width::Bits64 => 4,
        }
    }

    /// Issue an operation and wait for the switch to clear the op bits
    fn run_op(&mut self, bus: &mut B, addr: RegisterAddress, op: u16) -> Result<()> {
        bus.write(self.phy, REG_ADDR, (u16::from(addr.reg) << 8) | op)?;

        for _ in 0..POLL_RETRIES {
            if bus.read(self.phy, REG_ADDR)? & OP_MASK == 0 {
                return Ok(());
            }
            bus.delay_us(POLL_DELAY_US);
        }

        self.timeouts += 1;
        if self.strict {
            log::error!("mdio: access to {} timed out", addr);
            return Err(Error::MdioTimeout {
                page: addr.page,
                reg: addr.reg,
            });
        }
        log::warn!("mdio: access to {} timed out, continuing", addr);
        Ok(())
    }
}

impl<B: MdioBus> RegisterIo for MdioAccess<B> {
    fn read(&mut self, addr: RegisterAddress) -> Result<u64> {
        let bus = self.bus.clone();
        let mut bus = bus.lock().map_err(|_| Error::LockPoisoned)?;

        bus.write(self.phy, REG_PAGE, (u16::from(addr.page) << 8) | PAGE_ACCESS_EN)?;
        self.run_op(&mut bus, addr, OP_READ)?;

        let mut value = 0u64;
        for i in 0..Self::chunks(addr.width) {
            let chunk = bus.read(self.phy, REG_DATA0 + i)?;
            value |= u64::from(chunk) << (16 * u32::from(i));
        }
        let value = value & addr.width.mask();

        log::trace!("mdio: read {} = {:#x}", addr, value);
        Ok(value)
    }

    fn write(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        let value = value & addr.width.mask();
        log::trace!("mdio: write {} = {:#x}", addr, value);

        let bus = self.bus.clone();
        let mut bus = bus.lock().map_err(|_| Error::LockPoisoned)?;

        bus.write(self.phy, REG_PAGE, (u16::from(addr.page) << 8) | PAGE_ACCESS_EN)?;
        for i in 0..Self::chunks(addr.width) {
            let chunk = (value >> (16 * u32::from(i))) as u16;
            bus.write(self.phy, REG_DATA0 + i, chunk)?;
        }
        self.run_op(&mut bus, addr, OP_WRITE)
    }
}
