//! Register Access Engine
//!
//! The switch exposes a paged register space: 256 pages of 256 byte
//! offsets, where a register is 8, 16, 32, 48 or 64 bits wide. This module
//! defines the uniform interface ([`RegisterIo`]) and its two transport
//! implementations:
//!
//! - [`MdioAccess`] - pseudo PHY protocol over an [`MdioBus`](crate::bus::MdioBus)
//! - [`SpiAccess`] - command/status protocol over an [`SpiBus`](crate::bus::SpiBus)
//!
//! Each logical access holds the bus lock from page selection to the last
//! data transfer, so the page register cannot be switched underneath it.

mod mdio;
mod spi;

pub use mdio::MdioAccess;
pub use spi::SpiAccess;

use std::fmt;

use crate::error::Result;

/// Register width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8-bit register
    Bits8,
    /// 16-bit register
    Bits16,
    /// 32-bit register
    Bits32,
    /// 48-bit register
    Bits48,
    /// 64-bit register
    Bits64,
}

impl Width {
    /// Number of bytes in the register
    pub const fn bytes(self) -> usize {
        match self {
            Width::Bits8 => 1,
            Width::Bits16 => 2,
            Width::Bits32 => 4,
            Width::Bits48 => 6,
            Width::Bits64 => 8,
        }
    }

    /// Number of bits in the register
    pub const fn bits(self) -> u32 {
        self.bytes() as u32 * 8
    }

    /// Mask covering the register's value range
    pub const fn mask(self) -> u64 {
        match self {
            Width::Bits64 => u64::MAX,
            _ => (1u64 << self.bits()) - 1,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bits())
    }
}

/// A fully qualified register: page, offset and width
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegisterAddress {
    /// Page number
    pub page: u8,
    /// Byte offset within the page
    pub reg: u8,
    /// Register width
    pub width: Width,
}

impl RegisterAddress {
    /// Create a register address
    pub const fn new(page: u8, reg: u8, width: Width) -> Self {
        Self { page, reg, width }
    }

    /// 8-bit register
    pub const fn r8(page: u8, reg: u8) -> Self {
        Self::new(page, reg, Width::Bits8)
    }

    /// 16-bit register
    pub const fn r16(page: u8, reg: u8) -> Self {
        Self::new(page, reg, Width::Bits16)
    }

    /// 32-bit register
    pub const fn r32(page: u8, reg: u8) -> Self {
        Self::new(page, reg, Width::Bits32)
    }

    /// 48-bit register
    pub const fn r48(page: u8, reg: u8) -> Self {
        Self::new(page, reg, Width::Bits48)
    }

    /// 64-bit register
    pub const fn r64(page: u8, reg: u8) -> Self {
        Self::new(page, reg, Width::Bits64)
    }
}

impl fmt::Display for RegisterAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}:{:02x}/{}", self.page, self.reg, self.width)
    }
}

/// Uniform paged register access
///
/// Implementations only need [`read`](Self::read) and
/// [`write`](Self::write); the width-specific helpers are provided.
/// Values are right-aligned and masked to the register width.
pub trait RegisterIo {
    /// Read a register
    fn read(&mut self, addr: RegisterAddress) -> Result<u64>;

    /// Write a register; bits above the register width are ignored
    fn write(&mut self, addr: RegisterAddress, value: u64) -> Result<()>;

    /// Read an 8-bit register
    fn read8(&mut self, page: u8, reg: u8) -> Result<u8> {
        Ok(self.read(RegisterAddress::r8(page, reg))? as u8)
    }

    /// Read a 16-bit register
    fn read16(&mut self, page: u8, reg: u8) -> Result<u16> {
        Ok(self.read(RegisterAddress::r16(page, reg))? as u16)
    }

    /// Read a 32-bit register
    fn read32(&mut self, page: u8, reg: u8) -> Result<u32> {
        Ok(self.read(RegisterAddress::r32(page, reg))? as u32)
    }

    /// Read a 48-bit register
    fn read48(&mut self, page: u8, reg: u8) -> Result<u64> {
        self.read(RegisterAddress::r48(page, reg))
    }

    /// Read a 64-bit register
    fn read64(&mut self, page: u8, reg: u8) -> Result<u64> {
        self.read(RegisterAddress::r64(page, reg))
    }

    /// Write an 8-bit register
    fn write8(&mut self, page: u8, reg: u8, value: u8) -> Result<()> {
        self.write(RegisterAddress::r8(page, reg), value.into())
    }

    /// Write a 16-bit register
    fn write16(&mut self, page: u8, reg: u8, value: u16) -> Result<()> {
        self.write(RegisterAddress::r16(page, reg), value.into())
    }

    /// Write a 32-bit register
    fn write32(&mut self, page: u8, reg: u8, value: u32) -> Result<()> {
        self.write(RegisterAddress::r32(page, reg), value.into())
    }

    /// Write a 48-bit register
    fn write48(&mut self, page: u8, reg: u8, value: u64) -> Result<()> {
        self.write(RegisterAddress::r48(page, reg), value)
    }

    /// Write a 64-bit register
    fn write64(&mut self, page: u8, reg: u8, value: u64) -> Result<()> {
        self.write(RegisterAddress::r64(page, reg), value)
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for &mut T {
    fn read(&mut self, addr: RegisterAddress) -> Result<u64> {
        (**self).read(addr)
    }

    fn write(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        (**self).write(addr, value)
    }
}

impl<T: RegisterIo + ?Sized> RegisterIo for Box<T> {
    fn read(&mut self, addr: RegisterAddress) -> Result<u64> {
        (**self).read(addr)
    }

    fn write(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        (**self).write(addr, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_mask() {
        assert_eq!(Width::Bits8.mask(), 0xff);
        assert_eq!(Width::Bits16.mask(), 0xffff);
        assert_eq!(Width::Bits32.mask(), 0xffff_ffff);
        assert_eq!(Width::Bits48.mask(), 0xffff_ffff_ffff);
        assert_eq!(Width::Bits64.mask(), u64::MAX);
    }

    #[test]
    fn test_address_display() {
        assert_eq!(RegisterAddress::r16(0x34, 0x10).to_string(), "34:10/16");
        assert_eq!(RegisterAddress::r48(0x02, 0x30).to_string(), "02:30/48");
    }
}
