//! Transport traits
//!
//! The switch core sits behind one of two narrow management buses:
//!
//! - an MDIO/MII management bus, where it answers as a pseudo PHY
//! - an SPI bus, as a byte-stream slave on a fixed chip select
//!
//! Implementations only move bits. Page selection, completion polling and
//! multi-word assembly live in [`crate::access`].
//!
//! A bus is shared through [`SharedBus`] so that the access engines can hold
//! its lock for exactly one logical register access, while other clients on
//! the same physical bus can still get in between two accesses.

use std::io;
use std::sync::{Arc, Mutex};

/// MDIO management bus master
pub trait MdioBus {
    /// Read the 16-bit register `reg` of the PHY at address `phy`
    fn read(&mut self, phy: u8, reg: u8) -> io::Result<u16>;

    /// Write the 16-bit register `reg` of the PHY at address `phy`
    fn write(&mut self, phy: u8, reg: u8, value: u16) -> io::Result<()>;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

/// SPI master with the switch on its chip select
///
/// Each call is one chip-select framed transaction.
pub trait SpiBus {
    /// Send `data` in a single transaction
    fn write(&mut self, data: &[u8]) -> io::Result<()>;

    /// Send `write`, then clock in `read.len()` bytes without releasing
    /// chip select
    fn write_then_read(&mut self, write: &[u8], read: &mut [u8]) -> io::Result<()>;

    /// Delay for the specified number of microseconds
    fn delay_us(&mut self, us: u32);
}

/// A bus behind the lock that serializes logical register accesses
pub type SharedBus<B> = Arc<Mutex<B>>;

/// Wrap a bus for sharing between access engines
pub fn shared<B>(bus: B) -> SharedBus<B> {
    Arc::new(Mutex::new(bus))
}

impl MdioBus for Box<dyn MdioBus + Send> {
    fn read(&mut self, phy: u8, reg: u8) -> io::Result<u16> {
        (**self).read(phy, reg)
    }

    fn write(&mut self, phy: u8, reg: u8, value: u16) -> io::Result<()> {
        (**self).write(phy, reg, value)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}

impl SpiBus for Box<dyn SpiBus + Send> {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write(data)
    }

    fn write_then_read(&mut self, write: &[u8], read: &mut [u8]) -> io::Result<()> {
        (**self).write_then_read(write, read)
    }

    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }
}
