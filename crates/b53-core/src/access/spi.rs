//! Register access over SPI
//!
//! Frames are a command byte followed by a register offset:
//!
//! - `0x61 0xff page` selects the page
//! - `0x61 reg v0 v1 ...` writes a register, value little-endian
//! - `0x60 reg` starts a read; the value then shows up in the data
//!   registers `0xf0..0xf7` once the status register (`0xfe`) reports the
//!   read acknowledge bit
//!
//! Unlike MDIO, a missing acknowledge is a hard failure.

use crate::bus::{shared, SharedBus, SpiBus};
use crate::error::{Error, Result};

use super::{RegisterAddress, RegisterIo};

const CMD_NORMAL: u8 = 0x60;
const CMD_READ: u8 = 0x00;
const CMD_WRITE: u8 = 0x01;

const REG_DATA0: u8 = 0xf0;
const REG_STATUS: u8 = 0xfe;
const REG_PAGE: u8 = 0xff;

const STATUS_RACK: u8 = 1 << 5;

/// Status polls before a read is abandoned
pub const ACK_RETRIES: u32 = 10;
/// Delay after each status poll without acknowledge
pub const ACK_DELAY_US: u32 = 1000;

/// Register access engine for SPI-attached switches
pub struct SpiAccess<B: SpiBus> {
    bus: SharedBus<B>,
}

impl<B: SpiBus> SpiAccess<B> {
    /// Take ownership of a bus
    pub fn new(bus: B) -> Self {
        Self::with_shared(shared(bus))
    }

    /// Use a bus that other clients also hold
    pub fn with_shared(bus: SharedBus<B>) -> Self {
        Self { bus }
    }

    /// The shared bus handle
    pub fn bus(&self) -> &SharedBus<B> {
        &self.bus
    }
}

fn set_page<B: SpiBus>(bus: &mut B, page: u8) -> Result<()> {
    bus.write(&[CMD_NORMAL | CMD_WRITE, REG_PAGE, page])?;
    Ok(())
}

fn read_byte<B: SpiBus>(bus: &mut B, reg: u8) -> Result<u8> {
    let mut rx = [0u8; 1];
    bus.write_then_read(&[CMD_NORMAL | CMD_READ, reg], &mut rx)?;
    Ok(rx[0])
}

/// Start a register read and wait for the acknowledge
fn prepare_read<B: SpiBus>(bus: &mut B, addr: RegisterAddress) -> Result<()> {
    read_byte(bus, addr.reg)?;

    for attempt in 0..ACK_RETRIES {
        if read_byte(bus, REG_STATUS)? & STATUS_RACK != 0 {
            if attempt > 0 {
                log::debug!("spi: {} acknowledged after {} retries", addr, attempt);
            }
            return Ok(());
        }
        bus.delay_us(ACK_DELAY_US);
    }

    log::error!("spi: read of {} not acknowledged", addr);
    Err(Error::SpiTimeout {
        page: addr.page,
        reg: addr.reg,
    })
}

impl<B: SpiBus> RegisterIo for SpiAccess<B> {
    fn read(&mut self, addr: RegisterAddress) -> Result<u64> {
        let mut bus = self.bus.lock().map_err(|_| Error::LockPoisoned)?;

        set_page(&mut *bus, addr.page)?;
        prepare_read(&mut *bus, addr)?;

        // Most significant byte first
        let mut value = 0u64;
        for i in (0..addr.width.bytes() as u8).rev() {
            value = (value << 8) | u64::from(read_byte(&mut *bus, REG_DATA0 + i)?);
        }

        log::trace!("spi: read {} = {:#x}", addr, value);
        Ok(value)
    }

    fn write(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        let value = value & addr.width.mask();
        log::trace!("spi: write {} = {:#x}", addr, value);

        let mut bus = self.bus.lock().map_err(|_| Error::LockPoisoned)?;
        set_page(&mut *bus, addr.page)?;

        let len = addr.width.bytes();
        let mut frame = [0u8; 10];
        frame[0] = CMD_NORMAL | CMD_WRITE;
        frame[1] = addr.reg;
        frame[2..2 + len].copy_from_slice(&value.to_le_bytes()[..len]);

        bus.write(&frame[..2 + len])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;

    #[derive(Default)]
    struct ScriptedSpi {
        writes: Vec<Vec<u8>>,
        reads: Vec<Vec<u8>>,
        status: VecDeque<u8>,
        data: [u8; 8],
        delay_total: u32,
    }

    impl SpiBus for ScriptedSpi {
        fn write(&mut self, data: &[u8]) -> io::Result<()> {
            self.writes.push(data.to_vec());
            Ok(())
        }

        fn write_then_read(&mut self, write: &[u8], read: &mut [u8]) -> io::Result<()> {
            self.reads.push(write.to_vec());
            read[0] = match write[1] {
                REG_STATUS => self.status.pop_front().unwrap_or(STATUS_RACK),
                r if r >= REG_DATA0 && r < REG_DATA0 + 8 => self.data[usize::from(r - REG_DATA0)],
                _ => 0,
            };
            Ok(())
        }

        fn delay_us(&mut self, us: u32) {
            self.delay_total += us;
        }
    }

    #[test]
    fn test_read16_sequence() {
        let mut bus = ScriptedSpi::default();
        bus.data[0] = 0x25;
        bus.data[1] = 0x31;
        let mut access = SpiAccess::new(bus);

        assert_eq!(access.read16(0x02, 0x30).unwrap(), 0x3125);

        let bus = access.bus().lock().unwrap();
        assert_eq!(bus.writes, vec![vec![0x61, 0xff, 0x02]]);
        assert_eq!(
            bus.reads,
            vec![
                vec![0x60, 0x30],
                vec![0x60, 0xfe],
                vec![0x60, 0xf1],
                vec![0x60, 0xf0],
            ]
        );
    }

    #[test]
    fn test_read_retries_until_ack() {
        let mut bus = ScriptedSpi::default();
        bus.status = VecDeque::from(vec![0, 0, 0, STATUS_RACK]);
        bus.data[0] = 0x97;
        let mut access = SpiAccess::new(bus);

        assert_eq!(access.read8(0x02, 0x30).unwrap(), 0x97);
        assert_eq!(access.bus().lock().unwrap().delay_total, 3 * ACK_DELAY_US);
    }

    #[test]
    fn test_read_without_ack_fails() {
        let mut bus = ScriptedSpi::default();
        bus.status = VecDeque::from(vec![0; 20]);
        let mut access = SpiAccess::new(bus);

        let err = access.read32(0x34, 0x08).unwrap_err();
        assert!(matches!(err, Error::SpiTimeout { page: 0x34, reg: 0x08 }));

        let bus = access.bus().lock().unwrap();
        let polls = bus.reads.iter().filter(|r| r[1] == REG_STATUS).count();
        assert_eq!(polls, ACK_RETRIES as usize);
        assert_eq!(bus.delay_total, ACK_RETRIES * ACK_DELAY_US);
        // No data register was touched
        assert!(bus.reads.iter().all(|r| r[1] < REG_DATA0 || r[1] == REG_STATUS));
    }

    #[test]
    fn test_write48_frame_little_endian() {
        let mut access = SpiAccess::new(ScriptedSpi::default());

        access.write48(0x05, 0x10, 0x0011_2233_4455_6677).unwrap();

        let bus = access.bus().lock().unwrap();
        assert_eq!(
            bus.writes,
            vec![
                vec![0x61, 0xff, 0x05],
                vec![0x61, 0x10, 0x77, 0x66, 0x55, 0x44, 0x33, 0x22],
            ]
        );
    }

    #[test]
    fn test_write8_single_frame() {
        let mut access = SpiAccess::new(ScriptedSpi::default());

        access.write8(0x00, 0x0b, 0x06).unwrap();

        let bus = access.bus().lock().unwrap();
        assert_eq!(bus.writes[1], vec![0x61, 0x0b, 0x06]);
        assert!(bus.reads.is_empty());
    }
}
