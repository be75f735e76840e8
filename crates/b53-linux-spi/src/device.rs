//! spidev bus master
//!
//! [`LinuxSpi`] implements [`SpiBus`] on top of `SPI_IOC_MESSAGE`. A write
//! is one transfer; a write-then-read is two transfers in the same message
//! so chip select stays asserted between the command and the response.

use crate::error::{LinuxSpiError, Result};

use b53_core::bus::SpiBus;

use std::fs::{File, OpenOptions};
use std::io;
use std::os::unix::io::AsRawFd;
use std::time::Duration;

/// Clock used when no `speed` option is given
const DEFAULT_CLOCK_HZ: u32 = 2_000_000;

/// Clock phase and polarity of the chip select
///
/// B53 parts are normally driven in [`SpiMode::Mode0`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SpiMode {
    #[default]
    Mode0 = 0,
    Mode1 = 1,
    Mode2 = 2,
    Mode3 = 3,
}

impl SpiMode {
    /// Mode from the number userspace tools use for it
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Mode0),
            1 => Some(Self::Mode1),
            2 => Some(Self::Mode2),
            3 => Some(Self::Mode3),
            _ => None,
        }
    }

    /// Value of `SPI_IOC_WR_MODE`
    pub fn bits(self) -> u8 {
        self as u8
    }
}

mod ioctl {
    use nix::{ioctl_write_buf, ioctl_write_ptr};

    const SPI_IOC_MAGIC: u8 = b'k';

    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, 1, u8);
    ioctl_write_ptr!(spi_ioc_wr_bits_per_word, SPI_IOC_MAGIC, 3, u8);
    ioctl_write_ptr!(spi_ioc_wr_max_speed_hz, SPI_IOC_MAGIC, 4, u32);

    // SPI_IOC_MESSAGE(n): the request size is n transfer descriptors
    ioctl_write_buf!(spi_ioc_message, SPI_IOC_MAGIC, 0, super::SpiIocTransfer);
}

/// Kernel `struct spi_ioc_transfer`
#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct SpiIocTransfer {
    tx_buf: u64,
    rx_buf: u64,
    len: u32,
    speed_hz: u32,
    delay_usecs: u16,
    bits_per_word: u8,
    cs_change: u8,
    tx_nbits: u8,
    rx_nbits: u8,
    word_delay_usecs: u8,
    _pad: u8,
}

impl SpiIocTransfer {
    fn tx(buf: &[u8], speed_hz: u32) -> Self {
        Self {
            tx_buf: buf.as_ptr() as u64,
            len: buf.len() as u32,
            speed_hz,
            bits_per_word: 8,
            ..Default::default()
        }
    }

    fn rx(buf: &mut [u8], speed_hz: u32) -> Self {
        Self {
            rx_buf: buf.as_mut_ptr() as u64,
            len: buf.len() as u32,
            speed_hz,
            bits_per_word: 8,
            ..Default::default()
        }
    }
}

/// Where the switch sits and how to clock it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxSpiConfig {
    /// spidev node of the switch's chip select
    pub device: String,
    /// Maximum SCK frequency
    pub clock_hz: u32,
    pub mode: SpiMode,
}

impl LinuxSpiConfig {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            clock_hz: DEFAULT_CLOCK_HZ,
            mode: SpiMode::default(),
        }
    }

    pub fn with_clock_hz(self, clock_hz: u32) -> Self {
        Self { clock_hz, ..self }
    }

    pub fn with_mode(self, mode: SpiMode) -> Self {
        Self { mode, ..self }
    }
}

/// Switch SPI bus on a `/dev/spidevX.Y` chip select
pub struct LinuxSpi {
    file: File,
    speed_hz: u32,
}

impl LinuxSpi {
    /// Open and configure a spidev device
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: claiming {}", config.device);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|source| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source,
            })?;

        let fd = file.as_raw_fd();
        let setup = |setting: &'static str, value: u32, res: nix::Result<libc::c_int>| {
            res.map(|_| ()).map_err(|e| LinuxSpiError::SetupFailed {
                path: config.device.clone(),
                setting,
                value,
                source: io::Error::from(e),
            })
        };

        let mode = config.mode.bits();
        let bits: u8 = 8;
        // SAFETY: fd is open for the lifetime of `file`, the pointers refer
        // to live locals of the type the request expects
        unsafe {
            setup("mode", u32::from(mode), ioctl::spi_ioc_wr_mode(fd, &mode))?;
            setup(
                "bits per word",
                u32::from(bits),
                ioctl::spi_ioc_wr_bits_per_word(fd, &bits),
            )?;
            setup(
                "max clock",
                config.clock_hz,
                ioctl::spi_ioc_wr_max_speed_hz(fd, &config.clock_hz),
            )?;
        }

        log::info!(
            "linux_spi: {} ready, mode {} at {} kHz",
            config.device,
            mode,
            config.clock_hz / 1000
        );

        Ok(Self {
            file,
            speed_hz: config.clock_hz,
        })
    }

    /// Open `device` in mode 0 at the default clock
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxSpiConfig::new(device))
    }

    /// SCK frequency requested for every transfer
    pub fn speed_hz(&self) -> u32 {
        self.speed_hz
    }

    fn message(&mut self, transfers: &[SpiIocTransfer]) -> io::Result<()> {
        // SAFETY: every descriptor points into a buffer borrowed by the
        // caller for the duration of this call
        unsafe { ioctl::spi_ioc_message(self.file.as_raw_fd(), transfers) }?;
        Ok(())
    }
}

impl SpiBus for LinuxSpi {
    fn write(&mut self, data: &[u8]) -> io::Result<()> {
        let transfers = [SpiIocTransfer::tx(data, self.speed_hz)];
        self.message(&transfers)
    }

    fn write_then_read(&mut self, write: &[u8], read: &mut [u8]) -> io::Result<()> {
        let transfers = [
            SpiIocTransfer::tx(write, self.speed_hz),
            SpiIocTransfer::rx(read, self.speed_hz),
        ];
        self.message(&transfers)
    }

    fn delay_us(&mut self, us: u32) {
        std::thread::sleep(Duration::from_micros(u64::from(us)));
    }
}

/// Build a config from `open_switch` options
///
/// `dev` names the spidev node and is mandatory. `speed` (alias
/// `spispeed`) is the clock in kHz, `mode` the clock mode number.
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut device = None;
    let mut config = LinuxSpiConfig::new("");

    for &(key, value) in options {
        match key {
            "dev" => device = Some(value),
            "speed" | "spispeed" => {
                config.clock_hz = value
                    .parse::<u32>()
                    .ok()
                    .and_then(|khz| khz.checked_mul(1000))
                    .ok_or_else(|| format!("linux_spi: {}={} is not a clock in kHz", key, value))?;
            }
            "mode" => {
                config.mode = value
                    .parse()
                    .ok()
                    .and_then(SpiMode::from_number)
                    .ok_or_else(|| format!("linux_spi: mode={} is not a clock mode 0..3", value))?;
            }
            _ => log::warn!("linux_spi: ignoring {}={}", key, value),
        }
    }

    match device {
        Some(dev) if !dev.is_empty() => Ok(LinuxSpiConfig {
            device: dev.to_string(),
            ..config
        }),
        _ => Err("linux_spi: dev=<spidev node> is required".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_layout() {
        assert_eq!(std::mem::size_of::<SpiIocTransfer>(), 32);

        let cmd = [0x60, 0x30];
        let t = SpiIocTransfer::tx(&cmd, 1_000_000);
        assert_eq!(t.len, 2);
        assert_eq!(t.rx_buf, 0);
        assert_eq!(t.bits_per_word, 8);
        assert_eq!(t.cs_change, 0);
    }

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("dev", "/dev/spidev1.0"), ("speed", "4000"), ("mode", "3")])
            .unwrap();
        assert_eq!(
            config,
            LinuxSpiConfig::new("/dev/spidev1.0")
                .with_clock_hz(4_000_000)
                .with_mode(SpiMode::Mode3)
        );

        let config = parse_options(&[("spispeed", "500"), ("dev", "/dev/spidev0.0"), ("bogus", "1")])
            .unwrap();
        assert_eq!(config.clock_hz, 500_000);
        assert_eq!(config.mode, SpiMode::Mode0);
    }

    #[test]
    fn test_parse_options_errors() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("dev", "")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "4")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("speed", "fast")]).is_err());
        assert!(parse_options(&[("dev", "/dev/spidev0.0"), ("speed", "5000000")]).is_err());

        let err = parse_options(&[("dev", "/dev/spidev0.0"), ("mode", "7")]).unwrap_err();
        assert_eq!(err, "linux_spi: mode=7 is not a clock mode 0..3");
    }

    #[test]
    fn test_spi_mode_numbers() {
        assert_eq!(SpiMode::from_number(2), Some(SpiMode::Mode2));
        assert_eq!(SpiMode::from_number(4), None);
        assert_eq!(SpiMode::Mode3.bits(), 3);
    }

    #[test]
    fn test_open_missing_device() {
        assert!(matches!(
            LinuxSpi::open(&LinuxSpiConfig::new("")),
            Err(LinuxSpiError::NoDevice)
        ));
        assert!(matches!(
            LinuxSpi::open_device("/nonexistent/spidev9.9"),
            Err(LinuxSpiError::OpenFailed { .. })
        ));
    }
}
