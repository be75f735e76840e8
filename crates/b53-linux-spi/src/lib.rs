//! b53-linux-spi - Linux spidev transport
//!
//! Drives a B53 switch sitting on a `/dev/spidevX.Y` chip select. The bus
//! only moves frames; the command/status protocol lives in
//! [`b53_core::access::SpiAccess`].
//!
//! # Example
//!
//! ```no_run
//! use b53_core::access::SpiAccess;
//! use b53_core::Switch;
//! use b53_linux_spi::{LinuxSpi, LinuxSpiConfig};
//!
//! let config = LinuxSpiConfig::new("/dev/spidev0.0").with_clock_hz(4_000_000);
//! let spi = LinuxSpi::open(&config)?;
//! let switch = Switch::register(SpiAccess::new(spi))?;
//! println!("{}", switch.identity());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with spidev support enabled (`CONFIG_SPI_SPIDEV`)
//! - Read/write access to the `/dev/spidevX.Y` device

pub mod device;
pub mod error;

pub use device::{parse_options, LinuxSpi, LinuxSpiConfig, SpiMode};
pub use error::{LinuxSpiError, Result};

use b53_core::access::SpiAccess;

/// Open a spidev device and wrap it in the SPI register access engine
///
/// # Options
///
/// - `dev=/dev/spidev0.0`: spidev node of the switch, required
/// - `speed=4000`: SCK in kHz, 2000 if absent (`spispeed` is accepted too)
/// - `mode=3`: clock mode number, 0 if absent
pub fn open_linux_spi(
    options: &[(&str, &str)],
) -> std::result::Result<SpiAccess<LinuxSpi>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let spi = LinuxSpi::open(&config)?;
    Ok(SpiAccess::new(spi))
}
