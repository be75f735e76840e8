//! Error types for the spidev transport

use thiserror::Error;

/// spidev setup errors
///
/// Transfer failures are not listed here: once the device is open they
/// surface as [`std::io::Error`] through the bus trait.
#[derive(Debug, Error)]
pub enum LinuxSpiError {
    /// spidev node could not be opened
    #[error("cannot open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A spidev setting was rejected by the driver
    #[error("{path}: failed to set {setting} to {value}: {source}")]
    SetupFailed {
        path: String,
        setting: &'static str,
        value: u32,
        #[source]
        source: std::io::Error,
    },

    /// Config carries an empty spidev path
    #[error("no spidev node configured")]
    NoDevice,
}

/// Result type for spidev setup
pub type Result<T> = std::result::Result<T, LinuxSpiError>;
