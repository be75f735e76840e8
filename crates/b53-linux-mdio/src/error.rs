//! Error types for the MII ioctl transport

use thiserror::Error;

/// Setup errors of the MII ioctl transport
#[derive(Debug, Error)]
pub enum LinuxMdioError {
    /// Interface not specified
    #[error("No interface specified. Use iface=<netdev>")]
    NoInterface,

    /// Interface name does not fit `struct ifreq`
    #[error("Interface name too long: {0}")]
    InterfaceName(String),

    /// Failed to create the control socket
    #[error("Failed to create control socket: {0}")]
    Socket(#[source] std::io::Error),

    /// The interface does not answer MII ioctls
    #[error("{iface} has no MII access: {source}")]
    NoMii {
        iface: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for MII ioctl setup
pub type Result<T> = std::result::Result<T, LinuxMdioError>;
