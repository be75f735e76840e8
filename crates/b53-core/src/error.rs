//! Error types for b53-core

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// The bus driver failed to move data
    #[error("bus I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The SPI read acknowledge bit never came up
    #[error("SPI read of {page:02x}:{reg:02x} not acknowledged")]
    SpiTimeout {
        /// Page of the register being read
        page: u8,
        /// Register offset within the page
        reg: u8,
    },

    /// MDIO operation did not complete (strict mode only)
    #[error("MDIO access to {page:02x}:{reg:02x} timed out")]
    MdioTimeout {
        /// Page of the register being accessed
        page: u8,
        /// Register offset within the page
        reg: u8,
    },

    /// Identity register did not match any supported chip
    #[error("unsupported switch id 0x{id:x}")]
    UnknownChip {
        /// Last value read from the device id register
        id: u16,
    },

    /// Forwarding enable bit did not latch during reset
    #[error("failed to enable switch forwarding")]
    ResetFailed,

    /// Port index beyond the chip's port count
    #[error("port {port} out of range (chip has {ports} ports)")]
    InvalidPort {
        /// Requested port
        port: u8,
        /// Number of ports on the chip
        ports: u8,
    },

    /// Port has no PHY status (CPU/IMP port or unused MII port)
    #[error("port {port} has no link status")]
    NoPhyStatus {
        /// Requested port
        port: u8,
    },

    /// VLAN table index beyond the table size
    #[error("VLAN index {index} out of range (table has {count} entries)")]
    InvalidVlanIndex {
        /// Requested entry
        index: u16,
        /// Number of entries in the table
        count: u16,
    },

    /// VLAN table entry that cannot be configured on this chip
    #[error("VLAN entry {index} is reserved on this chip")]
    ReservedVlan {
        /// Requested entry
        index: u16,
    },

    /// VLAN id does not fit the chip's VID field
    #[error("VLAN id {vid} exceeds maximum {max}")]
    InvalidVlanId {
        /// Requested VLAN id
        vid: u16,
        /// Largest representable VLAN id
        max: u16,
    },

    /// Speed summary register holds a reserved encoding
    #[error("port {port} reports reserved speed encoding {bits}")]
    InvalidSpeed {
        /// Port whose speed was decoded
        port: u8,
        /// Raw speed field
        bits: u8,
    },

    /// Operation not available on this chip family
    #[error("{0} not supported on this chip")]
    Unsupported(&'static str),

    /// A previous holder of the bus lock panicked
    #[error("bus lock poisoned")]
    LockPoisoned,
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
