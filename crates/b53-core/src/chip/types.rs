//! Chip type definitions

use std::fmt;

/// Chip family, selecting the configuration state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipFamily {
    /// 6-port Fast Ethernet switches (BCM5325)
    FastEthernet,
    /// 9-port Gigabit switches (BCM539x, BCM531xx)
    Gigabit,
}

/// Supported chip variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChipId {
    /// BCM5325E
    Bcm5325E,
    /// BCM5325F
    Bcm5325F,
    /// BCM5325M
    Bcm5325M,
    /// BCM5395
    Bcm5395,
    /// BCM5397
    Bcm5397,
    /// BCM5398
    Bcm5398,
    /// BCM53115
    Bcm53115,
    /// BCM53125
    Bcm53125,
}

impl ChipId {
    /// All supported variants
    pub const ALL: [ChipId; 8] = [
        ChipId::Bcm5325E,
        ChipId::Bcm5325F,
        ChipId::Bcm5325M,
        ChipId::Bcm5395,
        ChipId::Bcm5397,
        ChipId::Bcm5398,
        ChipId::Bcm53115,
        ChipId::Bcm53125,
    ];

    /// Match an 8-bit device id that names a chip directly
    ///
    /// The BCM5325 ids (0x00, 0x01) are ambiguous and return `None`.
    pub const fn from_device_id8(id: u8) -> Option<Self> {
        match id {
            0x95 => Some(ChipId::Bcm5395),
            0x97 => Some(ChipId::Bcm5397),
            0x98 => Some(ChipId::Bcm5398),
            _ => None,
        }
    }

    /// Match a 16-bit device id
    pub const fn from_device_id16(id: u16) -> Option<Self> {
        match id {
            0x3115 => Some(ChipId::Bcm53115),
            0x3125 => Some(ChipId::Bcm53125),
            _ => None,
        }
    }

    /// Pick the BCM5325 sub-variant from VLAN control 4
    pub const fn from_vc4(vc4: u8) -> Self {
        match vc4 {
            1 => ChipId::Bcm5325E,
            3 => ChipId::Bcm5325F,
            _ => ChipId::Bcm5325M,
        }
    }

    /// Whether `id` is one of the BCM5325 device ids
    pub const fn is_ambiguous_id(id: u8) -> bool {
        matches!(id, 0x00 | 0x01)
    }

    /// Device id as read back from the management page
    ///
    /// The 16-bit ids are only meaningful on a 16-bit read.
    pub const fn device_id(self) -> u16 {
        match self {
            ChipId::Bcm5325E | ChipId::Bcm5325F | ChipId::Bcm5325M => 0x00,
            ChipId::Bcm5395 => 0x95,
            ChipId::Bcm5397 => 0x97,
            ChipId::Bcm5398 => 0x98,
            ChipId::Bcm53115 => 0x3115,
            ChipId::Bcm53125 => 0x3125,
        }
    }

    /// VLAN control 4 value identifying a BCM5325 variant
    pub const fn vc4(self) -> u8 {
        match self {
            ChipId::Bcm5325E => 1,
            ChipId::Bcm5325F => 3,
            _ => 0,
        }
    }

    /// Family of this chip
    pub const fn family(self) -> ChipFamily {
        match self {
            ChipId::Bcm5325E | ChipId::Bcm5325F | ChipId::Bcm5325M => ChipFamily::FastEthernet,
            _ => ChipFamily::Gigabit,
        }
    }

    /// Marketing name
    pub const fn name(self) -> &'static str {
        match self {
            ChipId::Bcm5325E => "BCM5325E",
            ChipId::Bcm5325F => "BCM5325F",
            ChipId::Bcm5325M => "BCM5325M",
            ChipId::Bcm5395 => "BCM5395",
            ChipId::Bcm5397 => "BCM5397",
            ChipId::Bcm5398 => "BCM5398",
            ChipId::Bcm53115 => "BCM53115",
            ChipId::Bcm53125 => "BCM53125",
        }
    }

    /// Number of ports, including the CPU port
    pub const fn num_ports(self) -> u8 {
        match self.family() {
            ChipFamily::FastEthernet => 6,
            ChipFamily::Gigabit => 9,
        }
    }

    /// Index of the CPU (IMP) port
    pub const fn cpu_port(self) -> u8 {
        self.num_ports() - 1
    }

    /// Number of VLAN table entries
    pub const fn num_vlans(self) -> u16 {
        16
    }

    /// Width of the VLAN id field in the default tag registers
    pub const fn vid_bits(self) -> u32 {
        match self.family() {
            ChipFamily::FastEthernet => 4,
            ChipFamily::Gigabit => 12,
        }
    }

    /// Largest VLAN id a port can be assigned
    pub const fn max_vid(self) -> u16 {
        ((1u32 << self.vid_bits()) - 1) as u16
    }

    /// Last port with a PHY behind it
    ///
    /// Ports between this one and the CPU port are MII-only on the GE
    /// parts and report no link status.
    pub const fn last_phy_port(self) -> u8 {
        match self {
            ChipId::Bcm5398 => 7,
            ChipId::Bcm53115 | ChipId::Bcm53125 => 5,
            ChipId::Bcm5395 | ChipId::Bcm5397 => 4,
            _ => self.cpu_port() - 1,
        }
    }

    /// Whether the GE VLAN table sits at the BCM5397/98 offsets
    pub const fn uses_9798_vlan_regs(self) -> bool {
        matches!(self, ChipId::Bcm5397 | ChipId::Bcm5398)
    }

    /// Whether reset forces the port state override register
    pub const fn has_port_override(self) -> bool {
        matches!(self, ChipId::Bcm53115 | ChipId::Bcm53125)
    }
}

impl fmt::Display for ChipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of a successful probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChipIdentity {
    /// Detected variant
    pub chip_id: ChipId,
    /// Core revision register, informational
    pub core_revision: u8,
}

impl ChipIdentity {
    /// Family of the detected chip
    pub const fn family(&self) -> ChipFamily {
        self.chip_id.family()
    }
}

impl fmt::Display for ChipIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (rev {})", self.chip_id, self.core_revision)
    }
}
