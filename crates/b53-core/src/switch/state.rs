//! Logical switch configuration

use crate::chip::ChipIdentity;

/// Per-port configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortConfig {
    /// VLAN assigned to untagged ingress traffic
    pub pvid: u16,
    /// Port sends 802.1Q tagged frames; untagged ports get a default tag
    pub egress_tagged: bool,
}

/// One VLAN table entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VlanEntry {
    /// Member ports, one bit per port
    pub members: u16,
    /// Set when the member set is non-empty
    pub valid: bool,
}

/// A port's membership in a VLAN, as exchanged with a front end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VlanPort {
    /// Port index
    pub port: u8,
    /// Port carries this VLAN tagged
    pub tagged: bool,
}

impl VlanPort {
    /// Untagged member
    pub const fn untagged(port: u8) -> Self {
        Self {
            port,
            tagged: false,
        }
    }

    /// Tagged member
    pub const fn tagged(port: u8) -> Self {
        Self { port, tagged: true }
    }
}

/// Everything [`apply`](crate::family::SwitchFamily::apply) reconciles
/// against the hardware
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SwitchState {
    /// Detected chip
    pub identity: ChipIdentity,
    /// 802.1Q VLAN mode
    pub vlan_enabled: bool,
    /// Offset added to every VLAN id (FE only)
    pub vlan_base: u16,
    /// Port configuration, indexed by port
    pub ports: Vec<PortConfig>,
    /// VLAN table, indexed by entry
    pub vlans: Vec<VlanEntry>,
}

impl SwitchState {
    /// Default configuration for a detected chip
    pub fn new(identity: ChipIdentity) -> Self {
        let chip = identity.chip_id;
        Self {
            identity,
            vlan_enabled: false,
            vlan_base: 0,
            ports: vec![PortConfig::default(); usize::from(chip.num_ports())],
            vlans: vec![VlanEntry::default(); usize::from(chip.num_vlans())],
        }
    }

    /// Return every field to its default
    pub fn clear(&mut self) {
        *self = Self::new(self.identity);
    }

    /// Ports that transmit untagged
    pub fn untag_mask(&self) -> u16 {
        self.ports
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.egress_tagged)
            .fold(0, |mask, (i, _)| mask | (1u16 << i))
    }
}
