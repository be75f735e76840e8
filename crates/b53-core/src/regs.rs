//! B53 register map
//!
//! Page numbers, register offsets and field encodings used by the family
//! state machines. Multi-field registers get explicit encode/decode
//! functions rather than packed structs.

// ============================================================================
// Pages
// ============================================================================

/// Page numbers
pub mod page {
    /// Control
    pub const CTRL: u8 = 0x00;
    /// Status
    pub const STAT: u8 = 0x01;
    /// Management mode
    pub const MGMT: u8 = 0x02;
    /// ARL access (GE VLAN table lives here)
    pub const ARLIO: u8 = 0x05;
    /// VLAN registers
    pub const VLAN: u8 = 0x34;
}

// ============================================================================
// Control page
// ============================================================================

/// Control page registers
pub mod ctrl {
    use bitflags::bitflags;

    /// Port control register of front port `port` (8 bit)
    pub const fn port_ctrl(port: u8) -> u8 {
        port
    }

    /// Inverse MII (CPU) port control (8 bit)
    pub const IMP_CTRL: u8 = 0x08;
    /// Switch mode (8 bit)
    pub const SWITCH_MODE: u8 = 0x0b;
    /// Port state override (8 bit)
    pub const PORT_OVERRIDE: u8 = 0x0e;

    bitflags! {
        /// Switch mode register
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct SwitchMode: u8 {
            /// Managed mode
            const MANAGED    = 1 << 0;
            /// Forwarding enable
            const FORWARD_EN = 1 << 1;
        }
    }

    bitflags! {
        /// Port state override register
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct PortOverride: u8 {
            /// Forced link up
            const LINK = 1 << 0;
            /// Use the override values
            const ENABLE = 1 << 7;
        }
    }
}

// ============================================================================
// Status page
// ============================================================================

/// Status page registers
pub mod stat {
    /// Link status summary (16 bit, one bit per port)
    pub const LINK: u8 = 0x00;
    /// Port speed summary (16 bit FE, 32 bit GE)
    pub const SPEED: u8 = 0x04;
    /// Duplex status summary on FE chips (16 bit)
    pub const DUPLEX_FE: u8 = 0x06;
    /// Duplex status summary on GE chips (16 bit)
    pub const DUPLEX_GE: u8 = 0x08;
    /// Core revision (8 bit)
    pub const CORE_REV: u8 = 0x50;

    /// Speed field: 10 Mbit/s
    pub const SPEED_10M: u8 = 0;
    /// Speed field: 100 Mbit/s
    pub const SPEED_100M: u8 = 1;
    /// Speed field: 1000 Mbit/s
    pub const SPEED_1000M: u8 = 2;

    /// Speed field of `port` in the FE summary (1 bit per port)
    pub const fn speed_fe(reg: u16, port: u8) -> u8 {
        ((reg >> port) & 1) as u8
    }

    /// Speed field of `port` in the GE summary (2 bits per port)
    pub const fn speed_ge(reg: u32, port: u8) -> u8 {
        ((reg >> (2 * port as u32)) & 3) as u8
    }

    /// Per-port bit of a link or duplex summary
    pub const fn port_bit(reg: u16, port: u8) -> bool {
        (reg >> port) & 1 != 0
    }
}

// ============================================================================
// Management page
// ============================================================================

/// Management page registers
pub mod mgmt {
    /// Device id (read as 8 bit, or 16 bit on BCM531xx)
    pub const DEVICE_ID: u8 = 0x30;
}

// ============================================================================
// ARL access page (GE VLAN table)
// ============================================================================

/// ARL access page registers
pub mod arlio {
    use bitflags::bitflags;

    /// Offsets of the GE VLAN table registers
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct VtRegs {
        /// Table access (8 bit)
        pub access: u8,
        /// Table index (16 bit)
        pub index: u8,
        /// Table entry (32 bit)
        pub entry: u8,
    }

    impl VtRegs {
        /// BCM5395, BCM53115 and BCM53125
        pub const STANDARD: VtRegs = VtRegs {
            access: 0x80,
            index: 0x81,
            entry: 0x83,
        };

        /// BCM5397 and BCM5398
        pub const BCM9798: VtRegs = VtRegs {
            access: 0x60,
            index: 0x61,
            entry: 0x63,
        };
    }

    bitflags! {
        /// VLAN table access register
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct VtAccess: u8 {
            /// Start the table operation
            const START = 1 << 7;
        }
    }

    /// Port mask covered by a GE table entry
    pub const MEMBER_MASK: u16 = 0x1ff;
    /// Shift of the untag mask in a GE table entry
    pub const UNTAG_SHIFT: u32 = 9;

    /// Pack a GE VLAN table entry
    pub const fn encode_entry(members: u16, untag: u16) -> u32 {
        ((untag & MEMBER_MASK) as u32) << UNTAG_SHIFT | (members & MEMBER_MASK) as u32
    }

    /// Unpack a GE VLAN table entry into `(members, untag)`
    pub const fn decode_entry(entry: u32) -> (u16, u16) {
        (
            (entry & MEMBER_MASK as u32) as u16,
            ((entry >> UNTAG_SHIFT) & MEMBER_MASK as u32) as u16,
        )
    }
}

// ============================================================================
// VLAN page
// ============================================================================

/// VLAN page registers
pub mod vlan {
    use bitflags::bitflags;

    /// VLAN control 0 (8 bit)
    pub const CTRL0: u8 = 0x00;
    /// VLAN control 1 (8 bit)
    pub const CTRL1: u8 = 0x01;
    /// VLAN control 4 (8 bit)
    pub const CTRL4: u8 = 0x04;
    /// VLAN control 5 (8 bit)
    pub const CTRL5: u8 = 0x05;
    /// FE VLAN table access (16 bit)
    pub const TABLE_ACCESS: u8 = 0x06;
    /// FE VLAN write data (32 bit)
    pub const WRITE: u8 = 0x08;

    /// Default tag register of `port` (16 bit)
    pub const fn def_tag(port: u8) -> u8 {
        0x10 + 2 * port
    }

    bitflags! {
        /// VLAN control 0
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct VlanCtrl0: u8 {
            /// Drop frames whose VID misses the table
            const DROP_VID_MISS = 1 << 4;
            /// Hash by VID
            const HASH_VID      = 1 << 5;
            /// Learn and look up by VID and MAC
            const VID_CHK_EN    = 1 << 6;
            /// 802.1Q VLAN enable
            const VLAN_EN       = 1 << 7;
        }
    }

    impl VlanCtrl0 {
        /// Value written when VLANs are enforced
        pub const ENFORCED: Self = Self::VLAN_EN
            .union(Self::VID_CHK_EN)
            .union(Self::HASH_VID);
    }

    bitflags! {
        /// VLAN control 1
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct VlanCtrl1: u8 {
            /// Multicast tag enable
            const RX_MCST_TAG_EN   = 1 << 1;
            /// Multicast forward enable
            const RX_MCST_FWD_EN   = 1 << 2;
            /// Multicast untag enable
            const RX_MCST_UNTAG_EN = 1 << 3;
        }
    }

    impl VlanCtrl1 {
        /// Value written when VLANs are enforced
        pub const ENFORCED: Self = Self::RX_MCST_TAG_EN
            .union(Self::RX_MCST_FWD_EN)
            .union(Self::RX_MCST_UNTAG_EN);
    }

    /// Ingress VID violation policy (VLAN control 4)
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum IngressVidCheck {
        /// Forward but do not learn
        Forward = 0,
        /// Drop violating frames
        Drop = 1,
        /// Do not check
        Disabled = 2,
    }

    const ING_VID_CHECK_SHIFT: u32 = 6;

    /// Encode the ingress check field of VLAN control 4
    pub const fn ctrl4(check: IngressVidCheck) -> u8 {
        (check as u8) << ING_VID_CHECK_SHIFT
    }

    bitflags! {
        /// VLAN control 5
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct VlanCtrl5: u8 {
            /// Drop frames missing the VLAN table
            const DROP_VTABLE_MISS = 1 << 3;
        }
    }

    bitflags! {
        /// FE VLAN table access command bits
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct TableAccess: u16 {
            /// Write (clear for read)
            const WRITE = 1 << 12;
            /// Start the operation
            const START = 1 << 13;
        }
    }

    /// Table access command writing entry `index`
    pub const fn table_write(index: u8) -> u16 {
        index as u16 | TableAccess::WRITE.bits() | TableAccess::START.bits()
    }

    /// Port mask covered by an FE table entry
    pub const MEMBER_MASK: u16 = 0x3f;
    const UNTAG_SHIFT: u32 = 6;
    const VID_HIGH_SHIFT: u32 = 12;
    const VID_HIGH_MASK: u32 = 0xff;
    const VALID: u32 = 1 << 20;

    /// One FE VLAN table entry as written through [`WRITE`]
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FeEntry {
        /// Member ports
        pub members: u16,
        /// Ports sending untagged
        pub untag: u16,
        /// Upper VID bits of the entry (VLAN base >> 4)
        pub vid_high: u8,
        /// Entry is valid
        pub valid: bool,
    }

    impl FeEntry {
        /// Pack into the 32-bit write register layout
        pub const fn encode(&self) -> u32 {
            let mut value = (self.members & MEMBER_MASK) as u32
                | ((self.untag & MEMBER_MASK) as u32) << UNTAG_SHIFT
                | (self.vid_high as u32) << VID_HIGH_SHIFT;
            if self.valid {
                value |= VALID;
            }
            value
        }

        /// Unpack from the 32-bit register layout
        pub const fn decode(value: u32) -> Self {
            Self {
                members: (value & MEMBER_MASK as u32) as u16,
                untag: ((value >> UNTAG_SHIFT) & MEMBER_MASK as u32) as u16,
                vid_high: ((value >> VID_HIGH_SHIFT) & VID_HIGH_MASK) as u8,
                valid: value & VALID != 0,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fe_entry_fields() {
        for members in [0u16, 0x01, 0x15, 0x3f] {
            for untag in [0u16, 0x20, 0x3f] {
                for vid_high in [0u8, 0x01, 0xff] {
                    for valid in [false, true] {
                        let entry = vlan::FeEntry {
                            members,
                            untag,
                            vid_high,
                            valid,
                        };
                        assert_eq!(vlan::FeEntry::decode(entry.encode()), entry);
                    }
                }
            }
        }
    }

    #[test]
    fn test_fe_entry_layout() {
        let entry = vlan::FeEntry {
            members: 0x3f,
            untag: 0x3f,
            vid_high: 0,
            valid: true,
        };
        assert_eq!(entry.encode(), 0x0010_0fff);

        let entry = vlan::FeEntry {
            members: 0x21,
            untag: 0x01,
            vid_high: 0x02,
            valid: true,
        };
        assert_eq!(entry.encode(), 0x0010_2061);
    }

    #[test]
    fn test_ge_entry_fields() {
        for members in [0u16, 0x001, 0x100, 0x1ff] {
            for untag in [0u16, 0x0ff, 0x1ff] {
                let raw = arlio::encode_entry(members, untag);
                assert_eq!(arlio::decode_entry(raw), (members, untag));
            }
        }
        assert_eq!(arlio::encode_entry(0x103, 0x003), 0x0000_0703);
    }

    #[test]
    fn test_ge_entry_ignores_extra_bits() {
        assert_eq!(arlio::encode_entry(0xffff, 0), 0x1ff);
    }

    #[test]
    fn test_vlan_control_patterns() {
        assert_eq!(vlan::VlanCtrl0::ENFORCED.bits(), 0xe0);
        assert_eq!(vlan::VlanCtrl1::ENFORCED.bits(), 0x0e);
        assert_eq!(vlan::ctrl4(vlan::IngressVidCheck::Drop), 0x40);
        assert_eq!(vlan::ctrl4(vlan::IngressVidCheck::Disabled), 0x80);
        assert_eq!(vlan::VlanCtrl5::DROP_VTABLE_MISS.bits(), 0x08);
    }

    #[test]
    fn test_table_access_command() {
        assert_eq!(vlan::table_write(0), 0x3000);
        assert_eq!(vlan::table_write(15), 0x300f);
    }

    #[test]
    fn test_speed_fields() {
        assert_eq!(stat::speed_fe(0b10_0001, 0), stat::SPEED_100M);
        assert_eq!(stat::speed_fe(0b10_0001, 1), stat::SPEED_10M);
        // port 0: 1000M, port 1: 100M, port 7: 1000M
        let ge = 0b10 | 0b01 << 2 | 0b10 << 14;
        assert_eq!(stat::speed_ge(ge, 0), stat::SPEED_1000M);
        assert_eq!(stat::speed_ge(ge, 1), stat::SPEED_100M);
        assert_eq!(stat::speed_ge(ge, 2), stat::SPEED_10M);
        assert_eq!(stat::speed_ge(ge, 7), stat::SPEED_1000M);
    }

    #[test]
    fn test_def_tag_offsets() {
        assert_eq!(vlan::def_tag(0), 0x10);
        assert_eq!(vlan::def_tag(5), 0x1a);
        assert_eq!(vlan::def_tag(8), 0x20);
    }
}
