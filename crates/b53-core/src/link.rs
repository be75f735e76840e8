//! Port link status

use std::fmt;

/// Negotiated port speed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Speed {
    /// 10 Mbit/s
    Mbps10,
    /// 100 Mbit/s
    Mbps100,
    /// 1000 Mbit/s
    Mbps1000,
}

impl Speed {
    /// Ethernet medium name
    pub const fn name(self) -> &'static str {
        match self {
            Speed::Mbps10 => "10baseT",
            Speed::Mbps100 => "100baseT",
            Speed::Mbps1000 => "1000baseT",
        }
    }
}

/// Port duplex mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Duplex {
    /// Half duplex
    Half,
    /// Full duplex
    Full,
}

/// Link summary of one port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PortLink {
    /// Port index
    pub port: u8,
    /// Link is up
    pub link: bool,
    /// Speed, meaningful only while the link is up
    pub speed: Speed,
    /// Duplex, meaningful only while the link is up
    pub duplex: Duplex,
}

impl fmt::Display for PortLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.link {
            return write!(f, "port:{} link:down", self.port);
        }
        let duplex = match self.duplex {
            Duplex::Full => "full",
            Duplex::Half => "half",
        };
        write!(
            f,
            "port:{} link:up speed:{} {}-duplex",
            self.port,
            self.speed.name(),
            duplex
        )
    }
}
