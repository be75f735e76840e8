//! SwitchHandle - a registered switch behind a type-erased transport

use b53_core::{
    ChipId, ChipIdentity, PortLink, RegisterAddress, RegisterIo, Result, Switch, SwitchState,
    VlanPort,
};

/// Register interface of any transport
pub type BoxedRegisterIo = Box<dyn RegisterIo + Send>;

/// Handle on a registered switch
///
/// Front ends only deal with this type; which bus and which access engine
/// sit underneath is decided once by [`open_switch`](crate::open_switch).
pub struct SwitchHandle {
    switch: Switch<BoxedRegisterIo>,
    transport: &'static str,
}

impl SwitchHandle {
    pub(crate) fn new(switch: Switch<BoxedRegisterIo>, transport: &'static str) -> Self {
        Self { switch, transport }
    }

    /// Canonical name of the transport the switch was opened with
    pub fn transport(&self) -> &'static str {
        self.transport
    }

    /// Detected chip
    pub fn identity(&self) -> ChipIdentity {
        self.switch.identity()
    }

    /// Detected variant
    pub fn chip(&self) -> ChipId {
        self.switch.chip()
    }

    /// Logical configuration
    pub fn state(&self) -> &SwitchState {
        self.switch.state()
    }

    /// Whether 802.1Q VLAN mode is configured
    pub fn vlan_enabled(&self) -> bool {
        self.switch.vlan_enabled()
    }

    /// Configure 802.1Q VLAN mode
    pub fn set_vlan_enabled(&mut self, enable: bool) {
        self.switch.set_vlan_enabled(enable)
    }

    /// VLAN id offset
    pub fn vlan_base(&self) -> u16 {
        self.switch.vlan_base()
    }

    /// Set the VLAN id offset
    pub fn set_vlan_base(&mut self, base: u16) -> Result<()> {
        self.switch.set_vlan_base(base)
    }

    /// VLAN of untagged ingress on `port`
    pub fn port_pvid(&self, port: u8) -> Result<u16> {
        self.switch.port_pvid(port)
    }

    /// Set the VLAN of untagged ingress on `port`
    pub fn set_port_pvid(&mut self, port: u8, vid: u16) -> Result<()> {
        self.switch.set_port_pvid(port, vid)
    }

    /// Members of VLAN table entry `index`
    pub fn vlan_ports(&self, index: u16) -> Result<Vec<VlanPort>> {
        self.switch.vlan_ports(index)
    }

    /// Replace the members of VLAN table entry `index`
    pub fn set_vlan_ports(&mut self, index: u16, ports: &[VlanPort]) -> Result<()> {
        self.switch.set_vlan_ports(index, ports)
    }

    /// Push the logical configuration to the hardware
    pub fn apply_config(&mut self) -> Result<()> {
        self.switch.apply_config()
    }

    /// Return to the default configuration
    pub fn reset_switch(&mut self) -> Result<()> {
        self.switch.reset_switch()
    }

    /// Toggle managed mode
    pub fn set_managed(&mut self, enable: bool) -> Result<()> {
        self.switch.set_managed(enable)
    }

    /// Link summary of `port`
    pub fn port_link(&mut self, port: u8) -> Result<PortLink> {
        self.switch.port_link(port)
    }

    /// Link summaries of every port with a PHY
    pub fn port_links(&mut self) -> Result<Vec<PortLink>> {
        (0..=self.chip().last_phy_port())
            .map(|port| self.switch.port_link(port))
            .collect()
    }

    /// Read any register
    pub fn read_register(&mut self, addr: RegisterAddress) -> Result<u64> {
        self.switch.read_register(addr)
    }

    /// Write any register
    pub fn write_register(&mut self, addr: RegisterAddress, value: u64) -> Result<()> {
        self.switch.write_register(addr, value)
    }
}
