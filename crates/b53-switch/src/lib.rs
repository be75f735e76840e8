//! b53-switch - Open B53 switches by transport name
//!
//! Front ends (a CLI, a netlink bridge, a config daemon) should only need
//! this crate: it picks the bus from a transport string, probes and resets
//! the chip and hides the access engine behind [`SwitchHandle`].
//!
//! ```text
//!   front end ──> b53-switch ──> b53-core (Switch, families, access)
//!                     │
//!                     ├── b53-linux-mdio  (SIOCGMIIREG on a netdev)
//!                     ├── b53-linux-spi   (/dev/spidevX.Y)
//!                     └── b53-dummy       (in-memory chip)
//! ```
//!
//! # Example
//!
//! ```
//! use b53_core::VlanPort;
//!
//! let mut switch = b53_switch::open_switch("dummy:chip=3125")?;
//! switch.set_vlan_enabled(true);
//! switch.set_vlan_ports(2, &[VlanPort::untagged(0), VlanPort::tagged(8)])?;
//! switch.apply_config()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod handle;
mod registry;

pub use handle::{BoxedRegisterIo, SwitchHandle};
pub use registry::{
    available_transports, open_switch, parse_switch_params, transport_names_short,
    SwitchParams, TransportInfo,
};

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use b53_core::regs::{ctrl, page, stat, vlan};
    use b53_core::{ChipId, Error, RegisterAddress, VlanPort};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_open_dummy_defaults() {
        init();
        let switch = open_switch("dummy").unwrap();
        assert_eq!(switch.chip(), ChipId::Bcm5395);
        assert_eq!(switch.transport(), "dummy");
        assert!(!switch.vlan_enabled());
    }

    #[test]
    fn test_open_dummy_variants() {
        let switch = open_switch("dummy:chip=0x3115,transport=spi").unwrap();
        assert_eq!(switch.chip(), ChipId::Bcm53115);

        let switch = open_switch("dummy:chip=0,vc4=1").unwrap();
        assert_eq!(switch.chip(), ChipId::Bcm5325E);

        assert!(open_switch("dummy:chip=5310").is_err());
        assert!(open_switch("dummy:chip=zz").is_err());
        assert!(open_switch("dummy:transport=i2c").is_err());
    }

    #[test]
    fn test_handle_vlan_flow() {
        init();
        let mut switch = open_switch("dummy:chip=98,transport=spi").unwrap();
        assert_eq!(switch.chip(), ChipId::Bcm5398);

        switch.set_vlan_enabled(true);
        switch
            .set_vlan_ports(3, &[VlanPort::untagged(1), VlanPort::tagged(8)])
            .unwrap();
        switch.set_port_pvid(2, 100).unwrap();
        switch.apply_config().unwrap();

        assert_eq!(switch.port_pvid(1).unwrap(), 3);
        assert_eq!(
            switch.vlan_ports(3).unwrap(),
            vec![VlanPort::untagged(1), VlanPort::tagged(8)]
        );
        let ctrl0 = switch
            .read_register(RegisterAddress::r8(page::VLAN, vlan::CTRL0))
            .unwrap();
        assert_eq!(ctrl0, 0xe0);
        let tag = switch
            .read_register(RegisterAddress::r16(page::VLAN, vlan::def_tag(2)))
            .unwrap();
        assert_eq!(tag, 100);

        assert!(matches!(
            switch.set_vlan_ports(0, &[VlanPort::untagged(1)]),
            Err(Error::ReservedVlan { index: 0 })
        ));
        assert!(matches!(
            switch.set_vlan_base(16),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn test_handle_reset_and_managed() {
        let mut switch = open_switch("dummy:chip=0,vc4=3").unwrap();
        switch.set_vlan_base(0x40).unwrap();
        switch.set_vlan_enabled(true);
        switch.reset_switch().unwrap();
        assert_eq!(switch.vlan_base(), 0);
        assert!(!switch.state().vlan_enabled);

        switch.set_managed(true).unwrap();
        let mode = switch
            .read_register(RegisterAddress::r8(page::CTRL, ctrl::SWITCH_MODE))
            .unwrap();
        assert_eq!(mode, 0x03);

        switch
            .write_register(RegisterAddress::r8(page::CTRL, ctrl::IMP_CTRL), 0x1c)
            .unwrap();
        assert_eq!(
            switch
                .read_register(RegisterAddress::r8(page::CTRL, ctrl::IMP_CTRL))
                .unwrap(),
            0x1c
        );
    }

    #[test]
    fn test_port_links() {
        let mut switch = open_switch("dummy:chip=3125").unwrap();
        let links = switch.port_links().unwrap();

        assert_eq!(links.len(), 6);
        assert!(links.iter().all(|l| !l.link));
        assert_eq!(links[5].to_string(), "port:5 link:down");
        assert!(matches!(
            switch.port_link(6),
            Err(Error::NoPhyStatus { port: 6 })
        ));
    }

    #[test]
    fn test_port_links_with_reserved_speed_on_down_port() {
        let mut switch = open_switch("dummy:chip=3125").unwrap();
        switch
            .write_register(RegisterAddress::r32(page::STAT, stat::SPEED), 0b11)
            .unwrap();

        let links = switch.port_links().unwrap();
        assert_eq!(links.len(), 6);
        assert_eq!(links[0].to_string(), "port:0 link:down");
    }
}
