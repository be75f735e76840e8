//! Transport registry
//!
//! Opens a switch from a transport string such as
//! `linux_mdio:iface=eth0` or `dummy:chip=3125,transport=spi`, probes it
//! and hands back a [`SwitchHandle`].

use crate::handle::{BoxedRegisterIo, SwitchHandle};

use b53_core::Switch;

use std::collections::HashMap;

/// Parsed transport parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchParams {
    /// Transport name as given
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl SwitchParams {
    /// Parameters as borrowed pairs, the form backend option parsers take
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a transport string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```
/// let params = b53_switch::parse_switch_params("linux_spi:dev=/dev/spidev0.1").unwrap();
/// assert_eq!(params.name, "linux_spi");
/// assert_eq!(params.params.get("dev"), Some(&"/dev/spidev0.1".to_string()));
/// ```
pub fn parse_switch_params(s: &str) -> Result<SwitchParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err("No transport given".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            match opt.split_once('=') {
                Some((key, value)) => {
                    params.insert(key.to_string(), value.to_string());
                }
                None => {
                    return Err(
                        format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                    )
                }
            }
        }
    }

    Ok(SwitchParams {
        name: name.to_string(),
        params,
    })
}

/// Open a transport, detect the switch behind it and reset it
///
/// # Example
/// ```no_run
/// let mut switch = b53_switch::open_switch("linux_mdio:iface=eth0")?;
/// println!("{} via {}", switch.identity(), switch.transport());
/// for link in switch.port_links()? {
///     println!("{}", link);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn open_switch(transport: &str) -> Result<SwitchHandle, Box<dyn std::error::Error>> {
    let params = parse_switch_params(transport)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-spi")]
        "linux_spi" | "linux-spi" | "spidev" => open_linux_spi(&params),

        #[cfg(feature = "linux-mdio")]
        "linux_mdio" | "linux-mdio" | "mdio" => open_linux_mdio(&params),

        _ => Err(format!("Unknown transport: {}", params.name).into()),
    }
}

fn register(
    io: BoxedRegisterIo,
    transport: &'static str,
) -> Result<SwitchHandle, Box<dyn std::error::Error>> {
    let switch = Switch::register(io)?;
    log::info!("{}: {} ready", transport, switch.identity());
    Ok(SwitchHandle::new(switch, transport))
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &SwitchParams) -> Result<SwitchHandle, Box<dyn std::error::Error>> {
    use b53_core::access::{MdioAccess, SpiAccess};
    use b53_dummy::{DummyConfig, DummySwitch};

    let mut config = DummyConfig::default();
    if let Some(chip) = params.params.get("chip") {
        let hex = chip.trim_start_matches("0x");
        let id = u16::from_str_radix(hex, 16).map_err(|_| format!("Invalid chip id: {}", chip))?;
        config = DummyConfig::with_device_id(id, config.vc4);
    }
    if let Some(vc4) = params.params.get("vc4") {
        config.vc4 = vc4
            .parse()
            .map_err(|_| format!("Invalid vc4 value: {}", vc4))?;
    }

    let chip = DummySwitch::new(config);
    let io: BoxedRegisterIo = match params.params.get("transport").map(String::as_str) {
        None | Some("mdio") => Box::new(MdioAccess::new(chip)),
        Some("spi") => Box::new(SpiAccess::new(chip)),
        Some(other) => return Err(format!("Invalid dummy transport: {} (mdio or spi)", other).into()),
    };
    register(io, "dummy")
}

#[cfg(feature = "linux-spi")]
fn open_linux_spi(params: &SwitchParams) -> Result<SwitchHandle, Box<dyn std::error::Error>> {
    let io = b53_linux_spi::open_linux_spi(&params.options())?;
    register(Box::new(io), "linux_spi")
}

#[cfg(feature = "linux-mdio")]
fn open_linux_mdio(params: &SwitchParams) -> Result<SwitchHandle, Box<dyn std::error::Error>> {
    let io = b53_linux_mdio::open_linux_mdio(&params.options())?;
    register(Box::new(io), "linux_mdio")
}

/// Information about a transport
#[derive(Debug, Clone, Copy)]
pub struct TransportInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Transports enabled at compile time
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_transports() -> Vec<TransportInfo> {
    let mut transports = Vec::new();

    #[cfg(feature = "dummy")]
    transports.push(TransportInfo {
        name: "dummy",
        aliases: &[],
        description: "Simulated switch (chip=<hex id>,vc4=<n>,transport=<mdio|spi>)",
    });

    #[cfg(feature = "linux-spi")]
    transports.push(TransportInfo {
        name: "linux_spi",
        aliases: &["linux-spi", "spidev"],
        description: "Linux spidev device (dev=/dev/spidevX.Y,speed=<kHz>,mode=<0-3>)",
    });

    #[cfg(feature = "linux-mdio")]
    transports.push(TransportInfo {
        name: "linux_mdio",
        aliases: &["linux-mdio", "mdio"],
        description: "MDIO bus of a network interface (iface=<netdev>,phy=<addr>)",
    });

    transports
}

/// Short list of transport names for help output
pub fn transport_names_short() -> String {
    let transports = available_transports();
    if transports.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = transports.iter().map(|t| t.name).collect();
    names.join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_switch_params() {
        let params = parse_switch_params("dummy").unwrap();
        assert_eq!(params.name, "dummy");
        assert!(params.params.is_empty());

        let params = parse_switch_params("linux_mdio:iface=eth0,phy=0x1e").unwrap();
        assert_eq!(params.name, "linux_mdio");
        assert_eq!(params.params.len(), 2);
        assert_eq!(params.params["iface"], "eth0");
        assert_eq!(params.params["phy"], "0x1e");

        let mut options = params.options();
        options.sort();
        assert_eq!(options, vec![("iface", "eth0"), ("phy", "0x1e")]);
    }

    #[test]
    fn test_parse_switch_params_errors() {
        assert!(parse_switch_params("").is_err());
        assert!(parse_switch_params(":dev=x").is_err());
        assert!(parse_switch_params("linux_spi:dev").is_err());
    }

    #[test]
    fn test_unknown_transport() {
        let err = open_switch("ch341a").err().unwrap();
        assert_eq!(err.to_string(), "Unknown transport: ch341a");
    }

    #[test]
    fn test_available_transports() {
        let names = transport_names_short();
        assert!(names.contains("dummy"));
        assert!(available_transports()
            .iter()
            .any(|t| t.aliases.contains(&"spidev")));
    }

    #[test]
    fn test_backend_option_errors_surface() {
        assert!(open_switch("linux_spi").is_err());
        assert!(open_switch("mdio:phy=1").is_err());
    }
}
