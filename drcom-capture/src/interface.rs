//! Network interface enumeration and local address discovery

use std::net::{IpAddr, Ipv4Addr};

use drcom_core::{Error, MacAddr, Result};
use pnet_datalink::{self, NetworkInterface};

/// Information about a network interface
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    /// Interface name (e.g., "eth0", "wlan0")
    pub name: String,
    /// MAC address if available
    pub mac: Option<MacAddr>,
    /// List of IP addresses assigned to this interface
    pub ips: Vec<IpAddr>,
    /// Whether the interface is up
    pub is_up: bool,
    /// Whether the interface is a loopback
    pub is_loopback: bool,
}

impl From<&NetworkInterface> for InterfaceInfo {
    fn from(iface: &NetworkInterface) -> Self {
        let mac = iface
            .mac
            .map(|mac| MacAddr::new([mac.0, mac.1, mac.2, mac.3, mac.4, mac.5]));

        InterfaceInfo {
            name: iface.name.clone(),
            mac,
            ips: iface.ips.iter().map(|network| network.ip()).collect(),
            is_up: iface.is_up(),
            is_loopback: iface.is_loopback(),
        }
    }
}

impl InterfaceInfo {
    /// Get the primary IPv4 address if available
    pub fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.ips.iter().find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(*v4),
            IpAddr::V6(_) => None,
        })
    }

    /// Up, not loopback, with an IPv4 address and a non-zero MAC
    pub fn is_usable(&self) -> bool {
        self.is_up
            && !self.is_loopback
            && self.primary_ipv4().is_some()
            && self.mac.is_some_and(|mac| mac != MacAddr::zero())
    }
}

/// List all available network interfaces
pub fn list_interfaces() -> Result<Vec<InterfaceInfo>> {
    let interfaces = pnet_datalink::interfaces();

    if interfaces.is_empty() {
        return Err(Error::Capture("No network interfaces found".to_string()));
    }

    Ok(interfaces.iter().map(InterfaceInfo::from).collect())
}

/// Get information about a specific interface by name
pub fn get_interface(name: &str) -> Result<InterfaceInfo> {
    pnet_datalink::interfaces()
        .iter()
        .find(|iface| iface.name == name)
        .map(InterfaceInfo::from)
        .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))
}

/// Find the default interface (first usable one)
pub fn default_interface() -> Result<InterfaceInfo> {
    list_interfaces()?
        .into_iter()
        .find(InterfaceInfo::is_usable)
        .ok_or_else(|| Error::Capture("No interface with both an IPv4 and a MAC address".to_string()))
}

/// Source of the local IP and MAC written into login packets
pub trait NetworkInfo {
    fn local_ipv4(&self) -> Result<Ipv4Addr>;
    fn local_mac(&self) -> Result<MacAddr>;
}

/// [`NetworkInfo`] backed by the OS interface table
///
/// Uses the named interface when given, the first usable one otherwise.
#[derive(Debug, Clone, Default)]
pub struct InterfaceNetworkInfo {
    interface: Option<String>,
}

impl InterfaceNetworkInfo {
    pub fn new(interface: Option<String>) -> Self {
        Self { interface }
    }

    fn resolve(&self) -> Result<InterfaceInfo> {
        match &self.interface {
            Some(name) => get_interface(name),
            None => default_interface(),
        }
    }
}

impl NetworkInfo for InterfaceNetworkInfo {
    fn local_ipv4(&self) -> Result<Ipv4Addr> {
        let iface = self.resolve()?;
        iface
            .primary_ipv4()
            .ok_or_else(|| Error::Capture(format!("Interface {} has no IPv4 address", iface.name)))
    }

    fn local_mac(&self) -> Result<MacAddr> {
        let iface = self.resolve()?;
        iface
            .mac
            .ok_or_else(|| Error::Capture(format!("Interface {} has no MAC address", iface.name)))
    }
}
