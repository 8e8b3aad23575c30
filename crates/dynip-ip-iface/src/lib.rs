// # Interface Address Source
//
// This crate provides the internal address source: the addresses bound to
// one named network interface.
//
// ## Selection Rules
//
// - Loopback addresses are ignored
// - Any other IPv4 address is an IPv4 candidate
// - An IPv6 address is a candidate unless it is link-local unicast (fe80::/10)
// - IPv4: the first candidate in enumeration order wins
// - IPv6: global addresses win over unique-local ones (fc00::/7), then
//   the first in enumeration order
//
// ## Platform Support
//
// Enumeration uses `if-addrs` (getifaddrs on Unix, GetAdaptersAddresses on
// Windows). On Unix an interface that exists but has no address is told
// apart from a missing interface with `if_nametoindex` (via `nix`).

use dynip_core::traits::{AddressKind, AddressSource, IpStack};
use dynip_core::{Error, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// Internal address source backed by one network interface
#[derive(Debug, Clone)]
pub struct InterfaceAddressSource {
    interface: String,
}

impl InterfaceAddressSource {
    /// Create a source for `interface` (e.g. "eth0", "en0")
    pub fn new(interface: impl Into<String>) -> Self {
        Self {
            interface: interface.into(),
        }
    }
}

#[async_trait::async_trait]
impl AddressSource for InterfaceAddressSource {
    async fn discover(&self) -> Result<IpStack> {
        let bound = interface_addresses(&self.interface)?;
        tracing::debug!(
            "Interface {} has {} bound address(es): {:?}",
            self.interface,
            bound.len(),
            bound
        );
        Ok(select_addresses(bound))
    }

    fn kind(&self) -> AddressKind {
        AddressKind::Internal
    }
}

/// Addresses bound to `name`, in enumeration order
///
/// # Returns
///
/// - `Ok(addrs)`: The interface exists (the list may be empty)
/// - `Err(Error::InterfaceNotFound)`: No interface with that name
/// - `Err(Error::Network)`: Enumeration itself failed
pub fn interface_addresses(name: &str) -> Result<Vec<IpAddr>> {
    let bound: Vec<IpAddr> = if_addrs::get_if_addrs()?
        .into_iter()
        .filter(|iface| iface.name == name)
        .map(|iface| iface.ip())
        .collect();

    if bound.is_empty() && !interface_exists(name) {
        return Err(Error::interface_not_found(name));
    }

    Ok(bound)
}

/// Pick the IPv4 and IPv6 address to report from a list of bound addresses
pub fn select_addresses<I>(addrs: I) -> IpStack
where
    I: IntoIterator<Item = IpAddr>,
{
    let mut ipv4: Option<Ipv4Addr> = None;
    let mut ipv6: Option<(u8, Ipv6Addr)> = None;

    for addr in addrs {
        if addr.is_loopback() {
            continue;
        }

        match addr {
            IpAddr::V4(v4) => {
                if ipv4.is_none() {
                    ipv4 = Some(v4);
                }
            }
            IpAddr::V6(v6) => {
                if v6.is_unicast_link_local() {
                    continue;
                }
                let rank = ipv6_rank(&v6);
                match ipv6 {
                    Some((best, _)) if best <= rank => {}
                    _ => ipv6 = Some((rank, v6)),
                }
            }
        }
    }

    IpStack::new(ipv4, ipv6.map(|(_, v6)| v6))
}

/// Lower is preferred
fn ipv6_rank(addr: &Ipv6Addr) -> u8 {
    if addr.is_unique_local() { 1 } else { 0 }
}

#[cfg(unix)]
fn interface_exists(name: &str) -> bool {
    nix::net::if_::if_nametoindex(name).is_ok()
}

#[cfg(not(unix))]
fn interface_exists(_name: &str) -> bool {
    false
}
