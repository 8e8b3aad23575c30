// # Address Source Trait
//
// Defines the interface for discovering the machine's addresses.
//
// ## Implementations
//
// - Interface inspection (internal addresses): `dynip-ip-iface` crate
// - Remote "what is my IP" endpoint (external addresses): `dynip-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dynip_core::AddressSource;
//
// let stack = source.discover().await?;
// if let Some(v4) = stack.ipv4.address() {
//     println!("IPv4: {}", v4);
// }
// ```

use async_trait::async_trait;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IP family (v4 or v6)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpFamily {
    V4,
    V6,
}

impl IpFamily {
    /// Both families, IPv4 first
    pub const ALL: [IpFamily; 2] = [IpFamily::V4, IpFamily::V6];

    /// Family of an address
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => IpFamily::V4,
            IpAddr::V6(_) => IpFamily::V6,
        }
    }

    /// The unspecified address of this family (`0.0.0.0` or `::`)
    pub fn unspecified(self) -> IpAddr {
        match self {
            IpFamily::V4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpFamily::V6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        }
    }

    /// Whether `ip` belongs to this family
    pub fn matches(self, ip: &IpAddr) -> bool {
        Self::of(ip) == self
    }
}

impl std::fmt::Display for IpFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpFamily::V4 => write!(f, "IPv4"),
            IpFamily::V6 => write!(f, "IPv6"),
        }
    }
}

/// Where an address was observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// Bound to a local network interface
    Internal,
    /// Seen by a remote service
    External,
}

impl std::fmt::Display for AddressKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressKind::Internal => write!(f, "internal"),
            AddressKind::External => write!(f, "external"),
        }
    }
}

/// Outcome of discovering one family
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovered<A> {
    /// An address was found
    Found(A),
    /// No address of this family is available
    NotFound,
    /// The source answered with something unusable
    Failed(String),
}

impl<A: Copy> Discovered<A> {
    /// The address, if one was found
    pub fn address(&self) -> Option<A> {
        match self {
            Discovered::Found(a) => Some(*a),
            _ => None,
        }
    }
}

impl<A> Default for Discovered<A> {
    fn default() -> Self {
        Discovered::NotFound
    }
}

/// Best-known IPv4 and IPv6 addresses of one kind
///
/// Built fresh for every discovery and never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpStack {
    pub ipv4: Discovered<Ipv4Addr>,
    pub ipv6: Discovered<Ipv6Addr>,
}

impl IpStack {
    /// A stack with neither address found
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a stack from optional addresses
    pub fn new(ipv4: Option<Ipv4Addr>, ipv6: Option<Ipv6Addr>) -> Self {
        Self {
            ipv4: ipv4.map_or(Discovered::NotFound, Discovered::Found),
            ipv6: ipv6.map_or(Discovered::NotFound, Discovered::Found),
        }
    }

    /// Outcome for one family, widened to `IpAddr`
    pub fn get(&self, family: IpFamily) -> Discovered<IpAddr> {
        match family {
            IpFamily::V4 => widen(&self.ipv4),
            IpFamily::V6 => widen(&self.ipv6),
        }
    }

    /// Store the outcome for `family`
    ///
    /// An address of the other family is stored as `Failed`.
    pub fn set(&mut self, family: IpFamily, outcome: Discovered<IpAddr>) {
        match (family, outcome) {
            (IpFamily::V4, Discovered::Found(IpAddr::V4(a))) => self.ipv4 = Discovered::Found(a),
            (IpFamily::V6, Discovered::Found(IpAddr::V6(a))) => self.ipv6 = Discovered::Found(a),
            (family, Discovered::Found(other)) => {
                let reason = format!("expected {}, got {}", family, other);
                match family {
                    IpFamily::V4 => self.ipv4 = Discovered::Failed(reason),
                    IpFamily::V6 => self.ipv6 = Discovered::Failed(reason),
                }
            }
            (IpFamily::V4, Discovered::NotFound) => self.ipv4 = Discovered::NotFound,
            (IpFamily::V6, Discovered::NotFound) => self.ipv6 = Discovered::NotFound,
            (IpFamily::V4, Discovered::Failed(reason)) => self.ipv4 = Discovered::Failed(reason),
            (IpFamily::V6, Discovered::Failed(reason)) => self.ipv6 = Discovered::Failed(reason),
        }
    }
}

fn widen<A: Copy + Into<IpAddr>>(slot: &Discovered<A>) -> Discovered<IpAddr> {
    match slot {
        Discovered::Found(a) => Discovered::Found((*a).into()),
        Discovered::NotFound => Discovered::NotFound,
        Discovered::Failed(reason) => Discovered::Failed(reason.clone()),
    }
}

/// Trait for address discovery implementations
///
/// # Behavior
///
/// - One call discovers both families
/// - Failure to discover one family must not hide the other; per-family
///   problems go into the returned [`IpStack`]
/// - `Err` is reserved for problems that make the whole discovery
///   meaningless (e.g. [`crate::Error::InterfaceNotFound`])
/// - No state is kept between calls
#[async_trait]
pub trait AddressSource: Send + Sync {
    /// Discover the current IPv4 and IPv6 addresses
    async fn discover(&self) -> Result<IpStack, crate::Error>;

    /// Which kind of address this source reports
    fn kind(&self) -> AddressKind;
}
