//! Socket address values - IPv4, IPv6 and UNIX socket paths as one closed type

mod ipv4;
mod ipv6;
mod unix;

pub use ipv4::{Ipv4Sock, IPV4_BITS};
pub use ipv6::{Ipv6Sock, IPV6_BITS};
pub use unix::UnixSock;

use serde::Serialize;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Result, SockAddrError};

/// Address family of a [`SockAddr`]. The declaration order is the sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SockAddrType {
    Ipv4,
    Ipv6,
    Unix,
}

impl fmt::Display for SockAddrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SockAddrType::Ipv4 => "IPv4",
            SockAddrType::Ipv6 => "IPv6",
            SockAddrType::Unix => "UNIX",
        })
    }
}

/// A set of address families, parsed from text such as `"IPv4|IPv6"` or `"IP"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TypeSet {
    ipv4: bool,
    ipv6: bool,
    unix: bool,
}

impl TypeSet {
    pub const IPV4: TypeSet = TypeSet { ipv4: true, ipv6: false, unix: false };
    pub const IPV6: TypeSet = TypeSet { ipv4: false, ipv6: true, unix: false };
    pub const IP: TypeSet = TypeSet { ipv4: true, ipv6: true, unix: false };
    pub const UNIX: TypeSet = TypeSet { ipv4: false, ipv6: false, unix: true };

    pub fn union(self, other: TypeSet) -> TypeSet {
        TypeSet {
            ipv4: self.ipv4 || other.ipv4,
            ipv6: self.ipv6 || other.ipv6,
            unix: self.unix || other.unix,
        }
    }

    pub fn contains(&self, addr_type: SockAddrType) -> bool {
        match addr_type {
            SockAddrType::Ipv4 => self.ipv4,
            SockAddrType::Ipv6 => self.ipv6,
            SockAddrType::Unix => self.unix,
        }
    }
}

impl FromStr for TypeSet {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        s.split('|').try_fold(TypeSet::default(), |set, name| {
            let one = match name.trim().to_ascii_lowercase().as_str() {
                "ip" => TypeSet::IP,
                "ipv4" => TypeSet::IPV4,
                "ipv6" => TypeSet::IPV6,
                "unix" => TypeSet::UNIX,
                _ => return Err(SockAddrError::UnknownType(name.to_string())),
            };
            Ok(set.union(one))
        })
    }
}

/// One socket address. Operations that make no sense across families
/// (containment, per-key comparison) treat a family mismatch as "no match".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SockAddr {
    Ipv4(Ipv4Sock),
    Ipv6(Ipv6Sock),
    Unix(UnixSock),
}

impl SockAddr {
    /// Parses a bare IP, `ip/len`, `ip:port`, `[ipv6]:port` or a socket path.
    ///
    /// Text whose host part is an IP address is never reinterpreted as a path,
    /// so `10.0.0.0/33` is an error rather than a UNIX socket.
    pub fn parse(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(SockAddrError::parse(s, "empty input"));
        }
        if let Some(addr) = Ipv4Sock::parse_text(s)? {
            return Ok(SockAddr::Ipv4(addr));
        }
        if let Some(addr) = Ipv6Sock::parse_text(s)? {
            return Ok(SockAddr::Ipv6(addr));
        }
        if UnixSock::looks_like_path(s) {
            return UnixSock::new(s).map(SockAddr::Unix);
        }
        Err(SockAddrError::parse(
            s,
            "not an IP address, CIDR block, ip:port pair or socket path",
        ))
    }

    pub fn addr_type(&self) -> SockAddrType {
        match self {
            SockAddr::Ipv4(_) => SockAddrType::Ipv4,
            SockAddr::Ipv6(_) => SockAddrType::Ipv6,
            SockAddr::Unix(_) => SockAddrType::Unix,
        }
    }

    pub fn is_ip(&self) -> bool {
        !matches!(self, SockAddr::Unix(_))
    }

    pub fn ip(&self) -> Option<IpAddr> {
        match self {
            SockAddr::Ipv4(v4) => Some(IpAddr::V4(v4.ip())),
            SockAddr::Ipv6(v6) => Some(IpAddr::V6(v6.ip())),
            SockAddr::Unix(_) => None,
        }
    }

    pub fn mask_bits(&self) -> Option<u8> {
        match self {
            SockAddr::Ipv4(v4) => Some(v4.mask_bits()),
            SockAddr::Ipv6(v6) => Some(v6.mask_bits()),
            SockAddr::Unix(_) => None,
        }
    }

    /// Transport port, `0` when unset. UNIX sockets have none.
    pub fn port(&self) -> Option<u16> {
        match self {
            SockAddr::Ipv4(v4) => Some(v4.port()),
            SockAddr::Ipv6(v6) => Some(v6.port()),
            SockAddr::Unix(_) => None,
        }
    }

    /// True if `other` is inside this network. Always false across families;
    /// a UNIX socket contains only an identical path.
    pub fn contains(&self, other: &SockAddr) -> bool {
        match (self, other) {
            (SockAddr::Ipv4(net), SockAddr::Ipv4(candidate)) => net.contains(candidate),
            (SockAddr::Ipv6(net), SockAddr::Ipv6(candidate)) => net.contains(candidate),
            (SockAddr::Unix(a), SockAddr::Unix(b)) => a == b,
            _ => false,
        }
    }

    /// Adds a signed delta to the raw address, wrapping at the family's width.
    /// UNIX sockets are returned unchanged.
    pub fn offset_address(&self, delta: i128) -> SockAddr {
        match self {
            SockAddr::Ipv4(v4) => SockAddr::Ipv4(v4.offset_address(delta)),
            SockAddr::Ipv6(v6) => SockAddr::Ipv6(v6.offset_address(delta)),
            SockAddr::Unix(_) => self.clone(),
        }
    }

    /// Replaces the host part with `delta` reduced into the host bits, keeping
    /// the network prefix. UNIX sockets are returned unchanged.
    pub fn offset_network(&self, delta: i128) -> SockAddr {
        match self {
            SockAddr::Ipv4(v4) => SockAddr::Ipv4(v4.offset_network(delta)),
            SockAddr::Ipv6(v6) => SockAddr::Ipv6(v6.offset_network(delta)),
            SockAddr::Unix(_) => self.clone(),
        }
    }
}

impl FromStr for SockAddr {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        SockAddr::parse(s)
    }
}

impl fmt::Display for SockAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SockAddr::Ipv4(v4) => fmt::Display::fmt(v4, f),
            SockAddr::Ipv6(v6) => fmt::Display::fmt(v6, f),
            SockAddr::Unix(path) => fmt::Display::fmt(path, f),
        }
    }
}

impl From<IpAddr> for SockAddr {
    fn from(ip: IpAddr) -> Self {
        match ip {
            IpAddr::V4(v4) => SockAddr::Ipv4(Ipv4Sock::from(v4)),
            IpAddr::V6(v6) => SockAddr::Ipv6(Ipv6Sock::from(v6)),
        }
    }
}

/// Anything that carries a socket address; lets comparators and classifiers
/// work on bare addresses and interface-bound ones alike.
pub trait AsSockAddr {
    fn sock_addr(&self) -> &SockAddr;
}

impl AsSockAddr for SockAddr {
    fn sock_addr(&self) -> &SockAddr {
        self
    }
}

#[cfg(test)]
#[path = "sockaddr_tests.rs"]
mod sockaddr_tests;
