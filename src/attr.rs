//! Named attribute extraction for addresses and interface addresses

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Result, SockAddrError};
use crate::models::IfAddr;
use crate::sockaddr::{Ipv4Sock, Ipv6Sock, SockAddr, SockAddrType};

/// A recognised attribute name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AttrName {
    Type,
    String,
    Name,
    Size,
    Flags,
    Host,
    Address,
    Port,
    Netmask,
    Network,
    MaskBits,
    Binary,
    Hex,
    FirstUsable,
    LastUsable,
    Octets,
    Broadcast,
    Uint32,
    Uint128,
    Path,
}

impl AttrName {
    pub const ALL: [AttrName; 20] = [
        AttrName::Type,
        AttrName::String,
        AttrName::Name,
        AttrName::Size,
        AttrName::Flags,
        AttrName::Host,
        AttrName::Address,
        AttrName::Port,
        AttrName::Netmask,
        AttrName::Network,
        AttrName::MaskBits,
        AttrName::Binary,
        AttrName::Hex,
        AttrName::FirstUsable,
        AttrName::LastUsable,
        AttrName::Octets,
        AttrName::Broadcast,
        AttrName::Uint32,
        AttrName::Uint128,
        AttrName::Path,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AttrName::Type => "type",
            AttrName::String => "string",
            AttrName::Name => "name",
            AttrName::Size => "size",
            AttrName::Flags => "flags",
            AttrName::Host => "host",
            AttrName::Address => "address",
            AttrName::Port => "port",
            AttrName::Netmask => "netmask",
            AttrName::Network => "network",
            AttrName::MaskBits => "mask_bits",
            AttrName::Binary => "binary",
            AttrName::Hex => "hex",
            AttrName::FirstUsable => "first_usable",
            AttrName::LastUsable => "last_usable",
            AttrName::Octets => "octets",
            AttrName::Broadcast => "broadcast",
            AttrName::Uint32 => "uint32",
            AttrName::Uint128 => "uint128",
            AttrName::Path => "path",
        }
    }

    /// Whether an interface-bound address of `addr_type` has this attribute.
    pub fn applies_to(&self, addr_type: SockAddrType) -> bool {
        match self {
            AttrName::Type | AttrName::String => true,
            AttrName::Broadcast | AttrName::Uint32 => addr_type == SockAddrType::Ipv4,
            AttrName::Uint128 => addr_type == SockAddrType::Ipv6,
            AttrName::Path => addr_type == SockAddrType::Unix,
            _ => addr_type != SockAddrType::Unix,
        }
    }
}

impl fmt::Display for AttrName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttrName {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        AttrName::ALL
            .into_iter()
            .find(|attr| attr.as_str() == wanted)
            .ok_or_else(|| SockAddrError::UnknownAttr(s.to_string()))
    }
}

fn not_applicable(attr: AttrName, addr: &SockAddr) -> SockAddrError {
    SockAddrError::AttrNotApplicable {
        attr: attr.to_string(),
        addr_type: addr.addr_type(),
    }
}

fn join_octets(octets: &[u8]) -> String {
    octets
        .iter()
        .map(u8::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn ipv4_attr(v4: &Ipv4Sock, attr: AttrName) -> Option<String> {
    let value = match attr {
        AttrName::Size => v4.size().to_string(),
        AttrName::Host | AttrName::Address => v4.ip().to_string(),
        AttrName::Port => v4.port().to_string(),
        AttrName::Netmask => v4.netmask().to_string(),
        AttrName::Network => Ipv4Addr::from(v4.network_address()).to_string(),
        AttrName::MaskBits => v4.mask_bits().to_string(),
        AttrName::Binary => format!("{:032b}", v4.address()),
        AttrName::Hex => format!("{:08x}", v4.address()),
        AttrName::FirstUsable => v4.first_usable().to_string(),
        AttrName::LastUsable => v4.last_usable().to_string(),
        AttrName::Octets => join_octets(&v4.ip().octets()),
        AttrName::Broadcast => Ipv4Addr::from(v4.broadcast_address()).to_string(),
        AttrName::Uint32 => v4.address().to_string(),
        _ => return None,
    };
    Some(value)
}

fn ipv6_attr(v6: &Ipv6Sock, attr: AttrName) -> Option<String> {
    let value = match attr {
        AttrName::Size => v6.size_string(),
        AttrName::Host | AttrName::Address => v6.ip().to_string(),
        AttrName::Port => v6.port().to_string(),
        AttrName::Netmask => v6.netmask().to_string(),
        AttrName::Network => v6.network().ip().to_string(),
        AttrName::MaskBits => v6.mask_bits().to_string(),
        AttrName::Binary => format!("{:0128b}", v6.address()),
        AttrName::Hex => format!("{:032x}", v6.address()),
        AttrName::FirstUsable => v6.first_usable().to_string(),
        AttrName::LastUsable => v6.last_usable().to_string(),
        AttrName::Octets => join_octets(&v6.ip().octets()),
        AttrName::Uint128 => v6.address().to_string(),
        _ => return None,
    };
    Some(value)
}

/// Renders `attr` of a bare address.
///
/// `name` and `flags` belong to an interface, so a bare address never has them.
pub fn sock_addr_attr(addr: &SockAddr, attr: AttrName) -> Result<String> {
    let value = match (attr, addr) {
        (AttrName::Type, _) => Some(addr.addr_type().to_string()),
        (AttrName::String, _) => Some(addr.to_string()),
        (AttrName::Name | AttrName::Flags, _) => None,
        (_, SockAddr::Ipv4(v4)) => ipv4_attr(v4, attr),
        (_, SockAddr::Ipv6(v6)) => ipv6_attr(v6, attr),
        (AttrName::Path, SockAddr::Unix(unix)) => Some(unix.path().to_string()),
        (_, SockAddr::Unix(_)) => None,
    };
    value.ok_or_else(|| not_applicable(attr, addr))
}

/// Renders `attr` of an interface address; `name` and `flags` come from the interface.
pub fn if_addr_attr(ifaddr: &IfAddr, attr: AttrName) -> Result<String> {
    match attr {
        AttrName::Name | AttrName::Flags if !ifaddr.addr.is_ip() => {
            Err(not_applicable(attr, &ifaddr.addr))
        }
        AttrName::Name => Ok(ifaddr.name().to_string()),
        AttrName::Flags => Ok(ifaddr.flags().to_string()),
        _ => sock_addr_attr(&ifaddr.addr, attr),
    }
}

/// Parses the attribute name, then renders it for a bare address.
pub fn attr(addr: &SockAddr, name: &str) -> Result<String> {
    sock_addr_attr(addr, name.parse()?)
}

/// Every attribute of one address, as printed by `dump`.
#[derive(Debug, Clone, Serialize)]
pub struct AddrReport {
    pub input: String,
    #[serde(rename = "type")]
    pub addr_type: String,
    pub attributes: BTreeMap<&'static str, String>,
}

impl AddrReport {
    pub fn new(input: &str, addr: &SockAddr) -> Self {
        let attributes = AttrName::ALL
            .iter()
            .filter_map(|attr| {
                sock_addr_attr(addr, *attr)
                    .ok()
                    .map(|value| (attr.as_str(), value))
            })
            .collect();

        Self {
            input: input.to_string(),
            addr_type: addr.addr_type().to_string(),
            attributes,
        }
    }
}

impl fmt::Display for AddrReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Attribute     Value")?;
        for attr in AttrName::ALL {
            if let Some(value) = self.attributes.get(attr.as_str()) {
                writeln!(f, "{:<13} {}", attr.as_str(), value)?;
            }
        }
        Ok(())
    }
}
