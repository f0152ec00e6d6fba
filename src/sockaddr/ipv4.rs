//! IPv4 socket addresses: a 32-bit address, a prefix length and an optional port

use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Result, SockAddrError};

/// Width of an IPv4 address in bits
pub const IPV4_BITS: u8 = 32;

/// Returns the netmask for a prefix length. `bits` must be `<= 32`.
pub(crate) fn mask_for(bits: u8) -> u32 {
    u32::MAX
        .checked_shl(u32::from(IPV4_BITS - bits))
        .unwrap_or(0)
}

/// An IPv4 address with its prefix length and optional transport port.
///
/// The address is kept as entered; the network address is derived on demand.
/// A port of `0` means "unset".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv4Sock {
    address: u32,
    mask_bits: u8,
    port: u16,
}

impl Ipv4Sock {
    /// Creates an address with the given prefix length, rejecting lengths over 32.
    pub fn new(ip: Ipv4Addr, mask_bits: u8) -> Result<Self> {
        let cidr = Ipv4Network::new(ip, mask_bits)
            .map_err(|e| SockAddrError::parse(&format!("{}/{}", ip, mask_bits), e.to_string()))?;

        Ok(Self {
            address: u32::from(cidr.ip()),
            mask_bits: cidr.prefix(),
            port: 0,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.address)
    }

    pub fn address(&self) -> u32 {
        self.address
    }

    pub fn mask_bits(&self) -> u8 {
        self.mask_bits
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn mask(&self) -> u32 {
        mask_for(self.mask_bits)
    }

    pub fn netmask(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.mask())
    }

    pub fn network_address(&self) -> u32 {
        self.address & self.mask()
    }

    /// The network this address belongs to, with the same prefix length and no port
    pub fn network(&self) -> Self {
        Self {
            address: self.network_address(),
            mask_bits: self.mask_bits,
            port: 0,
        }
    }

    pub fn broadcast_address(&self) -> u32 {
        self.network_address() | !self.mask()
    }

    /// First usable host. /31 and /32 have no reserved network address.
    pub fn first_usable(&self) -> Ipv4Addr {
        let network = self.network_address();
        if self.mask_bits < IPV4_BITS - 1 {
            Ipv4Addr::from(network + 1)
        } else {
            Ipv4Addr::from(network)
        }
    }

    /// Last usable host. /31 and /32 have no reserved broadcast address.
    pub fn last_usable(&self) -> Ipv4Addr {
        let broadcast = self.broadcast_address();
        if self.mask_bits < IPV4_BITS - 1 {
            Ipv4Addr::from(broadcast - 1)
        } else {
            Ipv4Addr::from(broadcast)
        }
    }

    /// Number of addresses covered by the prefix
    pub fn size(&self) -> u64 {
        1u64 << (IPV4_BITS - self.mask_bits)
    }

    /// True if `other` lies within this network and is at least as specific.
    pub fn contains(&self, other: &Ipv4Sock) -> bool {
        other.mask_bits >= self.mask_bits
            && other.address & self.mask() == self.network_address()
    }

    /// Adds `delta` to the address, wrapping modulo 2^32.
    pub fn offset_address(&self, delta: i128) -> Self {
        Self {
            address: self.address.wrapping_add(delta as u32),
            ..*self
        }
    }

    /// Moves to host `delta` within this network, wrapping inside the host bits.
    pub fn offset_network(&self, delta: i128) -> Self {
        let host_bits = (delta as u32) & !self.mask();
        Self {
            address: self.network_address() | host_bits,
            ..*self
        }
    }

    /// Parses IPv4 text: `a.b.c.d`, `a.b.c.d/len` or `a.b.c.d:port`.
    ///
    /// Returns `Ok(None)` when the host part is not IPv4 at all, and an error
    /// when it is IPv4 but the mask or port is malformed.
    pub(crate) fn parse_text(s: &str) -> Result<Option<Self>> {
        if let Some((host, port)) = s.split_once(':') {
            let Ok(ip) = host.parse::<Ipv4Addr>() else {
                return Ok(None);
            };
            let port = port
                .parse::<u16>()
                .map_err(|_| SockAddrError::parse(s, format!("invalid port {:?}", port)))?;
            return Ok(Some(Self::from(ip).with_port(port)));
        }

        if let Some((host, bits)) = s.split_once('/') {
            let Ok(ip) = host.parse::<Ipv4Addr>() else {
                return Ok(None);
            };
            let bits = bits
                .parse::<u8>()
                .map_err(|_| SockAddrError::parse(s, format!("invalid mask length {:?}", bits)))?;
            return Self::new(ip, bits).map(Some);
        }

        Ok(s.parse::<Ipv4Addr>().ok().map(Self::from))
    }
}

impl From<Ipv4Addr> for Ipv4Sock {
    fn from(ip: Ipv4Addr) -> Self {
        Self {
            address: u32::from(ip),
            mask_bits: IPV4_BITS,
            port: 0,
        }
    }
}

impl FromStr for Ipv4Sock {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_text(s)?.ok_or_else(|| SockAddrError::parse(s, "not an IPv4 address"))
    }
}

impl fmt::Display for Ipv4Sock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port != 0 {
            write!(f, "{}:{}", self.ip(), self.port)
        } else if self.mask_bits == IPV4_BITS {
            write!(f, "{}", self.ip())
        } else {
            write!(f, "{}/{}", self.ip(), self.mask_bits)
        }
    }
}
