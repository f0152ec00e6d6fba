//! IPv6 socket addresses: a 128-bit address, a prefix length and an optional port

use ipnetwork::Ipv6Network;
use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use crate::error::{Result, SockAddrError};

/// Width of an IPv6 address in bits
pub const IPV6_BITS: u8 = 128;

/// Returns the netmask for a prefix length. `bits` must be `<= 128`.
pub(crate) fn mask_for(bits: u8) -> u128 {
    u128::MAX
        .checked_shl(u32::from(IPV6_BITS - bits))
        .unwrap_or(0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ipv6Sock {
    address: u128,
    mask_bits: u8,
    port: u16,
}

impl Ipv6Sock {
    /// Creates an address with the given prefix length, rejecting lengths over 128.
    pub fn new(ip: Ipv6Addr, mask_bits: u8) -> Result<Self> {
        let cidr = Ipv6Network::new(ip, mask_bits)
            .map_err(|e| SockAddrError::parse(&format!("{}/{}", ip, mask_bits), e.to_string()))?;

        Ok(Self {
            address: u128::from(cidr.ip()),
            mask_bits: cidr.prefix(),
            port: 0,
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn ip(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.address)
    }

    pub fn address(&self) -> u128 {
        self.address
    }

    pub fn mask_bits(&self) -> u8 {
        self.mask_bits
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn mask(&self) -> u128 {
        mask_for(self.mask_bits)
    }

    pub fn netmask(&self) -> Ipv6Addr {
        Ipv6Addr::from(self.mask())
    }

    pub fn network_address(&self) -> u128 {
        self.address & self.mask()
    }

    pub fn network(&self) -> Self {
        Self {
            address: self.network_address(),
            mask_bits: self.mask_bits,
            port: 0,
        }
    }

    /// Highest address in the prefix (IPv6 has no broadcast, this is its analogue)
    fn top_address(&self) -> u128 {
        self.network_address() | !self.mask()
    }

    pub fn first_usable(&self) -> Ipv6Addr {
        let network = self.network_address();
        if self.mask_bits < IPV6_BITS - 1 {
            Ipv6Addr::from(network + 1)
        } else {
            Ipv6Addr::from(network)
        }
    }

    pub fn last_usable(&self) -> Ipv6Addr {
        let top = self.top_address();
        if self.mask_bits < IPV6_BITS - 1 {
            Ipv6Addr::from(top - 1)
        } else {
            Ipv6Addr::from(top)
        }
    }

    /// Number of addresses covered by the prefix, `None` for `/0` (2^128 overflows u128).
    pub fn size(&self) -> Option<u128> {
        1u128.checked_shl(u32::from(IPV6_BITS - self.mask_bits))
    }

    /// Decimal rendering of [`size`](Self::size), including the `/0` case.
    pub fn size_string(&self) -> String {
        match self.size() {
            Some(size) => size.to_string(),
            None => "340282366920938463463374607431768211456".to_string(),
        }
    }

    pub fn contains(&self, other: &Ipv6Sock) -> bool {
        other.mask_bits >= self.mask_bits
            && other.address & self.mask() == self.network_address()
    }

    /// Adds `delta` to the address, wrapping modulo 2^128.
    pub fn offset_address(&self, delta: i128) -> Self {
        Self {
            address: self.address.wrapping_add(delta as u128),
            ..*self
        }
    }

    /// Moves to host `delta` within this network, wrapping inside the host bits.
    pub fn offset_network(&self, delta: i128) -> Self {
        let host_bits = (delta as u128) & !self.mask();
        Self {
            address: self.network_address() | host_bits,
            ..*self
        }
    }

    /// Parses IPv6 text: `addr`, `addr/len`, `[addr]` or `[addr]:port`.
    ///
    /// Same contract as the IPv4 parser: `Ok(None)` means "not IPv6".
    pub(crate) fn parse_text(s: &str) -> Result<Option<Self>> {
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| SockAddrError::parse(s, "missing closing ']'"))?;
            let ip = host
                .parse::<Ipv6Addr>()
                .map_err(|_| SockAddrError::parse(s, "invalid IPv6 address in brackets"))?;
            let port = match tail {
                "" => 0,
                _ => tail
                    .strip_prefix(':')
                    .and_then(|p| p.parse::<u16>().ok())
                    .ok_or_else(|| SockAddrError::parse(s, format!("invalid port {:?}", tail)))?,
            };
            return Ok(Some(Self::from(ip).with_port(port)));
        }

        if let Some((host, bits)) = s.split_once('/') {
            let Ok(ip) = host.parse::<Ipv6Addr>() else {
                return Ok(None);
            };
            let bits = bits
                .parse::<u8>()
                .map_err(|_| SockAddrError::parse(s, format!("invalid mask length {:?}", bits)))?;
            return Self::new(ip, bits).map(Some);
        }

        Ok(s.parse::<Ipv6Addr>().ok().map(Self::from))
    }
}

impl From<Ipv6Addr> for Ipv6Sock {
    fn from(ip: Ipv6Addr) -> Self {
        Self {
            address: u128::from(ip),
            mask_bits: IPV6_BITS,
            port: 0,
        }
    }
}

impl FromStr for Ipv6Sock {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_text(s)?.ok_or_else(|| SockAddrError::parse(s, "not an IPv6 address"))
    }
}

impl fmt::Display for Ipv6Sock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.port != 0 {
            write!(f, "[{}]:{}", self.ip(), self.port)
        } else if self.mask_bits == IPV6_BITS {
            write!(f, "{}", self.ip())
        } else {
            write!(f, "{}/{}", self.ip(), self.mask_bits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v6(s: &str) -> Ipv6Sock {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(v6("fe80::1/64").mask_bits(), 64);
        assert_eq!(v6("::1").mask_bits(), 128);
        assert_eq!(v6("0:0:0:0:0:0:0:1"), v6("::1"));

        let bracketed = v6("[2607:f0d0:1002:0051:0000:0000:0000:0004]:8600");
        assert_eq!(bracketed.port(), 8600);
        assert_eq!(bracketed.ip(), "2607:f0d0:1002:51::4".parse::<Ipv6Addr>().unwrap());
        assert_eq!(v6("[::1]").port(), 0);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!("fe80::/129".parse::<Ipv6Sock>().is_err());
        assert!("[::1".parse::<Ipv6Sock>().is_err());
        assert!("[::1]8080".parse::<Ipv6Sock>().is_err());
        assert!(Ipv6Sock::parse_text("10.0.0.1").unwrap().is_none());
    }

    #[test]
    fn test_display_canonical() {
        assert_eq!(v6("fe80:0000::0001/64").to_string(), "fe80::1/64");
        assert_eq!(v6("::1").to_string(), "::1");
        assert_eq!(v6("[::1]:53").to_string(), "[::1]:53");
    }

    #[test]
    fn test_derived_addresses() {
        let addr = v6("fe80::1/64");
        assert_eq!(Ipv6Addr::from(addr.network_address()), "fe80::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(addr.first_usable(), "fe80::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(
            addr.last_usable(),
            "fe80::ffff:ffff:ffff:fffe".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(addr.netmask(), "ffff:ffff:ffff:ffff::".parse::<Ipv6Addr>().unwrap());
        assert_eq!(addr.size_string(), "18446744073709551616");
        assert_eq!(v6("::/0").size_string(), "340282366920938463463374607431768211456");
        assert_eq!(v6("::1").size(), Some(1));
    }

    #[test]
    fn test_offset_address_wraps() {
        assert_eq!(v6("::1").offset_address(16_777_217).ip(), "::100:2".parse::<Ipv6Addr>().unwrap());
        assert_eq!(
            v6("::1").offset_address(-256).ip(),
            "ffff:ffff:ffff:ffff:ffff:ffff:ffff:ff01".parse::<Ipv6Addr>().unwrap()
        );
        assert_eq!(
            v6("fe80::1/64").offset_address(-4_278_190_082).ip(),
            "fe7f:ffff:ffff:ffff:ffff:ffff:ff:ffff".parse::<Ipv6Addr>().unwrap()
        );
    }

    #[test]
    fn test_offset_network_stays_in_prefix() {
        assert_eq!(v6("fe80::1/64").offset_network(2).ip(), "fe80::2".parse::<Ipv6Addr>().unwrap());
        assert_eq!(v6("::1").offset_network(2).ip(), "::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(
            v6("fe80::1/64").offset_network(-4_278_190_088).ip(),
            "fe80::ffff:ffff:ff:fff8".parse::<Ipv6Addr>().unwrap()
        );
    }
}
