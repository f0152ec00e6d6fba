//! RFC address-block registry and membership tests
//!
//! The table is built once on first use and never mutated afterwards, so it
//! is safe to read from any number of concurrent queries.

use std::collections::BTreeMap;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;

use crate::config::{FORWARDING_BLACKLIST_RFC, PRIVATE_RFC};
use crate::error::{Result, SockAddrError};
use crate::sockaddr::{AsSockAddr, Ipv4Sock, Ipv6Sock, SockAddr};

/// A registered block, kept as raw parts so the table can live in a `const`.
enum Block {
    V4(Ipv4Addr, u8),
    V6(Ipv6Addr, u8),
}

const fn v4(a: u8, b: u8, c: u8, d: u8, bits: u8) -> Block {
    Block::V4(Ipv4Addr::new(a, b, c, d), bits)
}

#[allow(clippy::too_many_arguments)]
const fn v6(a: u16, b: u16, c: u16, d: u16, e: u16, f: u16, g: u16, h: u16, bits: u8) -> Block {
    Block::V6(Ipv6Addr::new(a, b, c, d, e, f, g, h), bits)
}

const RFC_BLOCKS: &[(u32, &[Block])] = &[
    // Limited broadcast
    (919, &[v4(255, 255, 255, 255, 32)]),
    // Host extensions for IP multicasting
    (1112, &[v4(224, 0, 0, 0, 4)]),
    // Requirements for internet hosts
    (1122, &[v4(0, 0, 0, 0, 8), v4(127, 0, 0, 0, 8)]),
    // Private internets
    (1918, &[v4(10, 0, 0, 0, 8), v4(172, 16, 0, 0, 12), v4(192, 168, 0, 0, 16)]),
    // Benchmarking
    (2544, &[v4(198, 18, 0, 0, 15)]),
    // Stateless IP/ICMP translation
    (2765, &[v6(0, 0, 0, 0, 0, 0xffff, 0, 0, 96)]),
    // TEREDO and initial IPv6 assignments
    (2928, &[v6(0x2001, 0, 0, 0, 0, 0, 0, 0, 23)]),
    // IPv6 link-local and reserved
    (3056, &[v6(0x2001, 0, 0, 0, 0, 0, 0, 0, 16)]),
    // 6to4 relay anycast
    (3068, &[v4(192, 88, 99, 0, 24), v6(0x2002, 0, 0, 0, 0, 0, 0, 0, 16)]),
    // Multicast address assignments
    (3171, &[v4(224, 0, 0, 0, 4)]),
    // Special-use IPv4 addresses (superseded by 5735)
    (
        3330,
        &[
            v4(0, 0, 0, 0, 8),
            v4(10, 0, 0, 0, 8),
            v4(127, 0, 0, 0, 8),
            v4(169, 254, 0, 0, 16),
            v4(172, 16, 0, 0, 12),
            v4(192, 0, 2, 0, 24),
            v4(192, 88, 99, 0, 24),
            v4(192, 168, 0, 0, 16),
            v4(198, 18, 0, 0, 15),
            v4(224, 0, 0, 0, 4),
            v4(240, 0, 0, 0, 4),
        ],
    ),
    // IPv6 documentation prefix
    (3849, &[v6(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0, 32)]),
    // IPv4 link-local
    (3927, &[v4(169, 254, 0, 0, 16)]),
    // IPv4-mapped IPv6 addresses
    (4038, &[v6(0, 0, 0, 0, 0, 0xffff, 0, 0, 96)]),
    // Unique local IPv6 unicast
    (4193, &[v6(0xfc00, 0, 0, 0, 0, 0, 0, 0, 7)]),
    // IPv6 addressing architecture
    (
        4291,
        &[
            v6(0, 0, 0, 0, 0, 0, 0, 0, 128),
            v6(0, 0, 0, 0, 0, 0, 0, 1, 128),
            v6(0, 0, 0, 0, 0, 0xffff, 0, 0, 96),
            v6(0xfe80, 0, 0, 0, 0, 0, 0, 0, 10),
        ],
    ),
    // Teredo
    (4380, &[v6(0x2001, 0, 0, 0, 0, 0, 0, 0, 32)]),
    // IANA special purpose IPv6 registry
    (4773, &[v6(0x2001, 0, 0, 0, 0, 0, 0, 0, 23)]),
    // ORCHID
    (4843, &[v6(0x2001, 0x10, 0, 0, 0, 0, 0, 0, 28)]),
    // IPv6 benchmarking
    (5180, &[v6(0x2001, 0x2, 0, 0, 0, 0, 0, 0, 48)]),
    // Special-use IPv4 addresses
    (
        5735,
        &[
            v4(192, 0, 2, 0, 24),
            v4(198, 51, 100, 0, 24),
            v4(203, 0, 113, 0, 24),
        ],
    ),
    // IPv4 documentation ranges
    (5737, &[v4(198, 51, 100, 0, 24), v4(203, 0, 113, 0, 24)]),
    // IPv4/IPv6 translation well-known prefix
    (6052, &[v6(0x64, 0xff9b, 0, 0, 0, 0, 0, 0, 96)]),
    // DS-Lite
    (6333, &[v4(192, 0, 0, 0, 29)]),
    // Shared address space (carrier-grade NAT)
    (6598, &[v4(100, 64, 0, 0, 10)]),
    // Discard-only prefix
    (6666, &[v6(0x100, 0, 0, 0, 0, 0, 0, 0, 64)]),
    // Special-purpose address registries: everything not globally routable
    (
        6890,
        &[
            v4(0, 0, 0, 0, 8),
            v4(10, 0, 0, 0, 8),
            v4(100, 64, 0, 0, 10),
            v4(127, 0, 0, 0, 8),
            v4(169, 254, 0, 0, 16),
            v4(172, 16, 0, 0, 12),
            v4(192, 0, 0, 0, 24),
            v4(192, 0, 0, 0, 29),
            v4(192, 0, 2, 0, 24),
            v4(192, 88, 99, 0, 24),
            v4(192, 168, 0, 0, 16),
            v4(198, 18, 0, 0, 15),
            v4(198, 51, 100, 0, 24),
            v4(203, 0, 113, 0, 24),
            v4(240, 0, 0, 0, 4),
            v4(255, 255, 255, 255, 32),
            v6(0, 0, 0, 0, 0, 0, 0, 1, 128),
            v6(0, 0, 0, 0, 0, 0, 0, 0, 128),
            v6(0x64, 0xff9b, 0, 0, 0, 0, 0, 0, 96),
            v6(0, 0, 0, 0, 0, 0xffff, 0, 0, 96),
            v6(0x100, 0, 0, 0, 0, 0, 0, 0, 64),
            v6(0x2001, 0, 0, 0, 0, 0, 0, 0, 23),
            v6(0x2001, 0, 0, 0, 0, 0, 0, 0, 32),
            v6(0x2001, 0x2, 0, 0, 0, 0, 0, 0, 48),
            v6(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0, 32),
            v6(0x2001, 0x10, 0, 0, 0, 0, 0, 0, 28),
            v6(0x2002, 0, 0, 0, 0, 0, 0, 0, 16),
            v6(0xfc00, 0, 0, 0, 0, 0, 0, 0, 7),
            v6(0xfe80, 0, 0, 0, 0, 0, 0, 0, 10),
        ],
    ),
    // IPv4 service continuity prefix
    (7335, &[v4(192, 0, 0, 0, 29)]),
    // Pseudo-RFC: blocks that are never forwarded, taken from 6890
    (
        FORWARDING_BLACKLIST_RFC,
        &[
            v4(0, 0, 0, 0, 8),
            v4(127, 0, 0, 0, 8),
            v4(169, 254, 0, 0, 16),
            v4(192, 0, 0, 0, 24),
            v4(192, 0, 2, 0, 24),
            v4(198, 51, 100, 0, 24),
            v4(203, 0, 113, 0, 24),
            v4(240, 0, 0, 0, 4),
            v4(255, 255, 255, 255, 32),
            v6(0, 0, 0, 0, 0, 0, 0, 1, 128),
            v6(0, 0, 0, 0, 0, 0, 0, 0, 128),
            v6(0, 0, 0, 0, 0, 0xffff, 0, 0, 96),
            v6(0x2001, 0xdb8, 0, 0, 0, 0, 0, 0, 32),
            v6(0x2001, 0x10, 0, 0, 0, 0, 0, 0, 28),
            v6(0xfe80, 0, 0, 0, 0, 0, 0, 0, 10),
        ],
    ),
];

/// Unique-local IPv6 space, the IPv6 counterpart of RFC 1918
const IPV6_PRIVATE_RFC: u32 = 4193;

static RFC_TABLE: OnceLock<BTreeMap<u32, Vec<SockAddr>>> = OnceLock::new();

fn to_sock_addr(block: &Block) -> Result<SockAddr> {
    match *block {
        Block::V4(ip, bits) => Ipv4Sock::new(ip, bits).map(SockAddr::Ipv4),
        Block::V6(ip, bits) => Ipv6Sock::new(ip, bits).map(SockAddr::Ipv6),
    }
}

fn rfc_table() -> &'static BTreeMap<u32, Vec<SockAddr>> {
    RFC_TABLE.get_or_init(|| {
        RFC_BLOCKS
            .iter()
            .map(|(rfc, blocks)| {
                let parsed = blocks
                    .iter()
                    .filter_map(|block| match to_sock_addr(block) {
                        Ok(addr) => Some(addr),
                        Err(e) => {
                            tracing::error!("Dropping invalid block for RFC {}: {}", rfc, e);
                            None
                        }
                    })
                    .collect();
                (*rfc, parsed)
            })
            .collect()
    })
}

/// Registered RFC numbers in ascending order, the forwarding blacklist included.
pub fn known_rfcs() -> Vec<u32> {
    rfc_table().keys().copied().collect()
}

/// Blocks registered under `rfc`.
pub fn rfc_blocks(rfc: u32) -> Result<&'static [SockAddr]> {
    rfc_table()
        .get(&rfc)
        .map(Vec::as_slice)
        .ok_or_else(|| SockAddrError::UnknownRfc(rfc.to_string()))
}

/// Parses a decimal RFC number. Anything that is not a registered number is
/// an [`SockAddrError::UnknownRfc`].
pub fn parse_rfc(text: &str) -> Result<u32> {
    let rfc = text
        .trim()
        .parse::<u32>()
        .map_err(|_| SockAddrError::UnknownRfc(text.to_string()))?;
    rfc_blocks(rfc)?;
    Ok(rfc)
}

/// True if any block registered under `rfc` contains `addr`.
pub fn matches_rfc<A: AsSockAddr + ?Sized>(addr: &A, rfc: u32) -> Result<bool> {
    let addr = addr.sock_addr();
    Ok(rfc_blocks(rfc)?.iter().any(|block| block.contains(addr)))
}

fn in_table<A: AsSockAddr + ?Sized>(addr: &A, rfc: u32) -> bool {
    let addr = addr.sock_addr();
    rfc_table()
        .get(&rfc)
        .is_some_and(|blocks| blocks.iter().any(|block| block.contains(addr)))
}

/// True unless the address falls in the forwarding blacklist.
///
/// Only IP addresses can be forwarded; UNIX sockets never are.
pub fn is_forwardable<A: AsSockAddr + ?Sized>(addr: &A) -> bool {
    addr.sock_addr().is_ip() && !in_table(addr, FORWARDING_BLACKLIST_RFC)
}

/// RFC 1918 for IPv4, unique-local (RFC 4193) for IPv6.
pub fn is_private<A: AsSockAddr + ?Sized>(addr: &A) -> bool {
    in_table(addr, 1918) || in_table(addr, IPV6_PRIVATE_RFC)
}

/// Membership in the special-purpose registry used to split private from public.
pub fn is_special_purpose<A: AsSockAddr + ?Sized>(addr: &A) -> bool {
    in_table(addr, PRIVATE_RFC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sa(s: &str) -> SockAddr {
        SockAddr::parse(s).unwrap()
    }

    #[test]
    fn test_every_block_is_valid() {
        for (rfc, blocks) in RFC_BLOCKS {
            for block in blocks.iter() {
                assert!(to_sock_addr(block).is_ok(), "invalid block under RFC {rfc}");
            }
            assert_eq!(rfc_blocks(*rfc).unwrap().len(), blocks.len());
        }
    }

    #[test]
    fn test_rfc1918_membership() {
        assert!(matches_rfc(&sa("192.168.0.102/24"), 1918).unwrap());
        assert!(matches_rfc(&sa("172.16.1.3/12"), 1918).unwrap());
        assert!(!matches_rfc(&sa("172.32.0.1"), 1918).unwrap());
        assert!(!matches_rfc(&sa("8.8.8.8"), 1918).unwrap());
        // A broader network than the block itself is not a member
        assert!(!matches_rfc(&sa("10.0.0.0/7"), 1918).unwrap());
    }

    #[test]
    fn test_rfc6890_covers_both_families() {
        assert!(matches_rfc(&sa("127.0.0.1/8"), 6890).unwrap());
        assert!(matches_rfc(&sa("240.0.0.1/4"), 6890).unwrap());
        assert!(matches_rfc(&sa("::1"), 6890).unwrap());
        assert!(matches_rfc(&sa("fe80::1/64"), 6890).unwrap());
        assert!(!matches_rfc(&sa("128.95.120.1"), 6890).unwrap());
        assert!(!matches_rfc(&sa("2607:f0d0:1002:51::4"), 6890).unwrap());
    }

    #[test]
    fn test_unknown_rfc_is_an_error() {
        assert!(matches!(matches_rfc(&sa("10.0.0.1"), 1), Err(SockAddrError::UnknownRfc(_))));
        assert!(matches!(parse_rfc("99999999999"), Err(SockAddrError::UnknownRfc(_))));
        assert!(matches!(parse_rfc("abc"), Err(SockAddrError::UnknownRfc(_))));
        assert_eq!(parse_rfc("6598").unwrap(), 6598);
    }

    #[test]
    fn test_forwardable() {
        assert!(is_forwardable(&sa("172.16.0.0/12")));
        assert!(is_forwardable(&sa("8.8.8.8")));
        assert!(!is_forwardable(&sa("127.0.0.0/8")));
        assert!(!is_forwardable(&sa("169.254.0.0/16")));
        assert!(!is_forwardable(&sa("fe80::/10")));
        assert!(!is_forwardable(&sa("::1")));
        assert!(!is_forwardable(&sa("/tmp/sock")));
    }

    #[test]
    fn test_private_includes_unique_local_ipv6() {
        assert!(is_private(&sa("10.1.2.3")));
        assert!(is_private(&sa("fd00::1/64")));
        assert!(!is_private(&sa("100.64.0.1")));
        assert!(!is_private(&sa("fe80::1")));
    }

    #[test]
    fn test_known_rfcs_sorted_and_complete() {
        let rfcs = known_rfcs();
        assert!(rfcs.windows(2).all(|w| w[0] < w[1]));
        for rfc in [1918, 4291, 6598, 6890, FORWARDING_BLACKLIST_RFC] {
            assert!(rfcs.contains(&rfc));
        }
    }
}
