//! Filter stages: partition a sequence by interface name, flags, RFC, type or network
//!
//! Each `if_by_*` helper returns `(matched, unmatched)`; the `include_*` and
//! `exclude_*` wrappers pick one half. Inputs are never mutated.

use regex::Regex;
use std::net::IpAddr;
use std::str::FromStr;

use crate::error::{Result, SockAddrError};
use crate::models::{IfAddr, IfFlags};
use crate::rfc;
use crate::sockaddr::{SockAddr, TypeSet};

/// Matched and unmatched halves of a filter stage
pub type Partition = (Vec<IfAddr>, Vec<IfAddr>);

fn partition<F>(seq: &[IfAddr], pred: F) -> Partition
where
    F: Fn(&IfAddr) -> bool,
{
    seq.iter().cloned().partition(|ifaddr| pred(ifaddr))
}

/// A named predicate usable with the `flag` selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagFilter {
    Broadcast,
    Down,
    Forwardable,
    GlobalUnicast,
    InterfaceLocalMulticast,
    LinkLocalMulticast,
    LinkLocalUnicast,
    Loopback,
    Multicast,
    PointToPoint,
    Unspecified,
    Up,
}

impl FromStr for FlagFilter {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "broadcast" => Ok(FlagFilter::Broadcast),
            "down" => Ok(FlagFilter::Down),
            "forwardable" => Ok(FlagFilter::Forwardable),
            "global unicast" => Ok(FlagFilter::GlobalUnicast),
            "interface-local multicast" => Ok(FlagFilter::InterfaceLocalMulticast),
            "link-local multicast" => Ok(FlagFilter::LinkLocalMulticast),
            "link-local unicast" => Ok(FlagFilter::LinkLocalUnicast),
            "loopback" => Ok(FlagFilter::Loopback),
            "multicast" => Ok(FlagFilter::Multicast),
            "point-to-point" => Ok(FlagFilter::PointToPoint),
            "unspecified" => Ok(FlagFilter::Unspecified),
            "up" => Ok(FlagFilter::Up),
            _ => Err(SockAddrError::UnknownFlag(s.to_string())),
        }
    }
}

fn is_link_local_unicast(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4.is_link_local(),
        IpAddr::V6(v6) => v6.segments()[0] & 0xffc0 == 0xfe80,
    }
}

fn multicast_scope(ip: IpAddr) -> Option<u8> {
    match ip {
        IpAddr::V6(v6) if v6.is_multicast() => Some(v6.octets()[1] & 0x0f),
        _ => None,
    }
}

fn is_global_unicast(ip: IpAddr) -> bool {
    let excluded = match ip {
        IpAddr::V4(v4) => v4.is_broadcast() || v4.is_link_local(),
        IpAddr::V6(_) => is_link_local_unicast(ip),
    };
    !(excluded || ip.is_unspecified() || ip.is_loopback() || ip.is_multicast())
}

impl FlagFilter {
    /// Interface flags are read from the interface; address predicates from
    /// the address itself. UNIX sockets match none of the address predicates.
    pub fn matches(&self, ifaddr: &IfAddr) -> bool {
        let flags = ifaddr.flags();
        let ip = ifaddr.addr.ip();
        match self {
            FlagFilter::Broadcast => flags.contains(IfFlags::BROADCAST),
            FlagFilter::Down => !flags.contains(IfFlags::UP),
            FlagFilter::Loopback => flags.contains(IfFlags::LOOPBACK),
            FlagFilter::Multicast => flags.contains(IfFlags::MULTICAST),
            FlagFilter::PointToPoint => flags.contains(IfFlags::POINT_TO_POINT),
            FlagFilter::Up => flags.contains(IfFlags::UP),
            FlagFilter::Forwardable => rfc::is_forwardable(ifaddr),
            FlagFilter::GlobalUnicast => ip.is_some_and(is_global_unicast),
            FlagFilter::InterfaceLocalMulticast => ip.and_then(multicast_scope) == Some(0x1),
            FlagFilter::LinkLocalMulticast => match ip {
                Some(IpAddr::V4(v4)) => matches!(v4.octets(), [224, 0, 0, _]),
                Some(v6) => multicast_scope(v6) == Some(0x2),
                None => false,
            },
            FlagFilter::LinkLocalUnicast => ip.is_some_and(is_link_local_unicast),
            FlagFilter::Unspecified => ip.is_some_and(|ip| ip.is_unspecified()),
        }
    }
}

/// Parses a `|`-separated flag list; every listed flag must match.
pub fn parse_flags(list: &str) -> Result<Vec<FlagFilter>> {
    list.split('|').map(str::parse).collect()
}

/// Entries whose address family is in `types`
pub fn filter_by_type(seq: &[IfAddr], types: TypeSet) -> Vec<IfAddr> {
    if_by_type(seq, types).0
}

pub fn if_by_type(seq: &[IfAddr], types: TypeSet) -> Partition {
    partition(seq, |ifaddr| types.contains(ifaddr.addr.addr_type()))
}

/// Partition by a regular expression matched against the interface name.
pub fn if_by_name(seq: &[IfAddr], pattern: &str) -> Result<Partition> {
    let re = Regex::new(pattern).map_err(|source| SockAddrError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;
    Ok(partition(seq, |ifaddr| re.is_match(ifaddr.name())))
}

/// Partition by a `|`-separated flag list.
pub fn if_by_flag(seq: &[IfAddr], flags: &str) -> Result<Partition> {
    let filters = parse_flags(flags)?;
    Ok(partition(seq, |ifaddr| {
        filters.iter().all(|filter| filter.matches(ifaddr))
    }))
}

/// Partition by membership in one RFC.
pub fn if_by_rfc(seq: &[IfAddr], rfc: u32) -> Result<Partition> {
    if_by_rfcs(seq, &[rfc])
}

/// Partition by membership in any of `rfcs`.
pub fn if_by_rfcs(seq: &[IfAddr], rfcs: &[u32]) -> Result<Partition> {
    let blocks = rfcs
        .iter()
        .map(|rfc| rfc::rfc_blocks(*rfc))
        .collect::<Result<Vec<_>>>()?;
    Ok(partition(seq, |ifaddr| {
        blocks
            .iter()
            .flat_map(|set| set.iter())
            .any(|block| block.contains(&ifaddr.addr))
    }))
}

/// Partition by containment in `network`.
pub fn if_by_network(seq: &[IfAddr], network: &SockAddr) -> Partition {
    partition(seq, |ifaddr| network.contains(&ifaddr.addr))
}

pub fn include_by_type(seq: &[IfAddr], types: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_type(seq, types.parse()?).0)
}

pub fn exclude_by_type(seq: &[IfAddr], types: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_type(seq, types.parse()?).1)
}

pub fn include_by_name(seq: &[IfAddr], pattern: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_name(seq, pattern)?.0)
}

pub fn exclude_by_name(seq: &[IfAddr], pattern: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_name(seq, pattern)?.1)
}

pub fn include_by_flag(seq: &[IfAddr], flags: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_flag(seq, flags)?.0)
}

pub fn exclude_by_flag(seq: &[IfAddr], flags: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_flag(seq, flags)?.1)
}

pub fn include_by_rfc(seq: &[IfAddr], rfc: u32) -> Result<Vec<IfAddr>> {
    Ok(if_by_rfc(seq, rfc)?.0)
}

pub fn exclude_by_rfc(seq: &[IfAddr], rfc: u32) -> Result<Vec<IfAddr>> {
    Ok(if_by_rfc(seq, rfc)?.1)
}

pub fn include_by_network(seq: &[IfAddr], network: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_network(seq, &SockAddr::parse(network)?).0)
}

pub fn exclude_by_network(seq: &[IfAddr], network: &str) -> Result<Vec<IfAddr>> {
    Ok(if_by_network(seq, &SockAddr::parse(network)?).1)
}

/// Selector accepted by [`include`] and [`exclude`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Name,
    Flag,
    Rfc,
    Type,
    Network,
}

impl FromStr for Selector {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Selector::Name),
            "flag" | "flags" => Ok(Selector::Flag),
            "rfc" | "rfcs" => Ok(Selector::Rfc),
            "type" => Ok(Selector::Type),
            "network" => Ok(Selector::Network),
            _ => Err(SockAddrError::UnknownSelector(s.to_string())),
        }
    }
}

fn select(selector: &str, param: &str, seq: &[IfAddr]) -> Result<Partition> {
    match selector.parse::<Selector>()? {
        Selector::Name => if_by_name(seq, param),
        Selector::Flag => if_by_flag(seq, param),
        Selector::Rfc => {
            let rfcs = param
                .split('|')
                .map(rfc::parse_rfc)
                .collect::<Result<Vec<_>>>()?;
            if_by_rfcs(seq, &rfcs)
        }
        Selector::Type => Ok(if_by_type(seq, param.parse()?)),
        Selector::Network => Ok(if_by_network(seq, &SockAddr::parse(param)?)),
    }
}

/// Keeps the entries matching `selector`/`param`.
///
/// `rfc` accepts a `|`-separated list of RFC numbers and keeps members of any.
pub fn include(selector: &str, param: &str, seq: &[IfAddr]) -> Result<Vec<IfAddr>> {
    let (matched, _) = select(selector, param, seq)?;
    tracing::debug!(selector, param, total = seq.len(), kept = matched.len(), "include");
    Ok(matched)
}

/// Drops the entries matching `selector`/`param`.
pub fn exclude(selector: &str, param: &str, seq: &[IfAddr]) -> Result<Vec<IfAddr>> {
    let (_, unmatched) = select(selector, param, seq)?;
    tracing::debug!(selector, param, total = seq.len(), kept = unmatched.len(), "exclude");
    Ok(unmatched)
}
