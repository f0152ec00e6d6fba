//! Transform stages: sort, dedup, slice, render and shift address sequences

use std::collections::HashSet;
use std::str::FromStr;

use crate::attr::{if_addr_attr, AttrName};
use crate::error::{Result, SockAddrError};
use crate::models::IfAddr;
use crate::sort::SortSpec;

/// Stable sort by a `"+type,-address"` style specification.
pub fn sort_by(seq: &[IfAddr], spec: &str) -> Result<Vec<IfAddr>> {
    let order = SortSpec::parse(spec)?.order_by();
    let mut sorted = seq.to_vec();
    order.sort(&mut sorted);
    Ok(sorted)
}

/// Keeps the first entry for each distinct value of `attr`.
///
/// Entries that do not have the attribute (a UNIX socket asked for its
/// `address`) are kept as they are.
pub fn unique(seq: &[IfAddr], attr: &str) -> Result<Vec<IfAddr>> {
    let attr: AttrName = attr.parse()?;
    let mut seen = HashSet::new();
    let kept: Vec<IfAddr> = seq
        .iter()
        .filter(|ifaddr| match if_addr_attr(ifaddr, attr) {
            Ok(value) => seen.insert(value),
            Err(_) => true,
        })
        .cloned()
        .collect();
    tracing::debug!(%attr, total = seq.len(), kept = kept.len(), "unique");
    Ok(kept)
}

/// The first `n` entries. Negative `n` is an error.
pub fn limit(seq: &[IfAddr], n: i64) -> Result<Vec<IfAddr>> {
    let n = usize::try_from(n)
        .map_err(|_| SockAddrError::InvalidArgument(format!("limit must not be negative: {}", n)))?;
    Ok(seq.iter().take(n).cloned().collect())
}

/// Skips the first `n` entries; a negative `n` keeps the last `|n|` instead.
pub fn offset(seq: &[IfAddr], n: i64) -> Vec<IfAddr> {
    let len = seq.len();
    let magnitude = usize::try_from(n.unsigned_abs()).unwrap_or(usize::MAX).min(len);
    let start = if n >= 0 { magnitude } else { len - magnitude };
    seq[start..].to_vec()
}

pub fn reverse(seq: &[IfAddr]) -> Vec<IfAddr> {
    seq.iter().rev().cloned().collect()
}

fn render(seq: &[IfAddr], attr: &str) -> Result<Vec<String>> {
    let attr: AttrName = attr.parse()?;
    seq.iter().map(|ifaddr| if_addr_attr(ifaddr, attr)).collect()
}

/// Renders `attr` of every entry joined by `separator`.
pub fn join(seq: &[IfAddr], attr: &str, separator: &str) -> Result<String> {
    Ok(render(seq, attr)?.join(separator))
}

/// Renders `attr` of the first entry, or an empty string when there is none.
pub fn first_attr(seq: &[IfAddr], attr: &str) -> Result<String> {
    let attr: AttrName = attr.parse()?;
    match seq.first() {
        Some(ifaddr) => if_addr_attr(ifaddr, attr),
        None => Ok(String::new()),
    }
}

/// Which part of the address `math` shifts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Address,
    Network,
}

impl FromStr for MathOp {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "address" => Ok(MathOp::Address),
            "network" => Ok(MathOp::Network),
            _ => Err(SockAddrError::InvalidArgument(format!(
                "unsupported math operation {:?}, expected \"address\" or \"network\"",
                s
            ))),
        }
    }
}

/// Parses a signed decimal delta such as `+2`, `-256` or `4294967294`.
///
/// At most one leading sign is accepted.
pub fn parse_delta(value: &str) -> Result<i128> {
    let invalid = || SockAddrError::InvalidArgument(format!("invalid delta {:?}", value));
    let trimmed = value.trim();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let magnitude = digits.parse::<i128>().map_err(|_| invalid())?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// Shifts every address; UNIX sockets pass through unchanged.
pub fn math(seq: &[IfAddr], op: &str, value: &str) -> Result<Vec<IfAddr>> {
    let op: MathOp = op.parse()?;
    let delta = parse_delta(value)?;
    Ok(seq
        .iter()
        .map(|ifaddr| {
            let addr = match op {
                MathOp::Address => ifaddr.addr.offset_address(delta),
                MathOp::Network => ifaddr.addr.offset_network(delta),
            };
            IfAddr::new(addr, ifaddr.interface.clone())
        })
        .collect())
}

pub fn math_address(seq: &[IfAddr], delta: &str) -> Result<Vec<IfAddr>> {
    math(seq, "address", delta)
}

pub fn math_network(seq: &[IfAddr], delta: &str) -> Result<Vec<IfAddr>> {
    math(seq, "network", delta)
}
