//! Address ordering: single-key comparators and multi-key composite sorts
//!
//! Every per-key comparator returns `Ordering::Equal` when the key does not
//! apply to the pair (different families, UNIX sockets), which defers the
//! decision to the next key. Composite sorts are stable, so deferred pairs
//! keep their input order.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::{Result, SockAddrError};
use crate::models::IfAddr;
use crate::rfc;
use crate::sockaddr::{AsSockAddr, SockAddr};

/// A boxed comparator usable as one key of an [`OrderBy`].
pub type Comparator<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// IPv4 before IPv6 before UNIX
pub fn asc_type<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    a.sock_addr().addr_type().cmp(&b.sock_addr().addr_type())
}

/// Raw address, ascending. UNIX sockets compare by path.
pub fn asc_address<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    match (a.sock_addr(), b.sock_addr()) {
        (SockAddr::Ipv4(x), SockAddr::Ipv4(y)) => x.address().cmp(&y.address()),
        (SockAddr::Ipv6(x), SockAddr::Ipv6(y)) => x.address().cmp(&y.address()),
        (SockAddr::Unix(x), SockAddr::Unix(y)) => x.path().cmp(y.path()),
        _ => Ordering::Equal,
    }
}

/// Network address (address masked to its prefix), ascending
pub fn asc_network<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    match (a.sock_addr(), b.sock_addr()) {
        (SockAddr::Ipv4(x), SockAddr::Ipv4(y)) => x.network_address().cmp(&y.network_address()),
        (SockAddr::Ipv6(x), SockAddr::Ipv6(y)) => x.network_address().cmp(&y.network_address()),
        _ => Ordering::Equal,
    }
}

/// Port ascending; an unset port (0) sorts before any set port.
pub fn asc_port<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    match (a.sock_addr().port(), b.sock_addr().port()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Special-purpose (RFC 6890) addresses before globally routable ones
pub fn asc_private<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    if !a.sock_addr().is_ip() || !b.sock_addr().is_ip() {
        return Ordering::Equal;
    }
    // `true` must sort first
    rfc::is_special_purpose(b).cmp(&rfc::is_special_purpose(a))
}

/// Broadest prefix first, across both IP families
pub fn asc_mask_broad<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    match (a.sock_addr().mask_bits(), b.sock_addr().mask_bits()) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Most specific prefix first, across both IP families
pub fn asc_mask_specific<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    asc_mask_broad(b, a)
}

/// The `size` sort key: larger networks (smaller netmask) first, only within
/// one address family.
pub fn asc_network_size<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    match (a.sock_addr(), b.sock_addr()) {
        (SockAddr::Ipv4(x), SockAddr::Ipv4(y)) => x.mask().cmp(&y.mask()),
        (SockAddr::Ipv6(x), SockAddr::Ipv6(y)) => x.mask().cmp(&y.mask()),
        _ => Ordering::Equal,
    }
}

/// Addresses with a port before those without, then port ascending
fn port_set_first<A: AsSockAddr>(a: &A, b: &A) -> Ordering {
    match (a.sock_addr().port(), b.sock_addr().port()) {
        (Some(0), Some(0)) => Ordering::Equal,
        (Some(0), Some(_)) => Ordering::Greater,
        (Some(_), Some(0)) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    }
}

/// Interface name, lexical
pub fn asc_name(a: &IfAddr, b: &IfAddr) -> Ordering {
    a.name().cmp(b.name())
}

/// Host-selection order: most specific prefix first, IPv4 before IPv6,
/// network ascending, then hosts with a port before the bare host.
pub fn network_size_order<A: AsSockAddr + 'static>() -> OrderBy<A> {
    OrderBy::new()
        .then(asc_mask_specific::<A>)
        .then(asc_type::<A>)
        .then(asc_network::<A>)
        .then(port_set_first::<A>)
}

fn total_order(a: &SockAddr, b: &SockAddr, mask_order: Ordering) -> Ordering {
    let mask = match (a.mask_bits(), b.mask_bits()) {
        (Some(x), Some(y)) if mask_order == Ordering::Less => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        _ => Ordering::Equal,
    };
    asc_type(a, b)
        .then_with(|| asc_address(a, b))
        .then(mask)
        .then_with(|| asc_port(a, b))
}

/// Total order over addresses: type, then address, then mask length with a
/// longer (more specific) prefix comparing greater, then port.
pub fn compare_specific(a: &SockAddr, b: &SockAddr) -> Ordering {
    total_order(a, b, Ordering::Greater)
}

/// Total order over addresses: type, then address, then mask length with a
/// shorter (broader) prefix comparing greater, then port.
pub fn compare_broad(a: &SockAddr, b: &SockAddr) -> Ordering {
    total_order(a, b, Ordering::Less)
}

/// An ordered list of comparators, applied left to right until one decides.
pub struct OrderBy<T> {
    keys: Vec<Comparator<T>>,
}

impl<T> Default for OrderBy<T> {
    fn default() -> Self {
        Self { keys: Vec::new() }
    }
}

impl<T> OrderBy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an ascending key.
    pub fn then<F>(mut self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.keys.push(Box::new(cmp));
        self
    }

    /// Appends a key in reverse. Deferred (`Equal`) results stay deferred.
    pub fn then_desc<F>(self, cmp: F) -> Self
    where
        F: Fn(&T, &T) -> Ordering + Send + Sync + 'static,
    {
        self.then(move |a, b| cmp(a, b).reverse())
    }

    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        self.keys
            .iter()
            .map(|key| key(a, b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// Stable in-place sort.
    pub fn sort(&self, items: &mut [T]) {
        items.sort_by(|a, b| self.compare(a, b));
    }
}

/// One sortable attribute of an interface address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Type,
    Address,
    Network,
    Size,
    Port,
    Private,
    Name,
}

impl SortKey {
    fn comparator(self) -> fn(&IfAddr, &IfAddr) -> Ordering {
        match self {
            SortKey::Type => asc_type::<IfAddr>,
            SortKey::Address => asc_address::<IfAddr>,
            SortKey::Network => asc_network::<IfAddr>,
            SortKey::Size => asc_network_size::<IfAddr>,
            SortKey::Port => asc_port::<IfAddr>,
            SortKey::Private => asc_private::<IfAddr>,
            SortKey::Name => asc_name,
        }
    }
}

impl FromStr for SortKey {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "type" => Ok(SortKey::Type),
            "address" => Ok(SortKey::Address),
            "network" => Ok(SortKey::Network),
            "size" => Ok(SortKey::Size),
            "port" => Ok(SortKey::Port),
            "private" => Ok(SortKey::Private),
            "name" => Ok(SortKey::Name),
            _ => Err(SockAddrError::InvalidSortKey(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A parsed sort specification such as `"+type,-address"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    keys: Vec<(SortKey, Direction)>,
}

impl SortSpec {
    /// Parses comma-separated `[+|-]key` tokens. `+` is the default.
    pub fn parse(spec: &str) -> Result<Self> {
        let keys = spec
            .split(',')
            .map(|token| {
                let token = token.trim();
                let (direction, name) = match token.as_bytes().first() {
                    Some(b'+') => (Direction::Ascending, &token[1..]),
                    Some(b'-') => (Direction::Descending, &token[1..]),
                    _ => (Direction::Ascending, token),
                };
                Ok((name.parse::<SortKey>()?, direction))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { keys })
    }

    pub fn keys(&self) -> &[(SortKey, Direction)] {
        &self.keys
    }

    pub fn order_by(&self) -> OrderBy<IfAddr> {
        self.keys
            .iter()
            .fold(OrderBy::new(), |order, (key, direction)| {
                let cmp = key.comparator();
                match direction {
                    Direction::Ascending => order.then(cmp),
                    Direction::Descending => order.then_desc(cmp),
                }
            })
    }
}

impl FromStr for SortSpec {
    type Err = SockAddrError;

    fn from_str(s: &str) -> Result<Self> {
        SortSpec::parse(s)
    }
}

#[cfg(test)]
#[path = "sort_tests.rs"]
mod sort_tests;
