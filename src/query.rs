//! Convenience queries: private, public and per-interface addresses
//!
//! Every query returns a rendered answer. No match is an empty string, never
//! an error; errors are reserved for malformed input and enumeration failure.

use crate::config::{self, FORWARDABLE_FLAG, FORWARDING_BLACKLIST_RFC, PRIVATE_RFC};
use crate::error::Result;
use crate::models::IfAddr;
use crate::network::InterfaceProvider;
use crate::pipeline::{
    exclude_by_rfc, filter_by_type, first_attr, include_by_flag, include_by_name, include_by_rfc,
    join, sort_by,
};
use crate::sockaddr::TypeSet;

/// Knobs shared by all queries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Sort applied before picking the first address
    pub sort: String,
    /// Separator for the plural queries
    pub separator: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            sort: config::DEFAULT_INTERFACE_SORT.to_string(),
            separator: config::DEFAULT_JOIN_SEPARATOR.to_string(),
        }
    }
}

impl QueryOptions {
    /// Defaults overridden by `NEXUS_IFADDR_SORT` / `NEXUS_IFADDR_SEPARATOR`.
    pub fn from_env() -> Self {
        Self {
            sort: config::interface_sort(),
            separator: config::join_separator(),
        }
    }
}

/// Forwardable special-purpose (RFC 6890) addresses, best candidate first.
pub fn private_addrs(seq: &[IfAddr], opts: &QueryOptions) -> Result<Vec<IfAddr>> {
    let ips = filter_by_type(seq, TypeSet::IP);
    let sorted = sort_by(&ips, &opts.sort)?;
    let special = include_by_rfc(&sorted, PRIVATE_RFC)?;
    let private = exclude_by_rfc(&special, FORWARDING_BLACKLIST_RFC)?;
    tracing::debug!(
        total = seq.len(),
        special = special.len(),
        private = private.len(),
        "private addresses"
    );
    Ok(private)
}

/// Addresses outside RFC 6890, best candidate first.
pub fn public_addrs(seq: &[IfAddr], opts: &QueryOptions) -> Result<Vec<IfAddr>> {
    let ips = filter_by_type(seq, TypeSet::IP);
    let sorted = sort_by(&ips, &opts.sort)?;
    let public = exclude_by_rfc(&sorted, PRIVATE_RFC)?;
    tracing::debug!(total = seq.len(), ips = ips.len(), public = public.len(), "public addresses");
    Ok(public)
}

/// Addresses on interfaces whose name matches `pattern` and that carry every
/// flag in `flags`, best candidate first.
pub fn interface_addrs(
    seq: &[IfAddr],
    pattern: &str,
    flags: &[&str],
    opts: &QueryOptions,
) -> Result<Vec<IfAddr>> {
    let named = include_by_name(seq, pattern)?;
    let flagged = flags
        .iter()
        .try_fold(named, |current, flag| include_by_flag(&current, flag))?;
    sort_by(&flagged, &opts.sort)
}

pub fn private_ip(seq: &[IfAddr], opts: &QueryOptions) -> Result<String> {
    first_attr(&private_addrs(seq, opts)?, config::DEFAULT_JOIN_ATTR)
}

pub fn private_ips(seq: &[IfAddr], opts: &QueryOptions) -> Result<String> {
    join(&private_addrs(seq, opts)?, config::DEFAULT_JOIN_ATTR, &opts.separator)
}

pub fn public_ip(seq: &[IfAddr], opts: &QueryOptions) -> Result<String> {
    first_attr(&public_addrs(seq, opts)?, config::DEFAULT_JOIN_ATTR)
}

pub fn public_ips(seq: &[IfAddr], opts: &QueryOptions) -> Result<String> {
    join(&public_addrs(seq, opts)?, config::DEFAULT_JOIN_ATTR, &opts.separator)
}

/// First forwardable address on an interface matching `pattern`.
pub fn interface_ip(seq: &[IfAddr], pattern: &str, opts: &QueryOptions) -> Result<String> {
    interface_ip_with_flags(seq, pattern, &[FORWARDABLE_FLAG], opts)
}

/// Every address on interfaces matching `pattern`, link-local ones included.
pub fn interface_ips(seq: &[IfAddr], pattern: &str, opts: &QueryOptions) -> Result<String> {
    let addrs = interface_addrs(seq, pattern, &[], opts)?;
    join(&addrs, config::DEFAULT_JOIN_ATTR, &opts.separator)
}

/// First address on an interface matching `pattern` that carries all `flags`.
pub fn interface_ip_with_flags(
    seq: &[IfAddr],
    pattern: &str,
    flags: &[&str],
    opts: &QueryOptions,
) -> Result<String> {
    first_attr(&interface_addrs(seq, pattern, flags, opts)?, config::DEFAULT_JOIN_ATTR)
}

/// Runs the queries against a provider, enumerating once per query.
pub struct Queries<P> {
    provider: P,
    options: QueryOptions,
}

impl<P: InterfaceProvider> Queries<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            options: QueryOptions::from_env(),
        }
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// The raw interface table.
    pub fn interfaces(&self) -> Result<Vec<IfAddr>> {
        self.provider.interfaces()
    }

    pub fn private_ip(&self) -> Result<String> {
        private_ip(&self.interfaces()?, &self.options)
    }

    pub fn private_ips(&self) -> Result<String> {
        private_ips(&self.interfaces()?, &self.options)
    }

    pub fn public_ip(&self) -> Result<String> {
        public_ip(&self.interfaces()?, &self.options)
    }

    pub fn public_ips(&self) -> Result<String> {
        public_ips(&self.interfaces()?, &self.options)
    }

    pub fn interface_ip(&self, pattern: &str) -> Result<String> {
        interface_ip(&self.interfaces()?, pattern, &self.options)
    }

    pub fn interface_ips(&self, pattern: &str) -> Result<String> {
        interface_ips(&self.interfaces()?, pattern, &self.options)
    }

    pub fn interface_ip_with_flags(&self, pattern: &str, flags: &[&str]) -> Result<String> {
        interface_ip_with_flags(&self.interfaces()?, pattern, flags, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SockAddrError;
    use crate::models::{IfFlags, Interface};
    use crate::network::StaticInterfaceProvider;

    fn flagged_table() -> Vec<IfAddr> {
        StaticInterfaceProvider::from_entries([
            ("127.0.0.0/8", Interface::new(1, 65536, "lo", IfFlags::UP | IfFlags::LOOPBACK)),
            ("172.16.0.0/12", Interface::new(2, 1500, "eth0", IfFlags::UP)),
            ("169.254.0.0/16", Interface::new(3, 1500, "dummy", IfFlags::BROADCAST)),
            ("fe80::/10", Interface::new(3, 1500, "dummyv6", IfFlags::BROADCAST)),
        ])
        .unwrap()
        .interfaces()
        .unwrap()
    }

    fn host_table() -> Vec<IfAddr> {
        let lo = IfFlags::UP | IfFlags::LOOPBACK | IfFlags::MULTICAST;
        let bcast = IfFlags::UP | IfFlags::BROADCAST | IfFlags::MULTICAST;
        StaticInterfaceProvider::from_entries([
            ("127.0.0.1/8", Interface::new(1, 16384, "lo0", lo)),
            ("::1", Interface::new(1, 16384, "lo0", lo)),
            ("fe80::1/64", Interface::new(1, 16384, "lo0", lo)),
            ("fe80::2b:112f:ce21:7b6f/64", Interface::new(15, 1500, "en0", bcast)),
            ("2406:7400:63:ef5:1415:8bc3:fa5e:2578/64", Interface::new(15, 1500, "en0", bcast)),
            ("192.168.0.102/24", Interface::new(15, 1500, "en0", bcast)),
            ("10.8.0.2/24", Interface::new(18, 1500, "utun0", IfFlags::UP | IfFlags::POINT_TO_POINT)),
            ("203.0.114.7/22", Interface::new(19, 1500, "en1", bcast)),
        ])
        .unwrap()
        .interfaces()
        .unwrap()
    }

    #[test]
    fn test_interface_ip_with_flags() {
        let opts = QueryOptions::default();
        let cases: [(&str, &[&str], &str); 8] = [
            ("lo", &[], "127.0.0.0"),
            ("lo", &["forwardable"], ""),
            ("eth0", &[], "172.16.0.0"),
            ("eth0", &["broadcast"], ""),
            ("dummy", &[], "169.254.0.0"),
            ("dummy", &["forwardable"], ""),
            ("dummyv6", &[], "fe80::"),
            ("dummyv6", &["forwardable"], ""),
        ];
        for (pattern, flags, want) in cases {
            let got = interface_ip_with_flags(&flagged_table(), pattern, flags, &opts).unwrap();
            assert_eq!(got, want, "{pattern} {flags:?}");
        }
    }

    #[test]
    fn test_interface_ip_requires_forwardable() {
        let opts = QueryOptions::default();
        assert_eq!(interface_ip(&flagged_table(), "eth0", &opts).unwrap(), "172.16.0.0");
        assert_eq!(interface_ip(&flagged_table(), "lo", &opts).unwrap(), "");
        assert_eq!(interface_ip(&host_table(), "^en0$", &opts).unwrap(), "192.168.0.102");
    }

    #[test]
    fn test_interface_ips_keeps_non_forwardable_addresses() {
        let opts = QueryOptions::default();
        assert_eq!(
            interface_ips(&host_table(), "^en0$", &opts).unwrap(),
            "192.168.0.102 fe80::2b:112f:ce21:7b6f 2406:7400:63:ef5:1415:8bc3:fa5e:2578"
        );
        assert_eq!(interface_ips(&host_table(), "^lo0$", &opts).unwrap(), "127.0.0.1 fe80::1 ::1");
        assert_eq!(interface_ips(&flagged_table(), "dummy", &opts).unwrap(), "169.254.0.0 fe80::");
    }

    #[test]
    fn test_private_ip_skips_loopback() {
        let opts = QueryOptions::default();
        assert_eq!(private_ip(&flagged_table(), &opts).unwrap(), "172.16.0.0");
        // Equal prefixes keep enumeration order
        assert_eq!(private_ips(&host_table(), &opts).unwrap(), "192.168.0.102 10.8.0.2");
    }

    #[test]
    fn test_public_ip() {
        let opts = QueryOptions::default();
        assert_eq!(public_ip(&flagged_table(), &opts).unwrap(), "");
        assert_eq!(public_ip(&host_table(), &opts).unwrap(), "203.0.114.7");
        assert_eq!(
            public_ips(&host_table(), &opts).unwrap(),
            "203.0.114.7 2406:7400:63:ef5:1415:8bc3:fa5e:2578"
        );
    }

    #[test]
    fn test_separator_and_sort_options() {
        let opts = QueryOptions {
            sort: "+type,-address".to_string(),
            separator: ",".to_string(),
        };
        assert_eq!(private_ips(&host_table(), &opts).unwrap(), "192.168.0.102,10.8.0.2");

        let opts = QueryOptions {
            sort: "-type".to_string(),
            separator: " ".to_string(),
        };
        assert_eq!(public_ip(&host_table(), &opts).unwrap(), "2406:7400:63:ef5:1415:8bc3:fa5e:2578");
    }

    #[test]
    fn test_malformed_input_is_an_error_not_an_empty_answer() {
        let opts = QueryOptions::default();
        assert!(matches!(interface_ip(&host_table(), "[", &opts), Err(SockAddrError::InvalidPattern { .. })));
        assert!(matches!(
            interface_ip_with_flags(&host_table(), "en0", &["bogus"], &opts),
            Err(SockAddrError::UnknownFlag(_))
        ));
        let bad_sort = QueryOptions { sort: "+speed".to_string(), ..QueryOptions::default() };
        assert!(matches!(private_ip(&host_table(), &bad_sort), Err(SockAddrError::InvalidSortKey(_))));
        assert_eq!(private_ip(&[], &opts).unwrap(), "");
    }

    #[test]
    fn test_queries_over_provider() {
        let provider = StaticInterfaceProvider::new(host_table());
        let queries = Queries::new(provider).with_options(QueryOptions::default());
        assert_eq!(queries.private_ip().unwrap(), "192.168.0.102");
        assert_eq!(queries.public_ip().unwrap(), "203.0.114.7");
        assert_eq!(queries.interface_ip("utun").unwrap(), "10.8.0.2");
        assert_eq!(queries.interface_ip_with_flags("lo0", &["loopback"]).unwrap(), "127.0.0.1");
        assert_eq!(queries.interfaces().unwrap().len(), 8);
    }
}
