//! Interface enumeration: the OS adapter and a fixed-list provider

use pnet::datalink::{self, NetworkInterface};
use pnet::util::MacAddr;
use std::io;
use std::net::IpAddr;
use std::path::Path;

use crate::error::{Result, SockAddrError};
use crate::models::{IfAddr, IfFlags, Interface};
use crate::sockaddr::{Ipv4Sock, Ipv6Sock, SockAddr};
use crate::{log_debug, log_warn};

/// Source of the interface address table a query runs against.
///
/// Implementations return already-validated addresses in enumeration order.
pub trait InterfaceProvider {
    fn interfaces(&self) -> Result<Vec<IfAddr>>;
}

/// Enumerates the host's interfaces through `pnet`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsInterfaceProvider;

impl InterfaceProvider for OsInterfaceProvider {
    fn interfaces(&self) -> Result<Vec<IfAddr>> {
        let pnet_interfaces = datalink::interfaces();

        log_debug!("Enumerating {} network interfaces", pnet_interfaces.len());

        Ok(pnet_interfaces.iter().flat_map(convert_interface).collect())
    }
}

fn interface_flags(pnet_if: &NetworkInterface) -> IfFlags {
    let mut flags = IfFlags::empty();
    flags.set(IfFlags::UP, pnet_if.is_up());
    flags.set(IfFlags::BROADCAST, pnet_if.is_broadcast());
    flags.set(IfFlags::LOOPBACK, pnet_if.is_loopback());
    flags.set(IfFlags::POINT_TO_POINT, pnet_if.is_point_to_point());
    flags.set(IfFlags::MULTICAST, pnet_if.is_multicast());
    #[cfg(unix)]
    flags.set(IfFlags::RUNNING, pnet_if.is_running());
    flags
}

/// MTU from sysfs; `0` where the platform or the interface does not expose it.
fn read_mtu(name: &str) -> Result<u32> {
    if !cfg!(target_os = "linux") {
        return Ok(0);
    }
    read_mtu_file(Path::new("/sys/class/net").join(name).join("mtu").as_path())
}

fn read_mtu_file(path: &Path) -> Result<u32> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };
    raw.trim().parse().map_err(|_| {
        SockAddrError::Io(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unexpected MTU {:?} in {}", raw.trim(), path.display()),
        ))
    })
}

fn to_sock_addr(ip: IpAddr, prefix: u8) -> Result<SockAddr> {
    match ip {
        IpAddr::V4(v4) => Ipv4Sock::new(v4, prefix).map(SockAddr::Ipv4),
        IpAddr::V6(v6) => Ipv6Sock::new(v6, prefix).map(SockAddr::Ipv6),
    }
}

/// One [`IfAddr`] per address on the interface. Addresses that do not convert
/// are logged and skipped so one bad entry does not hide the rest.
pub(crate) fn convert_interface(pnet_if: &NetworkInterface) -> Vec<IfAddr> {
    let mtu = read_mtu(&pnet_if.name).unwrap_or_else(|e| {
        log_warn!("Unable to read MTU of {}: {}", pnet_if.name, e);
        0
    });
    let mut interface = Interface::new(
        pnet_if.index,
        mtu,
        pnet_if.name.clone(),
        interface_flags(pnet_if),
    );
    if let Some(mac) = pnet_if.mac.filter(|mac| *mac != MacAddr::zero()) {
        interface = interface.with_hardware_addr(mac);
    }

    log_debug!(
        "Interface {} (index: {}, flags: {}, ips: {})",
        interface.name,
        interface.index,
        interface.flags,
        pnet_if.ips.len()
    );

    pnet_if
        .ips
        .iter()
        .filter_map(|ip_network| match to_sock_addr(ip_network.ip(), ip_network.prefix()) {
            Ok(addr) => Some(IfAddr::new(addr, interface.clone())),
            Err(e) => {
                log_warn!("Skipping address {} on {}: {}", ip_network, pnet_if.name, e);
                None
            }
        })
        .collect()
}

/// A fixed interface table, for tests and for replaying a captured host.
#[derive(Debug, Clone, Default)]
pub struct StaticInterfaceProvider {
    addrs: Vec<IfAddr>,
}

impl StaticInterfaceProvider {
    pub fn new(addrs: Vec<IfAddr>) -> Self {
        Self { addrs }
    }

    /// Builds the table from `(address text, interface)` pairs.
    pub fn from_entries<'a, I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Interface)>,
    {
        let addrs = entries
            .into_iter()
            .map(|(address, interface)| {
                SockAddr::parse(address)
                    .map(|addr| IfAddr::new(addr, interface.clone()))
                    .map_err(|e| SockAddrError::Enumeration {
                        interface: interface.name.clone(),
                        address: address.to_string(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { addrs })
    }
}

impl InterfaceProvider for StaticInterfaceProvider {
    fn interfaces(&self) -> Result<Vec<IfAddr>> {
        Ok(self.addrs.clone())
    }
}
