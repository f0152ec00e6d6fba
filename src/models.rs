//! Data models for interface-bound addresses

use bitflags::bitflags;
use pnet::util::MacAddr;
use std::fmt;

use crate::sockaddr::{AsSockAddr, SockAddr};

bitflags! {
    /// Interface flag set, bit-compatible with the usual `IFF_*` ordering
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IfFlags: u32 {
        const UP = 1 << 0;
        const BROADCAST = 1 << 1;
        const LOOPBACK = 1 << 2;
        const POINT_TO_POINT = 1 << 3;
        const MULTICAST = 1 << 4;
        const RUNNING = 1 << 5;
    }
}

impl IfFlags {
    const NAMES: [(IfFlags, &'static str); 6] = [
        (IfFlags::UP, "up"),
        (IfFlags::BROADCAST, "broadcast"),
        (IfFlags::LOOPBACK, "loopback"),
        (IfFlags::POINT_TO_POINT, "pointtopoint"),
        (IfFlags::MULTICAST, "multicast"),
        (IfFlags::RUNNING, "running"),
    ];
}

impl fmt::Display for IfFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("0");
        }
        let names: Vec<&str> = Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        f.write_str(&names.join("|"))
    }
}

/// Metadata of the interface an address is attached to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interface {
    pub index: u32,
    pub mtu: u32,
    pub name: String,
    pub hardware_addr: Option<MacAddr>,
    pub flags: IfFlags,
}

impl Interface {
    pub fn new(index: u32, mtu: u32, name: impl Into<String>, flags: IfFlags) -> Self {
        Self {
            index,
            mtu,
            name: name.into(),
            hardware_addr: None,
            flags,
        }
    }

    pub fn with_hardware_addr(mut self, mac: MacAddr) -> Self {
        self.hardware_addr = Some(mac);
        self
    }
}

/// One address attached to one interface, as produced by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfAddr {
    pub addr: SockAddr,
    pub interface: Interface,
}

impl IfAddr {
    pub fn new(addr: SockAddr, interface: Interface) -> Self {
        Self { addr, interface }
    }

    pub fn name(&self) -> &str {
        &self.interface.name
    }

    pub fn flags(&self) -> IfFlags {
        self.interface.flags
    }
}

impl AsSockAddr for IfAddr {
    fn sock_addr(&self) -> &SockAddr {
        &self.addr
    }
}

impl fmt::Display for IfAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hw = self
            .interface
            .hardware_addr
            .map(|mac| mac.to_string())
            .unwrap_or_default();
        write!(
            f,
            "{} {{{} {} {} {} {}}}",
            self.addr,
            self.interface.index,
            self.interface.mtu,
            self.interface.name,
            hw,
            self.interface.flags
        )
    }
}
