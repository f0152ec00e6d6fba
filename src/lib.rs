//! NEXUS ifaddr - interface address queries
//!
//! This crate answers "which address should I use" questions about the
//! local host:
//! - Typed socket addresses (IPv4, IPv6, UNIX paths) with parse and render
//! - RFC block classification (private, special-purpose, forwardable)
//! - Stable multi-key sorting of interface addresses
//! - A filter, sort and transform pipeline over the interface table
//! - Convenience queries (private-ip, public-ip, interface-ip, ...)

pub mod app;
pub mod attr;
pub mod cli;
mod command_handlers;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod network;
pub mod pipeline;
pub mod query;
pub mod rfc;
pub mod sockaddr;
pub mod sort;

pub use app::{
    execute_command, execute_command_typed, execute_command_with_context, run, run_with_context,
    AppCommandResult, AppContext, OutputHook,
};
pub use attr::{attr, if_addr_attr, sock_addr_attr, AddrReport, AttrName};
pub use cli::CliCommand;
pub use error::{Result, SockAddrError};
pub use models::{IfAddr, IfFlags, Interface};
pub use network::{InterfaceProvider, OsInterfaceProvider, StaticInterfaceProvider};
pub use pipeline::Stage;
pub use query::{
    interface_ip, interface_ip_with_flags, interface_ips, private_ip, private_ips, public_ip,
    public_ips, Queries, QueryOptions,
};
pub use rfc::{is_forwardable, is_private, is_special_purpose, known_rfcs, matches_rfc};
pub use sockaddr::{AsSockAddr, Ipv4Sock, Ipv6Sock, SockAddr, SockAddrType, TypeSet, UnixSock};
pub use sort::{compare_broad, compare_specific, OrderBy, SortKey, SortSpec};

// Re-export logging macros for use across crate
pub use crate::logging::macros;
