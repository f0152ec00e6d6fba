//! Network module - interface enumeration

mod interface;

pub use interface::{InterfaceProvider, OsInterfaceProvider, StaticInterfaceProvider};
