//! Configuration constants for interface address queries

/// RFC whose members count as private (non-global) addresses
pub const PRIVATE_RFC: u32 = 6890;

/// Pseudo-RFC number under which the non-forwardable blocks are registered
pub const FORWARDING_BLACKLIST_RFC: u32 = u32::MAX;

/// Sort applied by the interface queries: IPv4 first, broadest network first
pub const DEFAULT_INTERFACE_SORT: &str = "+type,+size";

/// Separator used by the plural queries (`private-ips`, `public-ips`, ...)
pub const DEFAULT_JOIN_SEPARATOR: &str = " ";

/// Attribute rendered by query output and `join` when none is named
pub const DEFAULT_JOIN_ATTR: &str = "address";

/// Flag an interface must carry for `interface-ip` to pick it
pub const FORWARDABLE_FLAG: &str = "forwardable";

/// Log file name used when file logging is enabled
pub const LOG_FILE_NAME: &str = "nexus-ifaddr.log";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse_bool(name: &str, default: bool) -> bool {
    match env_var(name) {
        Some(value) => {
            let normalized = value.to_ascii_lowercase();
            matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
        }
        None => default,
    }
}

/// Runtime-tunable sort for the interface queries.
/// Env: `NEXUS_IFADDR_SORT` (e.g. `+type,-size`)
pub fn interface_sort() -> String {
    env_var("NEXUS_IFADDR_SORT").unwrap_or_else(|| DEFAULT_INTERFACE_SORT.to_string())
}

/// Runtime-tunable separator for the plural queries.
/// Env: `NEXUS_IFADDR_SEPARATOR`
pub fn join_separator() -> String {
    // Read raw: a separator may legitimately be whitespace.
    std::env::var("NEXUS_IFADDR_SEPARATOR")
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_JOIN_SEPARATOR.to_string())
}

/// Whether to also write JSON logs to a rotating file.
/// Env: `NEXUS_IFADDR_LOG_FILE`
pub fn file_logging_enabled() -> bool {
    env_parse_bool("NEXUS_IFADDR_LOG_FILE", false)
}
