//! Error types for address queries.
//!
//! Every failure here is terminal for the query that raised it. "Nothing
//! matched" is never an error; queries return an empty result instead.

use thiserror::Error;

use crate::sockaddr::SockAddrType;

/// Result type alias for address operations.
pub type Result<T> = std::result::Result<T, SockAddrError>;

#[derive(Error, Debug)]
pub enum SockAddrError {
    #[error("Unable to parse {input:?} as an IPv4, IPv6 or UNIX socket address: {reason}")]
    Parse { input: String, reason: String },

    #[error("Invalid interface name pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Unknown RFC: {0}")]
    UnknownRfc(String),

    #[error("Unknown interface flag: {0:?}")]
    UnknownFlag(String),

    #[error("Unknown attribute: {0:?}")]
    UnknownAttr(String),

    #[error("Unknown address type: {0:?}")]
    UnknownType(String),

    #[error("Unknown selector: {0:?}")]
    UnknownSelector(String),

    #[error("Attribute {attr:?} is not applicable to {addr_type} addresses")]
    AttrNotApplicable {
        attr: String,
        addr_type: SockAddrType,
    },

    #[error("Invalid sort key: {0:?}")]
    InvalidSortKey(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Interface enumeration failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Interface {interface} reported an unusable address {address}: {reason}")]
    Enumeration {
        interface: String,
        address: String,
        reason: String,
    },
}

impl SockAddrError {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        SockAddrError::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}
