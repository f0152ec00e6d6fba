//! UNIX domain socket paths

use std::fmt;

use crate::error::{Result, SockAddrError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnixSock {
    path: String,
}

impl UnixSock {
    pub fn new(path: impl Into<String>) -> Result<Self> {
        let path = path.into();
        if path.is_empty() {
            return Err(SockAddrError::parse(&path, "empty socket path"));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Relative or absolute path heuristic: leading `.` or `/`, or any `/` inside.
    pub(crate) fn looks_like_path(s: &str) -> bool {
        s.len() > 1 && (s.starts_with('.') || s.starts_with('/') || s.contains('/'))
    }
}

impl fmt::Display for UnixSock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
