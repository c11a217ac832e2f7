//! Error types for the core library.

use std::fmt;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A server or key hashed to a slot that is already occupied.
    SlotCollision { hash: u32 },
    /// The requested server is not present in the ring.
    ServerNotFound { ip: String, port: u16 },
    /// The requested key is not present in the ring.
    KeyNotFound { key: String },
    /// `add_key` was attempted against a ring with no servers.
    EmptyRing,
    /// Invalid node configuration.
    InvalidNode(String),
    /// Internal invariant violation; should never surface to a caller.
    Internal(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SlotCollision { hash } => write!(f, "slot {} is already occupied", hash),
            Error::ServerNotFound { ip, port } => write!(f, "no such server {}:{}", ip, port),
            Error::KeyNotFound { key } => write!(f, "no such key '{}'", key),
            Error::EmptyRing => write!(f, "ring has no servers"),
            Error::InvalidNode(msg) => write!(f, "invalid node: {}", msg),
            Error::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}
