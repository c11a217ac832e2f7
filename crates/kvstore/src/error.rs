//! Error type for the local key/value map.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// `insert` was attempted against a key that already exists.
    KeyExists { key: String },
    /// `remove` was attempted against a key that isn't present.
    KeyNotFound { key: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::KeyExists { key } => write!(f, "key '{}' already exists", key),
            Error::KeyNotFound { key } => write!(f, "no such key '{}'", key),
        }
    }
}

impl std::error::Error for Error {}
