//! A store node's local key/value table.
//!
//! Grounded in `hashtable.h`'s chained-bucket design: a fixed-size bucket
//! array, each bucket a small list of `(key, value)` pairs, collisions
//! resolved by walking the bucket. Unlike the reference, which leaves the
//! table unsynchronized and lets the worker pool race on it, the whole
//! table is guarded by one `parking_lot::RwLock` so concurrent workers can
//! read in parallel and never tear a write.

pub mod error;

pub use error::{Error, Result};

use corelib::hash::HashAlgorithm;
use parking_lot::RwLock;

const DEFAULT_BUCKET_COUNT: usize = 4096;

struct Table {
    buckets: Vec<Vec<(String, String)>>,
    count: usize,
}

/// A store node's local key/value table.
///
/// `insert` mirrors `hashtable_insert`: it fails if the key is already
/// present rather than overwriting it. Use [`LocalMap::set`] for
/// insert-or-overwrite semantics.
pub struct LocalMap {
    algorithm: HashAlgorithm,
    bucket_count: usize,
    table: RwLock<Table>,
}

impl LocalMap {
    /// Create a table with the default bucket count, hashing keys with
    /// `algorithm`.
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self::with_bucket_count(algorithm, DEFAULT_BUCKET_COUNT)
    }

    pub fn with_bucket_count(algorithm: HashAlgorithm, bucket_count: usize) -> Self {
        let bucket_count = bucket_count.max(1);
        Self {
            algorithm,
            bucket_count,
            table: RwLock::new(Table {
                buckets: (0..bucket_count).map(|_| Vec::new()).collect(),
                count: 0,
            }),
        }
    }

    fn bucket_index(&self, key: &str) -> usize {
        (self.algorithm.hash(key) as usize) % self.bucket_count
    }

    /// Insert `key` with `value`. Fails with [`Error::KeyExists`] if the key
    /// is already present, matching `hashtable_insert`'s reject-on-collision
    /// behavior.
    pub fn insert(&self, key: &str, value: &str) -> Result<()> {
        let index = self.bucket_index(key);
        let mut table = self.table.write();
        let bucket = &mut table.buckets[index];
        if bucket.iter().any(|(k, _)| k == key) {
            return Err(Error::KeyExists {
                key: key.to_string(),
            });
        }
        bucket.push((key.to_string(), value.to_string()));
        table.count += 1;
        Ok(())
    }

    /// Insert `key` with `value`, overwriting any existing value.
    pub fn set(&self, key: &str, value: &str) {
        let index = self.bucket_index(key);
        let mut table = self.table.write();
        let bucket = &mut table.buckets[index];
        if let Some(entry) = bucket.iter_mut().find(|(k, _)| k == key) {
            entry.1 = value.to_string();
        } else {
            bucket.push((key.to_string(), value.to_string()));
            table.count += 1;
        }
    }

    /// Look up `key`'s value.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let index = self.bucket_index(key);
        let table = self.table.read();
        table.buckets[index]
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Remove `key`. Fails with [`Error::KeyNotFound`] if absent.
    pub fn remove(&self, key: &str) -> Result<()> {
        let index = self.bucket_index(key);
        let mut table = self.table.write();
        let bucket = &mut table.buckets[index];
        let before = bucket.len();
        bucket.retain(|(k, _)| k != key);
        if bucket.len() == before {
            return Err(Error::KeyNotFound {
                key: key.to_string(),
            });
        }
        table.count -= 1;
        Ok(())
    }

    pub fn contains(&self, key: &str) -> bool {
        let index = self.bucket_index(key);
        self.table.read().buckets[index]
            .iter()
            .any(|(k, _)| k == key)
    }

    /// Every key currently stored, in no particular order. Used by `SYNC`.
    pub fn keys(&self) -> Vec<String> {
        let table = self.table.read();
        table
            .buckets
            .iter()
            .flat_map(|bucket| bucket.iter().map(|(k, _)| k.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.table.read().count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for LocalMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMap")
            .field("len", &self.len())
            .field("bucket_count", &self.bucket_count)
            .finish()
    }
}
