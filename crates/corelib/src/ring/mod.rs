//! Consistent hash ring implementation.
//!
//! The ring owns a single authoritative map from ring token to server
//! (`BTreeMap<u32, NodeId>`), replacing the sorted-array-plus-BST pair older
//! designs kept in lockstep. Server ownership of a key is resolved on demand
//! by a clockwise predecessor search over that map: a key belongs to the
//! server at the largest token less than or equal to its own, wrapping
//! around past the lowest token.

mod ring;

pub use ring::{HashRing, RingBuilder, RING_SIZE};
