//! Core library for consistent hashing implementation.
//!
//! This crate provides the fundamental abstractions for consistent hashing:
//! - Hash functions shared by the ring and the local store
//! - Node and virtual node abstractions
//! - Ring storage, routing, and range/remap maintenance
//! - A read-only topology view for diagnostics

pub mod error;
pub mod hash;
pub mod node;
pub mod ring;
pub mod topology;
pub mod vnode;

pub use error::{Error, Result};
pub use hash::HashAlgorithm;
pub use node::{Node, NodeId};
pub use ring::{HashRing, RingBuilder, RING_SIZE};
pub use topology::Topology;
pub use vnode::VirtualNode;
