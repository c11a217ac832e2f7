//! Virtual node abstractions.
//!
//! Instead of giving each physical node a single ring position, a node is
//! assigned many (typically 10-256) virtual nodes spread around the ring.
//! This smooths load distribution and means a node join or leave only moves
//! a fraction of the keyspace instead of a contiguous chunk of it.
//!
//! Each vnode's ring position comes from hashing the node's address with an
//! index suffix appended: `"{ip}:{port}"` for the primary (index 0), and
//! `"{ip}:{port}-{index}"` for index > 0.

use crate::hash::HashAlgorithm;
use crate::node::NodeId;

/// A single ring position owned by a physical node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualNode {
    /// Token position on the ring, in `[0, RING_SIZE)`.
    pub token: u32,
    /// The physical node this position routes to.
    pub node_id: NodeId,
}

impl VirtualNode {
    pub fn new(token: u32, node_id: NodeId) -> Self {
        Self { token, node_id }
    }

    /// Derive vnode `index`'s address key for `base` (a node's `ip:port`).
    ///
    /// Index 0 is the node's primary position and uses the bare address;
    /// every other index appends a `-{index}` suffix so it hashes to a
    /// distinct ring slot.
    pub fn address_key(base: &str, index: usize) -> String {
        if index == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, index)
        }
    }

    /// Build the vnode at `index` for `node_id`, hashing `base`'s derived
    /// address key with `algorithm`.
    pub fn from_index(algorithm: HashAlgorithm, node_id: NodeId, base: &str, index: usize) -> Self {
        let key = Self::address_key(base, index);
        Self::new(algorithm.hash(&key), node_id)
    }
}

impl std::fmt::Display for VirtualNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "VNode(token={}, node={})", self.token, self.node_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::HashAlgorithm;

    #[test]
    fn index_zero_uses_bare_address() {
        assert_eq!(VirtualNode::address_key("10.0.0.1:7000", 0), "10.0.0.1:7000");
    }

    #[test]
    fn nonzero_index_appends_suffix() {
        assert_eq!(VirtualNode::address_key("10.0.0.1:7000", 3), "10.0.0.1:7000-3");
    }

    #[test]
    fn from_index_varies_token_per_index() {
        let a = VirtualNode::from_index(HashAlgorithm::Djb2, NodeId(1), "10.0.0.1:7000", 0);
        let b = VirtualNode::from_index(HashAlgorithm::Djb2, NodeId(1), "10.0.0.1:7000", 1);
        assert_ne!(a.token, b.token);
        assert_eq!(a.node_id, b.node_id);
    }

    #[test]
    fn ordering_is_by_token() {
        let a = VirtualNode::new(100, NodeId(1));
        let b = VirtualNode::new(200, NodeId(2));
        assert!(a < b);
    }
}
