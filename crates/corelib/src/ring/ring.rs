//! `HashRing`: the consistent hash ring proper.
//!
//! Grounded in `hashring.h`'s array-of-slots design, but with its two
//! shadow structures (a sorted server array and a BST, kept in lockstep by
//! hand) collapsed into one: a `BTreeMap<u32, ServerSlot>` is the sole
//! authority for server placement, ordered by token so range recomputation
//! and predecessor search are both native map operations.

use std::collections::BTreeMap;

use dashmap::DashMap;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use crate::node::{Node, NodeId};
use crate::vnode::VirtualNode;

/// Size of the ring's index space. Every hash, server or key, is reduced
/// into `[0, RING_SIZE)`.
pub const RING_SIZE: u32 = 4_000_000;

/// Number of virtual nodes a server gets when none is specified.
const DEFAULT_VNODES: usize = 128;

/// A server's claim on one ring token.
///
/// `range_start`/`range_end` are the inclusive span of raw key-hashes this
/// slot owns, recomputed over the whole ring by [`update_ranges`] whenever
/// membership changes, mirroring `hashring_updateranges`. They are kept for
/// parity with the reference and for diagnostics; actual lookups resolve
/// ownership with a direct predecessor search instead of a range scan, which
/// sidesteps the wraparound off-by-one the reference's range walk
/// (`i > size`) was prone to.
#[derive(Debug, Clone, Copy)]
struct ServerSlot {
    node_id: NodeId,
    range_start: u32,
    range_end: u32,
}

/// An explicitly tracked key and the server it currently resolves to.
#[derive(Debug, Clone)]
struct KeySlot {
    owner: NodeId,
}

struct RingInner {
    /// Token -> server slot. The single authoritative ordering structure,
    /// replacing the reference's sorted array *and* BST.
    vnodes: BTreeMap<u32, ServerSlot>,
    /// How many vnode tokens were assigned to each server, so they can be
    /// recomputed (and removed) deterministically without a reverse index.
    vnode_counts: std::collections::HashMap<NodeId, usize>,
    /// Explicitly tracked keys: token -> current owner.
    keys: BTreeMap<u32, KeySlot>,
}

impl RingInner {
    fn new() -> Self {
        Self {
            vnodes: BTreeMap::new(),
            vnode_counts: std::collections::HashMap::new(),
            keys: BTreeMap::new(),
        }
    }

    /// Clockwise predecessor slot of `token`, wrapping past the start.
    fn predecessor(&self, token: u32) -> Option<&ServerSlot> {
        self.vnodes
            .range(..token)
            .next_back()
            .or_else(|| self.vnodes.iter().next_back())
            .map(|(_, slot)| slot)
    }

    /// Recompute `range_start`/`range_end` for every slot from scratch.
    ///
    /// Slot `i` (tokens sorted ascending) owns `(tokens[i-1], tokens[i]]`;
    /// the lowest-token slot wraps and also owns everything above the
    /// highest token, up to `RING_SIZE - 1`. With a single slot, `prev`
    /// is that same slot's own token, so the range wraps all the way
    /// around and covers the whole ring.
    fn update_ranges(&mut self) {
        let tokens: Vec<u32> = self.vnodes.keys().copied().collect();
        let n = tokens.len();
        for (i, &token) in tokens.iter().enumerate() {
            let prev = tokens[(i + n - 1) % n];
            let range_start = (prev + 1) % RING_SIZE;
            if let Some(slot) = self.vnodes.get_mut(&token) {
                slot.range_start = range_start;
                slot.range_end = token;
            }
        }
    }

    /// Repoint every tracked key whose owner is no longer in the ring to its
    /// clockwise predecessor, matching `hashring_remapkeys_del`.
    fn remap_keys_removed(&mut self, removed: NodeId) {
        let stale: Vec<u32> = self
            .keys
            .iter()
            .filter(|(_, slot)| slot.owner == removed)
            .map(|(token, _)| *token)
            .collect();
        for token in stale {
            if let Some(new_owner) = self.predecessor(token).map(|s| s.node_id) {
                if let Some(slot) = self.keys.get_mut(&token) {
                    slot.owner = new_owner;
                }
            }
        }
    }

    /// Repoint every tracked key that now falls under `new_owner`'s newly
    /// added range, matching `hashring_remapkeys_add`.
    fn remap_keys_added(&mut self, new_owner: NodeId) {
        let to_remap: Vec<u32> = self
            .keys
            .iter()
            .filter(|(token, _)| {
                self.predecessor(**token).map(|s| s.node_id) == Some(new_owner)
            })
            .map(|(token, _)| *token)
            .collect();
        for token in to_remap {
            if let Some(slot) = self.keys.get_mut(&token) {
                slot.owner = new_owner;
            }
        }
    }
}

/// A consistent hash ring mapping servers and keys onto a fixed-size token
/// space.
///
/// Ring position bookkeeping (`vnodes`, `keys`) is guarded by an `RwLock`;
/// server metadata lives in a `DashMap` so read-mostly lookups by id don't
/// contend with ring mutation. Every public method takes `&self`: the ring
/// is meant to be shared behind an `Arc` across worker threads.
pub struct HashRing {
    algorithm: HashAlgorithm,
    inner: RwLock<RingInner>,
    nodes: DashMap<NodeId, Node>,
}

impl HashRing {
    /// Create an empty ring using the default hash algorithm (Jenkins
    /// one-at-a-time, matching the reference coordinator/store processes).
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::Jenkins)
    }

    /// Create an empty ring using a specific hash algorithm. All servers and
    /// keys added to this ring are hashed with it.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            inner: RwLock::new(RingInner::new()),
            nodes: DashMap::new(),
        }
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Name of the algorithm this ring hashes with, for diagnostics.
    pub fn partitioner_name(&self) -> &'static str {
        self.algorithm.name()
    }

    /// Add a server at `ip:port` with `vnodes` virtual positions (plus its
    /// primary, for `vnodes + 1` total ring tokens).
    ///
    /// Fails with [`Error::SlotCollision`] if any of the server's tokens
    /// (including its primary, index-0 token) already belongs to another
    /// server; this also rejects adding the same address twice. On
    /// collision, any vnodes already inserted for this call are rolled back
    /// so a failed add never leaves a partially registered server.
    pub fn add_server(&self, ip: &str, port: u16, vnodes: usize) -> Result<NodeId> {
        let base = format!("{}:{}", ip, port);
        let id = NodeId(self.algorithm.hash(&base));

        let mut inner = self.inner.write();
        let mut inserted = Vec::with_capacity(vnodes + 1);
        for index in 0..=vnodes {
            let vnode = VirtualNode::from_index(self.algorithm, id, &base, index);
            if inner.vnodes.contains_key(&vnode.token) || inner.keys.contains_key(&vnode.token) {
                for token in &inserted {
                    inner.vnodes.remove(token);
                }
                return Err(Error::SlotCollision { hash: vnode.token });
            }
            inner.vnodes.insert(
                vnode.token,
                ServerSlot {
                    node_id: id,
                    range_start: 0,
                    range_end: 0,
                },
            );
            inserted.push(vnode.token);
        }
        inner.vnode_counts.insert(id, inserted.len());
        inner.update_ranges();
        inner.remap_keys_added(id);
        drop(inner);

        self.nodes.insert(id, Node::new(id, ip, port));
        Ok(id)
    }

    /// Same as [`Self::add_server`] but attaches datacenter/rack metadata.
    pub fn add_server_with_topology(
        &self,
        ip: &str,
        port: u16,
        vnodes: usize,
        datacenter: Option<String>,
        rack: Option<String>,
    ) -> Result<NodeId> {
        let id = self.add_server(ip, port, vnodes)?;
        if let Some(mut node) = self.nodes.get_mut(&id) {
            node.datacenter = datacenter;
            node.rack = rack;
        }
        Ok(id)
    }

    /// Remove a server and every vnode token it owns.
    ///
    /// Returns `true` if the server was present. Keys it owned are
    /// repointed to their clockwise predecessor server.
    pub fn remove_server(&self, id: NodeId) -> bool {
        let Some((_, node)) = self.nodes.remove(&id) else {
            return false;
        };
        let base = node.address();

        let mut inner = self.inner.write();
        let count = inner.vnode_counts.remove(&id).unwrap_or(0);
        for index in 0..count {
            let key = VirtualNode::address_key(&base, index);
            let token = self.algorithm.hash(&key);
            inner.vnodes.remove(&token);
        }
        if !inner.vnodes.is_empty() {
            inner.update_ranges();
        }
        inner.remap_keys_removed(id);
        true
    }

    /// Resolve which server *would* own `key` right now, via clockwise
    /// predecessor search, independent of whether `key` was ever tracked
    /// with [`Self::add_key`]. `None` only when the ring has no servers.
    /// See [`Self::tracked_owner`] for the narrower, tracking-only
    /// `lookup_key` contract.
    pub fn lookup_key(&self, key: &str) -> Option<NodeId> {
        let token = self.algorithm.hash(key);
        self.inner.read().predecessor(token).map(|s| s.node_id)
    }

    /// Same as [`Self::lookup_key`], returning the server's metadata.
    pub fn lookup_node(&self, key: &str) -> Option<Node> {
        let id = self.lookup_key(key)?;
        self.nodes.get(&id).map(|n| n.clone())
    }

    /// Resolve the server registered at exactly `ip:port`, or `None` if no
    /// server owns that precise address-derived slot.
    ///
    /// Unlike [`Self::lookup_node`], this does not fall back to the
    /// clockwise predecessor of a vacant slot: it validates that a SERVER
    /// element actually occupies the token `ip:port` hashes to, matching
    /// `hashring_lookupserver`'s type check on the looked-up slot.
    pub fn lookup_server(&self, ip: &str, port: u16) -> Option<Node> {
        let token = self.algorithm.hash(&format!("{}:{}", ip, port));
        let node_id = self.inner.read().vnodes.get(&token).map(|slot| slot.node_id)?;
        self.nodes.get(&node_id).map(|n| n.clone())
    }

    pub fn get_node(&self, id: &NodeId) -> Option<Node> {
        self.nodes.get(id).map(|n| n.clone())
    }

    /// Explicitly track `key` as installed in the ring, caching its current
    /// owner so later server joins/leaves can remap it.
    ///
    /// Fails with [`Error::EmptyRing`] if there are no servers to own it, or
    /// [`Error::SlotCollision`] if another tracked key already hashes to the
    /// same token.
    pub fn add_key(&self, key: &str) -> Result<NodeId> {
        let mut inner = self.inner.write();
        let token = self.algorithm.hash(key);
        let owner = inner.predecessor(token).map(|s| s.node_id).ok_or(Error::EmptyRing)?;
        if inner.vnodes.contains_key(&token) || inner.keys.contains_key(&token) {
            return Err(Error::SlotCollision { hash: token });
        }
        inner.keys.insert(token, KeySlot { owner });
        Ok(owner)
    }

    /// Resolve `key` only if it has been explicitly tracked by a prior
    /// [`Self::add_key`]: the literal `lookup_key(key) -> KEY slot | empty`
    /// contract, as opposed to [`Self::lookup_key`]'s generalized "who
    /// would own this" resolution used for diagnostics.
    pub fn tracked_owner(&self, key: &str) -> Option<Node> {
        let token = self.algorithm.hash(key);
        let owner = self.inner.read().keys.get(&token).map(|slot| slot.owner)?;
        self.nodes.get(&owner).map(|n| n.clone())
    }

    /// Stop tracking `key`. Fails with [`Error::KeyNotFound`] if it was
    /// never tracked.
    pub fn remove_key(&self, key: &str) -> Result<()> {
        let token = self.algorithm.hash(key);
        let mut inner = self.inner.write();
        if inner.keys.remove(&token).is_none() {
            return Err(Error::KeyNotFound {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        let token = self.algorithm.hash(key);
        self.inner.read().keys.contains_key(&token)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.inner.read().vnodes.len()
    }

    /// Snapshot of every token -> server mapping, sorted by token.
    pub fn tokens(&self) -> Vec<(u32, NodeId)> {
        self.inner
            .read()
            .vnodes
            .iter()
            .map(|(t, slot)| (*t, slot.node_id))
            .collect()
    }

    /// Snapshot of every registered server.
    pub fn nodes(&self) -> Vec<Node> {
        self.nodes.iter().map(|e| e.value().clone()).collect()
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent constructor for a [`HashRing`], mirroring the reference processes'
/// startup flow of seeding a ring with a weighted list of store addresses.
pub struct RingBuilder {
    algorithm: HashAlgorithm,
    default_vnodes: usize,
    servers: Vec<(String, u16, usize)>,
}

impl RingBuilder {
    pub fn new() -> Self {
        Self {
            algorithm: HashAlgorithm::Jenkins,
            default_vnodes: DEFAULT_VNODES,
            servers: Vec::new(),
        }
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Set the vnode count used by servers added without an explicit count.
    pub fn with_vnodes(mut self, vnodes: usize) -> Self {
        self.default_vnodes = vnodes;
        self
    }

    pub fn add_server(mut self, ip: impl Into<String>, port: u16) -> Self {
        let vnodes = self.default_vnodes;
        self.servers.push((ip.into(), port, vnodes));
        self
    }

    pub fn add_server_with_vnodes(mut self, ip: impl Into<String>, port: u16, vnodes: usize) -> Self {
        self.servers.push((ip.into(), port, vnodes));
        self
    }

    /// Build the ring, adding every queued server in order.
    ///
    /// Fails on the first [`Error::SlotCollision`] encountered; servers
    /// queued after the failing one are never added.
    pub fn build(self) -> Result<HashRing> {
        let ring = HashRing::with_algorithm(self.algorithm);
        for (ip, port, vnodes) in self.servers {
            ring.add_server(&ip, port, vnodes)?;
        }
        Ok(ring)
    }
}

impl Default for RingBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ring_has_no_lookups() {
        let ring = HashRing::new();
        assert_eq!(ring.lookup_key("key1"), None);
        assert_eq!(ring.node_count(), 0);
        assert_eq!(ring.token_count(), 0);
    }

    #[test]
    fn add_key_on_empty_ring_fails() {
        let ring = HashRing::new();
        assert_eq!(ring.add_key("key1"), Err(Error::EmptyRing));
    }

    #[test]
    fn add_and_lookup_single_server() {
        let ring = HashRing::new();
        let id = ring.add_server("127.0.0.1", 7000, 4).unwrap();
        assert_eq!(ring.node_count(), 1);
        assert_eq!(ring.token_count(), 5); // 1 primary + 4 virtuals
        assert_eq!(ring.lookup_key("any-key"), Some(id));
    }

    #[test]
    fn duplicate_server_is_a_collision() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();
        let err = ring.add_server("127.0.0.1", 7000, 4).unwrap_err();
        assert!(matches!(err, Error::SlotCollision { .. }));
        // the failed second add must not have left partial state behind
        assert_eq!(ring.token_count(), 5);
    }

    #[test]
    fn remove_server_drops_its_tokens() {
        let ring = HashRing::new();
        let a = ring.add_server("127.0.0.1", 7000, 4).unwrap();
        ring.add_server("127.0.0.1", 7001, 4).unwrap();
        assert_eq!(ring.token_count(), 10);

        assert!(ring.remove_server(a));
        assert_eq!(ring.node_count(), 1);
        assert_eq!(ring.token_count(), 5);
        assert!(ring.get_node(&a).is_none());
    }

    #[test]
    fn removing_unknown_server_is_a_noop() {
        let ring = HashRing::new();
        assert!(!ring.remove_server(NodeId(12345)));
    }

    #[test]
    fn lookup_is_consistent_for_same_key() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 16).unwrap();
        ring.add_server("127.0.0.1", 7001, 16).unwrap();
        let a = ring.lookup_key("stable-key");
        let b = ring.lookup_key("stable-key");
        assert_eq!(a, b);
    }

    #[test]
    fn key_tracking_roundtrips() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();
        let owner = ring.add_key("user:42").unwrap();
        assert!(ring.contains_key("user:42"));
        assert_eq!(ring.lookup_key("user:42"), Some(owner));
        ring.remove_key("user:42").unwrap();
        assert!(!ring.contains_key("user:42"));
    }

    #[test]
    fn remove_key_unknown_fails() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();
        assert!(matches!(ring.remove_key("missing"), Err(Error::KeyNotFound { .. })));
    }

    #[test]
    fn key_remaps_to_predecessor_when_its_owner_leaves() {
        let ring = HashRing::new();
        let first = ring.add_server("127.0.0.1", 7000, 32).unwrap();
        let second = ring.add_server("127.0.0.1", 7001, 32).unwrap();
        ring.add_key("user:1").unwrap();

        let before = ring.lookup_key("user:1").unwrap();
        let survivor = if before == first { second } else { first };
        ring.remove_server(before);

        let after = ring.lookup_key("user:1").unwrap();
        assert_eq!(after, survivor);
    }

    #[test]
    fn ranges_cover_the_whole_space_without_overlap() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 8).unwrap();
        ring.add_server("127.0.0.1", 7001, 8).unwrap();
        ring.add_server("127.0.0.1", 7002, 8).unwrap();

        let inner = ring.inner.read();
        let slots: Vec<ServerSlot> = inner.vnodes.values().copied().collect();
        let mut covered: u64 = 0;
        for slot in &slots {
            let span = if slot.range_start <= slot.range_end {
                (slot.range_end - slot.range_start + 1) as u64
            } else {
                (RING_SIZE - slot.range_start) as u64 + (slot.range_end + 1) as u64
            };
            covered += span;
        }
        assert_eq!(covered, RING_SIZE as u64);
    }

    #[test]
    fn builder_adds_all_queued_servers() {
        let ring = RingBuilder::new()
            .with_vnodes(8)
            .add_server("127.0.0.1", 7000)
            .add_server_with_vnodes("127.0.0.1", 7001, 16)
            .build()
            .unwrap();
        assert_eq!(ring.node_count(), 2);
        assert_eq!(ring.token_count(), 26); // (8+1) + (16+1)
    }

    #[test]
    fn builder_stops_at_first_collision() {
        let result = RingBuilder::new()
            .add_server("127.0.0.1", 7000)
            .add_server("127.0.0.1", 7000)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn partitioner_name_reflects_algorithm() {
        let djb2_ring = HashRing::with_algorithm(HashAlgorithm::Djb2);
        assert_eq!(djb2_ring.partitioner_name(), "djb2");
        let jenkins_ring = HashRing::new();
        assert_eq!(jenkins_ring.partitioner_name(), "jenkins");
    }

    #[test]
    fn tracked_owner_is_none_until_add_key() {
        let ring = HashRing::new();
        let id = ring.add_server("127.0.0.1", 7000, 4).unwrap();
        assert_eq!(ring.tracked_owner("never-set"), None);

        ring.add_key("never-set").unwrap();
        assert_eq!(ring.tracked_owner("never-set").map(|n| n.id), Some(id));
    }

    #[test]
    fn lookup_key_succeeds_without_tracking_but_tracked_owner_does_not() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();
        assert!(ring.lookup_key("anything").is_some());
        assert!(ring.tracked_owner("anything").is_none());
    }

    #[test]
    fn lookup_server_requires_exact_address_match() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();
        assert!(ring.lookup_server("127.0.0.1", 7000).is_some());
        assert!(ring.lookup_server("127.0.0.1", 9999).is_none());
    }

    #[test]
    fn add_key_colliding_with_a_server_slot_fails() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 1).unwrap();
        // A server's own address hashes to exactly its primary token, so
        // adding it as a key collides with that SERVER slot.
        assert!(matches!(
            ring.add_key("127.0.0.1:7000"),
            Err(Error::SlotCollision { .. })
        ));
    }
}
