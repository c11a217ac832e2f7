//! Integration tests for the hash ring: membership, lookup, and key
//! tracking across server joins and removals.

use corelib::node::NodeId;
use corelib::ring::{HashRing, RingBuilder};

#[test]
fn empty_ring_lookup() {
    let ring = HashRing::new();
    assert_eq!(ring.lookup_key("key1"), None);
    assert_eq!(ring.lookup_node("key1"), None);
    assert_eq!(ring.node_count(), 0);
    assert_eq!(ring.token_count(), 0);
}

#[test]
fn add_server_and_lookup() {
    let ring = HashRing::new();
    let id = ring.add_server("10.0.0.1", 7000, 4).unwrap();

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 5); // 1 primary + 4 virtuals

    let owner = ring.lookup_key("test-key");
    assert_eq!(owner, Some(id));

    let node = ring.lookup_node("test-key").unwrap();
    assert_eq!(node.id, id);
    assert_eq!(ring.get_node(&id).unwrap().id, id);
}

#[test]
fn remove_server_shrinks_ring() {
    let ring = HashRing::new();
    let a = ring.add_server("10.0.0.1", 7000, 4).unwrap();
    let b = ring.add_server("10.0.0.2", 7000, 4).unwrap();

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 10);

    assert!(ring.remove_server(a));
    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 5);

    assert_eq!(ring.lookup_key("some-key"), Some(b));
    assert!(ring.get_node(&a).is_none());
    assert!(ring.get_node(&b).is_some());

    assert!(!ring.remove_server(NodeId(999)));
}

#[test]
fn multiple_servers_all_reachable() {
    let ring = HashRing::new();
    ring.add_server("10.0.0.1", 7000, 8).unwrap();
    ring.add_server("10.0.0.2", 7000, 8).unwrap();
    ring.add_server("10.0.0.3", 7000, 8).unwrap();

    assert_eq!(ring.node_count(), 3);
    assert_eq!(ring.token_count(), 27); // 3 servers * (8+1) tokens each

    for key in ["key1", "key2", "key3"] {
        let owner = ring.lookup_key(key);
        assert!(owner.is_some());
        assert!(ring.get_node(&owner.unwrap()).is_some());
    }
}

#[test]
fn lookup_is_stable_across_repeated_calls() {
    let ring = HashRing::new();
    ring.add_server("10.0.0.1", 7000, 8).unwrap();
    ring.add_server("10.0.0.2", 7000, 8).unwrap();

    let a = ring.lookup_key("consistent-key");
    let b = ring.lookup_key("consistent-key");
    let c = ring.lookup_key("consistent-key");
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[test]
fn builder_default_vnodes() {
    let ring = RingBuilder::new()
        .add_server("10.0.0.1", 7000)
        .add_server("10.0.0.2", 7000)
        .build()
        .unwrap();

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 258); // 2 servers * (128 default vnodes + 1 primary)
    assert!(ring.lookup_key("key").is_some());
}

#[test]
fn builder_custom_vnodes() {
    let ring = RingBuilder::new()
        .with_vnodes(8)
        .add_server("10.0.0.1", 7000)
        .add_server("10.0.0.2", 7000)
        .build()
        .unwrap();

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 18); // 2 servers * (8+1)
}

#[test]
fn builder_mixed_vnode_counts() {
    let ring = RingBuilder::new()
        .with_vnodes(4)
        .add_server("10.0.0.1", 7000)
        .add_server_with_vnodes("10.0.0.2", 7000, 8)
        .build()
        .unwrap();

    assert_eq!(ring.node_count(), 2);
    assert_eq!(ring.token_count(), 14); // (4+1) + (8+1)
}

#[test]
fn builder_fails_on_duplicate_address() {
    let result = RingBuilder::new()
        .add_server("10.0.0.1", 7000)
        .add_server("10.0.0.1", 7000)
        .build();
    assert!(result.is_err());
}

#[test]
fn single_server_owns_every_key() {
    let ring = HashRing::new();
    let id = ring.add_server("10.0.0.1", 7000, 4).unwrap();

    for key in ["key1", "key2", "key3", "a-rather-long-key-name"] {
        assert_eq!(ring.lookup_key(key), Some(id));
    }
}

#[test]
fn add_remove_add_is_stable() {
    let ring = HashRing::new();
    let id = ring.add_server("10.0.0.1", 7000, 4).unwrap();
    assert_eq!(ring.node_count(), 1);

    assert!(ring.remove_server(id));
    assert_eq!(ring.node_count(), 0);

    let id2 = ring.add_server("10.0.0.1", 7000, 4).unwrap();
    assert_eq!(ring.node_count(), 1);
    assert_eq!(id, id2); // same address hashes to the same id
    assert!(ring.lookup_key("key").is_some());
}

#[test]
fn duplicate_add_is_rejected_not_doubled() {
    let ring = HashRing::new();
    ring.add_server("10.0.0.1", 7000, 4).unwrap();
    assert_eq!(ring.token_count(), 5);

    assert!(ring.add_server("10.0.0.1", 7000, 4).is_err());
    assert_eq!(ring.token_count(), 5);
    assert_eq!(ring.node_count(), 1);
}

#[test]
fn nodes_snapshot_lists_every_server() {
    let ring = HashRing::new();
    let a = ring.add_server("10.0.0.1", 7000, 4).unwrap();
    let b = ring.add_server("10.0.0.2", 7000, 4).unwrap();

    let nodes = ring.nodes();
    assert_eq!(nodes.len(), 2);
    let ids: Vec<NodeId> = nodes.iter().map(|n| n.id).collect();
    assert!(ids.contains(&a));
    assert!(ids.contains(&b));
}

#[test]
fn tokens_snapshot_all_map_to_the_one_server() {
    let ring = HashRing::new();
    let id = ring.add_server("10.0.0.1", 7000, 4).unwrap();

    let tokens = ring.tokens();
    assert_eq!(tokens.len(), 5);
    for (_, owner) in tokens {
        assert_eq!(owner, id);
    }
}

#[test]
fn partitioner_name_reports_algorithm() {
    let ring = HashRing::new();
    assert_eq!(ring.partitioner_name(), "jenkins");
}

#[test]
fn key_tracking_survives_a_server_join() {
    let ring = HashRing::new();
    ring.add_server("10.0.0.1", 7000, 32).unwrap();
    ring.add_key("user:1").unwrap();
    assert!(ring.contains_key("user:1"));

    ring.add_server("10.0.0.2", 7000, 32).unwrap();
    // key is still tracked and still resolves to a live server, whether or
    // not ownership moved to the new one
    assert!(ring.contains_key("user:1"));
    assert!(ring.lookup_key("user:1").is_some());
}

#[test]
fn key_remaps_to_predecessor_after_owner_removed() {
    let ring = HashRing::new();
    let first = ring.add_server("10.0.0.1", 7000, 32).unwrap();
    let second = ring.add_server("10.0.0.2", 7000, 32).unwrap();
    ring.add_key("user:1").unwrap();

    let before = ring.lookup_key("user:1").unwrap();
    let survivor = if before == first { second } else { first };
    ring.remove_server(before);

    let after = ring.lookup_key("user:1").unwrap();
    assert_ne!(before, after);
    assert_eq!(after, survivor);
}

/// Testable Property 4: removing the same server twice yields ok then
/// missing, and leaves the ring exactly as it was minus that one server.
#[test]
fn removing_a_server_twice_is_idempotent() {
    let ring = HashRing::new();
    let a = ring.add_server("10.0.0.1", 7000, 16).unwrap();
    ring.add_server("10.0.0.2", 7000, 16).unwrap();

    assert!(ring.remove_server(a));
    assert!(!ring.remove_server(a));

    assert_eq!(ring.node_count(), 1);
    assert_eq!(ring.token_count(), 17); // 1 primary + 16 virtuals
    assert!(ring.get_node(&a).is_none());
}

/// Testable Property 6: removing a primary server removes exactly its
/// virtual-node count of further slots (plus the primary itself).
#[test]
fn removing_a_server_cascades_its_virtual_nodes() {
    let ring = HashRing::new();
    ring.add_server("10.0.0.1", 7000, 8).unwrap();
    let b = ring.add_server("10.0.0.2", 7000, 16).unwrap();
    assert_eq!(ring.token_count(), 26); // (8+1) + (16+1)

    ring.remove_server(b);
    assert_eq!(ring.token_count(), 9); // 1 primary + 8 virtuals remain
    assert_eq!(ring.node_count(), 1);
}
