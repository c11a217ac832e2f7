//! Node abstractions for the consistent hash ring.
//!
//! A node is a physical server, addressed by `ip:port`. Its `NodeId` is
//! derived deterministically from that address (hashed with the ring's own
//! algorithm), so two rings built with the same algorithm agree on the id of
//! a given address without any coordination.

use std::fmt;

/// Compact identifier for a server in the cluster.
///
/// Newtype over `u32` so comparisons and hashing are cheap. The value is the
/// ring-space hash of the server's `ip:port` address, not an externally
/// assigned sequence number.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

/// A physical server participating in the ring.
///
/// Keep this struct small and cheap to clone; connection state, retry
/// counters and the like belong to the caller, not here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// Address this node listens on.
    pub ip: String,
    pub port: u16,
    /// Optional data center label, carried for topology reporting.
    pub datacenter: Option<String>,
    /// Optional rack label, carried for topology reporting.
    pub rack: Option<String>,
}

impl Node {
    /// Construct a node from its address. `id` is computed by the ring at
    /// insertion time, since it depends on the ring's hash algorithm.
    pub fn new(id: NodeId, ip: impl Into<String>, port: u16) -> Self {
        Self {
            id,
            ip: ip.into(),
            port,
            datacenter: None,
            rack: None,
        }
    }

    pub fn with_topology(
        id: NodeId,
        ip: impl Into<String>,
        port: u16,
        datacenter: impl Into<Option<String>>,
        rack: impl Into<Option<String>>,
    ) -> Self {
        Self {
            id,
            ip: ip.into(),
            port,
            datacenter: datacenter.into(),
            rack: rack.into(),
        }
    }

    /// Canonical `ip:port` address string, used as the ring's primary hash
    /// key for this node.
    pub fn address(&self) -> String {
        format!("{}:{}", self.ip, self.port)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.address(), self.id)
    }
}
