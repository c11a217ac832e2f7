//! Read-only ring topology views, for diagnostics and the CLI's `describe`
//! output.

use std::collections::HashMap;

use crate::node::NodeId;
use crate::ring::HashRing;

/// Lightweight, read-only wrapper around a [`HashRing`] for inspection.
///
/// Every operation here takes a read lock and walks the token table; none of
/// them mutate the ring.
#[derive(Clone)]
pub struct Topology<'a> {
    ring: &'a HashRing,
}

impl<'a> Topology<'a> {
    pub fn new(ring: &'a HashRing) -> Self {
        Self { ring }
    }

    /// Tokens owned by each server, sorted ascending.
    pub fn ownership(&self) -> HashMap<NodeId, Vec<u32>> {
        let mut ownership: HashMap<NodeId, Vec<u32>> = HashMap::new();
        for (token, node_id) in self.ring.tokens() {
            ownership.entry(node_id).or_default().push(token);
        }
        for tokens in ownership.values_mut() {
            tokens.sort_unstable();
        }
        ownership
    }

    /// Fraction of the ring's tokens (0.0-100.0) each server owns.
    pub fn ownership_percentages(&self) -> HashMap<NodeId, f64> {
        let ownership = self.ownership();
        let total = self.ring.token_count() as f64;
        if total == 0.0 {
            return HashMap::new();
        }
        ownership
            .into_iter()
            .map(|(id, tokens)| (id, tokens.len() as f64 / total * 100.0))
            .collect()
    }

    /// Human-readable summary of the ring's current membership and balance.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        out.push_str("Ring Description:\n");
        out.push_str(&format!("  Servers: {}\n", self.ring.node_count()));
        out.push_str(&format!("  Total tokens: {}\n", self.ring.token_count()));
        out.push_str(&format!("  Algorithm: {}\n", self.ring.partitioner_name()));

        let percentages = self.ownership_percentages();
        let ownership = self.ownership();
        if !percentages.is_empty() {
            out.push_str("\nServer ownership:\n");
            let mut entries: Vec<_> = percentages.iter().collect();
            entries.sort_by_key(|(id, _)| **id);
            for (id, pct) in entries {
                let node = self.ring.get_node(id);
                let address = node
                    .as_ref()
                    .map(|n| n.address())
                    .unwrap_or_else(|| "unknown".to_string());
                let tokens = ownership.get(id).map(|v| v.len()).unwrap_or(0);
                out.push_str(&format!(
                    "  {} ({}): {} tokens ({:.2}%)\n",
                    id, address, tokens, pct
                ));
            }
        }
        out
    }

    pub fn ring(&self) -> &HashRing {
        self.ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_splits_tokens_per_server() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();
        ring.add_server("127.0.0.1", 7001, 4).unwrap();

        let topology = Topology::new(&ring);
        let ownership = topology.ownership();
        assert_eq!(ownership.len(), 2);
        assert_eq!(ownership.values().map(|v| v.len()).sum::<usize>(), 8);
    }

    #[test]
    fn percentages_sum_to_roughly_one_hundred() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 64).unwrap();
        ring.add_server("127.0.0.1", 7001, 64).unwrap();

        let topology = Topology::new(&ring);
        let total: f64 = topology.ownership_percentages().values().sum();
        assert!((total - 100.0).abs() < 0.001);
    }

    #[test]
    fn describe_mentions_registered_servers() {
        let ring = HashRing::new();
        ring.add_server("127.0.0.1", 7000, 4).unwrap();

        let topology = Topology::new(&ring);
        let description = topology.describe();
        assert!(description.contains("Ring Description"));
        assert!(description.contains("127.0.0.1:7000"));
    }
}
