//! Work package relation graph.
//!
//! A relation is stored once on the server but read from both ends. For a
//! given work package, outbound edges are keyed by the relation's forward
//! type and inbound edges by its reverse type, so that both maps read
//! naturally from the work package's point of view.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::Relation;

/// Relation type name mapped to the peer work package ids, in input order.
pub type RelationMap = BTreeMap<String, Vec<u64>>;

/// Inbound and outbound adjacency of a single work package.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RelationGraph {
    /// Edges where the work package is the `from` end, keyed by forward type.
    pub outbound: RelationMap,
    /// Edges where the work package is the `to` end, keyed by reverse type.
    pub inbound: RelationMap,
}

impl RelationGraph {
    /// Compute the adjacency of `work_package_id` from a relation list.
    ///
    /// Relations not touching the work package are ignored. Peer ids are not
    /// deduplicated.
    pub fn build(work_package_id: u64, relations: &[Relation]) -> Self {
        let mut graph = Self::default();

        for relation in relations {
            if relation.from_id == Some(work_package_id) {
                if let (Some(kind), Some(peer)) = (&relation.relation_type, relation.to_id) {
                    graph.outbound.entry(kind.clone()).or_default().push(peer);
                }
            }
            if relation.to_id == Some(work_package_id) {
                if let (Some(kind), Some(peer)) = (&relation.reverse_type, relation.from_id) {
                    graph.inbound.entry(kind.clone()).or_default().push(peer);
                }
            }
        }

        graph
    }

    pub fn is_empty(&self) -> bool {
        self.outbound.is_empty() && self.inbound.is_empty()
    }
}
