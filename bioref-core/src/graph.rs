//! Coreference-augmented semantic graph.
//!
//! A directed graph over semantic item handles with role-labelled edges.
//! It is an auxiliary index: the resolver uses it to detect two-node cycles
//! and the composer follows it to substitute antecedents for anaphors.
//!
//! # Chains
//!
//! Registering a coreference chain decomposes it:
//!
//! ```text
//! anaphor ──Antecedent──▶ referent
//!    │
//!    └──Coref──▶ further expression
//! ```
//!
//! The first expression becomes the anchor. Self-referential edges are
//! rejected, never inserted.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use std::collections::HashMap;

use crate::semantics::{ItemId, RelationData};

/// Edge label linking additional expressions to a chain anchor.
pub const COREF_LABEL: &str = "Coref";

/// Directed, role-labelled graph over semantic items.
#[derive(Debug, Clone, Default)]
pub struct SemanticGraph {
    graph: DiGraph<ItemId, String>,
    nodes: HashMap<ItemId, NodeIndex>,
}

impl SemanticGraph {
    /// Empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an item as a node. Idempotent.
    pub fn add_node(&mut self, id: ItemId) -> NodeIndex {
        if let Some(index) = self.nodes.get(&id) {
            return *index;
        }
        let index = self.graph.add_node(id);
        self.nodes.insert(id, index);
        index
    }

    /// Add `parent --label--> child`.
    ///
    /// Returns false without touching the graph when the edge would be a
    /// self-loop or already exists.
    pub fn add_edge(&mut self, parent: ItemId, child: ItemId, label: &str) -> bool {
        if parent == child {
            log::debug!("rejected self-referential '{label}' edge on {parent}");
            return false;
        }
        if self.has_edge(parent, child, label) {
            return false;
        }
        let p = self.add_node(parent);
        let c = self.add_node(child);
        self.graph.add_edge(p, c, label.to_string());
        true
    }

    /// Decompose a coreference chain into anchor edges. Returns the anchor,
    /// or `None` for relations that are not chains.
    pub fn add_chain(&mut self, chain: &RelationData) -> Option<ItemId> {
        let coreference_type = chain.coreference_type()?;
        let expressions = chain.expressions();
        let anchor = *expressions.first()?;
        self.add_node(anchor);
        for other in expressions.iter().skip(1) {
            self.add_edge(anchor, *other, COREF_LABEL);
        }
        for referent in chain.referents() {
            self.add_edge(anchor, referent, coreference_type.referent_role());
        }
        Some(anchor)
    }

    /// True if the item is a node.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// True if the labelled edge exists.
    #[must_use]
    pub fn has_edge(&self, parent: ItemId, child: ItemId, label: &str) -> bool {
        self.outgoing(parent)
            .iter()
            .any(|(target, l)| *target == child && *l == label)
    }

    /// Outgoing `(child, label)` pairs in insertion order.
    #[must_use]
    pub fn outgoing(&self, id: ItemId) -> Vec<(ItemId, &str)> {
        self.neighbors(id, Direction::Outgoing)
    }

    /// Incoming `(parent, label)` pairs in insertion order.
    #[must_use]
    pub fn incoming(&self, id: ItemId) -> Vec<(ItemId, &str)> {
        self.neighbors(id, Direction::Incoming)
    }

    fn neighbors(&self, id: ItemId, direction: Direction) -> Vec<(ItemId, &str)> {
        let Some(index) = self.nodes.get(&id) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(*index, direction)
            .map(|e| {
                let other = match direction {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), self.graph[other], e.weight().as_str())
            })
            .collect();
        // petgraph walks adjacency lists newest first
        edges.sort_by_key(|(edge, _, _)| *edge);
        edges.into_iter().map(|(_, item, label)| (item, label)).collect()
    }

    /// First child reached over a `label` edge.
    #[must_use]
    pub fn follow(&self, id: ItemId, label: &str) -> Option<ItemId> {
        self.outgoing(id)
            .into_iter()
            .find(|(_, l)| *l == label)
            .map(|(child, _)| child)
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.graph.node_indices().map(|i| self.graph[i])
    }

    /// Export to NetworkX node-link JSON.
    ///
    /// ```python
    /// import networkx as nx, json
    /// G = nx.node_link_graph(json.loads(data))
    /// ```
    #[must_use]
    pub fn to_networkx_json(&self) -> String {
        #[derive(Serialize)]
        struct NetworkXGraph {
            directed: bool,
            multigraph: bool,
            nodes: Vec<NetworkXNode>,
            links: Vec<NetworkXLink>,
        }

        #[derive(Serialize)]
        struct NetworkXNode {
            id: u32,
        }

        #[derive(Serialize)]
        struct NetworkXLink {
            source: u32,
            target: u32,
            role: String,
        }

        let graph = NetworkXGraph {
            directed: true,
            multigraph: true,
            nodes: self.nodes().map(|id| NetworkXNode { id: id.0 }).collect(),
            links: self
                .graph
                .edge_indices()
                .filter_map(|e| {
                    let (s, t) = self.graph.edge_endpoints(e)?;
                    Some(NetworkXLink {
                        source: self.graph[s].0,
                        target: self.graph[t].0,
                        role: self.graph[e].clone(),
                    })
                })
                .collect(),
        };
        serde_json::to_string_pretty(&graph).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coref_type::CoreferenceType;
    use crate::semantics::{Argument, RelationKind};

    fn chain(t: CoreferenceType, exprs: &[u32], refs: &[u32]) -> RelationData {
        RelationData {
            kind: RelationKind::CoreferenceChain(t),
            arguments: exprs
                .iter()
                .map(|e| Argument::new(t.expression_role(), ItemId(*e)))
                .chain(refs.iter().map(|r| Argument::new(t.referent_role(), ItemId(*r))))
                .collect(),
        }
    }

    #[test]
    fn test_self_loop_is_rejected() {
        let mut g = SemanticGraph::new();
        assert!(!g.add_edge(ItemId(1), ItemId(1), "Antecedent"));
        assert_eq!(g.edge_count(), 0);
        assert!(g.add_edge(ItemId(1), ItemId(2), "Antecedent"));
        assert!(!g.add_edge(ItemId(1), ItemId(2), "Antecedent"));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_chain_decomposition() {
        let mut g = SemanticGraph::new();
        let anchor = g
            .add_chain(&chain(CoreferenceType::Anaphora, &[5, 6], &[1, 2]))
            .unwrap();
        assert_eq!(anchor, ItemId(5));
        assert_eq!(
            g.outgoing(ItemId(5)),
            vec![
                (ItemId(6), COREF_LABEL),
                (ItemId(1), "Antecedent"),
                (ItemId(2), "Antecedent")
            ]
        );
        assert_eq!(g.follow(ItemId(5), "Antecedent"), Some(ItemId(1)));
        assert_eq!(g.incoming(ItemId(1)), vec![(ItemId(5), "Antecedent")]);
    }

    #[test]
    fn test_ontological_chain_uses_first_argument_as_anchor() {
        let mut g = SemanticGraph::new();
        let anchor = g
            .add_chain(&chain(CoreferenceType::Ontological, &[3], &[4]))
            .unwrap();
        assert_eq!(anchor, ItemId(3));
        assert_eq!(g.follow(ItemId(3), "Equiv"), Some(ItemId(4)));
    }

    #[test]
    fn test_networkx_export() {
        let mut g = SemanticGraph::new();
        g.add_edge(ItemId(1), ItemId(2), "Antecedent");
        let json: serde_json::Value = serde_json::from_str(&g.to_networkx_json()).unwrap();
        assert_eq!(json["directed"], true);
        assert_eq!(json["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(json["links"][0]["role"], "Antecedent");
    }
}
