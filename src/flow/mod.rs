pub mod edge;
pub mod node;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use edge::FlowEdge;
use node::{FlowNode, NodeKind};

/// The complete parse result: flat node and edge lists in renderer order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl FlowGraph {
    /// The degraded result used whenever a parse fails: empty, never partial.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Count nodes broken down by kind.
    pub fn nodes_by_kind(&self) -> HashMap<NodeKind, usize> {
        let mut map: HashMap<NodeKind, usize> = HashMap::new();
        for n in &self.nodes {
            *map.entry(n.kind).or_insert(0) += 1;
        }
        map
    }

    /// Edges whose source or target id is missing from the node list.
    ///
    /// An empty return is a graph invariant; the integration suite asserts it
    /// for every produced graph.
    pub fn dangling_edges(&self) -> Vec<&FlowEdge> {
        let ids: HashSet<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        self.edges
            .iter()
            .filter(|e| !ids.contains(e.source.as_str()) || !ids.contains(e.target.as_str()))
            .collect()
    }

    /// Duplicate node ids, if any. Same invariant status as [`dangling_edges`].
    ///
    /// [`dangling_edges`]: FlowGraph::dangling_edges
    pub fn duplicate_node_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter(|n| !seen.insert(n.id.as_str()))
            .map(|n| n.id.as_str())
            .collect()
    }
}
