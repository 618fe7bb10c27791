//! Deterministic layered layout.
//!
//! Positions are assigned per scope: value/flow nodes are ranked left-to-right
//! by their longest incoming edge path (petgraph toposort over the scope's
//! subgraph), definition nodes sit in a dedicated column on the left, and the
//! native-API sentinel is pinned top-right. The same graph shape always
//! produces the same positions; edges are never touched.

use std::collections::{BTreeMap, HashMap};

use petgraph::Directed;
use petgraph::algo::toposort;
use petgraph::graph::{Graph, NodeIndex};

use crate::flow::FlowGraph;
use crate::flow::edge::FlowEdge;
use crate::flow::node::{FlowNode, NodeKind, Position};

/// Spacing knobs, overridable from `code-flow.toml`.
#[derive(Debug, Clone)]
pub struct LayoutOptions {
    /// Vertical gap between nodes sharing a rank.
    pub node_sep: f64,
    /// Horizontal gap between ranks.
    pub rank_sep: f64,
    /// Outer margin applied to every scope.
    pub margin: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            node_sep: 60.0,
            rank_sep: 100.0,
            margin: 50.0,
        }
    }
}

/// Column where definition nodes stack, left of the flow area.
const DEFINITION_COLUMN_X: f64 = -600.0;
const DEFINITION_ROW_HEIGHT: f64 = 400.0;
/// Fixed position of the native-API sentinel.
const NATIVE_API_POSITION: Position = Position { x: 500.0, y: -200.0 };

/// Rendered footprint of a node, by kind and payload.
fn node_size(node: &FlowNode) -> (f64, f64) {
    match node.kind {
        NodeKind::Logic => (50.0, 50.0),
        NodeKind::Literal => (180.0, 60.0),
        NodeKind::Variable => {
            let tall = node.data.nested_call.is_some()
                || node.data.value.as_deref() == Some("(computed)");
            (320.0, if tall { 180.0 } else { 120.0 })
        }
        NodeKind::FunctionCall | NodeKind::Method => {
            let arg_count = node.data.args.as_ref().map_or(0, Vec::len);
            (350.0, 100.0 + 40.0 * arg_count as f64)
        }
        NodeKind::If | NodeKind::For | NodeKind::While => (250.0, 250.0),
        NodeKind::Class => (
            node.style.as_ref().and_then(|s| s.width).unwrap_or(360.0),
            node.style.as_ref().and_then(|s| s.height).unwrap_or(300.0),
        ),
        _ => (350.0, 150.0),
    }
}

/// Assign positions to every node. Consumes and returns the node list so the
/// caller keeps its edges untouched; pure given the same graph shape.
pub fn layout_nodes(nodes: Vec<FlowNode>, edges: &[FlowEdge], options: &LayoutOptions) -> Vec<FlowNode> {
    let mut nodes = nodes;

    // Scope id -> node indices, in insertion order within each scope.
    // BTreeMap keys keep the scope iteration order stable across runs.
    let mut scopes: BTreeMap<String, Vec<usize>> = BTreeMap::new();
    for (i, node) in nodes.iter().enumerate() {
        if node.kind == NodeKind::NativeApi {
            continue;
        }
        let scope = node.data.scope_id.clone().unwrap_or_else(|| "root".to_owned());
        scopes.entry(scope).or_default().push(i);
    }

    for members in scopes.values() {
        let (definitions, flow): (Vec<usize>, Vec<usize>) = members
            .iter()
            .copied()
            .partition(|&i| nodes[i].data.is_decl == Some(true));

        for (row, &i) in definitions.iter().enumerate() {
            nodes[i].position = Position {
                x: DEFINITION_COLUMN_X,
                y: row as f64 * DEFINITION_ROW_HEIGHT,
            };
        }

        place_flow_nodes(&mut nodes, &flow, edges, options);
    }

    // Containment: children are positioned relative to their parent.
    let absolute: HashMap<String, Position> =
        nodes.iter().map(|n| (n.id.clone(), n.position)).collect();
    for node in &mut nodes {
        if let Some(parent_id) = &node.parent_id
            && let Some(parent_pos) = absolute.get(parent_id)
        {
            node.position.x -= parent_pos.x;
            node.position.y -= parent_pos.y;
        }
    }

    for node in &mut nodes {
        if node.kind == NodeKind::NativeApi {
            node.position = NATIVE_API_POSITION;
        }
    }

    nodes
}

/// Convenience wrapper over a whole graph.
pub fn layout_graph(graph: FlowGraph, options: &LayoutOptions) -> FlowGraph {
    let FlowGraph { nodes, edges } = graph;
    let nodes = layout_nodes(nodes, &edges, options);
    FlowGraph { nodes, edges }
}

fn place_flow_nodes(
    nodes: &mut [FlowNode],
    members: &[usize],
    edges: &[FlowEdge],
    options: &LayoutOptions,
) {
    if members.is_empty() {
        return;
    }

    let mut graph: Graph<usize, (), Directed> = Graph::new();
    let mut indices: HashMap<&str, NodeIndex> = HashMap::new();
    for &i in members {
        let idx = graph.add_node(i);
        indices.insert(nodes[i].id.as_str(), idx);
    }
    for edge in edges {
        if let (Some(&a), Some(&b)) = (
            indices.get(edge.source.as_str()),
            indices.get(edge.target.as_str()),
        ) && a != b
        {
            graph.add_edge(a, b, ());
        }
    }

    // Rank by longest incoming path. A cycle (while-loop back edges and the
    // like) falls back to insertion order, which is still deterministic.
    let mut ranks: HashMap<NodeIndex, usize> = HashMap::new();
    match toposort(&graph, None) {
        Ok(order) => {
            for idx in order {
                let rank = graph
                    .neighbors_directed(idx, petgraph::Direction::Incoming)
                    .filter_map(|pred| ranks.get(&pred))
                    .map(|r| r + 1)
                    .max()
                    .unwrap_or(0);
                ranks.insert(idx, rank);
            }
        }
        Err(_) => {
            for (order, idx) in graph.node_indices().enumerate() {
                ranks.insert(idx, order);
            }
        }
    }

    // Widest node per rank sets the rank's column width.
    let mut rank_widths: BTreeMap<usize, f64> = BTreeMap::new();
    for idx in graph.node_indices() {
        let (w, _) = node_size(&nodes[graph[idx]]);
        let entry = rank_widths.entry(ranks[&idx]).or_insert(0.0);
        *entry = entry.max(w);
    }
    let mut rank_x: BTreeMap<usize, f64> = BTreeMap::new();
    let mut x = options.margin;
    for (&rank, &width) in &rank_widths {
        rank_x.insert(rank, x);
        x += width + options.rank_sep;
    }

    // Stack nodes within a rank in member order.
    let mut rank_y: HashMap<usize, f64> = HashMap::new();
    for &i in members {
        let idx = indices[nodes[i].id.as_str()];
        let rank = ranks[&idx];
        let (_, h) = node_size(&nodes[i]);
        let y = rank_y.entry(rank).or_insert(options.margin);
        nodes[i].position = Position {
            x: rank_x[&rank],
            y: *y,
        };
        *y += h + options.node_sep;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ParseOptions, source_to_flow};

    fn laid_out(source: &str) -> FlowGraph {
        let graph = source_to_flow(source, &ParseOptions::default()).unwrap();
        layout_graph(graph, &LayoutOptions::default())
    }

    #[test]
    fn test_layout_is_deterministic() {
        let source = "const a = 1;\nconst b = a + 2;\nif (b > 1) { act(b); }";
        let first = serde_json::to_value(laid_out(source)).unwrap();
        let second = serde_json::to_value(laid_out(source)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_layout_preserves_edges_and_node_set() {
        let graph = source_to_flow("const a = 1;\nuse(a);", &ParseOptions::default()).unwrap();
        let edges_before = serde_json::to_value(&graph.edges).unwrap();
        let node_count = graph.nodes.len();

        let after = layout_graph(graph, &LayoutOptions::default());
        assert_eq!(serde_json::to_value(&after.edges).unwrap(), edges_before);
        assert_eq!(after.nodes.len(), node_count);
    }

    #[test]
    fn test_definitions_sit_left_of_the_flow() {
        let graph = laid_out("function f(x) { return x; }\nconst y = f(1);");
        let def = graph
            .nodes
            .iter()
            .find(|n| n.data.is_decl == Some(true))
            .unwrap();
        assert_eq!(def.position.x, DEFINITION_COLUMN_X);

        let variable = graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("y"))
            .unwrap();
        assert!(variable.position.x > DEFINITION_COLUMN_X);
    }

    #[test]
    fn test_native_sentinel_is_pinned() {
        let graph = laid_out("console.log('x');");
        let sentinel = graph
            .nodes
            .iter()
            .find(|n| n.kind == NodeKind::NativeApi)
            .unwrap();
        assert_eq!(sentinel.position.x, NATIVE_API_POSITION.x);
        assert_eq!(sentinel.position.y, NATIVE_API_POSITION.y);
    }

    #[test]
    fn test_data_flow_orders_ranks() {
        let graph = laid_out("const a = 1;\nconst b = a + 2;");
        let a = graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("a"))
            .unwrap();
        let logic = graph.nodes.iter().find(|n| n.kind == NodeKind::Logic).unwrap();
        assert!(
            logic.position.x > a.position.x,
            "a feeds the operator, so the operator ranks later"
        );
    }
}
