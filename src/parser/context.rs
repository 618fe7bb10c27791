use std::collections::{HashMap, HashSet};

use crate::flow::edge::{self, EdgeStyle, FlowEdge};
use crate::flow::node::{FlowNode, NodeData, NodeKind, ScopeRef};
use crate::parser::dispatch;
use crate::parser::ids::{IdGenerator, NativeApiSurface};
use crate::syntax::Stmt;

/// Fixed id of the scope every parse starts in.
pub const ROOT_SCOPE: &str = "root";
/// Fixed id of the native-API sentinel node.
pub const NATIVE_API_NODE_ID: &str = "native-api";

/// The mutable builder every handler receives by reference.
///
/// Accumulates nodes and edges, owns the name→node-id resolution table and the
/// scope/parent tracking, and carries the context-local counters. One context
/// is created per parse and discarded after producing its graph; nothing
/// survives across parses.
pub struct GraphContext {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
    /// Name → node id. Prefixed keys partition the namespaces sharing this
    /// table: `decl:<name>` for function/class declarations (enables forward
    /// and self reference), `import:<name>` for imported bindings.
    pub variable_nodes: HashMap<String, String>,
    pub current_scope_id: String,
    /// Containment parent for newly created nodes (a class around its methods).
    pub current_parent_id: Option<String>,
    /// The node owning the scope currently being processed; macro dependency
    /// edges attach to it. `None` at the top level.
    pub scope_owner_id: Option<String>,
    pub is_exporting: bool,
    pub is_exporting_default: bool,
    native_surface: NativeApiSurface,
    ids: IdGenerator,
    scope_counter: u64,
    macro_edges_seen: HashSet<(String, String)>,
}

impl GraphContext {
    /// Fresh context with the native-API sentinel already in place.
    pub fn new(native_surface: NativeApiSurface) -> Self {
        let mut ctx = Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            variable_nodes: HashMap::new(),
            current_scope_id: ROOT_SCOPE.to_owned(),
            current_parent_id: None,
            scope_owner_id: None,
            is_exporting: false,
            is_exporting_default: false,
            native_surface,
            ids: IdGenerator::default(),
            scope_counter: 0,
            macro_edges_seen: HashSet::new(),
        };
        ctx.nodes.push(FlowNode::new(
            NATIVE_API_NODE_ID,
            NodeKind::NativeApi,
            NodeData {
                label: Some("JS Runtime".to_owned()),
                scope_id: Some(ROOT_SCOPE.to_owned()),
                ..NodeData::default()
            },
        ));
        ctx
    }

    pub fn is_native_api(&self, name: &str) -> bool {
        self.native_surface.is_native_api(name)
    }

    /// `prefix-<counter>`, unique for this context's lifetime.
    pub fn generate_id(&mut self, prefix: &str) -> String {
        self.ids.next(prefix)
    }

    /// Push a node, stamping the current scope and containment parent.
    pub fn push_node(&mut self, mut node: FlowNode) {
        if node.data.scope_id.is_none() {
            node.data.scope_id = Some(self.current_scope_id.clone());
        }
        if node.parent_id.is_none() {
            node.parent_id = self.current_parent_id.clone();
        }
        self.nodes.push(node);
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut FlowNode> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    // -----------------------------------------------------------------------
    // Edges
    // -----------------------------------------------------------------------

    /// Solid animated edge — ordinary data/flow connection.
    pub fn add_edge(&mut self, source: &str, target: &str, source_handle: &str, target_handle: &str) {
        let tick = self.ids.tick();
        self.edges.push(FlowEdge {
            id: format!("e-{source}-{source_handle}-to-{target}-{target_handle}-{tick}"),
            source: source.to_owned(),
            source_handle: source_handle.to_owned(),
            target: target.to_owned(),
            target_handle: target_handle.to_owned(),
            animated: true,
            edge_type: None,
            style: EdgeStyle::default_stroke(),
        });
    }

    /// Dashed step edge carrying sequential flow into declarations/imports.
    pub fn add_flow_chain_edge(&mut self, parent: &str, handle: &str, target: &str) {
        let tick = self.ids.tick();
        self.edges.push(FlowEdge {
            id: format!("flow-{parent}-{target}-{tick}"),
            source: parent.to_owned(),
            source_handle: handle.to_owned(),
            target: target.to_owned(),
            target_handle: edge::FLOW_IN.to_owned(),
            animated: false,
            edge_type: Some("step".to_owned()),
            style: EdgeStyle::flow_chain(),
        });
    }

    /// Reference edge from the native-API sentinel into `target`.
    pub fn add_native_ref_edge(&mut self, target: &str) {
        let tick = self.ids.tick();
        self.edges.push(FlowEdge {
            id: format!("ref-native-{NATIVE_API_NODE_ID}-{target}-{tick}"),
            source: NATIVE_API_NODE_ID.to_owned(),
            source_handle: edge::REF_SOURCE.to_owned(),
            target: target.to_owned(),
            target_handle: edge::REF_TARGET.to_owned(),
            animated: false,
            edge_type: Some("step".to_owned()),
            style: EdgeStyle::native_ref(),
        });
    }

    /// Reference edge from a user declaration node into `target`.
    pub fn add_decl_ref_edge(&mut self, decl_id: &str, target: &str) {
        let tick = self.ids.tick();
        self.edges.push(FlowEdge {
            id: format!("ref-{decl_id}-{target}-{tick}"),
            source: decl_id.to_owned(),
            source_handle: edge::REF_SOURCE.to_owned(),
            target: target.to_owned(),
            target_handle: edge::REF_TARGET.to_owned(),
            animated: false,
            edge_type: Some("step".to_owned()),
            style: EdgeStyle::decl_ref(),
        });
    }

    /// Faint coupling edge from `source` to the current scope's owner node.
    /// Deduplicated per (source, owner) pair; a no-op at the top level.
    fn add_macro_dep_edge(&mut self, source: &str) {
        let Some(owner) = self.scope_owner_id.clone() else {
            return;
        };
        if owner == source {
            return;
        }
        if !self.macro_edges_seen.insert((source.to_owned(), owner.clone())) {
            return;
        }
        let tick = self.ids.tick();
        self.edges.push(FlowEdge {
            id: format!("macro-{source}-{owner}-{tick}"),
            source: source.to_owned(),
            source_handle: edge::REF_SOURCE.to_owned(),
            target: owner,
            target_handle: edge::MACRO_DEP.to_owned(),
            animated: false,
            edge_type: Some("step".to_owned()),
            style: EdgeStyle::macro_dep(),
        });
    }

    // -----------------------------------------------------------------------
    // Name resolution
    // -----------------------------------------------------------------------

    pub fn register_variable(&mut self, name: &str, node_id: &str) {
        self.variable_nodes.insert(name.to_owned(), node_id.to_owned());
    }

    pub fn register_decl(&mut self, name: &str, node_id: &str) {
        self.variable_nodes.insert(format!("decl:{name}"), node_id.to_owned());
    }

    pub fn register_import(&mut self, name: &str, node_id: &str) {
        self.variable_nodes.insert(format!("import:{name}"), node_id.to_owned());
    }

    /// The declaration node registered for `name`, if any.
    pub fn decl_id(&self, name: &str) -> Option<String> {
        self.variable_nodes.get(&format!("decl:{name}")).cloned()
    }

    /// Resolve an identifier to its value-producing node.
    ///
    /// Emits a macro dependency edge when the hit is an imported binding or a
    /// node registered in an outer scope and we are inside a nested scope —
    /// coupling awareness, distinct from the ordinary data-flow edge the
    /// caller is about to draw.
    pub fn resolve_value_source(&mut self, name: &str) -> Option<String> {
        if let Some(id) = self.variable_nodes.get(name).cloned() {
            let node_scope = self.node(&id).and_then(|n| n.data.scope_id.clone());
            if node_scope.as_deref() != Some(self.current_scope_id.as_str()) {
                self.add_macro_dep_edge(&id);
            }
            return Some(id);
        }
        self.resolve_import(name)
    }

    /// Resolve an imported binding to its import node, emitting the macro
    /// dependency edge for the current scope.
    pub fn resolve_import(&mut self, name: &str) -> Option<String> {
        let id = self.variable_nodes.get(&format!("import:{name}"))?.clone();
        self.add_macro_dep_edge(&id);
        Some(id)
    }

    // -----------------------------------------------------------------------
    // Scope entry
    // -----------------------------------------------------------------------

    /// Process a nested statement list in a freshly allocated scope.
    ///
    /// Registers `scopes[flow_handle] = {id, label}` on the entry node (the
    /// UI's drill-down anchor), swaps scope/parent/owner state, inserts
    /// `pre_nodes` (pre-built parameter or binding nodes) into the new scope,
    /// and threads a previous-node id across the statements to build
    /// sequential flow edges. The chain is seeded with the entry node and its
    /// branch handle, so the first flow-participating statement receives the
    /// single `flow-true`/`flow-body`/… edge out of the entry node; the
    /// containment parent resets to none. Saved state is restored on return.
    pub fn process_block(
        &mut self,
        body: &[Stmt],
        entry_node_id: &str,
        flow_handle: &str,
        label: &str,
        pre_nodes: Vec<FlowNode>,
    ) {
        self.scope_counter += 1;
        let ordinal = self.scope_counter;
        let scope_id = format!("scope-{ordinal}");

        if let Some(entry) = self.node_mut(entry_node_id) {
            entry.add_scope(
                flow_handle,
                ScopeRef {
                    id: scope_id.clone(),
                    label: label.to_owned(),
                },
            );
        }

        let saved_scope = std::mem::replace(&mut self.current_scope_id, scope_id.clone());
        let saved_parent = self.current_parent_id.take();
        let saved_owner = std::mem::replace(&mut self.scope_owner_id, Some(entry_node_id.to_owned()));

        for mut node in pre_nodes {
            node.data.scope_id = Some(scope_id.clone());
            if node.kind == NodeKind::Variable
                && let Some(name) = node.data.label.clone()
            {
                self.register_variable(&name, &node.id);
            }
            self.nodes.push(node);
        }

        let mut prev = (entry_node_id.to_owned(), flow_handle.to_owned());
        for (i, stmt) in body.iter().enumerate() {
            let suffix = format!("{ordinal}-{i}");
            let chained = Some((prev.0.as_str(), prev.1.as_str()));
            if let Some(id) = dispatch::parse_statement(stmt, self, chained, Some(&suffix)) {
                prev = (id, edge::FLOW_NEXT.to_owned());
            }
        }

        self.current_scope_id = saved_scope;
        self.current_parent_id = saved_parent;
        self.scope_owner_id = saved_owner;
    }

    /// Consume the context into its final graph.
    pub fn into_graph(self) -> crate::flow::FlowGraph {
        crate::flow::FlowGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }
}
