use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The renderer-facing kind tag of a flow node.
///
/// Serialized values are the node-type strings the diagram renderer registers
/// its components under — they are a wire contract, not display text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// A named binding holding a value (declaration, parameter, or extracted key).
    #[serde(rename = "variableNode")]
    Variable,
    /// An inline literal materialized as its own value source.
    #[serde(rename = "literalNode")]
    Literal,
    /// Pattern-based field extraction; one outgoing handle per extracted key.
    #[serde(rename = "destructuringNode")]
    Destructuring,
    /// Function definitions, standalone call sites, `Set:` assignments and
    /// `RETURN` statements all render through this one component.
    #[serde(rename = "functionCallNode")]
    FunctionCall,
    #[serde(rename = "ifNode")]
    If,
    #[serde(rename = "forNode")]
    For,
    #[serde(rename = "whileNode")]
    While,
    #[serde(rename = "switchNode")]
    Switch,
    #[serde(rename = "tryCatchNode")]
    TryCatch,
    /// A binary or logical operator with `input-a`/`input-b` operands.
    #[serde(rename = "logicNode")]
    Logic,
    #[serde(rename = "importNode")]
    Import,
    #[serde(rename = "exportNode")]
    Export,
    #[serde(rename = "classNode")]
    Class,
    #[serde(rename = "methodNode")]
    Method,
    /// The single sentinel representing the host runtime's implicit surface.
    #[serde(rename = "nativeApiNode")]
    NativeApi,
    /// Free-text annotation. Never produced by the parser; the editor layer
    /// creates these and they share the node schema.
    #[serde(rename = "noteNode")]
    Note,
}

/// A 2D canvas position. Defaulted to the origin by the parser and overwritten
/// by the layout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Cosmetic per-node style overrides (only emitted where the renderer cannot
/// derive the size itself, e.g. class containers sized to their methods).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z_index: Option<i32>,
}

/// A navigable scope reference registered on the node that owns a nested block.
/// The UI uses these entries to offer "step into this branch/body".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeRef {
    pub id: String,
    pub label: String,
}

/// Summary of a call expression used as an initializer, rendered inline inside
/// the variable node instead of as a separate call node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedCall {
    pub name: String,
    pub args: Vec<String>,
}

/// One local binding introduced by an import statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSpecifier {
    /// The local name the binding is visible under.
    pub local: String,
    /// The exported name at the source module, when it differs from `local`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported: Option<String>,
    /// "named", "default" or "namespace".
    pub kind: String,
}

/// Variant-specific node payload.
///
/// One open struct rather than a payload enum: the renderer receives this as a
/// free-form `data` object and each node component reads the fields it knows.
/// Absent fields are omitted from the serialized output entirely.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Literal or annotation type: boolean/number/string/any/unknown/void, or
    /// a named type reference.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Human-readable rendering of a computed initializer expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
    /// Ordered parameter/argument names. Each entry materializes an `arg-N`
    /// input handle on the rendered node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_decl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exported: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default_export: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_parameter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_await: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_standalone: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_return: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_return: Option<bool>,
    /// Method kind: "constructor", "method", "getter" or "setter".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_count: Option<u32>,
    /// The scope this node visually belongs to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    /// flow-handle name -> nested scope, for drill-down navigation.
    /// BTreeMap so serialization order is stable across parses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scopes: Option<BTreeMap<String, ScopeRef>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructuring_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destructuring_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nested_call: Option<NestedCall>,
    /// Operator token for logic nodes ("+", "===", "&&", …).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    /// Case labels for switch nodes, in source order; "default" for the
    /// default clause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cases: Option<Vec<String>>,
    /// Import source module string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifiers: Option<Vec<ImportSpecifier>>,
    /// "named" or "default" for placeholder export nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_type: Option<String>,
    /// Note body for annotation nodes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A node in the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    /// Unique within one parse result.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    /// Containment (a method inside its class), not flow.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    pub data: NodeData,
}

impl FlowNode {
    /// Build a node at the origin with the given kind and payload.
    pub fn new(id: impl Into<String>, kind: NodeKind, data: NodeData) -> Self {
        Self {
            id: id.into(),
            kind,
            position: Position::default(),
            parent_id: None,
            style: None,
            data,
        }
    }

    /// Register a navigable nested scope under `handle` on this node.
    pub fn add_scope(&mut self, handle: &str, scope: ScopeRef) {
        self.data
            .scopes
            .get_or_insert_with(BTreeMap::new)
            .insert(handle.to_owned(), scope);
    }
}
