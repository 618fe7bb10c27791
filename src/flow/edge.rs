use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Handle names
//
// Handle strings are a wire contract shared with the renderer: each names an
// anchor on a node component and encodes the semantic role of the connection.
// Renaming any of these breaks connector drawing downstream.
// ---------------------------------------------------------------------------

/// Control-flow entry on every statement node.
pub const FLOW_IN: &str = "flow-in";
/// Sequential successor within a statement list.
pub const FLOW_NEXT: &str = "flow-next";
/// Consequent branch of an `if`.
pub const FLOW_TRUE: &str = "flow-true";
/// Alternate branch of an `if`.
pub const FLOW_FALSE: &str = "flow-false";
/// Loop body.
pub const FLOW_BODY: &str = "flow-body";
pub const FLOW_TRY: &str = "flow-try";
pub const FLOW_CATCH: &str = "flow-catch";
pub const FLOW_FINALLY: &str = "flow-finally";
/// Function and method bodies.
pub const BODY: &str = "body";

/// Boolean input of `if`/`while` nodes.
pub const CONDITION: &str = "condition";
/// Boolean input of `for` nodes.
pub const TEST: &str = "test";
/// Value input of `switch` nodes.
pub const DISCRIMINANT: &str = "discriminant";

/// Default value-producing handle of variables, literals and imports.
pub const OUTPUT: &str = "output";
/// Value-producing handle of logic and assignment nodes.
pub const RESULT: &str = "result";
/// Value-producing handle of call nodes.
pub const RETURN: &str = "return";

/// Declaration side of a declaration-to-usage reference (non-flow).
pub const REF_SOURCE: &str = "ref-source";
/// Usage side of a declaration-to-usage reference (non-flow).
pub const REF_TARGET: &str = "ref-target";

/// Source-value input of a destructuring node.
pub const INPUT: &str = "input";
/// Left operand of a logic node.
pub const INPUT_A: &str = "input-a";
/// Right operand of a logic node.
pub const INPUT_B: &str = "input-b";

/// `for` initializer input.
pub const INIT: &str = "init";
/// `for` update input.
pub const UPDATE: &str = "update";

/// Coupling input on a scope-owner node for macro dependency edges.
pub const MACRO_DEP: &str = "macro-dep";

/// Positional argument input (`arg-0`, `arg-1`, …).
pub fn arg(i: usize) -> String {
    format!("arg-{i}")
}

/// Positional argument input of an inline nested-call summary.
pub fn nested_arg(i: usize) -> String {
    format!("nested-arg-{i}")
}

// ---------------------------------------------------------------------------
// Edge style presets
// ---------------------------------------------------------------------------

/// Purely cosmetic stroke attributes carried on every edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
}

impl EdgeStyle {
    /// Solid grey — ordinary data/flow connections.
    pub fn default_stroke() -> Self {
        Self {
            stroke: "#b1b1b7".to_owned(),
            stroke_width: 2.0,
            stroke_dasharray: None,
            opacity: None,
        }
    }

    /// Dashed yellow — references originating from the native-API sentinel.
    pub fn native_ref() -> Self {
        Self {
            stroke: "#f7df1e".to_owned(),
            stroke_width: 2.0,
            stroke_dasharray: Some("3,3".to_owned()),
            opacity: Some(0.8),
        }
    }

    /// Dashed green — references originating from a user declaration.
    pub fn decl_ref() -> Self {
        Self {
            stroke: "#4caf50".to_owned(),
            stroke_width: 2.0,
            stroke_dasharray: Some("5,5".to_owned()),
            opacity: Some(0.8),
        }
    }

    /// Dashed dark grey — sequential flow into declarations and imports.
    pub fn flow_chain() -> Self {
        Self {
            stroke: "#555".to_owned(),
            stroke_width: 2.0,
            stroke_dasharray: Some("4,4".to_owned()),
            opacity: None,
        }
    }

    /// Faint dashed — cross-scope coupling (macro dependency) edges.
    pub fn macro_dep() -> Self {
        Self {
            stroke: "#8a8a8a".to_owned(),
            stroke_width: 1.5,
            stroke_dasharray: Some("6,3".to_owned()),
            opacity: Some(0.35),
        }
    }
}

/// A directed, handle-addressed edge in the flow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    pub id: String,
    pub source: String,
    pub source_handle: String,
    pub target: String,
    pub target_handle: String,
    pub animated: bool,
    /// Renderer edge-path variant; "step" for reference-style edges.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub edge_type: Option<String>,
    pub style: EdgeStyle,
}
