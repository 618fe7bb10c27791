//! The handler families. Each module exposes a `handle` entry (or a
//! statement/expression pair) that appends nodes and edges to the
//! [`GraphContext`](crate::parser::context::GraphContext) and returns the id
//! the caller uses for flow chaining.
//!
//! Handlers compose: Logic and Call are invoked both from the dispatcher and
//! from inside Variable, Assignment, Return, If and Loop handling.

pub mod assignment;
pub mod branch;
pub mod call;
pub mod class;
pub mod export;
pub mod function;
pub mod import;
pub mod logic;
pub mod looping;
pub mod ret;
pub mod switch;
pub mod try_catch;
pub mod variable;

use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::syntax::{Expr, Lit};

/// Materialize a literal as its own value-source node and return its id.
pub(crate) fn materialize_literal(ctx: &mut GraphContext, lit: &Lit) -> String {
    let id = ctx.generate_id("literal");
    ctx.push_node(FlowNode::new(
        &id,
        NodeKind::Literal,
        NodeData {
            label: Some(lit.type_name().to_owned()),
            value: Some(lit.value_string()),
            value_type: Some(lit.type_name().to_owned()),
            ..NodeData::default()
        },
    ));
    id
}

/// One-line rendering of an expression for value summaries.
pub(crate) fn expression_summary(expr: &Expr) -> String {
    match expr {
        Expr::Binary(b) => format!(
            "{} {} {}",
            expression_summary(&b.left),
            b.op,
            expression_summary(&b.right)
        ),
        Expr::Ident(name) => name.clone(),
        Expr::Literal(lit) => lit.value_string(),
        Expr::Call(call) => format!("{}(...)", call.callee.label()),
        Expr::Await(inner) => expression_summary(inner),
        _ => "...".to_owned(),
    }
}

/// Short display form of a call argument (`'text'`, `42`, `name`, `` `...` ``).
pub(crate) fn argument_summary(arg: &Expr) -> String {
    match arg {
        Expr::Literal(Lit::Str(s)) => format!("'{s}'"),
        Expr::Literal(lit) => lit.value_string(),
        Expr::Ident(name) => name.clone(),
        Expr::Template(_) => "`...`".to_owned(),
        _ => "...".to_owned(),
    }
}
