use crate::flow::edge::{INPUT_A, INPUT_B, OUTPUT, RESULT};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::{call, materialize_literal};
use crate::syntax::{BinaryExpr, Expr};

/// Handle a binary/logical expression in value position: create the operator
/// node, wire both operands, and connect its result into the consumer's
/// `consumer_handle`.
///
/// Returns the logic node's id for nested composition.
pub fn handle_expression(
    binary: &BinaryExpr,
    ctx: &mut GraphContext,
    consumer_id: &str,
    consumer_handle: &str,
    id_suffix: Option<&str>,
) -> String {
    let node_id = create_node(binary, ctx, id_suffix);
    ctx.add_edge(&node_id, consumer_id, RESULT, consumer_handle);
    node_id
}

/// A bare expression statement like `a + b;` — the node exists but its result
/// goes nowhere.
pub fn handle_statement(binary: &BinaryExpr, ctx: &mut GraphContext, id_suffix: Option<&str>) -> String {
    create_node(binary, ctx, id_suffix)
}

fn create_node(binary: &BinaryExpr, ctx: &mut GraphContext, id_suffix: Option<&str>) -> String {
    let node_id = match id_suffix {
        Some(suffix) => format!("logic-{suffix}"),
        None => ctx.generate_id("logic"),
    };
    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::Logic,
        NodeData {
            op: Some(binary.op.clone()),
            ..NodeData::default()
        },
    ));
    wire_operand(&binary.left, ctx, &node_id, INPUT_A);
    wire_operand(&binary.right, ctx, &node_id, INPUT_B);
    node_id
}

/// Operand wiring follows the shared three-way pattern: identifiers resolve
/// through the context, literals materialize inline, nested expressions
/// recurse.
fn wire_operand(operand: &Expr, ctx: &mut GraphContext, node_id: &str, target_handle: &str) {
    match operand {
        Expr::Ident(name) => {
            if let Some(source_id) = ctx.resolve_value_source(name) {
                ctx.add_edge(&source_id, node_id, OUTPUT, target_handle);
            }
        }
        Expr::Literal(lit) => {
            let literal_id = materialize_literal(ctx, lit);
            ctx.add_edge(&literal_id, node_id, OUTPUT, target_handle);
        }
        Expr::Binary(inner) => {
            handle_expression(inner, ctx, node_id, target_handle, None);
        }
        Expr::Call(inner) => {
            call::handle_expression(inner, ctx, node_id, target_handle);
        }
        Expr::Await(inner) => wire_operand(inner, ctx, node_id, target_handle),
        _ => {}
    }
}
