use crate::flow::edge::{self, FLOW_IN, OUTPUT};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::{call, logic, materialize_literal};
use crate::syntax::{AssignExpr, Expr};

/// Handle an assignment statement as a `Set: <name>` node with a single
/// `Value` input, wiring the right-hand side into `arg-0`.
pub fn handle(
    assign: &AssignExpr,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("assignment-{suffix}"),
        None => ctx.generate_id("assignment"),
    };
    let target = assign.target.as_deref().unwrap_or("unknown");

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::FunctionCall,
        NodeData {
            label: Some(format!("Set: {target}")),
            args: Some(vec!["Value".to_owned()]),
            is_standalone: Some(true),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    let value_handle = edge::arg(0);
    match &*assign.value {
        Expr::Ident(name) => {
            if let Some(source_id) = ctx.resolve_value_source(name) {
                ctx.add_edge(&source_id, &node_id, OUTPUT, &value_handle);
            }
        }
        Expr::Literal(lit) => {
            let literal_id = materialize_literal(ctx, lit);
            ctx.add_edge(&literal_id, &node_id, OUTPUT, &value_handle);
        }
        Expr::Binary(binary) => {
            logic::handle_expression(binary, ctx, &node_id, &value_handle, None);
        }
        Expr::Call(call_expr) => {
            call::handle_expression(call_expr, ctx, &node_id, &value_handle);
        }
        _ => {}
    }

    Some(node_id)
}
