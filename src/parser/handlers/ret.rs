use crate::flow::edge::{self, FLOW_IN, OUTPUT};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::{call, logic, materialize_literal};
use crate::syntax::{Expr, ReturnStmt};

/// Handle a return statement as a `RETURN` node with one `value` input.
pub fn handle(
    stmt: &ReturnStmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("return-{suffix}"),
        None => ctx.generate_id("return"),
    };

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::FunctionCall,
        NodeData {
            label: Some("RETURN".to_owned()),
            // One entry creates the arg-0 input handle on the rendered node.
            args: Some(vec!["value".to_owned()]),
            is_return: Some(true),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    if let Some(argument) = &stmt.argument {
        wire_value(argument, ctx, &node_id);
    }
    Some(node_id)
}

fn wire_value(argument: &Expr, ctx: &mut GraphContext, node_id: &str) {
    let value_handle = edge::arg(0);
    match argument {
        Expr::Ident(name) => {
            if let Some(source_id) = ctx.resolve_value_source(name) {
                ctx.add_edge(&source_id, node_id, OUTPUT, &value_handle);
            }
        }
        Expr::Literal(lit) => {
            let literal_id = materialize_literal(ctx, lit);
            ctx.add_edge(&literal_id, node_id, OUTPUT, &value_handle);
        }
        Expr::Binary(binary) => {
            logic::handle_expression(binary, ctx, node_id, &value_handle, None);
        }
        Expr::Call(call_expr) => {
            call::handle_expression(call_expr, ctx, node_id, &value_handle);
        }
        Expr::Await(inner) => wire_value(inner, ctx, node_id),
        _ => {}
    }
}
