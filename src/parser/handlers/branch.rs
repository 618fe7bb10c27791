use crate::flow::edge::{CONDITION, FLOW_FALSE, FLOW_IN, FLOW_TRUE, OUTPUT};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::logic;
use crate::syntax::{Expr, IfStmt};

/// Handle an if statement: condition wiring plus one navigable scope per
/// branch (`flow-true`, and `flow-false` only when an else clause exists).
pub fn handle(
    stmt: &IfStmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("if-{suffix}"),
        None => ctx.generate_id("if"),
    };

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::If,
        NodeData {
            label: Some("If".to_owned()),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    match &stmt.test {
        Expr::Binary(binary) => {
            logic::handle_expression(binary, ctx, &node_id, CONDITION, None);
        }
        Expr::Ident(name) => {
            if let Some(source_id) = ctx.resolve_value_source(name) {
                ctx.add_edge(&source_id, &node_id, OUTPUT, CONDITION);
            }
        }
        _ => {}
    }

    ctx.process_block(&stmt.consequent, &node_id, FLOW_TRUE, "True", Vec::new());
    if let Some(alternate) = &stmt.alternate {
        ctx.process_block(alternate, &node_id, FLOW_FALSE, "False", Vec::new());
    }

    Some(node_id)
}
