use crate::flow::edge::{FLOW_CATCH, FLOW_FINALLY, FLOW_IN, FLOW_TRY};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::syntax::TryStmt;

/// Handle a try statement: one node with a navigable scope per present block
/// (`flow-try`, `flow-catch`, `flow-finally`).
pub fn handle(
    stmt: &TryStmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("try-{suffix}"),
        None => ctx.generate_id("trycatch"),
    };

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::TryCatch,
        NodeData {
            label: Some("Try/Catch".to_owned()),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    ctx.process_block(&stmt.block, &node_id, FLOW_TRY, "Try", Vec::new());
    if let Some(handler) = &stmt.handler {
        ctx.process_block(handler, &node_id, FLOW_CATCH, "Catch", Vec::new());
    }
    if let Some(finalizer) = &stmt.finalizer {
        ctx.process_block(finalizer, &node_id, FLOW_FINALLY, "Finally", Vec::new());
    }

    Some(node_id)
}
