use crate::flow::edge::{self, BODY, FLOW_IN, OUTPUT, RETURN};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::{argument_summary, materialize_literal};
use crate::syntax::{CallExpr, Callee, Expr};

/// Handle a standalone call statement. Chained into sequential flow via
/// `flow-in` when `parent` is supplied. Returns the call node id.
pub fn handle_statement(
    call: &CallExpr,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> String {
    // Standalone call sites use the call-exec prefix; value-position calls
    // use plain call (see handle_expression).
    let node_id = match id_suffix {
        Some(suffix) => format!("call-exec-{suffix}"),
        None => ctx.generate_id("call-exec"),
    };
    create_call_node(call, ctx, &node_id, parent.is_none());
    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }
    wire_arguments(call, ctx, &node_id);
    node_id
}

/// Handle a call in value position: the call's `return` handle feeds the
/// consumer's `consumer_handle`. Returns the call node id.
pub fn handle_expression(
    call: &CallExpr,
    ctx: &mut GraphContext,
    consumer_id: &str,
    consumer_handle: &str,
) -> String {
    let node_id = ctx.generate_id("call");
    create_call_node(call, ctx, &node_id, false);
    ctx.add_edge(&node_id, consumer_id, RETURN, consumer_handle);
    wire_arguments(call, ctx, &node_id);
    node_id
}

fn create_call_node(call: &CallExpr, ctx: &mut GraphContext, node_id: &str, is_standalone: bool) {
    let label = call.callee.label();

    if ctx.is_native_api(&label) {
        ctx.add_native_ref_edge(node_id);
    } else if let Callee::Ident(name) = &call.callee {
        if let Some(decl_id) = ctx.decl_id(name) {
            ctx.add_decl_ref_edge(&decl_id, node_id);
            if let Some(decl_node) = ctx.node_mut(&decl_id) {
                let count = decl_node.data.usage_count.get_or_insert(0);
                *count += 1;
            }
        } else if let Some(import_id) = ctx.resolve_import(name) {
            ctx.add_decl_ref_edge(&import_id, node_id);
        }
    } else if let Callee::Member { object, .. } = &call.callee
        && let Some(import_id) = ctx.resolve_import(object)
    {
        ctx.add_decl_ref_edge(&import_id, node_id);
    }

    // Propagate the callee's body scope so the call site is navigable too.
    let scopes = ctx
        .decl_id(&label)
        .and_then(|decl_id| ctx.node(&decl_id))
        .and_then(|decl_node| decl_node.data.scopes.as_ref())
        .and_then(|scopes| scopes.get(BODY).cloned())
        .map(|body_scope| {
            let mut map = std::collections::BTreeMap::new();
            map.insert(BODY.to_owned(), body_scope);
            map
        });

    let args = call.args.iter().map(argument_summary).collect();
    ctx.push_node(FlowNode::new(
        node_id,
        NodeKind::FunctionCall,
        NodeData {
            label: Some(label),
            args: Some(args),
            has_return: Some(true),
            is_standalone: is_standalone.then_some(true),
            scopes,
            ..NodeData::default()
        },
    ));
}

fn wire_arguments(call: &CallExpr, ctx: &mut GraphContext, node_id: &str) {
    for (i, arg) in call.args.iter().enumerate() {
        let handle = edge::arg(i);
        match arg {
            Expr::Ident(name) => {
                if let Some(source_id) = ctx.resolve_value_source(name) {
                    ctx.add_edge(&source_id, node_id, OUTPUT, &handle);
                }
            }
            Expr::Literal(lit) => {
                let literal_id = materialize_literal(ctx, lit);
                ctx.add_edge(&literal_id, node_id, OUTPUT, &handle);
            }
            Expr::Template(exprs) => {
                // Identifiers interpolated into the template feed the same
                // argument slot.
                for inner in exprs {
                    if let Expr::Ident(name) = inner
                        && let Some(source_id) = ctx.resolve_value_source(name)
                    {
                        ctx.add_edge(&source_id, node_id, OUTPUT, &handle);
                    }
                }
            }
            _ => {}
        }
    }
}
