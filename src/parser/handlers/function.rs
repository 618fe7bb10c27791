use crate::flow::edge::BODY;
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::variable;
use crate::syntax::{FuncDecl, Param};

/// Handle a function declaration: a `Definition:` node registered under the
/// `decl:` prefix (enabling forward and self reference), parameters
/// materialized as nodes inside the body scope, and the body processed as a
/// navigable scope on the `body` handle.
///
/// Definitions do not participate in sequential flow, so no id is returned.
pub fn handle(func: &FuncDecl, ctx: &mut GraphContext, id_suffix: Option<&str>) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("func-{}-{suffix}", func.name),
        None => format!("func-{}", func.name),
    };

    let args: Vec<String> = func.params.iter().map(param_summary).collect();
    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::FunctionCall,
        NodeData {
            label: Some(format!("Definition: {}", func.name)),
            args: Some(args),
            is_decl: Some(true),
            usage_count: Some(0),
            is_async: func.is_async.then_some(true),
            is_exported: ctx.is_exporting.then_some(true),
            is_default_export: ctx.is_exporting_default.then_some(true),
            ..NodeData::default()
        },
    ));
    ctx.register_decl(&func.name, &node_id);

    let pre_nodes = materialize_params(ctx, &func.params);
    ctx.process_block(&func.body, &node_id, BODY, "Body", pre_nodes);

    None
}

/// Display summary of one parameter: the identifier name, or a `{a, b}` brace
/// summary for object patterns.
pub(crate) fn param_summary(param: &Param) -> String {
    match param {
        Param::Ident { name, .. } => name.clone(),
        Param::Pattern(pattern) => pattern.summary(),
    }
}

/// Build the nodes a body scope starts with: one variable node per simple
/// parameter, one destructuring expansion per pattern parameter.
///
/// Pattern parameters always read from `"Arguments"` — the destructured value
/// has no binding name of its own, whatever the function is called.
pub(crate) fn materialize_params(ctx: &mut GraphContext, params: &[Param]) -> Vec<FlowNode> {
    let mut out = Vec::new();
    for param in params {
        match param {
            Param::Ident { name, type_note } => {
                let param_id = ctx.generate_id(&format!("param-{name}"));
                out.push(FlowNode::new(
                    &param_id,
                    NodeKind::Variable,
                    NodeData {
                        label: Some(name.clone()),
                        value: Some("(parameter)".to_owned()),
                        value_type: type_note.as_ref().map(|t| t.label()),
                        is_parameter: Some(true),
                        ..NodeData::default()
                    },
                ));
            }
            Param::Pattern(pattern) => {
                variable::materialize_pattern(ctx, pattern, "Arguments", None, true, &mut out);
            }
        }
    }
    out
}
