use crate::flow::edge::{self, OUTPUT, REF_TARGET};
use crate::flow::node::{FlowNode, NestedCall, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::{expression_summary, logic};
use crate::syntax::{BindingTarget, Callee, Expr, Lit, ObjectPattern, PatternProp, VarDecl};

/// Handle a variable declaration statement (`const`/`let`/`var`), one node
/// group per declarator.
///
/// Identifier targets become variable nodes carrying a value summary; call
/// initializers additionally record an inline nested-call summary and a
/// reference edge back to the callee's origin; binary/logical initializers
/// delegate operand wiring to the logic handler; object-pattern targets expand
/// into destructuring nodes.
///
/// When `parent` is supplied the declaration is chained into sequential flow
/// with a dashed edge. Returns the last declarator's primary node id.
pub fn handle(
    decl: &VarDecl,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let mut first_id: Option<String> = None;
    let mut last_id: Option<String> = None;

    for (i, declarator) in decl.declarators.iter().enumerate() {
        // Multi-declarator statements get a per-declarator suffix so pattern
        // node ids stay unique.
        let declarator_suffix = if decl.declarators.len() > 1 {
            id_suffix.map(|s| format!("{s}-{i}"))
        } else {
            id_suffix.map(str::to_owned)
        };
        let produced = match &declarator.target {
            BindingTarget::Ident(name) => handle_identifier_target(
                name,
                declarator.init.as_ref(),
                declarator.type_note.as_ref().map(|t| t.label()),
                ctx,
                declarator_suffix.as_deref(),
            ),
            BindingTarget::Pattern(pattern) => handle_pattern_target(
                pattern,
                declarator.init.as_ref(),
                ctx,
                declarator_suffix.as_deref(),
            ),
        };
        if let Some(id) = produced {
            first_id.get_or_insert_with(|| id.clone());
            last_id = Some(id);
        }
    }

    if let (Some((parent_id, handle)), Some(first)) = (parent, first_id.as_ref()) {
        ctx.add_flow_chain_edge(parent_id, handle, first);
    }
    last_id
}

fn handle_identifier_target(
    name: &str,
    init: Option<&Expr>,
    type_label: Option<String>,
    ctx: &mut GraphContext,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("var-{name}-{suffix}"),
        None => format!("var-{name}"),
    };

    // An awaited call renders like the call itself, flagged async.
    let (effective_init, is_await) = match init {
        Some(Expr::Await(inner)) => (Some(&**inner), true),
        other => (other, false),
    };

    let mut value = String::new();
    let mut nested_call = None;

    match effective_init {
        Some(Expr::Literal(lit)) => {
            value = match lit {
                Lit::Str(s) => format!("'{s}'"),
                other => other.value_string(),
            };
        }
        Some(Expr::Call(call)) => {
            value = "(computed)".to_owned();
            let call_name = call.callee.label();

            // The value traces back to a definition: the runtime surface for
            // built-ins, the registered declaration or import node otherwise.
            if ctx.is_native_api(&call_name) {
                ctx.add_native_ref_edge(&node_id);
            } else if let Callee::Ident(callee_name) = &call.callee {
                if let Some(decl_id) = ctx.decl_id(callee_name) {
                    ctx.add_decl_ref_edge(&decl_id, &node_id);
                    if let Some(decl_node) = ctx.node_mut(&decl_id) {
                        let count = decl_node.data.usage_count.get_or_insert(0);
                        *count += 1;
                    }
                } else if let Some(import_id) = ctx.resolve_import(callee_name) {
                    ctx.add_decl_ref_edge(&import_id, &node_id);
                }
            } else if let Callee::Member { object, .. } = &call.callee
                && let Some(import_id) = ctx.resolve_import(object)
            {
                ctx.add_decl_ref_edge(&import_id, &node_id);
            }

            let arg_names = call
                .args
                .iter()
                .map(|arg| match arg {
                    Expr::Ident(n) => n.clone(),
                    Expr::Literal(lit) => lit.value_string(),
                    _ => "arg".to_owned(),
                })
                .collect();
            nested_call = Some(NestedCall {
                name: call_name,
                args: arg_names,
            });

            for (i, arg) in call.args.iter().enumerate() {
                if let Expr::Ident(arg_name) = arg
                    && let Some(source_id) = ctx.resolve_value_source(arg_name)
                {
                    ctx.add_edge(&source_id, &node_id, OUTPUT, &edge::nested_arg(i));
                }
            }
        }
        Some(Expr::Binary(binary)) => {
            value = format!(
                "{} {} {}",
                expression_summary(&binary.left),
                binary.op,
                expression_summary(&binary.right)
            );
        }
        _ => {}
    }

    let expression = (value == "(computed)" || value.contains(' ')).then(|| value.clone());
    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::Variable,
        NodeData {
            label: Some(name.to_owned()),
            value: (!value.is_empty()).then_some(value),
            value_type: type_label,
            expression,
            nested_call,
            is_await: is_await.then_some(true),
            is_exported: ctx.is_exporting.then_some(true),
            is_default_export: ctx.is_exporting_default.then_some(true),
            ..NodeData::default()
        },
    ));
    ctx.register_variable(name, &node_id);

    if let Some(Expr::Binary(binary)) = effective_init {
        logic::handle_expression(binary, ctx, &node_id, REF_TARGET, None);
    }

    Some(node_id)
}

fn handle_pattern_target(
    pattern: &ObjectPattern,
    init: Option<&Expr>,
    ctx: &mut GraphContext,
    id_suffix: Option<&str>,
) -> Option<String> {
    let effective_init = match init {
        Some(Expr::Await(inner)) => Some(&**inner),
        other => other,
    };
    let source_label = match effective_init {
        Some(Expr::Ident(name)) => name.clone(),
        Some(Expr::Call(call)) => call.callee.label(),
        _ => "value".to_owned(),
    };
    let source_id = match effective_init {
        Some(Expr::Ident(name)) => ctx.resolve_value_source(name),
        _ => None,
    };

    let mut produced = Vec::new();
    let top_id = materialize_pattern(ctx, pattern, &source_label, id_suffix, false, &mut produced);
    if let Some(source) = source_id {
        ctx.add_edge(&source, &top_id, OUTPUT, edge::INPUT);
    }
    for node in produced {
        if node.kind == NodeKind::Variable
            && let Some(name) = node.data.label.clone()
        {
            ctx.register_variable(&name, &node.id);
        }
        ctx.push_node(node);
    }
    Some(top_id)
}

/// Expand an object pattern into a destructuring node plus one variable node
/// per extracted key, recursing for nested pattern levels.
///
/// Nodes are collected into `out` rather than pushed, so function handling can
/// pass them into a body scope as pre-nodes; edges are appended immediately.
/// `is_parameter` marks the produced variables as parameters (pattern sourced
/// from `"Arguments"`).
///
/// Returns the id of the destructuring node for this pattern level.
pub(crate) fn materialize_pattern(
    ctx: &mut GraphContext,
    pattern: &ObjectPattern,
    source_label: &str,
    id_suffix: Option<&str>,
    is_parameter: bool,
    out: &mut Vec<FlowNode>,
) -> String {
    let node_id = match id_suffix {
        Some(suffix) => format!("destructure-{suffix}"),
        None => ctx.generate_id("destructure"),
    };

    out.push(FlowNode::new(
        &node_id,
        NodeKind::Destructuring,
        NodeData {
            destructuring_keys: Some(pattern.keys()),
            destructuring_source: Some(source_label.to_owned()),
            ..NodeData::default()
        },
    ));

    for prop in &pattern.props {
        match prop {
            PatternProp::Shorthand(name) => {
                let var_id = emit_pattern_variable(ctx, name, is_parameter, out);
                ctx.add_edge(&node_id, &var_id, name, edge::INPUT);
            }
            PatternProp::Renamed { key, binding } => {
                let var_id = emit_pattern_variable(ctx, binding, is_parameter, out);
                ctx.add_edge(&node_id, &var_id, key, edge::INPUT);
            }
            PatternProp::Nested { key, pattern: inner } => {
                // The nested level's source is the key it was extracted from.
                let child_id = materialize_pattern(ctx, inner, key, None, is_parameter, out);
                ctx.add_edge(&node_id, &child_id, key, edge::INPUT);
            }
        }
    }

    node_id
}

fn emit_pattern_variable(
    ctx: &mut GraphContext,
    name: &str,
    is_parameter: bool,
    out: &mut Vec<FlowNode>,
) -> String {
    let var_id = ctx.generate_id(&format!("var-{name}"));
    out.push(FlowNode::new(
        &var_id,
        NodeKind::Variable,
        NodeData {
            label: Some(name.to_owned()),
            value: is_parameter.then(|| "(parameter)".to_owned()),
            is_parameter: is_parameter.then_some(true),
            ..NodeData::default()
        },
    ));
    var_id
}
