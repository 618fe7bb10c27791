use crate::flow::edge::{CONDITION, FLOW_BODY, FLOW_IN, INIT, OUTPUT, RESULT, RETURN, TEST, UPDATE};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::handlers::{assignment, logic, variable};
use crate::syntax::{BindingTarget, Expr, ForStmt, Stmt, WhileStmt};

/// Handle a `for` loop: init and update clauses feed dedicated handles, the
/// test feeds `test`, the body gets its own scope on `flow-body`.
pub fn handle_for(
    stmt: &ForStmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("for-{suffix}"),
        None => ctx.generate_id("for"),
    };

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::For,
        NodeData {
            label: Some("For".to_owned()),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    if let Some(init) = &stmt.init {
        // The loop's own suffix keeps init-clause ids unique across loops
        // declaring the same counter name.
        let init_suffix = id_suffix.map(|s| format!("{s}-init"));
        match &**init {
            Stmt::VarDecl(decl) => {
                variable::handle(decl, ctx, None, init_suffix.as_deref());
                // Wire the first declared variable into the init handle.
                if let Some(BindingTarget::Ident(name)) =
                    decl.declarators.first().map(|d| &d.target)
                    && let Some(var_id) = ctx.resolve_value_source(name)
                {
                    ctx.add_edge(&var_id, &node_id, OUTPUT, INIT);
                }
            }
            Stmt::Expr(Expr::Assign(assign)) => {
                if let Some(assign_id) = assignment::handle(assign, ctx, None, init_suffix.as_deref())
                {
                    ctx.add_edge(&assign_id, &node_id, RESULT, INIT);
                }
            }
            _ => {}
        }
    }

    // The update clause materializes as a small synthetic statement node.
    if let Some(Expr::Update(update)) = &stmt.update {
        let update_id = ctx.generate_id("update");
        let arg_name = update.arg.as_deref().unwrap_or("i");
        ctx.push_node(FlowNode::new(
            &update_id,
            NodeKind::FunctionCall,
            NodeData {
                label: Some(format!("{arg_name}{}", update.op)),
                args: Some(Vec::new()),
                is_standalone: Some(true),
                ..NodeData::default()
            },
        ));
        ctx.add_edge(&update_id, &node_id, RETURN, UPDATE);
    }

    if let Some(test) = &stmt.test {
        wire_test(test, ctx, &node_id, TEST);
    }

    ctx.process_block(&stmt.body, &node_id, FLOW_BODY, "Body", Vec::new());
    Some(node_id)
}

/// Handle a `while` loop: test feeds `condition`, body gets its own scope.
pub fn handle_while(
    stmt: &WhileStmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("while-{suffix}"),
        None => ctx.generate_id("while"),
    };

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::While,
        NodeData {
            label: Some("While".to_owned()),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    wire_test(&stmt.test, ctx, &node_id, CONDITION);
    ctx.process_block(&stmt.body, &node_id, FLOW_BODY, "Body", Vec::new());
    Some(node_id)
}

fn wire_test(test: &Expr, ctx: &mut GraphContext, node_id: &str, target_handle: &str) {
    match test {
        Expr::Binary(binary) => {
            logic::handle_expression(binary, ctx, node_id, target_handle, None);
        }
        Expr::Ident(name) => {
            if let Some(source_id) = ctx.resolve_value_source(name) {
                ctx.add_edge(&source_id, node_id, OUTPUT, target_handle);
            }
        }
        _ => {}
    }
}
