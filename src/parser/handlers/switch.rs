use crate::flow::edge::{DISCRIMINANT, FLOW_IN, OUTPUT};
use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::syntax::{Expr, SwitchStmt};

/// Handle a switch statement: one node carrying the case labels, the
/// discriminant wired into `discriminant`, and one navigable scope per
/// non-empty clause on `case-<index>`.
pub fn handle(
    stmt: &SwitchStmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("switch-{suffix}"),
        None => ctx.generate_id("switch"),
    };

    let case_labels: Vec<String> = stmt
        .cases
        .iter()
        .map(|case| match &case.test {
            Some(Expr::Literal(lit)) => lit.value_string(),
            Some(_) => "case".to_owned(),
            None => "default".to_owned(),
        })
        .collect();

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::Switch,
        NodeData {
            label: Some("Switch".to_owned()),
            cases: Some(case_labels.clone()),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_edge(parent_id, &node_id, handle, FLOW_IN);
    }

    if let Expr::Ident(name) = &stmt.discriminant
        && let Some(source_id) = ctx.resolve_value_source(name)
    {
        ctx.add_edge(&source_id, &node_id, OUTPUT, DISCRIMINANT);
    }

    for (i, case) in stmt.cases.iter().enumerate() {
        if case.body.is_empty() {
            continue;
        }
        let handle = format!("case-{i}");
        let label = if case.test.is_some() {
            format!("Case {}", case_labels[i])
        } else {
            "Default".to_owned()
        };
        ctx.process_block(&case.body, &node_id, &handle, &label, Vec::new());
    }

    Some(node_id)
}
