use crate::flow::node::{FlowNode, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::parser::dispatch;
use crate::syntax::ExportDecl;

/// Handle an export statement.
///
/// Exports wrapping a recognized declaration delegate to that declaration's
/// handler with the exporting flags raised, so the inner node is marked
/// instead of duplicated. Bare clauses and default-exported expressions fall
/// back to a minimal placeholder node.
pub fn handle(
    export: &ExportDecl,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    if let Some(declaration) = &export.declaration {
        ctx.is_exporting = true;
        ctx.is_exporting_default = export.is_default;
        let result = dispatch::parse_statement(declaration, ctx, parent, id_suffix);
        ctx.is_exporting = false;
        ctx.is_exporting_default = false;
        return result;
    }

    let ordinal = ctx.nodes.len();
    let node_id = match id_suffix {
        Some(suffix) => format!("export-{ordinal}-{suffix}"),
        None => format!("export-{ordinal}"),
    };
    let (label, export_type) = if export.is_default {
        ("export default".to_owned(), "default")
    } else {
        ("export".to_owned(), "named")
    };

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::Export,
        NodeData {
            label: Some(label),
            export_type: Some(export_type.to_owned()),
            value: (!export.specifiers.is_empty()).then(|| export.specifiers.join(", ")),
            ..NodeData::default()
        },
    ));

    if let Some((parent_id, handle)) = parent {
        ctx.add_flow_chain_edge(parent_id, handle, &node_id);
    }

    Some(node_id)
}
