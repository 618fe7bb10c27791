use crate::flow::node::{FlowNode, ImportSpecifier, NodeData, NodeKind};
use crate::parser::context::GraphContext;
use crate::syntax::ImportDecl;

/// Handle an import statement: one node per statement, every local binding
/// registered under the `import:` prefix so later references can be styled
/// as imports and wired with macro dependency edges.
pub fn handle(
    import: &ImportDecl,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    let ordinal = ctx.nodes.len();
    let node_id = match id_suffix {
        Some(suffix) => format!("import-{ordinal}-{suffix}"),
        None => format!("import-{ordinal}"),
    };

    let specifiers: Vec<ImportSpecifier> = import
        .specifiers
        .iter()
        .map(|s| ImportSpecifier {
            local: s.local.clone(),
            imported: s.imported.clone(),
            kind: s.kind.as_str().to_owned(),
        })
        .collect();

    ctx.push_node(FlowNode::new(
        &node_id,
        NodeKind::Import,
        NodeData {
            label: Some(format!("import from '{}'", import.source)),
            source: Some(import.source.clone()),
            specifiers: Some(specifiers),
            ..NodeData::default()
        },
    ));

    for specifier in &import.specifiers {
        ctx.register_import(&specifier.local, &node_id);
    }

    if let Some((parent_id, handle)) = parent {
        ctx.add_flow_chain_edge(parent_id, handle, &node_id);
    }

    Some(node_id)
}
