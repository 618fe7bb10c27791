use crate::flow::edge::BODY;
use crate::flow::node::{FlowNode, NodeData, NodeKind, NodeStyle};
use crate::parser::context::GraphContext;
use crate::parser::handlers::function::{materialize_params, param_summary};
use crate::syntax::ClassDecl;

/// Container width and the vertical slot reserved per method.
const CLASS_WIDTH: f64 = 360.0;
const CLASS_HEADER_HEIGHT: f64 = 120.0;
const METHOD_SLOT_HEIGHT: f64 = 150.0;

/// Handle a class declaration: a container node sized to fit its methods,
/// one method node per member (parented under the class), each method body
/// processed like a function body.
pub fn handle(class: &ClassDecl, ctx: &mut GraphContext, id_suffix: Option<&str>) -> Option<String> {
    let node_id = match id_suffix {
        Some(suffix) => format!("class-{}-{suffix}", class.name),
        None => format!("class-{}", class.name),
    };

    let mut node = FlowNode::new(
        &node_id,
        NodeKind::Class,
        NodeData {
            label: Some(class.name.clone()),
            is_decl: Some(true),
            is_exported: ctx.is_exporting.then_some(true),
            is_default_export: ctx.is_exporting_default.then_some(true),
            ..NodeData::default()
        },
    );
    node.style = Some(NodeStyle {
        width: Some(CLASS_WIDTH),
        height: Some(CLASS_HEADER_HEIGHT + METHOD_SLOT_HEIGHT * class.methods.len() as f64),
        z_index: None,
    });
    ctx.push_node(node);
    ctx.register_decl(&class.name, &node_id);

    let saved_parent = ctx.current_parent_id.replace(node_id.clone());

    for method in &class.methods {
        let method_id = match id_suffix {
            Some(suffix) => format!("method-{}-{}-{suffix}", class.name, method.name),
            None => format!("method-{}-{}", class.name, method.name),
        };
        let args: Vec<String> = method.params.iter().map(param_summary).collect();
        ctx.push_node(FlowNode::new(
            &method_id,
            NodeKind::Method,
            NodeData {
                label: Some(method.name.clone()),
                kind: Some(method.kind.as_str().to_owned()),
                args: Some(args),
                is_static: method.is_static.then_some(true),
                is_async: method.is_async.then_some(true),
                ..NodeData::default()
            },
        ));

        let pre_nodes = materialize_params(ctx, &method.params);
        ctx.process_block(&method.body, &method_id, BODY, "Body", pre_nodes);
    }

    ctx.current_parent_id = saved_parent;
    None
}
