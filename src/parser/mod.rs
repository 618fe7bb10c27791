pub mod context;
pub mod dispatch;
pub mod handlers;
pub mod ids;

use anyhow::Result;

use crate::flow::FlowGraph;
use crate::flow::edge::FLOW_NEXT;
use crate::syntax::{self, Dialect};
use context::GraphContext;
use ids::NativeApiSurface;

/// Knobs for one graph-construction run.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub dialect: Dialect,
    /// Additional names treated as part of the native runtime surface.
    pub extra_native_globals: Vec<String>,
}

/// Convert source text into a flow graph.
///
/// Drives the dispatcher over the top-level statements, threading a previous
/// node id so sequential statements are chained with `flow-next` edges. A
/// fresh context is used per call; nothing survives between invocations.
///
/// # Errors
/// Returns an error for malformed input (the syntax-tree producer rejects
/// it). There is no partial output.
pub fn source_to_flow(source: &str, options: &ParseOptions) -> Result<FlowGraph> {
    let program = syntax::parse_program(source, options.dialect)?;

    let mut ctx = GraphContext::new(NativeApiSurface::new(&options.extra_native_globals));
    let mut prev: Option<String> = None;
    for (i, stmt) in program.body.iter().enumerate() {
        let suffix = i.to_string();
        let chained = prev.as_deref().map(|p| (p, FLOW_NEXT));
        if let Some(id) = dispatch::parse_statement(stmt, &mut ctx, chained, Some(&suffix)) {
            prev = Some(id);
        }
    }
    Ok(ctx.into_graph())
}

/// Like [`source_to_flow`] but degrading any failure to the empty graph —
/// the contract the worker protocol exposes.
pub fn source_to_flow_or_empty(source: &str, options: &ParseOptions) -> FlowGraph {
    source_to_flow(source, options).unwrap_or_else(|_| FlowGraph::empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::edge::{self, FlowEdge};
    use crate::flow::node::{FlowNode, NodeKind};
    use crate::parser::context::NATIVE_API_NODE_ID;

    fn parse(source: &str) -> FlowGraph {
        source_to_flow(source, &ParseOptions::default()).expect("fixture should parse")
    }

    fn nodes_of_kind(graph: &FlowGraph, kind: NodeKind) -> Vec<&FlowNode> {
        graph.nodes.iter().filter(|n| n.kind == kind).collect()
    }

    fn edges_with_source_handle<'a>(graph: &'a FlowGraph, handle: &str) -> Vec<&'a FlowEdge> {
        graph
            .edges
            .iter()
            .filter(|e| e.source_handle == handle)
            .collect()
    }

    #[test]
    fn test_simple_destructuring_shape() {
        let graph = parse("const obj = load();\nconst {x, y} = obj;");

        let destructuring = nodes_of_kind(&graph, NodeKind::Destructuring);
        assert_eq!(destructuring.len(), 1, "exactly one destructuring node");
        let d = destructuring[0];
        assert_eq!(
            d.data.destructuring_keys.as_deref(),
            Some(["x".to_owned(), "y".to_owned()].as_slice())
        );
        assert_eq!(d.data.destructuring_source.as_deref(), Some("obj"));

        let obj_id = &graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("obj"))
            .expect("obj variable node")
            .id;
        let input_edges: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.source == *obj_id && e.target == d.id && e.target_handle == edge::INPUT)
            .collect();
        assert_eq!(input_edges.len(), 1, "one obj -> destructuring input edge");

        for key in ["x", "y"] {
            let key_edges: Vec<_> = graph
                .edges
                .iter()
                .filter(|e| e.source == d.id && e.source_handle == key)
                .collect();
            assert_eq!(key_edges.len(), 1, "one outgoing edge for key {key}");
            let target = graph.node(&key_edges[0].target).unwrap();
            assert_eq!(target.kind, NodeKind::Variable);
            assert_eq!(target.data.label.as_deref(), Some(key));
        }
    }

    #[test]
    fn test_parameter_destructuring_reads_from_arguments() {
        let graph = parse("function f({a, b}) { return a; }");

        let destructuring = nodes_of_kind(&graph, NodeKind::Destructuring);
        assert_eq!(destructuring.len(), 1);
        assert_eq!(
            destructuring[0].data.destructuring_source.as_deref(),
            Some("Arguments"),
            "parameter patterns read from Arguments regardless of the function name"
        );

        let params: Vec<_> = graph
            .nodes
            .iter()
            .filter(|n| n.data.is_parameter == Some(true))
            .collect();
        assert_eq!(params.len(), 2);
        for p in &params {
            assert_eq!(p.kind, NodeKind::Variable);
        }
    }

    #[test]
    fn test_nested_destructuring_chains_through_the_key_handle() {
        let graph = parse("const obj = load();\nconst {start: {x, y}, end} = obj;");

        let destructuring = nodes_of_kind(&graph, NodeKind::Destructuring);
        assert_eq!(destructuring.len(), 2, "one node per pattern level");

        let top = destructuring
            .iter()
            .find(|d| d.data.destructuring_source.as_deref() == Some("obj"))
            .expect("top-level destructuring node");
        let top_keys = top.data.destructuring_keys.as_ref().unwrap();
        assert!(top_keys.contains(&"start".to_owned()));
        assert!(top_keys.contains(&"end".to_owned()));

        let nested = destructuring
            .iter()
            .find(|d| d.data.destructuring_source.as_deref() == Some("start"))
            .expect("nested destructuring node");
        assert_eq!(
            nested.data.destructuring_keys.as_deref(),
            Some(["x".to_owned(), "y".to_owned()].as_slice())
        );

        let chain: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.source == top.id && e.target == nested.id && e.source_handle == "start")
            .collect();
        assert_eq!(chain.len(), 1, "the levels chain via the start handle");
    }

    #[test]
    fn test_if_else_branch_edges() {
        let graph = parse("if (cond) { doA(); } else { doB(); }");

        assert_eq!(nodes_of_kind(&graph, NodeKind::If).len(), 1);
        assert_eq!(edges_with_source_handle(&graph, edge::FLOW_TRUE).len(), 1);
        assert_eq!(edges_with_source_handle(&graph, edge::FLOW_FALSE).len(), 1);

        let if_node = &nodes_of_kind(&graph, NodeKind::If)[0];
        let scopes = if_node.data.scopes.as_ref().expect("branch scopes registered");
        assert!(scopes.contains_key(edge::FLOW_TRUE));
        assert!(scopes.contains_key(edge::FLOW_FALSE));
    }

    #[test]
    fn test_if_without_else_has_no_false_edge() {
        let graph = parse("if (cond) { doA(); }");
        assert_eq!(edges_with_source_handle(&graph, edge::FLOW_TRUE).len(), 1);
        assert!(edges_with_source_handle(&graph, edge::FLOW_FALSE).is_empty());
    }

    #[test]
    fn test_sequential_statements_chain_with_flow_next() {
        let graph = parse("greet('a');\ngreet('b');\ngreet('c');");
        assert_eq!(edges_with_source_handle(&graph, edge::FLOW_NEXT).len(), 2);
    }

    #[test]
    fn test_native_call_references_the_sentinel() {
        let graph = parse("const id = setTimeout(tick, 100);\nconsole.log(id);");

        let sentinels = nodes_of_kind(&graph, NodeKind::NativeApi);
        assert_eq!(sentinels.len(), 1, "exactly one native-api node per parse");

        let native_refs: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.source == NATIVE_API_NODE_ID)
            .collect();
        assert_eq!(native_refs.len(), 2, "both built-in uses trace to the sentinel");
        assert!(native_refs.iter().all(|e| !e.animated));
    }

    #[test]
    fn test_call_to_declared_function_gets_decl_ref() {
        let graph = parse("function greet(name) { return name; }\nconst msg = greet('hi');");

        let def = graph
            .nodes
            .iter()
            .find(|n| n.data.is_decl == Some(true))
            .expect("definition node");
        assert_eq!(def.data.label.as_deref(), Some("Definition: greet"));
        assert_eq!(def.data.usage_count, Some(1));

        let refs: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.source == def.id && e.source_handle == edge::REF_SOURCE)
            .collect();
        assert_eq!(refs.len(), 1, "the variable's value traces back to the definition");
    }

    #[test]
    fn test_imported_symbol_used_in_nested_scope_gets_macro_edge() {
        let graph = parse(
            "import { helper } from './util';\nfunction run() { const out = helper(1); return out; }",
        );

        let macro_edges: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.target_handle == edge::MACRO_DEP)
            .collect();
        assert!(
            !macro_edges.is_empty(),
            "imported symbol referenced inside a nested scope couples to the scope owner"
        );
        let import_node = &nodes_of_kind(&graph, NodeKind::Import)[0];
        assert!(macro_edges.iter().all(|e| e.source == import_node.id));
        assert!(macro_edges.iter().all(|e| !e.animated));
    }

    #[test]
    fn test_for_loop_wires_init_test_update_and_body() {
        let graph = parse("for (let i = 0; i < 3; i++) { work(i); }");

        let for_node = &nodes_of_kind(&graph, NodeKind::For)[0];
        let targets: Vec<&str> = graph
            .edges
            .iter()
            .filter(|e| e.target == for_node.id)
            .map(|e| e.target_handle.as_str())
            .collect();
        assert!(targets.contains(&edge::INIT));
        assert!(targets.contains(&edge::TEST));
        assert!(targets.contains(&edge::UPDATE));
        assert_eq!(edges_with_source_handle(&graph, edge::FLOW_BODY).len(), 1);
    }

    #[test]
    fn test_switch_cases_and_scopes() {
        let graph = parse("switch (mode) { case 1: a(); break; case 2: b(); break; default: c(); }");

        let switch_node = &nodes_of_kind(&graph, NodeKind::Switch)[0];
        assert_eq!(
            switch_node.data.cases.as_deref(),
            Some(["1".to_owned(), "2".to_owned(), "default".to_owned()].as_slice())
        );
        let scopes = switch_node.data.scopes.as_ref().unwrap();
        assert_eq!(scopes.len(), 3);
        assert_eq!(scopes.get("case-2").map(|s| s.label.as_str()), Some("Default"));
    }

    #[test]
    fn test_try_catch_finally_scopes() {
        let graph = parse("try { risky(); } catch { recover(); } finally { cleanup(); }");
        let node = &nodes_of_kind(&graph, NodeKind::TryCatch)[0];
        let scopes = node.data.scopes.as_ref().unwrap();
        assert!(scopes.contains_key(edge::FLOW_TRY));
        assert!(scopes.contains_key(edge::FLOW_CATCH));
        assert!(scopes.contains_key(edge::FLOW_FINALLY));
    }

    #[test]
    fn test_export_marks_the_inner_declaration() {
        let graph = parse("export const version = 1;\nexport default function main() {}");

        let version = graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("version"))
            .unwrap();
        assert_eq!(version.data.is_exported, Some(true));

        let main = graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("Definition: main"))
            .unwrap();
        assert_eq!(main.data.is_default_export, Some(true));
    }

    #[test]
    fn test_class_methods_are_contained_and_scoped() {
        let graph =
            parse("class Greeter { constructor(name) { this.name = name; } greet() { return 1; } }");

        let class_node = &nodes_of_kind(&graph, NodeKind::Class)[0];
        assert!(class_node.style.as_ref().and_then(|s| s.height).unwrap() > 0.0);

        let methods = nodes_of_kind(&graph, NodeKind::Method);
        assert_eq!(methods.len(), 2);
        assert!(
            methods
                .iter()
                .all(|m| m.parent_id.as_deref() == Some(class_node.id.as_str()))
        );
        assert_eq!(methods[0].data.kind.as_deref(), Some("constructor"));
    }

    #[test]
    fn test_await_initializer_is_flagged() {
        let graph = parse("async function go() { const data = await fetch('/api'); }");
        let data_node = graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("data"))
            .unwrap();
        assert_eq!(data_node.data.is_await, Some(true));
        assert_eq!(data_node.data.value.as_deref(), Some("(computed)"));
    }

    #[test]
    fn test_referential_integrity_on_a_mixed_fixture() {
        let graph = parse(
            "import { api } from './api';\n\
             const limit: number = 10;\n\
             function check(value) { if (value > limit) { return true; } return false; }\n\
             class Runner { run(input) { while (input) { input = step(input); } } }\n\
             const ok = check(limit);\n\
             api.report(ok);",
        );
        assert!(graph.dangling_edges().is_empty(), "every edge endpoint must exist");
        assert!(graph.duplicate_node_ids().is_empty(), "node ids must be unique");
    }

    #[test]
    fn test_idempotence_identical_source_identical_graph() {
        let source = "const a = 1;\nfunction f(x) { return x + a; }\nconst b = f(2);";
        let first = serde_json::to_value(parse(source)).unwrap();
        let second = serde_json::to_value(parse(source)).unwrap();
        assert_eq!(first, second, "fresh contexts must reproduce the graph exactly");
    }

    #[test]
    fn test_malformed_input_degrades_to_empty() {
        let graph = source_to_flow_or_empty("function broken( {", &ParseOptions::default());
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
        assert!(source_to_flow("const x = ;", &ParseOptions::default()).is_err());
    }

    #[test]
    fn test_unrecognized_statement_is_silently_skipped() {
        let with = parse("const a = 1;\ndebugger;\nconst b = 2;");
        let without = parse("const a = 1;\nconst b = 2;");
        assert_eq!(
            with.nodes.len(),
            without.nodes.len(),
            "unsupported statements leave no node behind"
        );
    }

    #[test]
    fn test_logic_operands_wire_into_a_and_b() {
        let graph = parse("const x = 1;\nconst y = 2;\nif (x < y) { act(); }");
        let logic = nodes_of_kind(&graph, NodeKind::Logic);
        assert_eq!(logic.len(), 1);
        assert_eq!(logic[0].data.op.as_deref(), Some("<"));

        let inputs: Vec<&str> = graph
            .edges
            .iter()
            .filter(|e| e.target == logic[0].id)
            .map(|e| e.target_handle.as_str())
            .collect();
        assert!(inputs.contains(&edge::INPUT_A));
        assert!(inputs.contains(&edge::INPUT_B));

        let result: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.source == logic[0].id && e.source_handle == edge::RESULT)
            .collect();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].target_handle, edge::CONDITION);
    }

    #[test]
    fn test_assignment_renders_as_set_node() {
        let graph = parse("let total = 0;\ntotal = total + 5;");
        let set_node = graph
            .nodes
            .iter()
            .find(|n| n.data.label.as_deref() == Some("Set: total"))
            .expect("assignment node");
        let incoming: Vec<_> = graph
            .edges
            .iter()
            .filter(|e| e.target == set_node.id && e.target_handle == "arg-0")
            .collect();
        assert_eq!(incoming.len(), 1, "the right-hand side feeds the Value slot");
    }
}
