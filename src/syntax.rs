//! Syntax-tree boundary: parses source text with tree-sitter and lowers the
//! CST into a closed sum type covering the recognized statement and expression
//! subset.
//!
//! Lowering is deliberately lossy — constructs outside the subset produce
//! nothing and simply do not appear in the graph. Recognition happens here and
//! only here, so every downstream handler can rely on the shapes it receives.

use anyhow::{Result, anyhow, bail};
use tree_sitter::{Node, Parser};

/// The grammar dialect used for parsing.
///
/// TypeScript is the default: its grammar accepts type annotations, class
/// fields, rest/spread and dynamic import alongside plain JavaScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    TypeScript,
    Tsx,
    JavaScript,
}

impl Dialect {
    /// Parse a CLI/config string into a `Dialect`. Case-insensitive.
    pub fn from_str_loose(s: &str) -> Option<Dialect> {
        match s.to_lowercase().as_str() {
            "typescript" | "ts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            "javascript" | "js" => Some(Dialect::JavaScript),
            _ => None,
        }
    }

    fn language(self) -> tree_sitter::Language {
        match self {
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Lowered statement forms
// ---------------------------------------------------------------------------

/// A lowered top-level or nested statement list.
#[derive(Debug, Clone)]
pub struct Program {
    pub body: Vec<Stmt>,
}

/// The recognized statement subset.
#[derive(Debug, Clone)]
pub enum Stmt {
    VarDecl(VarDecl),
    Function(FuncDecl),
    Class(ClassDecl),
    Import(ImportDecl),
    Export(ExportDecl),
    If(IfStmt),
    For(ForStmt),
    While(WhileStmt),
    Switch(SwitchStmt),
    Try(TryStmt),
    Return(ReturnStmt),
    /// An expression statement whose inner expression is in the subset.
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct VarDecl {
    pub declarators: Vec<Declarator>,
}

#[derive(Debug, Clone)]
pub struct Declarator {
    pub target: BindingTarget,
    pub type_note: Option<TypeNote>,
    pub init: Option<Expr>,
}

/// The left-hand side of a declarator: a simple name or an object pattern.
#[derive(Debug, Clone)]
pub enum BindingTarget {
    Ident(String),
    Pattern(ObjectPattern),
}

/// An object destructuring pattern, possibly nested.
#[derive(Debug, Clone)]
pub struct ObjectPattern {
    pub props: Vec<PatternProp>,
}

#[derive(Debug, Clone)]
pub enum PatternProp {
    /// `{ x }` — key and binding share a name.
    Shorthand(String),
    /// `{ key: binding }`.
    Renamed { key: String, binding: String },
    /// `{ key: { ... } }` — a nested pattern level.
    Nested { key: String, pattern: ObjectPattern },
}

impl ObjectPattern {
    /// The property names at this pattern level, in source order.
    pub fn keys(&self) -> Vec<String> {
        self.props
            .iter()
            .map(|p| match p {
                PatternProp::Shorthand(name) => name.clone(),
                PatternProp::Renamed { key, .. } | PatternProp::Nested { key, .. } => key.clone(),
            })
            .collect()
    }

    /// A `{a, b}` style one-line summary used for parameter labels.
    pub fn summary(&self) -> String {
        format!("{{{}}}", self.keys().join(", "))
    }
}

/// A recognized type annotation, mapped from a small fixed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNote {
    Boolean,
    Number,
    String,
    Any,
    Unknown,
    Void,
    Named(String),
}

impl TypeNote {
    pub fn label(&self) -> String {
        match self {
            TypeNote::Boolean => "boolean".to_owned(),
            TypeNote::Number => "number".to_owned(),
            TypeNote::String => "string".to_owned(),
            TypeNote::Any => "any".to_owned(),
            TypeNote::Unknown => "unknown".to_owned(),
            TypeNote::Void => "void".to_owned(),
            TypeNote::Named(name) => name.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    pub is_async: bool,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Param {
    Ident { name: String, type_note: Option<TypeNote> },
    Pattern(ObjectPattern),
}

#[derive(Debug, Clone)]
pub struct ClassDecl {
    pub name: String,
    pub methods: Vec<MethodDecl>,
}

#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub kind: MethodKind,
    pub is_static: bool,
    pub is_async: bool,
    pub params: Vec<Param>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Constructor,
    Method,
    Getter,
    Setter,
}

impl MethodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MethodKind::Constructor => "constructor",
            MethodKind::Method => "method",
            MethodKind::Getter => "getter",
            MethodKind::Setter => "setter",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportDecl {
    pub source: String,
    pub specifiers: Vec<ImportBinding>,
}

#[derive(Debug, Clone)]
pub struct ImportBinding {
    pub local: String,
    /// The name at the source module when it differs from `local`.
    pub imported: Option<String>,
    pub kind: ImportKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    Named,
    Default,
    Namespace,
}

impl ImportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ImportKind::Named => "named",
            ImportKind::Default => "default",
            ImportKind::Namespace => "namespace",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportDecl {
    pub is_default: bool,
    /// The wrapped declaration for `export const/function/class ...` forms.
    pub declaration: Option<Box<Stmt>>,
    /// Exported names for bare `export { a, b }` clauses.
    pub specifiers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub test: Expr,
    pub consequent: Vec<Stmt>,
    pub alternate: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    /// A `VarDecl` or an assignment expression statement.
    pub init: Option<Box<Stmt>>,
    pub test: Option<Expr>,
    pub update: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub test: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub discriminant: Expr,
    pub cases: Vec<SwitchCase>,
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    /// `None` for the default clause.
    pub test: Option<Expr>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct TryStmt {
    pub block: Vec<Stmt>,
    pub handler: Option<Vec<Stmt>>,
    pub finalizer: Option<Vec<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub argument: Option<Expr>,
}

// ---------------------------------------------------------------------------
// Lowered expression forms
// ---------------------------------------------------------------------------

/// The recognized expression subset.
#[derive(Debug, Clone)]
pub enum Expr {
    Ident(String),
    Literal(Lit),
    /// A template string; only the substitution expressions are retained.
    Template(Vec<Expr>),
    Call(CallExpr),
    /// Binary and logical operators share one form; the operator token
    /// distinguishes them.
    Binary(BinaryExpr),
    Assign(AssignExpr),
    Update(UpdateExpr),
    Await(Box<Expr>),
    /// Anything outside the subset. Consumers skip it defensively.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lit {
    Number(String),
    Str(String),
    Bool(bool),
}

impl Lit {
    /// The raw value rendering (unquoted for strings).
    pub fn value_string(&self) -> String {
        match self {
            Lit::Number(n) => n.clone(),
            Lit::Str(s) => s.clone(),
            Lit::Bool(b) => b.to_string(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Lit::Number(_) => "number",
            Lit::Str(_) => "string",
            Lit::Bool(_) => "boolean",
        }
    }
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Callee,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub enum Callee {
    Ident(String),
    Member { object: String, property: String },
    Other,
}

impl Callee {
    /// Display label: `name`, `obj.prop`, or the `function` fallback.
    pub fn label(&self) -> String {
        match self {
            Callee::Ident(name) => name.clone(),
            Callee::Member { object, property } => format!("{object}.{property}"),
            Callee::Other => "function".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub op: String,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct AssignExpr {
    /// Identifier targets only; anything else leaves this unset.
    pub target: Option<String>,
    pub op: String,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct UpdateExpr {
    pub arg: Option<String>,
    pub op: String,
}

// ---------------------------------------------------------------------------
// Parse entry
// ---------------------------------------------------------------------------

/// Parse source text and lower it to the recognized statement subset.
///
/// # Errors
/// Returns an error if tree-sitter cannot produce a tree or the tree contains
/// error/missing nodes (malformed input). Callers degrade to an empty graph.
pub fn parse_program(source: &str, dialect: Dialect) -> Result<Program> {
    let mut parser = Parser::new();
    parser
        .set_language(&dialect.language())
        .expect("grammar version mismatch");

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| anyhow!("tree-sitter returned no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let pos = first_error_position(root);
        bail!("syntax error at line {}, column {}", pos.0 + 1, pos.1);
    }

    let src = source.as_bytes();
    let mut body = Vec::new();
    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        if let Some(stmt) = lower_statement(child, src) {
            body.push(stmt);
        }
    }
    Ok(Program { body })
}

/// Row/column of the first error or missing node under `root`.
fn first_error_position(root: Node) -> (usize, usize) {
    let mut cursor = root.walk();
    loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let p = node.start_position();
            return (p.row, p.column);
        }
        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                let p = root.start_position();
                return (p.row, p.column);
            }
        }
    }
}

fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

// ---------------------------------------------------------------------------
// Statement lowering
// ---------------------------------------------------------------------------

fn lower_statement(node: Node, src: &[u8]) -> Option<Stmt> {
    match node.kind() {
        "lexical_declaration" | "variable_declaration" => {
            lower_var_decl(node, src).map(Stmt::VarDecl)
        }
        "function_declaration" => lower_function(node, src).map(Stmt::Function),
        "class_declaration" => lower_class(node, src).map(Stmt::Class),
        "import_statement" => lower_import(node, src).map(Stmt::Import),
        "export_statement" => Some(Stmt::Export(lower_export(node, src))),
        "if_statement" => lower_if(node, src).map(Stmt::If),
        "for_statement" => Some(Stmt::For(lower_for(node, src))),
        "while_statement" => lower_while(node, src).map(Stmt::While),
        "switch_statement" => lower_switch(node, src).map(Stmt::Switch),
        "try_statement" => lower_try(node, src).map(Stmt::Try),
        "return_statement" => Some(Stmt::Return(ReturnStmt {
            argument: node.named_child(0).map(|n| lower_expression(n, src)),
        })),
        "expression_statement" => {
            let expr = lower_expression(node.named_child(0)?, src);
            if matches!(expr, Expr::Other) {
                None
            } else {
                Some(Stmt::Expr(expr))
            }
        }
        _ => None,
    }
}

/// Lower a block body: a `statement_block` yields its statements, any other
/// single statement yields a one-element list.
fn lower_block(node: Node, src: &[u8]) -> Vec<Stmt> {
    if node.kind() == "statement_block" {
        let mut body = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            if let Some(stmt) = lower_statement(child, src) {
                body.push(stmt);
            }
        }
        body
    } else {
        lower_statement(node, src).into_iter().collect()
    }
}

fn lower_var_decl(node: Node, src: &[u8]) -> Option<VarDecl> {
    let mut declarators = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "variable_declarator" {
            continue;
        }
        let Some(name_node) = child.child_by_field_name("name") else {
            continue;
        };
        let target = match name_node.kind() {
            "identifier" => BindingTarget::Ident(node_text(name_node, src).to_owned()),
            "object_pattern" => BindingTarget::Pattern(lower_object_pattern(name_node, src)),
            // Array patterns and other targets are outside the subset.
            _ => continue,
        };
        let type_note = child
            .child_by_field_name("type")
            .and_then(|t| lower_type_annotation(t, src));
        let init = child
            .child_by_field_name("value")
            .map(|v| lower_expression(v, src));
        declarators.push(Declarator { target, type_note, init });
    }
    if declarators.is_empty() {
        None
    } else {
        Some(VarDecl { declarators })
    }
}

fn lower_object_pattern(node: Node, src: &[u8]) -> ObjectPattern {
    let mut props = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "shorthand_property_identifier_pattern" => {
                props.push(PatternProp::Shorthand(node_text(child, src).to_owned()));
            }
            "pair_pattern" => {
                let Some(key_node) = child.child_by_field_name("key") else {
                    continue;
                };
                // Computed and string keys are skipped, not mis-rendered.
                if !matches!(key_node.kind(), "property_identifier" | "identifier") {
                    continue;
                }
                let key = node_text(key_node, src).to_owned();
                match child.child_by_field_name("value").map(|v| (v, v.kind())) {
                    Some((v, "identifier")) => props.push(PatternProp::Renamed {
                        key,
                        binding: node_text(v, src).to_owned(),
                    }),
                    Some((v, "object_pattern")) => props.push(PatternProp::Nested {
                        key,
                        pattern: lower_object_pattern(v, src),
                    }),
                    _ => {}
                }
            }
            "object_assignment_pattern" => {
                // `{ a = 1 }` — the default value is not represented.
                if let Some(left) = child.child_by_field_name("left")
                    && left.kind() == "shorthand_property_identifier_pattern"
                {
                    props.push(PatternProp::Shorthand(node_text(left, src).to_owned()));
                }
            }
            _ => {}
        }
    }
    ObjectPattern { props }
}

fn lower_type_annotation(node: Node, src: &[u8]) -> Option<TypeNote> {
    let ty = node.named_child(0)?;
    match ty.kind() {
        "predefined_type" => match node_text(ty, src) {
            "boolean" => Some(TypeNote::Boolean),
            "number" => Some(TypeNote::Number),
            "string" => Some(TypeNote::String),
            "any" => Some(TypeNote::Any),
            "unknown" => Some(TypeNote::Unknown),
            "void" => Some(TypeNote::Void),
            _ => None,
        },
        "type_identifier" => Some(TypeNote::Named(node_text(ty, src).to_owned())),
        _ => None,
    }
}

/// True when the node carries a bare `async` keyword child (functions, methods).
fn has_keyword(node: Node, keyword: &str) -> bool {
    let mut cursor = node.walk();
    node.children(&mut cursor).any(|c| c.kind() == keyword)
}

fn lower_function(node: Node, src: &[u8]) -> Option<FuncDecl> {
    let name = node_text(node.child_by_field_name("name")?, src).to_owned();
    let params = node
        .child_by_field_name("parameters")
        .map(|p| lower_params(p, src))
        .unwrap_or_default();
    let body = node
        .child_by_field_name("body")
        .map(|b| lower_block(b, src))
        .unwrap_or_default();
    Some(FuncDecl {
        name,
        is_async: has_keyword(node, "async"),
        params,
        body,
    })
}

fn lower_params(params_node: Node, src: &[u8]) -> Vec<Param> {
    let mut params = Vec::new();
    let mut cursor = params_node.walk();
    for child in params_node.named_children(&mut cursor) {
        match child.kind() {
            // TypeScript grammar wraps each parameter.
            "required_parameter" | "optional_parameter" => {
                let Some(pattern) = child.child_by_field_name("pattern") else {
                    continue;
                };
                let type_note = child
                    .child_by_field_name("type")
                    .and_then(|t| lower_type_annotation(t, src));
                match pattern.kind() {
                    "identifier" => params.push(Param::Ident {
                        name: node_text(pattern, src).to_owned(),
                        type_note,
                    }),
                    "object_pattern" => {
                        params.push(Param::Pattern(lower_object_pattern(pattern, src)));
                    }
                    _ => {}
                }
            }
            // JavaScript grammar exposes the patterns directly.
            "identifier" => params.push(Param::Ident {
                name: node_text(child, src).to_owned(),
                type_note: None,
            }),
            "object_pattern" => params.push(Param::Pattern(lower_object_pattern(child, src))),
            _ => {}
        }
    }
    params
}

fn lower_class(node: Node, src: &[u8]) -> Option<ClassDecl> {
    let name = node_text(node.child_by_field_name("name")?, src).to_owned();
    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for member in body.named_children(&mut cursor) {
            if member.kind() != "method_definition" {
                continue;
            }
            let Some(name_node) = member.child_by_field_name("name") else {
                continue;
            };
            if !matches!(name_node.kind(), "property_identifier" | "identifier") {
                continue;
            }
            let method_name = node_text(name_node, src).to_owned();
            let kind = if method_name == "constructor" {
                MethodKind::Constructor
            } else if has_keyword(member, "get") {
                MethodKind::Getter
            } else if has_keyword(member, "set") {
                MethodKind::Setter
            } else {
                MethodKind::Method
            };
            let params = member
                .child_by_field_name("parameters")
                .map(|p| lower_params(p, src))
                .unwrap_or_default();
            let body = member
                .child_by_field_name("body")
                .map(|b| lower_block(b, src))
                .unwrap_or_default();
            methods.push(MethodDecl {
                name: method_name,
                kind,
                is_static: has_keyword(member, "static"),
                is_async: has_keyword(member, "async"),
                params,
                body,
            });
        }
    }
    Some(ClassDecl { name, methods })
}

fn lower_import(node: Node, src: &[u8]) -> Option<ImportDecl> {
    let source_node = node.child_by_field_name("source")?;
    let source = string_value(source_node, src);

    let mut specifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "import_clause" {
            lower_import_clause(child, src, &mut specifiers);
        }
    }
    Some(ImportDecl { source, specifiers })
}

fn lower_import_clause(clause: Node, src: &[u8], out: &mut Vec<ImportBinding>) {
    let mut cursor = clause.walk();
    for child in clause.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => out.push(ImportBinding {
                local: node_text(child, src).to_owned(),
                imported: None,
                kind: ImportKind::Default,
            }),
            "namespace_import" => {
                // `* as ns` — the identifier has no field name in the grammar.
                let mut ns_cursor = child.walk();
                for ns_child in child.named_children(&mut ns_cursor) {
                    if ns_child.kind() == "identifier" {
                        out.push(ImportBinding {
                            local: node_text(ns_child, src).to_owned(),
                            imported: None,
                            kind: ImportKind::Namespace,
                        });
                    }
                }
            }
            "named_imports" => {
                let mut named_cursor = child.walk();
                for spec in child.named_children(&mut named_cursor) {
                    if spec.kind() != "import_specifier" {
                        continue;
                    }
                    let name = spec.child_by_field_name("name");
                    let alias = spec.child_by_field_name("alias");
                    match (name, alias) {
                        // `{ foo as bar }`: name is the exported name, alias the local.
                        (Some(n), Some(a)) => out.push(ImportBinding {
                            local: node_text(a, src).to_owned(),
                            imported: Some(node_text(n, src).to_owned()),
                            kind: ImportKind::Named,
                        }),
                        (Some(n), None) => out.push(ImportBinding {
                            local: node_text(n, src).to_owned(),
                            imported: None,
                            kind: ImportKind::Named,
                        }),
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

fn lower_export(node: Node, src: &[u8]) -> ExportDecl {
    let is_default = has_keyword(node, "default");
    let declaration = node
        .child_by_field_name("declaration")
        .and_then(|d| lower_statement(d, src))
        .map(Box::new);

    let mut specifiers = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() == "export_clause" {
            let mut clause_cursor = child.walk();
            for spec in child.named_children(&mut clause_cursor) {
                if spec.kind() == "export_specifier"
                    && let Some(name) = spec.child_by_field_name("name")
                {
                    specifiers.push(node_text(name, src).to_owned());
                }
            }
        }
    }

    ExportDecl {
        is_default,
        declaration,
        specifiers,
    }
}

fn lower_if(node: Node, src: &[u8]) -> Option<IfStmt> {
    let test = lower_expression(unwrap_parens(node.child_by_field_name("condition")?), src);
    let consequent = node
        .child_by_field_name("consequence")
        .map(|c| lower_block(c, src))
        .unwrap_or_default();
    // The alternative field is an else_clause wrapping either a block or a
    // chained if_statement.
    let alternate = node
        .child_by_field_name("alternative")
        .and_then(|alt| alt.named_child(0))
        .map(|inner| lower_block(inner, src));
    Some(IfStmt {
        test,
        consequent,
        alternate,
    })
}

fn lower_for(node: Node, src: &[u8]) -> ForStmt {
    let init = node.child_by_field_name("initializer").and_then(|n| {
        match n.kind() {
            "lexical_declaration" | "variable_declaration" => lower_statement(n, src),
            // `for (i = 0; ...)` — the initializer is an expression statement.
            "expression_statement" => n.named_child(0).and_then(|e| {
                let expr = lower_expression(e, src);
                matches!(expr, Expr::Assign(_)).then_some(Stmt::Expr(expr))
            }),
            _ => None,
        }
        .map(Box::new)
    });
    let test = node.child_by_field_name("condition").and_then(|n| {
        let inner = if n.kind() == "expression_statement" {
            n.named_child(0)?
        } else {
            n
        };
        let expr = lower_expression(inner, src);
        (!matches!(expr, Expr::Other)).then_some(expr)
    });
    let update = node.child_by_field_name("increment").map(|n| lower_expression(n, src));
    let body = node
        .child_by_field_name("body")
        .map(|b| lower_block(b, src))
        .unwrap_or_default();
    ForStmt {
        init,
        test,
        update,
        body,
    }
}

fn lower_while(node: Node, src: &[u8]) -> Option<WhileStmt> {
    let test = lower_expression(unwrap_parens(node.child_by_field_name("condition")?), src);
    let body = node
        .child_by_field_name("body")
        .map(|b| lower_block(b, src))
        .unwrap_or_default();
    Some(WhileStmt { test, body })
}

fn lower_switch(node: Node, src: &[u8]) -> Option<SwitchStmt> {
    let discriminant = lower_expression(unwrap_parens(node.child_by_field_name("value")?), src);
    let mut cases = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for clause in body.named_children(&mut cursor) {
            match clause.kind() {
                "switch_case" => {
                    let value = clause.child_by_field_name("value");
                    let test = value.map(|v| lower_expression(v, src));
                    let value_id = value.map(|v| v.id());
                    let mut stmts = Vec::new();
                    let mut case_cursor = clause.walk();
                    for child in clause.named_children(&mut case_cursor) {
                        if Some(child.id()) == value_id {
                            continue;
                        }
                        if let Some(stmt) = lower_statement(child, src) {
                            stmts.push(stmt);
                        }
                    }
                    cases.push(SwitchCase { test, body: stmts });
                }
                "switch_default" => {
                    let mut stmts = Vec::new();
                    let mut case_cursor = clause.walk();
                    for child in clause.named_children(&mut case_cursor) {
                        if let Some(stmt) = lower_statement(child, src) {
                            stmts.push(stmt);
                        }
                    }
                    cases.push(SwitchCase {
                        test: None,
                        body: stmts,
                    });
                }
                _ => {}
            }
        }
    }
    Some(SwitchStmt {
        discriminant,
        cases,
    })
}

fn lower_try(node: Node, src: &[u8]) -> Option<TryStmt> {
    let block = lower_block(node.child_by_field_name("body")?, src);
    let mut handler = None;
    let mut finalizer = None;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "catch_clause" => {
                handler = child.child_by_field_name("body").map(|b| lower_block(b, src));
            }
            "finally_clause" => {
                finalizer = child.named_child(0).map(|b| lower_block(b, src));
            }
            _ => {}
        }
    }
    Some(TryStmt {
        block,
        handler,
        finalizer,
    })
}

// ---------------------------------------------------------------------------
// Expression lowering
// ---------------------------------------------------------------------------

fn unwrap_parens(node: Node) -> Node {
    if node.kind() == "parenthesized_expression"
        && let Some(inner) = node.named_child(0)
    {
        return unwrap_parens(inner);
    }
    node
}

fn lower_expression(node: Node, src: &[u8]) -> Expr {
    let node = unwrap_parens(node);
    match node.kind() {
        "identifier" => Expr::Ident(node_text(node, src).to_owned()),
        "number" => Expr::Literal(Lit::Number(node_text(node, src).to_owned())),
        "string" => Expr::Literal(Lit::Str(string_value(node, src))),
        "true" => Expr::Literal(Lit::Bool(true)),
        "false" => Expr::Literal(Lit::Bool(false)),
        "template_string" => {
            let mut exprs = Vec::new();
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                if child.kind() == "template_substitution"
                    && let Some(inner) = child.named_child(0)
                {
                    exprs.push(lower_expression(inner, src));
                }
            }
            Expr::Template(exprs)
        }
        "call_expression" => lower_call(node, src),
        "binary_expression" => {
            let (Some(left), Some(op), Some(right)) = (
                node.child_by_field_name("left"),
                node.child_by_field_name("operator"),
                node.child_by_field_name("right"),
            ) else {
                return Expr::Other;
            };
            Expr::Binary(BinaryExpr {
                op: node_text(op, src).to_owned(),
                left: Box::new(lower_expression(left, src)),
                right: Box::new(lower_expression(right, src)),
            })
        }
        "assignment_expression" => {
            let target = node
                .child_by_field_name("left")
                .filter(|l| l.kind() == "identifier")
                .map(|l| node_text(l, src).to_owned());
            let value = node
                .child_by_field_name("right")
                .map(|r| lower_expression(r, src))
                .unwrap_or(Expr::Other);
            Expr::Assign(AssignExpr {
                target,
                op: "=".to_owned(),
                value: Box::new(value),
            })
        }
        "augmented_assignment_expression" => {
            let target = node
                .child_by_field_name("left")
                .filter(|l| l.kind() == "identifier")
                .map(|l| node_text(l, src).to_owned());
            let op = node
                .child_by_field_name("operator")
                .map(|o| node_text(o, src).to_owned())
                .unwrap_or_else(|| "=".to_owned());
            let value = node
                .child_by_field_name("right")
                .map(|r| lower_expression(r, src))
                .unwrap_or(Expr::Other);
            Expr::Assign(AssignExpr {
                target,
                op,
                value: Box::new(value),
            })
        }
        "update_expression" => {
            let arg = node
                .child_by_field_name("argument")
                .filter(|a| a.kind() == "identifier")
                .map(|a| node_text(a, src).to_owned());
            let op = node
                .child_by_field_name("operator")
                .map(|o| node_text(o, src).to_owned())
                .unwrap_or_else(|| "++".to_owned());
            Expr::Update(UpdateExpr { arg, op })
        }
        "await_expression" => match node.named_child(0) {
            Some(inner) => Expr::Await(Box::new(lower_expression(inner, src))),
            None => Expr::Other,
        },
        // TS wrappers that do not change the runtime value.
        "non_null_expression" | "as_expression" | "satisfies_expression" => {
            match node.named_child(0) {
                Some(inner) => lower_expression(inner, src),
                None => Expr::Other,
            }
        }
        _ => Expr::Other,
    }
}

fn lower_call(node: Node, src: &[u8]) -> Expr {
    let callee = match node.child_by_field_name("function") {
        Some(f) if f.kind() == "identifier" => Callee::Ident(node_text(f, src).to_owned()),
        Some(f) if f.kind() == "member_expression" => {
            let object = f.child_by_field_name("object");
            let property = f.child_by_field_name("property");
            match (object, property) {
                (Some(o), Some(p)) if o.kind() == "identifier" => Callee::Member {
                    object: node_text(o, src).to_owned(),
                    property: node_text(p, src).to_owned(),
                },
                _ => Callee::Other,
            }
        }
        _ => Callee::Other,
    };

    let mut args = Vec::new();
    if let Some(args_node) = node.child_by_field_name("arguments")
        && args_node.kind() == "arguments"
    {
        let mut cursor = args_node.walk();
        for arg in args_node.named_children(&mut cursor) {
            args.push(lower_expression(arg, src));
        }
    }

    Expr::Call(CallExpr { callee, args })
}

/// The unquoted contents of a `string` node (its fragment children joined).
fn string_value(node: Node, src: &[u8]) -> String {
    let mut out = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if matches!(child.kind(), "string_fragment" | "escape_sequence") {
            out.push_str(node_text(child, src));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Program {
        parse_program(source, Dialect::TypeScript).expect("fixture should parse")
    }

    #[test]
    fn test_lowers_variable_declaration_with_literal() {
        let program = parse("const x = 42;");
        assert_eq!(program.body.len(), 1);
        let Stmt::VarDecl(decl) = &program.body[0] else {
            panic!("expected a variable declaration");
        };
        let Declarator {
            target: BindingTarget::Ident(name),
            init: Some(Expr::Literal(Lit::Number(n))),
            ..
        } = &decl.declarators[0]
        else {
            panic!("expected an identifier target with a numeric initializer");
        };
        assert_eq!(name, "x");
        assert_eq!(n, "42");
    }

    #[test]
    fn test_lowers_nested_object_pattern() {
        let program = parse("const {start: {x, y}, end} = obj;");
        let Stmt::VarDecl(decl) = &program.body[0] else {
            panic!("expected a variable declaration");
        };
        let BindingTarget::Pattern(pattern) = &decl.declarators[0].target else {
            panic!("expected a pattern target");
        };
        assert_eq!(pattern.keys(), vec!["start", "end"]);
        let PatternProp::Nested { key, pattern: inner } = &pattern.props[0] else {
            panic!("expected a nested pattern under 'start'");
        };
        assert_eq!(key, "start");
        assert_eq!(inner.keys(), vec!["x", "y"]);
    }

    #[test]
    fn test_lowers_type_annotations() {
        let program = parse("const flag: boolean = true; const user: User = getUser();");
        let Stmt::VarDecl(first) = &program.body[0] else {
            panic!("expected a declaration");
        };
        assert_eq!(first.declarators[0].type_note, Some(TypeNote::Boolean));
        let Stmt::VarDecl(second) = &program.body[1] else {
            panic!("expected a declaration");
        };
        assert_eq!(
            second.declarators[0].type_note,
            Some(TypeNote::Named("User".to_owned()))
        );
    }

    #[test]
    fn test_lowers_if_else_chain() {
        let program = parse("if (a > 1) { foo(); } else { bar(); }");
        let Stmt::If(stmt) = &program.body[0] else {
            panic!("expected an if statement");
        };
        assert!(matches!(stmt.test, Expr::Binary(_)));
        assert_eq!(stmt.consequent.len(), 1);
        assert_eq!(stmt.alternate.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_lowers_for_with_init_and_update() {
        let program = parse("for (let i = 0; i < 10; i++) { work(i); }");
        let Stmt::For(stmt) = &program.body[0] else {
            panic!("expected a for statement");
        };
        assert!(matches!(stmt.init.as_deref(), Some(Stmt::VarDecl(_))));
        assert!(matches!(stmt.test, Some(Expr::Binary(_))));
        assert!(matches!(&stmt.update, Some(Expr::Update(u)) if u.arg.as_deref() == Some("i")));
        assert_eq!(stmt.body.len(), 1);
    }

    #[test]
    fn test_lowers_switch_cases_and_default() {
        let program = parse("switch (mode) { case 1: a(); break; default: b(); }");
        let Stmt::Switch(stmt) = &program.body[0] else {
            panic!("expected a switch statement");
        };
        assert_eq!(stmt.cases.len(), 2);
        assert!(stmt.cases[0].test.is_some());
        assert!(stmt.cases[1].test.is_none());
    }

    #[test]
    fn test_lowers_async_function_and_await() {
        let program = parse("async function load() { const data = await fetch('/api'); }");
        let Stmt::Function(func) = &program.body[0] else {
            panic!("expected a function declaration");
        };
        assert!(func.is_async);
        let Stmt::VarDecl(decl) = &func.body[0] else {
            panic!("expected a declaration in the body");
        };
        assert!(matches!(decl.declarators[0].init, Some(Expr::Await(_))));
    }

    #[test]
    fn test_lowers_imports_and_exports() {
        let program = parse("import def, { a as b } from './m';\nexport const x = 1;");
        let Stmt::Import(import) = &program.body[0] else {
            panic!("expected an import");
        };
        assert_eq!(import.source, "./m");
        assert_eq!(import.specifiers.len(), 2);
        assert_eq!(import.specifiers[0].kind, ImportKind::Default);
        assert_eq!(import.specifiers[1].local, "b");
        assert_eq!(import.specifiers[1].imported.as_deref(), Some("a"));
        let Stmt::Export(export) = &program.body[1] else {
            panic!("expected an export");
        };
        assert!(!export.is_default);
        assert!(matches!(export.declaration.as_deref(), Some(Stmt::VarDecl(_))));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        assert!(parse_program("function broken( {", Dialect::TypeScript).is_err());
    }

    #[test]
    fn test_unrecognized_statement_is_dropped() {
        // Labeled statements are outside the subset.
        let program = parse("outer: while (x) { break outer; }\nconst y = 1;");
        assert!(
            program.body.len() < 3,
            "the labeled statement should not survive lowering as itself"
        );
    }

    #[test]
    fn test_class_methods_and_kinds() {
        let program = parse(
            "class Point { constructor(x) { this.x = x; } static origin() { return 0; } get len() { return 1; } }",
        );
        let Stmt::Class(class) = &program.body[0] else {
            panic!("expected a class declaration");
        };
        assert_eq!(class.name, "Point");
        assert_eq!(class.methods.len(), 3);
        assert_eq!(class.methods[0].kind, MethodKind::Constructor);
        assert!(class.methods[1].is_static);
        assert_eq!(class.methods[2].kind, MethodKind::Getter);
    }
}
