use crate::parser::context::GraphContext;
use crate::parser::handlers;
use crate::syntax::{Expr, Stmt};

/// Route one statement to its handler.
///
/// `parent` is the flow predecessor: `(node id, source handle)` of the node
/// this statement follows sequentially. `id_suffix` is the caller-stable id
/// suffix (statement index, prefixed by the scope ordinal in nested blocks) so
/// re-parses of similar code produce stable ids.
///
/// Returns the id subsequent statements chain their flow edges from, or `None`
/// for statements that do not participate in flow (definitions) or were not
/// recognized.
///
/// Expression statements tie-break in a fixed priority: an assignment wins
/// over a call, a call over a bare logic expression. The match arms encode
/// that order.
pub fn parse_statement(
    stmt: &Stmt,
    ctx: &mut GraphContext,
    parent: Option<(&str, &str)>,
    id_suffix: Option<&str>,
) -> Option<String> {
    match stmt {
        Stmt::VarDecl(decl) => handlers::variable::handle(decl, ctx, parent, id_suffix),
        Stmt::Function(func) => handlers::function::handle(func, ctx, id_suffix),
        Stmt::Class(class) => handlers::class::handle(class, ctx, id_suffix),
        Stmt::Import(import) => handlers::import::handle(import, ctx, parent, id_suffix),
        Stmt::Export(export) => handlers::export::handle(export, ctx, parent, id_suffix),
        Stmt::If(stmt) => handlers::branch::handle(stmt, ctx, parent, id_suffix),
        Stmt::For(stmt) => handlers::looping::handle_for(stmt, ctx, parent, id_suffix),
        Stmt::While(stmt) => handlers::looping::handle_while(stmt, ctx, parent, id_suffix),
        Stmt::Switch(stmt) => handlers::switch::handle(stmt, ctx, parent, id_suffix),
        Stmt::Try(stmt) => handlers::try_catch::handle(stmt, ctx, parent, id_suffix),
        Stmt::Return(stmt) => handlers::ret::handle(stmt, ctx, parent, id_suffix),
        Stmt::Expr(Expr::Assign(assign)) => handlers::assignment::handle(assign, ctx, parent, id_suffix),
        Stmt::Expr(Expr::Call(call)) => {
            Some(handlers::call::handle_statement(call, ctx, parent, id_suffix))
        }
        Stmt::Expr(Expr::Binary(binary)) => {
            Some(handlers::logic::handle_statement(binary, ctx, id_suffix))
        }
        // Remaining expression statements (updates, awaits, templates, …)
        // have no graph representation of their own.
        Stmt::Expr(_) => None,
    }
}
