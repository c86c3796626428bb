//! Await elision.
//!
//! Removes a redundant await wrapper from an expression already proven to
//! be the last node of its body: `return await f()` becomes
//! `return f()`, and a bare trailing `await f();` becomes `f();`. The
//! awaited expression is untouched apart from re-parenting, so the call
//! target and arguments are exactly what they were.

use tracing::debug;

use asyncify_syntax::{Node, NodeArena, NodeIndex, SyntaxKind};

/// Strip one await wrapper, splicing the inner expression into the
/// enclosing return or expression statement. Returns false (leaving the
/// tree untouched) when the node is not a live await expression sitting
/// directly under a return or expression statement.
pub fn elide(arena: &mut NodeArena, await_expr: NodeIndex) -> bool {
    if !arena.is_valid(await_expr) {
        return false;
    }
    let inner = match arena.get(await_expr) {
        Some(Node::AwaitExpression(awaited)) => awaited.expression,
        _ => return false,
    };
    if inner.is_none() {
        return false;
    }

    let parent = arena.parent(await_expr);
    match arena.kind(parent) {
        Some(SyntaxKind::ReturnStatement) | Some(SyntaxKind::ExpressionStatement) => {}
        _ => {
            debug!(?parent, "await not directly under a return or expression statement");
            return false;
        }
    }

    if !arena.replace_child(parent, await_expr, inner) {
        return false;
    }
    arena.detach(await_expr);
    true
}
