//! Await elision: the await/return wrapper is removed, the awaited call
//! is untouched.

use asyncify_refactor::elide;
use asyncify_syntax::{AstBuilder, Node, NodeArena, SyntaxKind};

#[test]
fn return_await_becomes_direct_return() {
    let mut arena = NodeArena::new();
    let mut builder = AstBuilder::new(&mut arena);
    let callee = builder.identifier("f");
    let arg = builder.number("1");
    let call = builder.call(callee, vec![arg]);
    let awaited = builder.await_expr(call);
    let ret = builder.ret(awaited);

    assert!(elide(&mut arena, awaited));

    match arena.get(ret) {
        Some(Node::ReturnStatement(r)) => assert_eq!(r.expression, call),
        other => panic!("expected return statement, got {other:?}"),
    }
    assert_eq!(arena.parent(call), ret);
    assert!(!arena.is_valid(awaited));
    // Target and arguments are exactly what they were.
    match arena.get(call) {
        Some(Node::CallExpression(c)) => {
            assert_eq!(c.expression, callee);
            assert_eq!(c.arguments.nodes, vec![arg]);
        }
        other => panic!("expected call expression, got {other:?}"),
    }
}

#[test]
fn bare_await_statement_becomes_plain_call_statement() {
    let mut arena = NodeArena::new();
    let mut builder = AstBuilder::new(&mut arena);
    let callee = builder.identifier("g");
    let call = builder.call(callee, vec![]);
    let awaited = builder.await_expr(call);
    let stmt = builder.expr_stmt(awaited);

    assert!(elide(&mut arena, awaited));

    match arena.get(stmt) {
        Some(Node::ExpressionStatement(s)) => assert_eq!(s.expression, call),
        other => panic!("expected expression statement, got {other:?}"),
    }
    assert_eq!(arena.parent(call), stmt);
    assert!(!arena.is_valid(awaited));
}

#[test]
fn non_await_node_is_refused() {
    let mut arena = NodeArena::new();
    let mut builder = AstBuilder::new(&mut arena);
    let callee = builder.identifier("f");
    let call = builder.call(callee, vec![]);
    builder.ret(call);

    assert!(!elide(&mut arena, call));
    assert!(arena.is_valid(call));
}

#[test]
fn await_nested_in_an_expression_is_refused() {
    let mut arena = NodeArena::new();
    let mut builder = AstBuilder::new(&mut arena);
    let callee = builder.identifier("f");
    let call = builder.call(callee, vec![]);
    let awaited = builder.await_expr(call);
    let one = builder.number("1");
    let sum = builder.binary(one, SyntaxKind::PlusToken, awaited);
    builder.ret(sum);

    assert!(!elide(&mut arena, awaited));
    assert!(arena.is_valid(awaited));
}

#[test]
fn detached_await_is_refused() {
    let mut arena = NodeArena::new();
    let mut builder = AstBuilder::new(&mut arena);
    let callee = builder.identifier("f");
    let call = builder.call(callee, vec![]);
    let awaited = builder.await_expr(call);
    builder.ret(awaited);

    arena.detach(awaited);
    assert!(!elide(&mut arena, awaited));
}
