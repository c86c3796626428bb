//! Call-reference binding and resolution.

use asyncify_binder::BinderState;
use asyncify_syntax::{AstBuilder, Node, NodeArena, TypeInterner};

#[test]
fn bare_call_in_same_class_resolves_to_member() {
    let mut arena = NodeArena::new();
    let types = TypeInterner::new();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let step_body = builder.block(vec![]);
    let step = builder.method("step", 0, vec![], void, step_body);

    let callee = builder.identifier("step");
    let call = builder.call(callee, vec![]);
    let stmt = builder.expr_stmt(call);
    let run_body = builder.block(vec![stmt]);
    let run = builder.method("run", 0, vec![], void, run_body);

    let class = builder.class("Job", None, vec![step, run]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);

    let step_id = binder.symbol_for_node(step);
    assert_eq!(binder.resolve_call_target(call), step_id);
    assert_eq!(binder.find_all_references(step_id), vec![callee]);
    assert_eq!(binder.stats.calls_resolved, 1);
}

#[test]
fn this_receiver_resolves_through_base_chain() {
    let mut arena = NodeArena::new();
    let types = TypeInterner::new();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let ping_body = builder.block(vec![]);
    let ping = builder.method("ping", 0, vec![], void, ping_body);
    let base = builder.class("Base", None, vec![ping]);

    let this_expr = builder.this();
    let access = builder.property_access(this_expr, "ping");
    let call = builder.call(access, vec![]);
    let stmt = builder.expr_stmt(call);
    let body = builder.block(vec![stmt]);
    let run = builder.method("run", 0, vec![], void, body);
    let derived = builder.class("Derived", Some("Base"), vec![run]);

    let file = builder.source_file(vec![base, derived]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);

    let ping_id = binder.symbol_for_node(ping);
    assert_eq!(binder.resolve_call_target(call), ping_id);
    // The recorded use node is the whole property access, so its parent
    // is the call expression.
    assert_eq!(binder.find_all_references(ping_id), vec![access]);
    assert_eq!(arena.parent(access), call);
}

#[test]
fn typed_receiver_resolves_through_declared_type() {
    let mut arena = NodeArena::new();
    let mut types = TypeInterner::new();
    let void = types.void();
    let repo_ty = types.register_class("Repo");
    let mut builder = AstBuilder::new(&mut arena);

    let save_body = builder.block(vec![]);
    let save = builder.method("save", 0, vec![], void, save_body);
    let repo = builder.class("Repo", None, vec![save]);

    let recv = builder.identifier("repo");
    let access = builder.property_access(recv, "save");
    let call = builder.call(access, vec![]);
    let stmt = builder.expr_stmt(call);
    let body = builder.block(vec![stmt]);
    let param = builder.parameter("repo", repo_ty);
    let use_site = builder.function("persist", 0, vec![param], void, body);

    let file = builder.source_file(vec![repo, use_site]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);

    let save_id = binder.symbol_for_node(save);
    assert_eq!(binder.resolve_call_target(call), save_id);
    assert_eq!(binder.find_all_references(save_id), vec![access]);
}

#[test]
fn untyped_receiver_stays_unresolved() {
    let mut arena = NodeArena::new();
    let types = TypeInterner::new();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let recv = builder.identifier("mystery");
    let access = builder.property_access(recv, "poke");
    let call = builder.call(access, vec![]);
    let stmt = builder.expr_stmt(call);
    let body = builder.block(vec![stmt]);
    let run = builder.function("run", 0, vec![], void, body);
    let file = builder.source_file(vec![run]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);

    assert!(binder.resolve_call_target(call).is_none());
    assert_eq!(binder.stats.calls_unresolved, 1);
}

#[test]
fn value_position_reference_is_recorded_without_a_call() {
    let mut arena = NodeArena::new();
    let types = TypeInterner::new();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let compute_body = builder.block(vec![]);
    let compute = builder.method("compute", 0, vec![], void, compute_body);

    let reference = builder.identifier("compute");
    let var = builder.var_stmt("f", asyncify_syntax::TypeId::NONE, reference);
    let body = builder.block(vec![var]);
    let run = builder.method("run", 0, vec![], void, body);

    let class = builder.class("Calc", None, vec![compute, run]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);

    let compute_id = binder.symbol_for_node(compute);
    let refs = binder.find_all_references(compute_id);
    assert_eq!(refs, vec![reference]);
    // Not a call: the reference's parent is the variable declaration.
    assert!(matches!(
        arena.get(arena.parent(reference)),
        Some(Node::VariableDeclaration(_))
    ));
}

#[test]
fn references_are_sorted_and_deduplicated() {
    let mut arena = NodeArena::new();
    let types = TypeInterner::new();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let step_body = builder.block(vec![]);
    let step = builder.method("step", 0, vec![], void, step_body);

    let callee_a = builder.identifier("step");
    let call_a = builder.call(callee_a, vec![]);
    let stmt_a = builder.expr_stmt(call_a);
    let callee_b = builder.identifier("step");
    let call_b = builder.call(callee_b, vec![]);
    let stmt_b = builder.expr_stmt(call_b);
    let body = builder.block(vec![stmt_a, stmt_b]);
    let run = builder.method("run", 0, vec![], void, body);

    let class = builder.class("Job", None, vec![step, run]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);

    let step_id = binder.symbol_for_node(step);
    let refs = binder.find_all_references(step_id);
    assert_eq!(refs, vec![callee_a, callee_b]);
    assert!(refs[0].0 < refs[1].0);
}
