//! End-to-end replacement scenarios.

use asyncify_binder::BinderState;
use asyncify_refactor::{AsyncReplacer, async_name};
use asyncify_syntax::flags::modifier_flags;
use asyncify_syntax::{
    AstBuilder, Node, NodeArena, NodeIndex, SyntaxKind, TASK_TYPE_NAME, TypeInterner,
};

fn task_ready_interner() -> TypeInterner {
    let mut types = TypeInterner::new();
    types.register_class(TASK_TYPE_NAME);
    types
}

#[test]
fn async_rename_is_idempotent() {
    assert_eq!(async_name("compute"), "computeAsync");
    assert_eq!(async_name("computeAsync"), "computeAsync");
}

/// The end-to-end scenario: `int compute() { return 1 + 2; }` with one
/// async caller doing `var x = compute();`.
#[test]
fn converts_method_and_async_call_site() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let int = types.named("int");
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let one = builder.number("1");
    let two = builder.number("2");
    let sum = builder.binary(one, SyntaxKind::PlusToken, two);
    let ret = builder.ret(sum);
    let compute_body = builder.block(vec![ret]);
    let compute = builder.method("compute", 0, vec![], int, compute_body);

    let callee = builder.identifier("compute");
    let call = builder.call(callee, vec![]);
    let var = builder.var_stmt("x", int, call);
    let run_body = builder.block(vec![var]);
    let run = builder.method("run", modifier_flags::ASYNC, vec![], void, run_body);

    let class = builder.class("Calculator", None, vec![compute, run]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let compute_id = binder.symbol_for_node(compute);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, compute_id);

    assert_eq!(stats.declarations_converted, 1);
    assert_eq!(stats.usages_rewritten, 1);
    assert_eq!(stats.declarations_skipped, 0);

    // Declaration: renamed, re-typed, marked async.
    assert_eq!(arena.declaration_name(compute), Some("computeAsync"));
    assert_eq!(
        types.display(arena.declaration_return_type(compute)),
        "Task<int>"
    );
    assert!(arena.has_modifier(compute, modifier_flags::ASYNC));

    // Call site: `x = await computeAsync();`.
    assert_eq!(arena.get_identifier_text(callee), Some("computeAsync"));
    let awaited = arena.parent(call);
    assert_eq!(arena.kind(awaited), Some(SyntaxKind::AwaitExpression));
    match arena.get(arena.parent(awaited)) {
        Some(Node::VariableDeclaration(v)) => assert_eq!(v.initializer, awaited),
        other => panic!("expected variable declaration, got {other:?}"),
    }

    // The untouched body had no awaits to elide.
    assert_eq!(stats.awaits_elided, 0);
}

#[test]
fn void_method_maps_to_bare_task() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let body = builder.block(vec![]);
    let ping = builder.method("ping", 0, vec![], void, body);
    let class = builder.class("Monitor", None, vec![ping]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let ping_id = binder.symbol_for_node(ping);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, ping_id);

    assert_eq!(stats.declarations_converted, 1);
    assert_eq!(arena.declaration_name(ping), Some("pingAsync"));
    assert_eq!(types.display(arena.declaration_return_type(ping)), "Task");
    assert!(arena.has_modifier(ping, modifier_flags::ASYNC));
}

#[test]
fn sync_caller_is_renamed_but_not_awaited() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let body = builder.block(vec![]);
    let load = builder.method("load", 0, vec![], void, body);

    let callee = builder.identifier("load");
    let call = builder.call(callee, vec![]);
    let stmt = builder.expr_stmt(call);
    let run_body = builder.block(vec![stmt]);
    let run = builder.method("run", 0, vec![], void, run_body);

    let class = builder.class("Loader", None, vec![load, run]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let load_id = binder.symbol_for_node(load);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, load_id);

    assert_eq!(stats.usages_rewritten, 1);
    assert_eq!(arena.get_identifier_text(callee), Some("loadAsync"));
    // The synchronous caller cannot await: the statement still holds the
    // call directly, now producing an async-result value.
    assert_eq!(arena.parent(call), stmt);
    assert!(!arena.has_modifier(run, modifier_flags::ASYNC));
}

#[test]
fn abstract_member_is_renamed_and_retyped_but_never_marked_async() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let abstract_process = builder.method(
        "process",
        modifier_flags::ABSTRACT,
        vec![],
        void,
        NodeIndex::NONE,
    );
    let base = builder.class("Base", None, vec![abstract_process]);

    let impl_body = builder.block(vec![]);
    let impl_process = builder.method("process", 0, vec![], void, impl_body);
    let derived = builder.class("Impl", Some("Base"), vec![impl_process]);

    let file = builder.source_file(vec![base, derived]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let base_id = binder.symbol_for_node(abstract_process);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, base_id);

    // Both hierarchy members converted.
    assert_eq!(stats.declarations_converted, 2);

    assert_eq!(arena.declaration_name(abstract_process), Some("processAsync"));
    assert_eq!(
        types.display(arena.declaration_return_type(abstract_process)),
        "Task"
    );
    assert!(!arena.has_modifier(abstract_process, modifier_flags::ASYNC));

    assert_eq!(arena.declaration_name(impl_process), Some("processAsync"));
    assert!(arena.has_modifier(impl_process, modifier_flags::ASYNC));
}

#[test]
fn whole_hierarchy_converts_from_any_member() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let base_body = builder.block(vec![]);
    let base_method = builder.method("handle", 0, vec![], void, base_body);
    let base = builder.class("Base", None, vec![base_method]);

    let mid_body = builder.block(vec![]);
    let mid_method = builder.method("handle", 0, vec![], void, mid_body);
    let mid = builder.class("Mid", Some("Base"), vec![mid_method]);

    let leaf_body = builder.block(vec![]);
    let leaf_method = builder.method("handle", 0, vec![], void, leaf_body);
    let leaf = builder.class("Leaf", Some("Mid"), vec![leaf_method]);

    let file = builder.source_file(vec![base, mid, leaf]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let mid_id = binder.symbol_for_node(mid_method);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, mid_id);

    assert_eq!(stats.declarations_converted, 3);
    for decl in [base_method, mid_method, leaf_method] {
        assert_eq!(arena.declaration_name(decl), Some("handleAsync"));
        assert!(arena.has_modifier(decl, modifier_flags::ASYNC));
    }
}

#[test]
fn nested_calls_convert_to_a_fixed_point() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let load_callee = builder.identifier("load");
    let load_call = builder.call(load_callee, vec![]);
    let load_stmt = builder.expr_stmt(load_call);
    let save_callee = builder.identifier("save");
    let save_call = builder.call(save_callee, vec![]);
    let save_stmt = builder.expr_stmt(save_call);
    let work_body = builder.block(vec![load_stmt, save_stmt]);
    let work = builder.method("work", 0, vec![], void, work_body);

    let load_body = builder.block(vec![]);
    let load = builder.method("load", 0, vec![], void, load_body);
    let load_async_body = builder.block(vec![]);
    let load_async = builder.method("loadAsync", 0, vec![], void, load_async_body);
    let save_body = builder.block(vec![]);
    let save = builder.method("save", 0, vec![], void, save_body);
    let save_async_body = builder.block(vec![]);
    let save_async = builder.method("saveAsync", 0, vec![], void, save_async_body);

    let class = builder.class(
        "Svc",
        None,
        vec![work, load, load_async, save, save_async],
    );
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let work_id = binder.symbol_for_node(work);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, work_id);

    assert_eq!(stats.invocations_converted, 2);
    assert_eq!(arena.get_identifier_text(load_callee), Some("loadAsync"));
    assert_eq!(arena.get_identifier_text(save_callee), Some("saveAsync"));
    for call in [load_call, save_call] {
        assert_eq!(
            arena.kind(arena.parent(call)),
            Some(SyntaxKind::AwaitExpression)
        );
    }
    // Two awaits in the transformed body: the single-await elision rule
    // does not fire.
    assert_eq!(stats.awaits_elided, 0);
}

#[test]
fn trailing_return_await_is_elided() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let int = types.named("int");
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let load_callee = builder.identifier("load");
    let load_call = builder.call(load_callee, vec![]);
    let ret = builder.ret(load_call);
    let fetch_body = builder.block(vec![ret]);
    let fetch = builder.method("fetch", 0, vec![], int, fetch_body);

    let load_body = builder.block(vec![]);
    let load = builder.method("load", 0, vec![], int, load_body);
    let load_async_body = builder.block(vec![]);
    let load_async = builder.method("loadAsync", 0, vec![], int, load_async_body);

    let class = builder.class("Repo", None, vec![fetch, load, load_async]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let fetch_id = binder.symbol_for_node(fetch);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, fetch_id);

    assert_eq!(stats.invocations_converted, 1);
    assert_eq!(stats.awaits_elided, 1);

    // `return await loadAsync();` collapsed back to `return loadAsync();`.
    match arena.get(ret) {
        Some(Node::ReturnStatement(r)) => assert_eq!(r.expression, load_call),
        other => panic!("expected return statement, got {other:?}"),
    }
    assert_eq!(arena.get_identifier_text(load_callee), Some("loadAsync"));
    assert_eq!(
        types.display(arena.declaration_return_type(fetch)),
        "Task<int>"
    );
}

#[test]
fn trailing_await_statement_is_elided_after_unrelated_work() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let log_callee = builder.identifier("log");
    let log_call = builder.call(log_callee, vec![]);
    let log_stmt = builder.expr_stmt(log_call);
    let load_callee = builder.identifier("load");
    let load_call = builder.call(load_callee, vec![]);
    let load_stmt = builder.expr_stmt(load_call);
    let drive_body = builder.block(vec![log_stmt, load_stmt]);
    let drive = builder.method("drive", 0, vec![], void, drive_body);

    let log_body = builder.block(vec![]);
    let log = builder.method("log", 0, vec![], void, log_body);
    let load_body = builder.block(vec![]);
    let load = builder.method("load", 0, vec![], void, load_body);
    let load_async_body = builder.block(vec![]);
    let load_async = builder.method("loadAsync", 0, vec![], void, load_async_body);

    let class = builder.class("Driver", None, vec![drive, log, load, load_async]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let drive_id = binder.symbol_for_node(drive);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, drive_id);

    // `log()` has no async counterpart and is left alone; `load()` became
    // `await loadAsync();`, the body's only await, in final position.
    assert_eq!(stats.invocations_converted, 1);
    assert_eq!(stats.awaits_elided, 1);
    match arena.get(load_stmt) {
        Some(Node::ExpressionStatement(s)) => assert_eq!(s.expression, load_call),
        other => panic!("expected expression statement, got {other:?}"),
    }
    assert_eq!(arena.get_identifier_text(log_callee), Some("log"));
}

#[test]
fn value_position_usage_is_left_untouched() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let compute_body = builder.block(vec![]);
    let compute = builder.method("compute", 0, vec![], void, compute_body);

    let reference = builder.identifier("compute");
    let var = builder.var_stmt("f", asyncify_syntax::TypeId::NONE, reference);
    let run_body = builder.block(vec![var]);
    let run = builder.method("run", modifier_flags::ASYNC, vec![], void, run_body);

    let class = builder.class("Calc", None, vec![compute, run]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let compute_id = binder.symbol_for_node(compute);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, compute_id);

    // The usage was not a call; its rewrite is skipped while the
    // declaration still converts.
    assert_eq!(stats.usages_rewritten, 0);
    assert_eq!(stats.declarations_converted, 1);
    assert_eq!(arena.get_identifier_text(reference), Some("compute"));
    assert_eq!(arena.declaration_name(compute), Some("computeAsync"));
}

#[test]
fn unresolvable_task_type_skips_the_signature_transform() {
    let mut arena = NodeArena::new();
    // No Task class registered.
    let mut types = TypeInterner::new();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let body = builder.block(vec![]);
    let ping = builder.method("ping", 0, vec![], void, body);
    let class = builder.class("Monitor", None, vec![ping]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let ping_id = binder.symbol_for_node(ping);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, ping_id);

    assert_eq!(stats.declarations_converted, 0);
    assert_eq!(stats.declarations_skipped, 1);
    assert_eq!(arena.declaration_name(ping), Some("ping"));
    assert!(!arena.has_modifier(ping, modifier_flags::ASYNC));
    assert!(types.is_void(arena.declaration_return_type(ping)));
}

#[test]
fn detached_declaration_is_skipped_silently() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let base_body = builder.block(vec![]);
    let base_method = builder.method("handle", 0, vec![], void, base_body);
    let base = builder.class("Base", None, vec![base_method]);

    let impl_body = builder.block(vec![]);
    let impl_method = builder.method("handle", 0, vec![], void, impl_body);
    let derived = builder.class("Impl", Some("Base"), vec![impl_method]);

    let file = builder.source_file(vec![base, derived]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let base_id = binder.symbol_for_node(base_method);

    arena.detach(impl_method);
    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, base_id);

    assert_eq!(stats.declarations_converted, 1);
    assert_eq!(stats.declarations_skipped, 1);
    assert_eq!(arena.declaration_name(base_method), Some("handleAsync"));
    assert_eq!(arena.declaration_name(impl_method), Some("handle"));
}

#[test]
fn already_suffixed_method_keeps_its_name() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let body = builder.block(vec![]);
    let method = builder.method("fetchAsync", 0, vec![], void, body);
    let class = builder.class("Repo", None, vec![method]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let method_id = binder.symbol_for_node(method);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, method_id);

    assert_eq!(stats.declarations_converted, 1);
    assert_eq!(arena.declaration_name(method), Some("fetchAsync"));
}

#[test]
fn recursive_call_is_rewritten_as_a_plain_usage() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let callee = builder.identifier("retry");
    let call = builder.call(callee, vec![]);
    let stmt = builder.expr_stmt(call);
    let body = builder.block(vec![stmt]);
    let retry = builder.method("retry", 0, vec![], void, body);
    let class = builder.class("Job", None, vec![retry]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let retry_id = binder.symbol_for_node(retry);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, retry_id);

    // The self-call is found through the reference index before the
    // declaration is marked async, so it is renamed without an await.
    assert_eq!(stats.usages_rewritten, 1);
    assert_eq!(stats.invocations_converted, 0);
    assert_eq!(arena.get_identifier_text(callee), Some("retryAsync"));
    assert_eq!(arena.parent(call), stmt);
}

#[test]
fn stats_serialize_to_json() {
    let mut arena = NodeArena::new();
    let mut types = task_ready_interner();
    let void = types.void();
    let mut builder = AstBuilder::new(&mut arena);

    let body = builder.block(vec![]);
    let ping = builder.method("ping", 0, vec![], void, body);
    let class = builder.class("Monitor", None, vec![ping]);
    let file = builder.source_file(vec![class]);

    let mut binder = BinderState::new();
    binder.bind_source_file(&arena, &types, file);
    let ping_id = binder.symbol_for_node(ping);

    let stats = AsyncReplacer::new(&binder).replace_to_async(&mut arena, &mut types, ping_id);

    let value = serde_json::to_value(&stats).expect("serializable stats");
    assert_eq!(value["declarations_converted"], 1);
    assert_eq!(value["usages_rewritten"], 0);
}
