//! The sync-to-async replacement orchestrator.

use rustc_hash::FxHashSet;
use serde::Serialize;
use tracing::debug;

use asyncify_binder::SymbolId;
use asyncify_syntax::flags::modifier_flags;
use asyncify_syntax::{NodeArena, NodeIndex, SyntaxKind, TypeInterner};

use crate::elider;
use crate::index::SymbolIndex;
use crate::invocation::{AsyncInvocationReplacer, InvocationConverter};
use crate::last_node;

/// Suffix appended to a declaration's name when it turns async.
pub const ASYNC_SUFFIX: &str = "Async";

/// The async form of a declared name. Idempotent: a name already
/// carrying the suffix is returned unchanged.
pub fn async_name(old_name: &str) -> String {
    if old_name.ends_with(ASYNC_SUFFIX) {
        old_name.to_string()
    } else {
        format!("{old_name}{ASYNC_SUFFIX}")
    }
}

/// Whether a node sits inside a declaration carrying the async modifier.
pub fn is_under_async_declaration(arena: &NodeArena, node: NodeIndex) -> bool {
    let decl = arena.enclosing_declaration(node);
    decl.is_some() && arena.has_modifier(decl, modifier_flags::ASYNC)
}

/// Counters for one `replace_to_async` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaceStats {
    /// Declarations whose signature was fully transformed.
    pub declarations_converted: u64,
    /// Declarations skipped: detached, or async-result type unresolvable.
    pub declarations_skipped: u64,
    /// External call sites rewritten to the async name.
    pub usages_rewritten: u64,
    /// Nested body calls converted by the fixed-point pass.
    pub invocations_converted: u64,
    /// Redundant trailing awaits removed.
    pub awaits_elided: u64,
}

/// Converts a method, its whole override hierarchy, and every recorded
/// call site to the asynchronous form.
pub struct AsyncReplacer<'a, I: SymbolIndex> {
    index: &'a I,
}

impl<'a, I: SymbolIndex> AsyncReplacer<'a, I> {
    pub fn new(index: &'a I) -> AsyncReplacer<'a, I> {
        AsyncReplacer { index }
    }

    /// Replace `method` and every declaration in its override hierarchy
    /// with the async form, rewriting external call sites first, then
    /// converting nested calls inside each body to a fixed point, then
    /// transforming the signature, and finally eliding a redundant
    /// trailing await where that is provably safe.
    ///
    /// Best-effort throughout: every resolution failure skips its one
    /// unit of work and the run always completes.
    pub fn replace_to_async(
        &self,
        arena: &mut NodeArena,
        types: &mut TypeInterner,
        method: SymbolId,
    ) -> ReplaceStats {
        let mut stats = ReplaceStats::default();
        let hierarchy = self.index.hierarchy_of(method);
        let converting: FxHashSet<SymbolId> = hierarchy.iter().copied().collect();

        for &symbol in &hierarchy {
            for declaration in self.index.declarations_of(symbol) {
                self.replace_declaration(arena, types, &converting, symbol, declaration, &mut stats);
            }
        }
        stats
    }

    fn replace_declaration(
        &self,
        arena: &mut NodeArena,
        types: &mut TypeInterner,
        converting: &FxHashSet<SymbolId>,
        symbol: SymbolId,
        declaration: NodeIndex,
        stats: &mut ReplaceStats,
    ) {
        // Earlier rewrites in this same run may have detached this
        // declaration; that is expected, not an error.
        if !arena.is_valid(declaration) {
            debug!(?declaration, "skipping detached declaration");
            stats.declarations_skipped += 1;
            return;
        }
        let Some(declared_name) = arena.declaration_name(declaration) else {
            stats.declarations_skipped += 1;
            return;
        };
        let new_name = async_name(declared_name);

        for usage in self.index.find_usages(symbol) {
            let invocation = enclosing_invocation(arena, usage);
            let caller_is_async =
                invocation.is_some() && is_under_async_declaration(arena, invocation);
            if AsyncInvocationReplacer::replace_invocation(
                arena,
                invocation,
                &new_name,
                caller_is_async,
            ) {
                stats.usages_rewritten += 1;
            }
        }

        stats.invocations_converted +=
            self.convert_nested_invocations(arena, converting, declaration);

        self.replace_signature(arena, types, declaration, &new_name, stats);
    }

    /// Scan the declaration's body for call expressions and convert each
    /// that has an async counterpart, rescanning until a full pass makes
    /// no progress. Every successful pass converts at least one of the
    /// initially present calls and conversion never introduces new call
    /// expressions, so the pass count is bounded by the initial call
    /// count.
    fn convert_nested_invocations(
        &self,
        arena: &mut NodeArena,
        converting: &FxHashSet<SymbolId>,
        declaration: NodeIndex,
    ) -> u64 {
        let body = arena.declaration_body(declaration);
        if body.is_none() {
            return 0;
        }
        let converter = InvocationConverter::new(self.index, converting);
        let mut converted = 0u64;
        let mut remaining_passes = count_calls(arena, body) + 1;
        while remaining_passes > 0 {
            let mut converted_this_pass = 0u64;
            for invocation in collect_calls(arena, body) {
                if converter.try_replace_invocation_to_async(arena, invocation) {
                    converted_this_pass += 1;
                }
            }
            if converted_this_pass == 0 {
                break;
            }
            converted += converted_this_pass;
            remaining_passes -= 1;
        }
        converted
    }

    /// Transform the declaration's signature: wrap the return type, mark
    /// async (unless abstract), rename, then elide a single redundant
    /// trailing await. An unresolvable async-result type aborts this
    /// declaration's transform entirely, leaving it unmutated.
    fn replace_signature(
        &self,
        arena: &mut NodeArena,
        types: &mut TypeInterner,
        declaration: NodeIndex,
        new_name: &str,
        stats: &mut ReplaceStats,
    ) {
        let return_type = arena.declaration_return_type(declaration);
        let new_return_type = if types.is_void(return_type) {
            types.task_type(None)
        } else {
            types.task_type(Some(return_type))
        };
        let Some(new_return_type) = new_return_type else {
            debug!(?declaration, "async-result type unresolvable, declaration left as-is");
            stats.declarations_skipped += 1;
            return;
        };

        if !arena.set_declaration_return_type(declaration, new_return_type) {
            stats.declarations_skipped += 1;
            return;
        }
        if !arena.has_modifier(declaration, modifier_flags::ABSTRACT) {
            arena.set_modifier(declaration, modifier_flags::ASYNC, true);
        }
        let name_node = arena.declaration_name_node(declaration);
        arena.set_identifier_text(name_node, new_name);
        stats.declarations_converted += 1;

        self.elide_trailing_await(arena, declaration, stats);
    }

    /// After the signature transform, remove the await/return wrapper
    /// when the body's one and only await is the last node executed.
    fn elide_trailing_await(
        &self,
        arena: &mut NodeArena,
        declaration: NodeIndex,
        stats: &mut ReplaceStats,
    ) {
        let body = arena.declaration_body(declaration);
        if body.is_none() {
            return;
        }
        let awaits: Vec<NodeIndex> = arena
            .descendants_in_scope(body)
            .into_iter()
            .filter(|&idx| arena.kind(idx) == Some(SyntaxKind::AwaitExpression))
            .collect();
        if awaits.len() != 1 {
            return;
        }
        let only_await = awaits[0];
        if last_node::is_last_node(arena, only_await) && elider::elide(arena, only_await) {
            stats.awaits_elided += 1;
        }
    }
}

/// The call expression a usage node is the callee of, or NONE when the
/// use is not a call (argument position, value reference, …).
fn enclosing_invocation(arena: &NodeArena, usage: NodeIndex) -> NodeIndex {
    let parent = arena.parent(usage);
    match arena.get(parent) {
        Some(asyncify_syntax::Node::CallExpression(call)) if call.expression == usage => parent,
        _ => NodeIndex::NONE,
    }
}

fn collect_calls(arena: &NodeArena, body: NodeIndex) -> Vec<NodeIndex> {
    arena
        .descendants_in_scope(body)
        .into_iter()
        .filter(|&idx| arena.kind(idx) == Some(SyntaxKind::CallExpression))
        .collect()
}

fn count_calls(arena: &NodeArena, body: NodeIndex) -> u64 {
    collect_calls(arena, body).len() as u64
}
