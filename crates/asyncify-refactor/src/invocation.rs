//! Call-site rewriting.
//!
//! Two rewriters share the splice machinery here:
//! [`AsyncInvocationReplacer`] handles call sites found through the
//! reference index (it is told the new name and whether the caller can
//! await), and [`InvocationConverter`] handles calls nested inside a body
//! that is itself being converted (it decides convertibility itself and
//! reports success so the caller can drive a fixed point).

use rustc_hash::FxHashSet;
use tracing::debug;

use asyncify_binder::SymbolId;
use asyncify_syntax::flags::node_flags;
use asyncify_syntax::{NodeArena, NodeIndex, SyntaxKind};

use crate::index::SymbolIndex;
use crate::replacer::{ASYNC_SUFFIX, async_name};

/// Rewrites one externally-found call site to target the renamed method.
pub struct AsyncInvocationReplacer;

impl AsyncInvocationReplacer {
    /// Rewrite `invocation` to call `new_async_name`, wrapping the call in
    /// an await only when the enclosing caller is itself async. A NONE or
    /// detached invocation is a no-op (the usage was not actually a call).
    /// Arguments and surrounding expression structure are preserved.
    /// Returns whether a rewrite happened.
    pub fn replace_invocation(
        arena: &mut NodeArena,
        invocation: NodeIndex,
        new_async_name: &str,
        caller_is_async: bool,
    ) -> bool {
        if invocation.is_none() || !arena.is_valid(invocation) {
            return false;
        }
        if arena.kind(invocation) != Some(SyntaxKind::CallExpression) {
            return false;
        }
        let name_node = arena.callee_name_node(invocation);
        if !arena.set_identifier_text(name_node, new_async_name) {
            debug!(?invocation, "call site has no renamable callee");
            return false;
        }
        if caller_is_async && !is_awaited(arena, invocation) {
            if arena.wrap_in_await(invocation).is_none() {
                return false;
            }
        }
        arena.set_flag(invocation, node_flags::ASYNC_REWRITTEN);
        true
    }
}

/// Rewrites calls nested in a body under conversion to their async
/// counterparts.
pub struct InvocationConverter<'a, I: SymbolIndex> {
    index: &'a I,
    /// Symbols being renamed by the current hierarchy pass. Calls to
    /// these convert even though their async declaration does not exist
    /// yet.
    converting: &'a FxHashSet<SymbolId>,
}

impl<'a, I: SymbolIndex> InvocationConverter<'a, I> {
    pub fn new(index: &'a I, converting: &'a FxHashSet<SymbolId>) -> InvocationConverter<'a, I> {
        InvocationConverter { index, converting }
    }

    /// Attempt to rewrite one nested call to its async form: rename the
    /// callee and wrap the call in an await. Returns true only when a
    /// mutation happened; a call already converted, already
    /// async-named, or without a reachable async counterpart reports
    /// false and is left untouched, so repeated scans terminate.
    pub fn try_replace_invocation_to_async(
        &self,
        arena: &mut NodeArena,
        invocation: NodeIndex,
    ) -> bool {
        if invocation.is_none() || !arena.is_valid(invocation) {
            return false;
        }
        if arena.kind(invocation) != Some(SyntaxKind::CallExpression) {
            return false;
        }
        if arena.has_flag(invocation, node_flags::ASYNC_REWRITTEN) {
            return false;
        }
        let name_node = arena.callee_name_node(invocation);
        let Some(name) = arena.get_identifier_text(name_node) else {
            return false;
        };
        if name.ends_with(ASYNC_SUFFIX) {
            return false;
        }

        let target = self.index.resolve_call_target(invocation);
        if target.is_none() {
            return false;
        }
        let convertible =
            self.converting.contains(&target) || self.index.async_counterpart(target).is_some();
        if !convertible {
            return false;
        }

        let new_name = async_name(name);
        if !arena.set_identifier_text(name_node, &new_name) {
            return false;
        }
        if !is_awaited(arena, invocation) && arena.wrap_in_await(invocation).is_none() {
            return false;
        }
        arena.set_flag(invocation, node_flags::ASYNC_REWRITTEN);
        true
    }
}

fn is_awaited(arena: &NodeArena, expression: NodeIndex) -> bool {
    arena.kind(arena.parent(expression)) == Some(SyntaxKind::AwaitExpression)
}
