//! The query surface the refactoring needs from the host symbol layer.

use asyncify_binder::{BinderState, SymbolId};
use asyncify_syntax::NodeIndex;

use crate::replacer::async_name;

/// Whole-program queries consumed by [`crate::AsyncReplacer`].
///
/// The engine never resolves symbols itself; a host hands it an index and
/// the engine asks only these questions. `asyncify-binder`'s
/// [`BinderState`] is the stock implementation.
pub trait SymbolIndex {
    /// All symbols related to `method` through override edges, `method`
    /// included.
    fn hierarchy_of(&self, method: SymbolId) -> Vec<SymbolId>;

    /// Declaration nodes realizing a symbol.
    fn declarations_of(&self, symbol: SymbolId) -> Vec<NodeIndex>;

    /// Use-site nodes recorded for a symbol. Each node's parent is the
    /// call expression when the use is a call; other uses are allowed and
    /// are skipped by the rewrite.
    fn find_usages(&self, symbol: SymbolId) -> Vec<NodeIndex>;

    /// The symbol a call expression resolved to, or NONE.
    fn resolve_call_target(&self, invocation: NodeIndex) -> SymbolId;

    /// A symbol visible from `symbol`'s scope already carrying its
    /// async-suffixed name, or NONE.
    fn async_counterpart(&self, symbol: SymbolId) -> SymbolId;

    /// Declared name of a symbol.
    fn name_of(&self, symbol: SymbolId) -> Option<&str>;
}

impl SymbolIndex for BinderState {
    fn hierarchy_of(&self, method: SymbolId) -> Vec<SymbolId> {
        self.find_all_hierarchy(method)
    }

    fn declarations_of(&self, symbol: SymbolId) -> Vec<NodeIndex> {
        BinderState::declarations_of(self, symbol)
    }

    fn find_usages(&self, symbol: SymbolId) -> Vec<NodeIndex> {
        self.find_all_references(symbol)
    }

    fn resolve_call_target(&self, invocation: NodeIndex) -> SymbolId {
        BinderState::resolve_call_target(self, invocation)
    }

    fn async_counterpart(&self, symbol: SymbolId) -> SymbolId {
        let Some(name) = self.name_of(symbol) else {
            return SymbolId::NONE;
        };
        if name.ends_with(crate::replacer::ASYNC_SUFFIX) {
            return SymbolId::NONE;
        }
        let counterpart = async_name(name);
        self.sibling_callable_named(symbol, &counterpart)
    }

    fn name_of(&self, symbol: SymbolId) -> Option<&str> {
        BinderState::name_of(self, symbol)
    }
}
