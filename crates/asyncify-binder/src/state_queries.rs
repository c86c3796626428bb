//! Post-binding queries: hierarchy enumeration, reference lookup, call
//! target resolution, and async-counterpart search.

use rustc_hash::FxHashSet;

use asyncify_syntax::NodeIndex;

use crate::state::BinderState;
use crate::{SymbolId, symbol_flags};

impl BinderState {
    /// The override hierarchy of a method: the transitive closure over
    /// override edges in both directions, starting symbol included.
    /// Order is breadth-first from the starting symbol, deduplicated.
    pub fn find_all_hierarchy(&self, symbol: SymbolId) -> Vec<SymbolId> {
        if symbol.is_none() {
            return Vec::new();
        }
        let mut seen = FxHashSet::default();
        let mut queue = std::collections::VecDeque::new();
        let mut out = Vec::new();
        seen.insert(symbol);
        queue.push_back(symbol);
        while let Some(current) = queue.pop_front() {
            out.push(current);
            let Some(sym) = self.symbols.get(current) else {
                continue;
            };
            for &next in sym.overrides.iter().chain(sym.overridden_by.iter()) {
                if seen.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        out
    }

    /// All recorded references to a symbol, sorted by node index and
    /// deduplicated.
    pub fn find_all_references(&self, symbol: SymbolId) -> Vec<NodeIndex> {
        let mut nodes = self
            .references
            .get(&symbol)
            .cloned()
            .unwrap_or_default();
        nodes.sort_by_key(|n| n.0);
        nodes.dedup();
        nodes
    }

    /// The target symbol a call expression resolved to during binding,
    /// or NONE.
    pub fn resolve_call_target(&self, call: NodeIndex) -> SymbolId {
        if call.is_none() {
            return SymbolId::NONE;
        }
        self.call_targets
            .get(&call.0)
            .copied()
            .unwrap_or(SymbolId::NONE)
    }

    /// A callable visible from `symbol`'s own scope under the given name:
    /// the owning class chain for members, the global table for free
    /// functions. NONE when absent.
    pub fn sibling_callable_named(&self, symbol: SymbolId, name: &str) -> SymbolId {
        let Some(sym) = self.symbols.get(symbol) else {
            return SymbolId::NONE;
        };
        if sym.parent.is_some() {
            return self.member_in_chain(sym.parent, name);
        }
        match self.globals.get(name) {
            Some(id)
                if self
                    .symbols
                    .get(id)
                    .is_some_and(|s| s.flags & symbol_flags::FUNCTION != 0) =>
            {
                id
            }
            _ => SymbolId::NONE,
        }
    }

    /// Declaration nodes realizing a symbol.
    pub fn declarations_of(&self, symbol: SymbolId) -> Vec<NodeIndex> {
        self.symbols
            .get(symbol)
            .map(|s| s.declarations.to_vec())
            .unwrap_or_default()
    }

    /// Declared name of a symbol.
    pub fn name_of(&self, symbol: SymbolId) -> Option<&str> {
        self.symbols.get(symbol).map(|s| s.name.as_str())
    }

    /// Symbol declared by a given declaration node.
    pub fn symbol_for_node(&self, decl: NodeIndex) -> SymbolId {
        if decl.is_none() {
            return SymbolId::NONE;
        }
        self.node_symbols
            .get(&decl.0)
            .copied()
            .unwrap_or(SymbolId::NONE)
    }
}
