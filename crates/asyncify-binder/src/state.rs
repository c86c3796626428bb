//! Binder state.

use rustc_hash::FxHashMap;
use serde::Serialize;

use asyncify_syntax::NodeIndex;

use crate::{SymbolArena, SymbolId, SymbolTable};

/// Binder state over one source tree.
///
/// Populated by [`BinderState::bind_source_file`]; queried afterwards
/// through the methods in `state_queries`.
#[derive(Debug, Default)]
pub struct BinderState {
    /// Arena for symbol storage.
    pub symbols: SymbolArena,
    /// Top-level classes and free functions.
    pub globals: SymbolTable,
    /// Declaration node id -> symbol declared there.
    pub node_symbols: FxHashMap<u32, SymbolId>,
    /// Symbol -> callee expression nodes of its recorded call sites.
    pub references: FxHashMap<SymbolId, Vec<NodeIndex>>,
    /// Class symbol -> member table.
    pub class_members: FxHashMap<SymbolId, SymbolTable>,
    /// Class symbol -> base class symbol.
    pub class_bases: FxHashMap<SymbolId, SymbolId>,
    /// Call expression node id -> resolved target symbol.
    pub call_targets: FxHashMap<u32, SymbolId>,
    /// Counters for this binding pass.
    pub stats: BindStats,
}

/// Statistics about a binding pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BindStats {
    /// Symbols declared.
    pub symbols_declared: u64,
    /// Override edges recorded (one per method pair).
    pub override_edges: u64,
    /// Call sites whose target resolved to a symbol.
    pub calls_resolved: u64,
    /// Call sites left unresolved.
    pub calls_unresolved: u64,
}

impl BinderState {
    pub fn new() -> BinderState {
        BinderState::default()
    }
}
