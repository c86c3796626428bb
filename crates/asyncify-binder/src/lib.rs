//! Symbol binding for the asyncify refactoring engine.
//!
//! The binder walks a source tree built by `asyncify-syntax` and produces
//! the whole-program facts the refactoring core consumes:
//! - a symbol table for classes, methods, and free functions
//! - override edges between methods related through class heritage
//! - a reference index mapping each callable symbol to its call sites
//!
//! Binding is a read-only pass over the tree; all recorded node handles
//! stay valid across later in-place edits because the arena never moves
//! nodes.

use serde::Serialize;
use smallvec::SmallVec;

use asyncify_syntax::NodeIndex;
use rustc_hash::FxHashMap;

mod state;
mod state_binding;
mod state_queries;

pub use state::{BindStats, BinderState};

/// Symbol classification flags.
pub mod symbol_flags {
    pub const CLASS: u32 = 1 << 0;
    pub const METHOD: u32 = 1 << 1;
    pub const FUNCTION: u32 = 1 << 2;
    pub const ABSTRACT: u32 = 1 << 3;
}

/// A handle to a symbol stored in a [`SymbolArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SymbolId(pub u32);

impl SymbolId {
    pub const NONE: SymbolId = SymbolId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == SymbolId::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// A declared program entity: class, method, or free function.
#[derive(Debug, Clone, Serialize)]
pub struct Symbol {
    pub name: String,
    /// See [`symbol_flags`].
    pub flags: u32,
    /// Declaration nodes realizing this symbol.
    pub declarations: SmallVec<[NodeIndex; 1]>,
    /// Containing class for members, NONE for classes and free functions.
    pub parent: SymbolId,
    /// Base-class methods this method overrides.
    pub overrides: Vec<SymbolId>,
    /// Derived-class methods overriding this one.
    pub overridden_by: Vec<SymbolId>,
}

impl Symbol {
    pub fn new(name: String, flags: u32, parent: SymbolId) -> Symbol {
        Symbol {
            name,
            flags,
            declarations: SmallVec::new(),
            parent,
            overrides: Vec::new(),
            overridden_by: Vec::new(),
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.flags & symbol_flags::ABSTRACT != 0
    }
}

/// Arena-based storage for symbols.
#[derive(Debug, Default, Serialize)]
pub struct SymbolArena {
    pub symbols: Vec<Symbol>,
}

impl SymbolArena {
    pub fn new() -> SymbolArena {
        SymbolArena {
            symbols: Vec::new(),
        }
    }

    pub fn alloc(&mut self, symbol: Symbol) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get(id.0 as usize)
        }
    }

    pub fn get_mut(&mut self, id: SymbolId) -> Option<&mut Symbol> {
        if id.is_none() {
            None
        } else {
            self.symbols.get_mut(id.0 as usize)
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// A name-to-symbol map for one scope (globals, or a class's members).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SymbolTable {
    map: FxHashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable {
            map: FxHashMap::default(),
        }
    }

    pub fn insert(&mut self, name: String, id: SymbolId) {
        self.map.insert(name, id);
    }

    pub fn get(&self, name: &str) -> Option<SymbolId> {
        self.map.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SymbolId)> {
        self.map.iter()
    }
}
