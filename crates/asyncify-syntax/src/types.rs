//! Type interning for declared types.
//!
//! Declared types (parameter annotations, return types) are interned into
//! lightweight [`TypeId`] handles so type equality is an integer compare.
//! The interner also tracks which named types correspond to host-declared
//! classes; the async-result wrapper is looked up there, so a host that
//! never declares a `Task` class gets a resolution failure instead of a
//! fabricated type.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// Name of the async-result wrapper type the refactoring produces.
pub const TASK_TYPE_NAME: &str = "Task";

/// A handle to an interned type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NONE: TypeId = TypeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == TypeId::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// An interned type shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Ty {
    /// The no-value return type.
    Void,
    /// A named nominal type (`int`, `User`, `Task`).
    Named(String),
    /// A named type applied to type arguments (`Task<int>`).
    Generic { name: String, arguments: Vec<TypeId> },
}

/// Type interning table.
#[derive(Debug, Default)]
pub struct TypeInterner {
    types: Vec<Ty>,
    interned: FxHashMap<Ty, TypeId>,
    classes: FxHashMap<String, TypeId>,
}

impl TypeInterner {
    /// Create a new interner with `Void` pre-interned.
    pub fn new() -> TypeInterner {
        let mut interner = TypeInterner::default();
        interner.intern(Ty::Void);
        interner
    }

    /// Intern a type, returning the id of the canonical copy.
    pub fn intern(&mut self, ty: Ty) -> TypeId {
        if let Some(&id) = self.interned.get(&ty) {
            return id;
        }
        let id = TypeId(self.types.len() as u32);
        self.types.push(ty.clone());
        self.interned.insert(ty, id);
        id
    }

    pub fn get(&self, id: TypeId) -> Option<&Ty> {
        if id.is_none() {
            None
        } else {
            self.types.get(id.0 as usize)
        }
    }

    /// The no-value type.
    pub fn void(&self) -> TypeId {
        TypeId(0)
    }

    /// Whether `id` is the no-value type. An absent annotation counts as
    /// void.
    pub fn is_void(&self, id: TypeId) -> bool {
        id.is_none() || matches!(self.get(id), Some(Ty::Void))
    }

    /// Intern a named type.
    pub fn named(&mut self, name: &str) -> TypeId {
        self.intern(Ty::Named(name.to_string()))
    }

    /// Register a host-declared class, making its name resolvable.
    pub fn register_class(&mut self, name: &str) -> TypeId {
        let id = self.named(name);
        self.classes.insert(name.to_string(), id);
        id
    }

    /// Resolve a class name registered by the host.
    pub fn lookup_class(&self, name: &str) -> Option<TypeId> {
        self.classes.get(name).copied()
    }

    /// The async-result type constructor: no value maps to the bare
    /// wrapper, a value type `T` maps to `Task<T>`. Returns `None` when
    /// the host never registered the wrapper class; callers treat that as
    /// a skip, not an error.
    pub fn task_type(&mut self, value: Option<TypeId>) -> Option<TypeId> {
        let bare = self.lookup_class(TASK_TYPE_NAME)?;
        match value {
            None => Some(bare),
            Some(v) => Some(self.intern(Ty::Generic {
                name: TASK_TYPE_NAME.to_string(),
                arguments: vec![v],
            })),
        }
    }

    /// Human-readable rendering, for logs and test assertions.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            None => "<none>".to_string(),
            Some(Ty::Void) => "void".to_string(),
            Some(Ty::Named(name)) => name.clone(),
            Some(Ty::Generic { name, arguments }) => {
                let args: Vec<String> = arguments.iter().map(|&a| self.display(a)).collect();
                format!("{}<{}>", name, args.join(", "))
            }
        }
    }
}
