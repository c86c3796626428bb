//! Arena-backed syntax tree for the asyncify refactoring engine.
//!
//! This crate is the host syntax layer: it owns the node model, the arena
//! the nodes live in, and the type interner used for declared return types.
//! Trees are built programmatically through [`AstBuilder`] — there is no
//! parser here; an embedding host brings its own front end and materializes
//! the shape of its program into this arena.
//!
//! Nodes are referenced by [`NodeIndex`] into a [`NodeArena`]. Indices are
//! stable for the lifetime of the arena: edits mutate nodes in place, and
//! removal detaches a node (it stays in storage but fails
//! [`NodeArena::is_valid`] from then on). Passes that mutate the tree are
//! expected to consult `is_valid` before every mutation.

pub mod arena;
pub mod ast;
pub mod builder;
pub mod flags;
pub mod kind;
pub mod types;

pub use arena::NodeArena;
pub use ast::{Node, NodeBase, NodeIndex, NodeList};
pub use builder::AstBuilder;
pub use kind::SyntaxKind;
pub use types::{TASK_TYPE_NAME, Ty, TypeId, TypeInterner};
