//! Sync-to-async method refactoring.
//!
//! Given a method symbol, [`AsyncReplacer`] converts the method and every
//! overriding/overridden form of it, together with every call site the
//! reference index knows about, into an asynchronous form:
//! - the declaration is renamed with the `Async` suffix, its return type
//!   is wrapped in the async-result type, and it is marked `async`
//!   (abstract members are renamed and re-typed but never marked)
//! - call sites in async callers become `await nameAsync(…)`; call sites
//!   in synchronous callers are renamed without an await
//! - nested calls inside the converted body are rewritten to their async
//!   counterparts until a full scan makes no further progress
//! - a single trailing await left by the conversion is elided when it is
//!   provably the last node executed on every path
//!
//! The whole operation is best-effort: unresolvable symbols, detached
//! nodes, and an unregistered async-result wrapper each skip their one
//! unit of work and never abort the rest.

pub mod elider;
pub mod index;
pub mod invocation;
pub mod last_node;
pub mod replacer;

pub use elider::elide;
pub use index::SymbolIndex;
pub use invocation::{AsyncInvocationReplacer, InvocationConverter};
pub use last_node::{AncestorStep, StatementKind, is_last_node, is_last_path};
pub use replacer::{
    ASYNC_SUFFIX, AsyncReplacer, ReplaceStats, async_name, is_under_async_declaration,
};
