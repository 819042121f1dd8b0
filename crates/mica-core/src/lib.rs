// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Core handles shared by every Mica compiler phase.
//!
//! Provides the name interner, the symbol table, local variable handles,
//! and opaque type references. Phases communicate through these handles
//! rather than strings, so equality is cheap and allocation happens once.

pub mod locals;
pub mod names;
pub mod symbols;
pub mod types;

pub use locals::LocalVariable;
pub use names::{NameRef, NameTable};
pub use symbols::{ClassData, Symbol, SymbolKind, SymbolRef, SymbolTable};
pub use types::{CastKind, TypeRef};
