// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Symbol definitions and symbol table.
//!
//! Classes, modules, methods, and fields resolved by earlier phases are
//! represented as `Symbol`s addressed by `SymbolRef`. The CFG builder only
//! reads the table; all definitions happen during name resolution (or in
//! test setup).

use std::collections::HashMap;

use crate::names::{self, NameRef, NameTable};

/// Unique identifier for a symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolRef(pub u32);

/// The root scope.
pub const ROOT: SymbolRef = SymbolRef(0);
/// `T.untyped`; the alias target for anything the checker gives up on.
pub const UNTYPED: SymbolRef = SymbolRef(1);
/// Placeholder module substituted for constants that failed to resolve.
pub const STUB_MODULE: SymbolRef = SymbolRef(2);
/// Sentinel module whose methods model sourceless operations
/// (array/hash construction and friends).
pub const MAGIC: SymbolRef = SymbolRef(3);
/// The `T` module of type-system intrinsics (`T.absurd`, casts).
pub const T_MODULE: SymbolRef = SymbolRef(4);
/// Default base class caught by a bare `rescue`.
pub const STANDARD_ERROR: SymbolRef = SymbolRef(5);

/// The kind of symbol.
#[derive(Debug, Clone)]
pub enum SymbolKind {
    ClassOrModule(ClassData),
    Method,
    /// An instance or class variable declaration.
    Field,
}

/// Class/module payload: inheritance, singleton linkage, and members.
#[derive(Debug, Clone, Default)]
pub struct ClassData {
    pub superclass: Option<SymbolRef>,
    /// For a singleton class, the class it is attached to.
    pub attached_class: Option<SymbolRef>,
    members: HashMap<NameRef, SymbolRef>,
}

/// A single symbol.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: NameRef,
    pub owner: SymbolRef,
    pub kind: SymbolKind,
}

/// Table of all symbols, owning the name interner.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    names: NameTable,
}

impl SymbolTable {
    /// Creates a table pre-seeded with the well-known symbols.
    pub fn new() -> Self {
        let names = NameTable::new();
        let mut table = SymbolTable { symbols: Vec::new(), names };
        let seeds = [
            (ROOT, names::ROOT_NAME),
            (UNTYPED, names::UNTYPED_NAME),
            (STUB_MODULE, names::STUB_MODULE_NAME),
            (MAGIC, names::MAGIC_NAME),
            (T_MODULE, names::T_NAME),
            (STANDARD_ERROR, names::STANDARD_ERROR_NAME),
        ];
        for (sym, name) in seeds {
            debug_assert_eq!(sym.0 as usize, table.symbols.len());
            table.symbols.push(Symbol {
                name,
                owner: ROOT,
                kind: SymbolKind::ClassOrModule(ClassData::default()),
            });
        }
        table
    }

    pub fn names(&self) -> &NameTable {
        &self.names
    }

    pub fn names_mut(&mut self) -> &mut NameTable {
        &mut self.names
    }

    pub fn symbol(&self, sym: SymbolRef) -> &Symbol {
        &self.symbols[sym.0 as usize]
    }

    pub fn name_of(&self, sym: SymbolRef) -> NameRef {
        self.symbol(sym).name
    }

    pub fn is_class_or_module(&self, sym: SymbolRef) -> bool {
        matches!(self.symbol(sym).kind, SymbolKind::ClassOrModule(_))
    }

    pub fn is_method(&self, sym: SymbolRef) -> bool {
        matches!(self.symbol(sym).kind, SymbolKind::Method)
    }

    fn push_symbol(&mut self, symbol: Symbol) -> SymbolRef {
        let sym = SymbolRef(self.symbols.len() as u32);
        self.symbols.push(symbol);
        sym
    }

    pub fn define_class(&mut self, name: &str, owner: SymbolRef) -> SymbolRef {
        let name = self.names.intern(name);
        self.push_symbol(Symbol {
            name,
            owner,
            kind: SymbolKind::ClassOrModule(ClassData::default()),
        })
    }

    pub fn define_method(&mut self, name: &str, owner: SymbolRef) -> SymbolRef {
        let name = self.names.intern(name);
        self.push_symbol(Symbol { name, owner, kind: SymbolKind::Method })
    }

    /// Defines a field on `owner` and registers it as a member.
    pub fn define_field(&mut self, name: NameRef, owner: SymbolRef) -> SymbolRef {
        let sym = self.push_symbol(Symbol { name, owner, kind: SymbolKind::Field });
        if let SymbolKind::ClassOrModule(data) = &mut self.symbols[owner.0 as usize].kind {
            data.members.insert(name, sym);
        }
        sym
    }

    pub fn set_superclass(&mut self, class: SymbolRef, superclass: SymbolRef) {
        if let SymbolKind::ClassOrModule(data) = &mut self.symbols[class.0 as usize].kind {
            data.superclass = Some(superclass);
        }
    }

    pub fn set_attached_class(&mut self, singleton: SymbolRef, attached: SymbolRef) {
        if let SymbolKind::ClassOrModule(data) = &mut self.symbols[singleton.0 as usize].kind {
            data.attached_class = Some(attached);
        }
    }

    pub fn attached_class(&self, sym: SymbolRef) -> Option<SymbolRef> {
        match &self.symbol(sym).kind {
            SymbolKind::ClassOrModule(data) => data.attached_class,
            _ => None,
        }
    }

    /// Walks the owner chain to the nearest class or module.
    pub fn enclosing_class(&self, sym: SymbolRef) -> SymbolRef {
        let mut cur = sym;
        loop {
            if self.is_class_or_module(cur) {
                return cur;
            }
            cur = self.symbol(cur).owner;
        }
    }

    pub fn find_member(&self, klass: SymbolRef, name: NameRef) -> Option<SymbolRef> {
        match &self.symbol(klass).kind {
            SymbolKind::ClassOrModule(data) => data.members.get(&name).copied(),
            _ => None,
        }
    }

    /// Member lookup following the superclass chain.
    pub fn find_member_transitive(&self, klass: SymbolRef, name: NameRef) -> Option<SymbolRef> {
        let mut cur = Some(klass);
        while let Some(sym) = cur {
            if let Some(found) = self.find_member(sym, name) {
                return Some(found);
            }
            cur = match &self.symbol(sym).kind {
                SymbolKind::ClassOrModule(data) => data.superclass,
                _ => None,
            };
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_are_classes() {
        let table = SymbolTable::new();
        assert!(table.is_class_or_module(MAGIC));
        assert_eq!(table.names().show(table.name_of(STANDARD_ERROR)), "StandardError");
    }

    #[test]
    fn member_lookup_follows_superclasses() {
        let mut table = SymbolTable::new();
        let base = table.define_class("Base", ROOT);
        let derived = table.define_class("Derived", ROOT);
        table.set_superclass(derived, base);
        let field_name = table.names_mut().intern("@count");
        let field = table.define_field(field_name, base);

        assert_eq!(table.find_member_transitive(derived, field_name), Some(field));
        assert_eq!(table.find_member(derived, field_name), None);
    }

    #[test]
    fn enclosing_class_climbs_owners() {
        let mut table = SymbolTable::new();
        let klass = table.define_class("Widget", ROOT);
        let method = table.define_method("render", klass);
        assert_eq!(table.enclosing_class(method), klass);
    }
}
