// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Interned names.
//!
//! Every identifier, method name, and compiler-introduced temporary name is
//! interned once into a `NameTable` and referred to by `NameRef` afterwards.
//! Compiler-introduced names are wrapped in angle brackets so they can never
//! collide with user identifiers.

use std::collections::HashMap;

/// Handle to an interned name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameRef(pub u32);

macro_rules! well_known {
    ($($konst:ident = $idx:literal => $text:literal;)*) => {
        $(
            pub const $konst: NameRef = NameRef($idx);
        )*
        const WELL_KNOWN: &[(NameRef, &str)] = &[$(($konst, $text)),*];
    };
}

// Names the CFG builder needs regardless of source text. The inferencer
// matches several of these by identity (BLOCK_CALL, BLOCK_BREAK_ASSIGN,
// GOTO_DEAD_TEMP, RESCUE_START_TEMP, RESCUE_END_TEMP), so their text is part
// of the contract with the type checker.
well_known! {
    NO_NAME = 0 => "<none>";
    SELF_ = 1 => "self";
    BLOCK_CALL = 2 => "<block_call>";
    STAT_TEMP = 3 => "<stat_temp>";
    WHILE_TEMP = 4 => "<while_temp>";
    IF_TEMP = 5 => "<if_temp>";
    RETURN_TEMP = 6 => "<return_temp>";
    NEXT_TEMP = 7 => "<next_temp>";
    BLOCK_BREAK_ASSIGN = 8 => "<block_break_assign>";
    BLOCK_PRE_CALL_TEMP = 9 => "<block_pre_call_temp>";
    SELF_RESTORE = 10 => "<self_restore>";
    BLOCK_ARG_TEMP = 11 => "<block_arg_temp>";
    BLOCK_RETURN_TEMP = 12 => "<block_return_temp>";
    RESCUE_START_TEMP = 13 => "<rescue_start_temp>";
    RESCUE_END_TEMP = 14 => "<rescue_end_temp>";
    EXCEPTION_CLASS_TEMP = 15 => "<exception_class_temp>";
    ISA_CHECK_TEMP = 16 => "<isa_check_temp>";
    GOTO_DEAD_TEMP = 17 => "<goto_dead_temp>";
    THROW_AWAY_TEMP = 18 => "<throw_away_temp>";
    CAST_TEMP = 19 => "<cast_temp>";
    HASH_TEMP = 20 => "<hash_temp>";
    ARRAY_TEMP = 21 => "<array_temp>";
    MAGIC_TEMP = 22 => "<magic_temp>";
    KEEP_FOR_IDE = 23 => "<keep_for_ide>";
    RETURN_METHOD_TEMP = 24 => "<return_method_temp>";
    SQUARE_BRACKETS = 25 => "[]";
    IS_A_P = 26 => "is_a?";
    ABSURD = 27 => "absurd";
    BUILD_ARRAY = 28 => "<build_array>";
    BUILD_HASH = 29 => "<build_hash>";
    ROOT_NAME = 30 => "<root>";
    UNTYPED_NAME = 31 => "untyped";
    STUB_MODULE_NAME = 32 => "<stub_module>";
    MAGIC_NAME = 33 => "<Magic>";
    T_NAME = 34 => "T";
    STANDARD_ERROR_NAME = 35 => "StandardError";
}

/// Interner mapping strings to stable `NameRef`s.
#[derive(Debug, Clone)]
pub struct NameTable {
    strings: Vec<String>,
    index: HashMap<String, NameRef>,
}

impl NameTable {
    /// Creates a table pre-seeded with the well-known names.
    pub fn new() -> Self {
        let mut table = NameTable {
            strings: Vec::with_capacity(WELL_KNOWN.len()),
            index: HashMap::with_capacity(WELL_KNOWN.len()),
        };
        for &(name, text) in WELL_KNOWN {
            debug_assert_eq!(name.0 as usize, table.strings.len());
            table.strings.push(text.to_string());
            table.index.insert(text.to_string(), name);
        }
        table
    }

    /// Interns `text`, returning the existing handle if already present.
    pub fn intern(&mut self, text: &str) -> NameRef {
        if let Some(&name) = self.index.get(text) {
            return name;
        }
        let name = NameRef(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.index.insert(text.to_string(), name);
        name
    }

    /// Returns the text of an interned name.
    pub fn show(&self, name: NameRef) -> &str {
        &self.strings[name.0 as usize]
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_known_seeded() {
        let table = NameTable::new();
        assert_eq!(table.show(SELF_), "self");
        assert_eq!(table.show(BLOCK_BREAK_ASSIGN), "<block_break_assign>");
        assert_eq!(table.show(STANDARD_ERROR_NAME), "StandardError");
    }

    #[test]
    fn intern_is_stable() {
        let mut table = NameTable::new();
        let a = table.intern("foo");
        let b = table.intern("foo");
        assert_eq!(a, b);
        assert_eq!(table.show(a), "foo");
    }

    #[test]
    fn intern_returns_well_known_handle() {
        let mut table = NameTable::new();
        assert_eq!(table.intern("self"), SELF_);
        assert_eq!(table.intern("[]"), SQUARE_BRACKETS);
    }
}
