// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Local variable handles.

use crate::names::{self, NameRef, NameTable};

/// A local variable of a method body.
///
/// `unique` disambiguates temporaries sharing a name prefix; it is a
/// per-method counter starting at 1. Source-level locals bound by the
/// namer and the distinguished locals (`self`, the block-call condition)
/// use `unique == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalVariable {
    pub name: NameRef,
    pub unique: u32,
}

impl LocalVariable {
    pub fn new(name: NameRef, unique: u32) -> Self {
        LocalVariable { name, unique }
    }

    /// The "no variable" sentinel, used as the condition of unconditional
    /// block exits.
    pub fn none() -> Self {
        LocalVariable { name: names::NO_NAME, unique: 0 }
    }

    pub fn exists(&self) -> bool {
        *self != Self::none()
    }

    /// The method's `self`.
    pub fn self_local() -> Self {
        LocalVariable { name: names::SELF_, unique: 0 }
    }

    /// The nondeterministic block-entry condition. The inferencer treats a
    /// branch on this local as taken both ways.
    pub fn block_call() -> Self {
        LocalVariable { name: names::BLOCK_CALL, unique: 0 }
    }

    /// Renders as `name` or `name$unique` for temporaries.
    pub fn show(&self, names: &NameTable) -> String {
        if self.unique == 0 {
            names.show(self.name).to_string()
        } else {
            format!("{}${}", names.show(self.name), self.unique)
        }
    }
}
