// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Alias resolution: mapping globals, fields, and unresolved identifiers to
//! method-local variables.

use mica_ast::{IdentKind, Span};
use mica_core::{LocalVariable, NameRef, SymbolRef};

use crate::builder::CfgBuilder;
use crate::errors::{self, CfgError};

impl CfgBuilder<'_> {
    /// Returns the local standing in for a resolved global or field,
    /// minting and caching it on first use.
    pub(crate) fn global_to_local(&mut self, sym: SymbolRef) -> LocalVariable {
        if let Some(&local) = self.aliases.get(&sym) {
            return local;
        }
        let local = self.new_temporary(self.symbols.name_of(sym));
        self.aliases.insert(sym, local);
        local
    }

    /// Resolves an instance/class variable against the owning class chain.
    ///
    /// Failure records an `UndeclaredVariable` diagnostic on the first
    /// occurrence and mints a local cached in
    /// `discovered_undeclared_fields`; later uses reuse it silently.
    pub(crate) fn unresolved_ident_to_local(
        &mut self,
        kind: IdentKind,
        name: NameRef,
        span: Span,
    ) -> Result<LocalVariable, CfgError> {
        let klass = match kind {
            IdentKind::Class => {
                let mut klass = self.symbols.enclosing_class(self.method);
                while let Some(attached) = self.symbols.attached_class(klass) {
                    klass = attached;
                }
                klass
            }
            IdentKind::Instance => {
                if !self.symbols.is_method(self.method) {
                    return Err(CfgError::internal(
                        "instance variable outside a method",
                        span,
                    ));
                }
                self.symbols.symbol(self.method).owner
            }
            // These should have been removed in the namer.
            IdentKind::Other => {
                return Err(CfgError::internal(
                    "identifier kind should have been erased by the namer",
                    span,
                ))
            }
        };
        if !self.symbols.is_class_or_module(klass) {
            return Err(CfgError::internal(
                "identifier owner is not a class or module",
                span,
            ));
        }

        match self.symbols.find_member_transitive(klass, name) {
            Some(sym) => Ok(self.global_to_local(sym)),
            None => {
                if let Some(&cached) = self.discovered_undeclared_fields.get(&name) {
                    return Ok(cached);
                }
                let shown = self.symbols.names().show(name);
                self.sink.push(errors::undeclared_variable(shown, span));
                let local = self.new_temporary(name);
                self.discovered_undeclared_fields.insert(name, local);
                Ok(local)
            }
        }
    }
}
