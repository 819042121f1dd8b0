// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Builder state and the per-method entry point.

use std::collections::HashMap;

use mica_ast::{Expr, Span};
use mica_core::{names, LocalVariable, NameRef, SymbolRef, SymbolTable};
use mica_diagnostics::{DiagnosticSink, ToDiagnostic};

use crate::cfg::{BlockId, Cfg};
use crate::context::CfgContext;
use crate::errors::CfgError;
use crate::instructions::{Instruction, Op};

/// A successfully built method CFG with the builder's side tables.
#[derive(Debug)]
pub struct MethodCfg {
    pub cfg: Cfg,
    /// Resolved global/field symbol → the local standing in for it.
    pub aliases: HashMap<SymbolRef, LocalVariable>,
    /// Undeclared instance/class variables found during the walk, one local
    /// per name so later uses stay consistent.
    pub discovered_undeclared_fields: HashMap<NameRef, LocalVariable>,
}

/// Lowers one method body to a CFG.
pub struct CfgBuilder<'a> {
    pub(crate) symbols: &'a SymbolTable,
    /// The method being lowered; owner lookups for ident resolution start
    /// here.
    pub(crate) method: SymbolRef,
    pub(crate) cfg: Cfg,
    pub(crate) sink: &'a mut DiagnosticSink,
    pub(crate) aliases: HashMap<SymbolRef, LocalVariable>,
    pub(crate) discovered_undeclared_fields: HashMap<NameRef, LocalVariable>,
    temp_counter: u32,
}

impl<'a> CfgBuilder<'a> {
    pub fn new(symbols: &'a SymbolTable, method: SymbolRef, sink: &'a mut DiagnosticSink) -> Self {
        CfgBuilder {
            symbols,
            method,
            cfg: Cfg::new(),
            sink,
            aliases: HashMap::new(),
            discovered_undeclared_fields: HashMap::new(),
            temp_counter: 0,
        }
    }

    /// Builds the CFG for `body`.
    ///
    /// User errors (undeclared variables, malformed `T.absurd`, orphan
    /// control transfers) are pushed into the sink and the build still
    /// succeeds with a best-effort graph. An internal error is recorded as
    /// an `InternalError` diagnostic and returned; no partial CFG escapes.
    pub fn build_method(
        symbols: &'a SymbolTable,
        method: SymbolRef,
        body: &Expr,
        sink: &'a mut DiagnosticSink,
    ) -> Result<MethodCfg, CfgError> {
        let mut builder = CfgBuilder::new(symbols, method, sink);
        match builder.build_body(body) {
            Ok(()) => Ok(MethodCfg {
                cfg: builder.cfg,
                aliases: builder.aliases,
                discovered_undeclared_fields: builder.discovered_undeclared_fields,
            }),
            Err(err) => {
                builder.sink.push(err.to_diagnostic());
                Err(err)
            }
        }
    }

    fn build_body(&mut self, body: &Expr) -> Result<(), CfgError> {
        let target = self.new_temporary(names::RETURN_METHOD_TEMP);
        let ctx = CfgContext::method_entry(target);
        let entry = self.cfg.entry();
        let cont = self.walk(&ctx, body, entry)?;

        // Implicit return of the body's value.
        let ret_temp = self.new_temporary(names::RETURN_TEMP);
        self.emit(cont, ret_temp, body.span, Op::Return(target));
        self.cfg.jump_to_dead(cont, body.span)?;
        Ok(())
    }

    /// Mints a fresh temporary named after `name`.
    pub(crate) fn new_temporary(&mut self, name: NameRef) -> LocalVariable {
        self.temp_counter += 1;
        LocalVariable::new(name, self.temp_counter)
    }

    pub(crate) fn emit(&mut self, block: BlockId, target: LocalVariable, span: Span, op: Op) {
        self.cfg
            .block_mut(block)
            .instructions
            .push(Instruction::new(target, span, op));
    }

    /// Emits an instruction that corresponds to no source token.
    pub(crate) fn synthesize(&mut self, block: BlockId, target: LocalVariable, span: Span, op: Op) {
        self.cfg
            .block_mut(block)
            .instructions
            .push(Instruction::synthetic(target, span, op));
    }
}
