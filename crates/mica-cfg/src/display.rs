// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Display implementation for CFG dumps (debugging).

use std::fmt;

use mica_ast::LiteralValue;
use mica_core::{NameTable, SymbolTable};

use crate::cfg::Cfg;
use crate::instructions::Op;

/// A CFG paired with the symbol table needed to print interned names.
///
/// Names and symbols live outside the graph, so `Display` goes through
/// this borrowing adapter instead of `Cfg` itself.
pub struct CfgDisplay<'a> {
    cfg: &'a Cfg,
    symbols: &'a SymbolTable,
}

impl Cfg {
    pub fn display<'a>(&'a self, symbols: &'a SymbolTable) -> CfgDisplay<'a> {
        CfgDisplay { cfg: self, symbols }
    }

    /// Renders the graph block by block.
    pub fn show(&self, symbols: &SymbolTable) -> String {
        self.display(symbols).to_string()
    }
}

impl fmt::Display for CfgDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.symbols.names();
        for block in self.cfg.blocks() {
            writeln!(
                f,
                "bb{} (loops={}, scope={}):",
                block.id.0, block.loop_depth, block.block_scope_id
            )?;
            for ins in &block.instructions {
                writeln!(
                    f,
                    "    {} = {}",
                    ins.target.show(names),
                    show_op(&ins.op, self.symbols, names)
                )?;
            }
            match &block.exit {
                None => writeln!(f, "    (no exit)")?,
                Some(exit) if exit.is_unconditional() => {
                    writeln!(f, "    -> bb{}", exit.then_block.0)?;
                }
                Some(exit) => writeln!(
                    f,
                    "    {} ? bb{} : bb{}",
                    exit.cond.show(names),
                    exit.then_block.0,
                    exit.else_block.0
                )?,
            }
        }
        Ok(())
    }
}

fn show_op(op: &Op, symbols: &SymbolTable, names: &NameTable) -> String {
    match op {
        Op::Literal(value) => show_literal(value, names),
        Op::Ident(local) => local.show(names),
        Op::Alias(sym) => format!("alias {}", names.show(symbols.name_of(*sym))),
        Op::Send(send) => {
            let args = send
                .args
                .iter()
                .map(|a| a.show(names))
                .collect::<Vec<_>>()
                .join(", ");
            let mut rendered = format!(
                "{}.{}({})",
                send.recv.show(names),
                names.show(send.method),
                args
            );
            if let Some(link) = &send.link {
                rendered.push_str(&format!(" [block {}]", link.block_scope_id));
            }
            rendered
        }
        Op::Return(local) => format!("return {}", local.show(names)),
        Op::BlockReturn { value, .. } => format!("blockreturn {}", value.show(names)),
        Op::LoadSelf { .. } => "loadself".to_string(),
        Op::LoadYieldParams { .. } => "yieldparams".to_string(),
        Op::SolveConstraint { result, .. } => {
            format!("solveconstraint {}", result.show(names))
        }
        Op::Cast { value, cast, .. } => {
            let kind = match cast {
                mica_core::CastKind::Let => "let",
                mica_core::CastKind::Cast => "cast",
                mica_core::CastKind::AssertType => "assert_type",
            };
            format!("{}({})", kind, value.show(names))
        }
        Op::TAbsurd(local) => format!("absurd({})", local.show(names)),
        Op::Unanalyzable => "unanalyzable".to_string(),
    }
}

fn show_literal(value: &LiteralValue, names: &NameTable) -> String {
    match value {
        LiteralValue::Int(i) => i.to_string(),
        LiteralValue::Float(f) => f.to_string(),
        LiteralValue::String(s) => format!("{:?}", s),
        LiteralValue::Symbol(name) => format!(":{}", names.show(*name)),
        LiteralValue::Bool(b) => b.to_string(),
        LiteralValue::Nil => "nil".to_string(),
    }
}
