// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CFG construction for Mica method bodies.
//!
//! Converts a fully-resolved AST into a control-flow graph of basic blocks
//! holding three-address-like instructions, ready for dataflow-based type
//! inference. The walk preserves the language's control-flow semantics:
//! loops with `break`/`next`, blocks with captured break targets,
//! rescue/else/ensure with exceptional edges, and `retry`.

mod builder;
mod cfg;
mod context;
mod display;
mod errors;
mod instructions;
mod resolve;
pub mod sanity;
mod walk;

#[cfg(test)]
mod tests;

pub use builder::{CfgBuilder, MethodCfg};
pub use cfg::{BasicBlock, BlockExit, BlockId, Cfg, MIN_LOOP_LET};
pub use context::CfgContext;
pub use display::CfgDisplay;
pub use errors::CfgError;
pub use instructions::{ArgFlags, BlockLink, BlockLinkRef, Instruction, Op, SendOp};
