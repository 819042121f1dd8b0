// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CFG instructions.
//!
//! Each instruction assigns the value of an operation to a target local.
//! The `synthetic` bit marks instructions with no corresponding source
//! token; the language server uses it to exclude them from cursor queries,
//! and they may carry a zero-length span.

use std::rc::Rc;

use mica_ast::{LiteralValue, Span};
use mica_core::{CastKind, LocalVariable, NameRef, SymbolRef, TypeRef};

/// A single three-address-like instruction: `target = op`.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub target: LocalVariable,
    pub span: Span,
    pub op: Op,
    pub synthetic: bool,
}

impl Instruction {
    pub fn new(target: LocalVariable, span: Span, op: Op) -> Self {
        Instruction { target, span, op, synthetic: false }
    }

    pub fn synthetic(target: LocalVariable, span: Span, op: Op) -> Self {
        Instruction { target, span, op, synthetic: true }
    }
}

/// The operations the builder emits.
#[derive(Debug, Clone)]
pub enum Op {
    /// A constant value.
    Literal(LiteralValue),
    /// Copy of another local.
    Ident(LocalVariable),
    /// Handle to a globally-resolved class or constant.
    Alias(SymbolRef),
    /// Method invocation.
    Send(SendOp),
    /// Method return.
    Return(LocalVariable),
    /// Return from the innermost block body.
    BlockReturn { link: BlockLinkRef, value: LocalVariable },
    /// Reload `self` at block entry; the callee may have rebound it.
    LoadSelf { link: BlockLinkRef, fallback: LocalVariable },
    /// Tuple of yielded arguments at block entry.
    LoadYieldParams { link: BlockLinkRef },
    /// Placeholder for the inferencer to resolve the send's generic
    /// constraints after it has walked the block body.
    SolveConstraint { link: BlockLinkRef, result: LocalVariable },
    /// Type ascription / assertion.
    Cast {
        value: LocalVariable,
        ty: TypeRef,
        cast: CastKind,
    },
    /// Explicit exhaustiveness assertion.
    TAbsurd(LocalVariable),
    /// Opaque value the inferencer must not reason about; models
    /// exception-edge semantics.
    Unanalyzable,
}

/// Payload of a `Send`.
#[derive(Debug, Clone)]
pub struct SendOp {
    pub recv: LocalVariable,
    pub method: NameRef,
    pub recv_span: Span,
    pub args: Vec<LocalVariable>,
    pub arg_spans: Vec<Span>,
    /// Whether a private method may be called (receiver-less send).
    pub is_private_ok: bool,
    /// Present when the send carries a literal block.
    pub link: Option<BlockLinkRef>,
}

/// Parsed flags of one block formal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgFlags {
    pub keyword: bool,
    pub repeated: bool,
    pub has_default: bool,
    pub shadow: bool,
}

/// Ties a call site to its block body.
///
/// Shared between the `Send`, the body's `LoadSelf`/`LoadYieldParams`/
/// `BlockReturn`, and the `SolveConstraint` that resolves the call's
/// generic constraints.
#[derive(Debug)]
pub struct BlockLink {
    /// The method the block was passed to.
    pub method: NameRef,
    pub arg_flags: Vec<ArgFlags>,
    pub block_scope_id: u32,
}

pub type BlockLinkRef = Rc<BlockLink>;
