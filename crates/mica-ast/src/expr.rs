// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Expression AST nodes.
//!
//! This is the *resolved* tree: constants carry symbols, locals carry
//! `LocalVariable` handles bound by the namer, and rewriter passes have
//! already run. Class and method definitions never appear in expression
//! position by the time a tree reaches CFG construction.

use mica_core::{CastKind, LocalVariable, NameRef, SymbolRef, TypeRef};

use crate::Span;

/// An expression in the resolved AST.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// The kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    /// Constant literal value
    Literal(LiteralValue),
    /// Namer-bound local variable read
    Local(LocalVariable),
    /// Instance/class variable not resolved by the namer
    UnresolvedIdent { kind: IdentKind, name: NameRef },
    /// Resolved class or constant reference
    ConstantLit {
        symbol: SymbolRef,
        /// Resolved nested qualifier (the `A::B` of `A::B::C`), kept so
        /// editor queries still see its locations.
        qualifier: Option<Box<Expr>>,
    },
    /// Resolved global or static field
    Field(SymbolRef),
    /// Assignment; LHS must be a constant, field, local, or unresolved ident
    Assign { lhs: Box<Expr>, rhs: Box<Expr> },
    /// Statement sequence with a trailing value expression
    Seq { stats: Vec<Expr>, expr: Box<Expr> },
    If {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    While { cond: Box<Expr>, body: Box<Expr> },
    Return { expr: Box<Expr> },
    /// `next` - jump to the enclosing loop/block continue point
    Next { expr: Box<Expr> },
    /// `break` - jump out of the enclosing loop/block
    Break { expr: Box<Expr> },
    /// `retry` - re-enter the enclosing rescue body
    Retry,
    /// Method invocation, optionally with a trailing block
    Send {
        recv: Box<Expr>,
        method: NameRef,
        args: Vec<Expr>,
        /// Whether a private method may be called (receiver-less send).
        is_private_ok: bool,
        block: Option<BlockExpr>,
    },
    /// A block outside a `Send`; only ever produced by a malformed tree
    Block(BlockExpr),
    /// try/rescue/else/ensure
    Rescue {
        body: Box<Expr>,
        cases: Vec<RescueCase>,
        else_: Box<Expr>,
        ensure: Box<Expr>,
    },
    Array { elems: Vec<Expr> },
    Hash { keys: Vec<Expr>, values: Vec<Expr> },
    /// Type ascription / assertion
    Cast {
        arg: Box<Expr>,
        ty: TypeRef,
        cast: CastKind,
    },
    /// Nothing; evaluates to nil
    EmptyTree,
    /// Must have been flattened out before CFG construction
    ClassDef,
    /// Must have been flattened out before CFG construction
    MethodDef,
    /// Must have been resolved away by the resolver
    UnresolvedConstantLit,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    String(String),
    Symbol(NameRef),
    Bool(bool),
    Nil,
}

/// Which namespace an unresolved identifier lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentKind {
    /// `@ivar`
    Instance,
    /// `@@cvar`
    Class,
    /// Anything else; erased by the namer, so reaching the builder is a bug
    Other,
}

/// A literal block (closure) attached to a send.
#[derive(Debug, Clone)]
pub struct BlockExpr {
    pub params: Vec<BlockParam>,
    pub body: Box<Expr>,
    pub span: Span,
}

/// A block formal parameter with its parsed argument flags.
#[derive(Debug, Clone)]
pub struct BlockParam {
    pub local: LocalVariable,
    pub span: Span,
    pub keyword: bool,
    pub repeated: bool,
    pub has_default: bool,
    pub shadow: bool,
}

impl BlockParam {
    /// A plain positional formal.
    pub fn positional(local: LocalVariable, span: Span) -> Self {
        BlockParam {
            local,
            span,
            keyword: false,
            repeated: false,
            has_default: false,
            shadow: false,
        }
    }
}

/// One `rescue Klass => e` case.
#[derive(Debug, Clone)]
pub struct RescueCase {
    /// Exception class expressions; empty means the default base class.
    pub exceptions: Vec<Expr>,
    /// The bound exception variable; must be a `Local`.
    pub var: Box<Expr>,
    pub body: Box<Expr>,
    pub span: Span,
}
