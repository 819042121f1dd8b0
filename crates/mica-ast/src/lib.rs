// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Abstract Syntax Tree types for the Mica language.
//!
//! This crate defines the resolved expression tree consumed by CFG
//! construction, plus source span utilities shared by diagnostics.

pub mod expr;
pub mod span;

pub use expr::{BlockExpr, BlockParam, Expr, ExprKind, IdentKind, LiteralValue, RescueCase};
pub use span::{LineMap, Span};
