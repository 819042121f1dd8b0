// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! CFG construction errors.
//!
//! User-level findings (undeclared variables, malformed `T.absurd`, orphan
//! `next`/`break`/`retry`) become diagnostics pushed into the sink; the
//! walk keeps going and produces a best-effort graph. `CfgError` is the
//! other regime: an AST that violates what earlier passes must guarantee.
//! It unwinds the walk, collecting a breadcrumb per frame, and no CFG is
//! returned.

use mica_ast::Span;
use mica_diagnostics::{Diagnostic, ToDiagnostic};

/// A fatal violation of the builder's preconditions.
#[derive(Debug, thiserror::Error)]
pub enum CfgError {
    #[error("CFG construction failed: {message}")]
    Internal {
        message: String,
        span: Span,
        /// Node kinds unwound through, innermost first.
        breadcrumbs: Vec<(&'static str, Span)>,
    },
}

impl CfgError {
    pub fn internal(message: impl Into<String>, span: Span) -> Self {
        CfgError::Internal {
            message: message.into(),
            span,
            breadcrumbs: Vec::new(),
        }
    }

    /// Records the node kind a walk frame was processing when the error
    /// passed through it.
    pub fn with_breadcrumb(mut self, kind: &'static str, span: Span) -> Self {
        let CfgError::Internal { breadcrumbs, .. } = &mut self;
        breadcrumbs.push((kind, span));
        self
    }

    pub fn span(&self) -> Span {
        let CfgError::Internal { span, .. } = self;
        *span
    }
}

impl ToDiagnostic for CfgError {
    fn to_diagnostic(&self) -> Diagnostic {
        let CfgError::Internal { message, span, breadcrumbs } = self;
        let mut diag = Diagnostic::error(format!("internal error: {}", message))
            .with_code("C0900")
            .with_primary(*span, "while lowering this expression");
        for (kind, _) in breadcrumbs {
            diag = diag.with_note(format!("while walking `{}`", kind));
        }
        diag
    }
}

/// `UndeclaredVariable` diagnostic.
pub fn undeclared_variable(name: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("use of undeclared variable `{}`", name))
        .with_code("C0001")
        .with_primary(span, "not declared")
}

/// `MalformedTAbsurd` diagnostic for a wrong argument count.
pub fn absurd_wrong_arity(got: usize, span: Span) -> Diagnostic {
    Diagnostic::error(format!(
        "`T.absurd` expects exactly one argument but got `{}`",
        got
    ))
    .with_code("C0002")
    .with_primary(span, "here")
}

/// `MalformedTAbsurd` diagnostic for a call argument.
pub fn absurd_on_call(span: Span) -> Diagnostic {
    Diagnostic::error("`T.absurd` expects to be called on a variable, not a method call")
        .with_code("C0002")
        .with_primary(span, "here")
}

/// `NoNextScope` diagnostic, shared by `next`, `break`, and `retry`.
pub fn no_scope(scope_kind: &str, keyword: &str, span: Span) -> Diagnostic {
    Diagnostic::error(format!("no `{}` block around `{}`", scope_kind, keyword))
        .with_code("C0003")
        .with_primary(span, "here")
}
