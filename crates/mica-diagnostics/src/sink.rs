// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Diagnostic collection.
//!
//! Phases push structured diagnostics into a sink as they run; the driver
//! decides afterwards how to render them. A sink can suppress codes, which
//! tooling uses to silence categories during exploratory runs.

use std::collections::HashSet;

use crate::Diagnostic;

/// Collects diagnostics produced by a compiler phase.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    suppressed: HashSet<String>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops any diagnostic carrying `code` instead of recording it.
    pub fn suppress(&mut self, code: impl Into<String>) {
        self.suppressed.insert(code.into());
    }

    /// Records a diagnostic unless its code is suppressed.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        if let Some(code) = &diagnostic.code {
            if self.suppressed.contains(&code.0) {
                return;
            }
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
