// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON diagnostic output for machine consumption.
//!
//! Produces structured JSON that IDEs and tooling can parse. Each
//! diagnostic includes exact locations (line/col) and its registry
//! category.

use serde::Serialize;

use mica_ast::LineMap;

use crate::{codes::ErrorCodeRegistry, Diagnostic, LabelStyle, Severity};

/// A complete JSON diagnostic report for one build.
#[derive(Debug, Serialize)]
pub struct DiagnosticReport {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub file: String,
    pub success: bool,
    /// The compilation phase that produced these diagnostics.
    pub phase: String,
    pub diagnostics: Vec<JsonDiagnostic>,
    pub error_count: usize,
    pub warning_count: usize,
}

/// A single diagnostic in JSON form.
#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub severity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
    pub labels: Vec<JsonLabel>,
    pub notes: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SourceLocation {
    pub line: u32,
    pub col: u32,
}

#[derive(Debug, Serialize)]
pub struct JsonLabel {
    pub start: usize,
    pub end: usize,
    pub style: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DiagnosticReport {
    pub fn new(file: impl Into<String>, phase: impl Into<String>, source: &str, diagnostics: &[Diagnostic]) -> Self {
        let line_map = LineMap::new(source);
        let registry = ErrorCodeRegistry::new();
        let rendered: Vec<JsonDiagnostic> = diagnostics
            .iter()
            .map(|d| JsonDiagnostic::new(d, &line_map, &registry))
            .collect();
        let error_count = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
        let warning_count = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();
        DiagnosticReport {
            version: 1,
            file: file.into(),
            success: error_count == 0,
            phase: phase.into(),
            diagnostics: rendered,
            error_count,
            warning_count,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl JsonDiagnostic {
    fn new(diagnostic: &Diagnostic, line_map: &LineMap, registry: &ErrorCodeRegistry) -> Self {
        let severity = match diagnostic.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        let code = diagnostic.code.as_ref().map(|c| c.0.clone());
        let category = code
            .as_deref()
            .and_then(|c| registry.category(c))
            .map(|cat| cat.to_string());
        // Synthetic no-source spans carry no location in the report.
        let location = diagnostic
            .primary_span()
            .and_then(|span| line_map.locate(span))
            .map(|(line, col)| SourceLocation { line, col });
        let labels = diagnostic
            .labels
            .iter()
            .map(|l| JsonLabel {
                start: l.span.start,
                end: l.span.end,
                style: match l.style {
                    LabelStyle::Primary => "primary".to_string(),
                    LabelStyle::Secondary => "secondary".to_string(),
                },
                message: l.message.clone(),
            })
            .collect();
        JsonDiagnostic {
            severity: severity.to_string(),
            code,
            category,
            message: diagnostic.message.clone(),
            location,
            labels,
            notes: diagnostic.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica_ast::Span;

    #[test]
    fn report_counts_and_locations() {
        let src = "a\nb = oops\n";
        let diags = vec![Diagnostic::error("boom")
            .with_code("C0001")
            .with_primary(Span::new(6, 10), "here")];
        let report = DiagnosticReport::new("t.mc", "cfg", src, &diags);
        assert_eq!(report.error_count, 1);
        assert!(!report.success);
        let loc = report.diagnostics[0].location.as_ref().unwrap();
        assert_eq!((loc.line, loc.col), (2, 5));
        assert!(report.to_json().contains("\"C0001\""));
    }
}
