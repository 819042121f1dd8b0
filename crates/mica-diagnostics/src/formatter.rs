// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Rich terminal formatter for diagnostics.
//!
//! Produces multi-line, color-coded error output:
//!
//! ```text
//! error[C0001]: use of undeclared variable `@count`
//!   --> widget.mc:10:5
//!    |
//! 10 |     @count += 1
//!    |     ^^^^^^ not declared on Widget
//!    |
//!    = note: declare it in the class body first
//! ```

use colored::Colorize;

use mica_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics for terminal output.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_map = LineMap::new(source);
        Self {
            source,
            file_name: None,
            line_map,
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        // Diagnostics anchored to the no-source span render header-only.
        if let Some((line, col)) = diagnostic.primary_span().and_then(|s| self.line_map.locate(s)) {
            let file = self.file_name.unwrap_or("<source>");
            out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

            let gutter_width = digits(line as usize);
            let pad = " ".repeat(gutter_width);
            out.push_str(&format!("{} {}\n", pad, "|".blue()));

            for label in &diagnostic.labels {
                let Some((l_line, l_col)) = self.line_map.locate(label.span) else {
                    continue;
                };
                let Some(text) = self.line_map.line_text(self.source, l_line) else {
                    continue;
                };
                out.push_str(&format!(
                    "{:>width$} {} {}\n",
                    l_line.to_string().blue(),
                    "|".blue(),
                    text,
                    width = gutter_width,
                ));

                let underline_len = label.span.end.saturating_sub(label.span.start).max(1);
                let marker = match label.style {
                    LabelStyle::Primary => "^".repeat(underline_len).red().to_string(),
                    LabelStyle::Secondary => "-".repeat(underline_len).blue().to_string(),
                };
                let msg = label.message.as_deref().unwrap_or("");
                out.push_str(&format!(
                    "{} {} {}{} {}\n",
                    pad,
                    "|".blue(),
                    " ".repeat((l_col as usize).saturating_sub(1)),
                    marker,
                    msg,
                ));
            }
            out.push_str(&format!("{} {}\n", pad, "|".blue()));
        }

        for note in &diagnostic.notes {
            out.push_str(&format!("   {} {}: {}\n", "=".blue(), "note".bold(), note));
        }
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let severity = match diagnostic.severity {
            Severity::Error => "error".red().bold().to_string(),
            Severity::Warning => "warning".yellow().bold().to_string(),
            Severity::Note => "note".blue().bold().to_string(),
        };
        match &diagnostic.code {
            Some(code) => {
                out.push_str(&format!("{}[{}]: {}\n", severity, code.0, diagnostic.message));
            }
            None => out.push_str(&format!("{}: {}\n", severity, diagnostic.message)),
        }
    }
}

fn digits(n: usize) -> usize {
    n.to_string().len()
}
