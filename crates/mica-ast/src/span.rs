// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.
//!
//! Spans are byte ranges. Instructions the CFG builder synthesizes carry
//! zero-length spans (anchored where the construct they support sits) or
//! the no-source span; `LineMap` understands both when mapping spans to
//! line/column positions for diagnostics.

/// A byte range in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The empty span at offset zero, for values with no source at all.
    pub fn none() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Collapses to a zero-length span at the start offset. Synthetic
    /// instructions carry these so the language server skips them in
    /// cursor queries.
    pub fn zero_length(&self) -> Self {
        Self { start: self.start, end: self.start }
    }

    pub fn is_zero_length(&self) -> bool {
        self.start == self.end
    }
}

/// Maps spans to 1-based line/column positions.
///
/// Holds the byte offset at which each line begins, so lookups are a
/// binary search rather than a rescan of the source.
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Offset of the first byte of each line; index 0 is always 0.
    line_starts: Vec<u32>,
}

impl LineMap {
    /// Indexes `source` by its newlines.
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0u32)
            .chain(source.match_indices('\n').map(|(i, _)| (i + 1) as u32))
            .collect();
        LineMap { line_starts }
    }

    /// Line and column of a byte offset, both 1-based.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        // partition_point counts the lines beginning at or before offset.
        let line_idx = self
            .line_starts
            .partition_point(|&start| start as usize <= offset)
            .saturating_sub(1);
        let col = offset - self.line_starts[line_idx] as usize + 1;
        ((line_idx + 1) as u32, col as u32)
    }

    /// Where a span starts, or `None` for the no-source span.
    ///
    /// A zero-length span with a nonzero anchor still locates: the
    /// synthetic instruction it belongs to supports a real construct, and
    /// diagnostics may point there. Only `Span::none()` has no position.
    pub fn locate(&self, span: Span) -> Option<(u32, u32)> {
        if span == Span::none() {
            return None;
        }
        Some(self.line_col(span.start))
    }

    /// The text of a 1-based line, without its newline.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)? as usize;
        let rest = source.get(start..)?;
        Some(match rest.find('\n') {
            Some(newline) => &rest[..newline],
            None => rest,
        })
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}
