// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error code registry.
//!
//! Maps error codes (C0001, C0002, etc.) to titles and categories. Used by
//! `mica explain <code>` and for error display.

use std::collections::HashMap;

/// Registry of all known error codes.
pub struct ErrorCodeRegistry {
    codes: HashMap<&'static str, ErrorCodeInfo>,
}

/// Information about a single error code.
pub struct ErrorCodeInfo {
    pub code: &'static str,
    pub title: &'static str,
    pub category: ErrorCategory,
}

/// Error category for grouping.
#[derive(Debug, Clone, Copy)]
pub enum ErrorCategory {
    Cfg,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Cfg => write!(f, "Cfg"),
            ErrorCategory::Internal => write!(f, "Internal"),
        }
    }
}

macro_rules! register_codes {
    ($($code:literal => ($title:literal, $cat:expr)),* $(,)?) => {{
        let mut map = HashMap::new();
        $(
            map.insert($code, ErrorCodeInfo {
                code: $code,
                title: $title,
                category: $cat,
            });
        )*
        map
    }};
}

impl Default for ErrorCodeRegistry {
    fn default() -> Self {
        use ErrorCategory::*;

        Self {
            codes: register_codes! {
                "C0001" => ("use of undeclared variable", Cfg),
                "C0002" => ("malformed T.absurd call", Cfg),
                "C0003" => ("no enclosing scope for next/break/retry", Cfg),
                "C0900" => ("internal error during CFG construction", Internal),
            },
        }
    }
}

impl ErrorCodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup(&self, code: &str) -> Option<&ErrorCodeInfo> {
        self.codes.get(code)
    }

    pub fn category(&self, code: &str) -> Option<ErrorCategory> {
        self.lookup(code).map(|info| info.category)
    }
}
