//! Checker diagnostics.

use serde::Deserialize;

/// Upper bound on chain nodes walked per diagnostic.
pub const MAX_CHAIN_NODES: usize = 64;

/// Category the checker itself assigned to a diagnostic or chain node.
///
/// Numeric values follow the TypeScript compiler's `DiagnosticCategory`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum DiagnosticCategory {
    Warning = 0,
    Error = 1,
    Suggestion = 2,
    Message = 3,
}

impl TryFrom<u8> for DiagnosticCategory {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, String> {
        // `Self::Error` would be ambiguous with the associated type.
        match value {
            0 => Ok(DiagnosticCategory::Warning),
            1 => Ok(DiagnosticCategory::Error),
            2 => Ok(DiagnosticCategory::Suggestion),
            3 => Ok(DiagnosticCategory::Message),
            other => Err(format!("unknown diagnostic category {}", other)),
        }
    }
}

/// Which checker query produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticOrigin {
    /// Compiler options diagnostics.
    Options,
    /// Global (project-level) diagnostics.
    Global,
    /// Per-file syntactic diagnostics.
    Syntactic,
    /// Per-file semantic diagnostics.
    Semantic,
}

impl DiagnosticOrigin {
    /// All origins, in the order they are collected and presented.
    pub const ALL: [DiagnosticOrigin; 4] = [
        DiagnosticOrigin::Options,
        DiagnosticOrigin::Global,
        DiagnosticOrigin::Syntactic,
        DiagnosticOrigin::Semantic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Options => "options",
            Self::Global => "global",
            Self::Syntactic => "syntactic",
            Self::Semantic => "semantic",
        }
    }
}

/// One message in a diagnostic's explanation chain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageNode {
    /// Diagnostic code of this message.
    pub code: u32,
    /// Message text.
    pub text: String,
    /// Category assigned by the checker.
    pub category: DiagnosticCategory,
    /// Nesting depth (0 for the head message).
    #[serde(default)]
    pub depth: usize,
}

/// A diagnostic from the checker.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Diagnostic {
    /// Checker-visible file name, absent for project-level diagnostics.
    #[serde(default)]
    pub file: Option<String>,
    /// Start offset into the file text.
    #[serde(default)]
    pub start: u32,
    /// Length of the flagged span.
    #[serde(default)]
    pub length: u32,
    /// Category assigned by the checker.
    pub category: DiagnosticCategory,
    /// Diagnostic code.
    pub code: u32,
    /// Message chain, head first.
    pub chain: Vec<MessageNode>,
}

impl Diagnostic {
    /// Create a project-level diagnostic with a single message.
    pub fn global(category: DiagnosticCategory, code: u32, text: impl Into<String>) -> Self {
        Self {
            file: None,
            start: 0,
            length: 0,
            category,
            code,
            chain: vec![MessageNode {
                code,
                text: text.into(),
                category,
                depth: 0,
            }],
        }
    }

    /// Create a diagnostic anchored at `start..start + length` in `file`.
    pub fn in_file(
        file: impl Into<String>,
        start: u32,
        length: u32,
        category: DiagnosticCategory,
        code: u32,
        text: impl Into<String>,
    ) -> Self {
        Self {
            file: Some(file.into()),
            start,
            length,
            ..Self::global(category, code, text)
        }
    }

    /// Append a nested explanation one level below the previous node.
    pub fn with_detail(mut self, code: u32, text: impl Into<String>) -> Self {
        let depth = self.chain.last().map_or(0, |node| node.depth + 1);
        self.chain.push(MessageNode {
            code,
            text: text.into(),
            category: self.category,
            depth,
        });
        self
    }

    /// Chain nodes, head first, bounded by [`MAX_CHAIN_NODES`].
    pub fn messages(&self) -> impl Iterator<Item = &MessageNode> {
        self.chain.iter().take(MAX_CHAIN_NODES)
    }

    /// Head message text.
    pub fn head_text(&self) -> &str {
        self.chain.first().map_or("", |node| node.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_bridge_diagnostic() {
        let json = r#"{
            "file": "face.ts",
            "start": 12,
            "length": 3,
            "category": 1,
            "code": 2322,
            "chain": [
                { "code": 2322, "text": "Type 'string' is not assignable to type 'number'.", "category": 1, "depth": 0 }
            ]
        }"#;
        let diag: Diagnostic = serde_json::from_str(json).unwrap();
        assert_eq!(diag.file.as_deref(), Some("face.ts"));
        assert_eq!(diag.category, DiagnosticCategory::Error);
        assert_eq!(diag.chain.len(), 1);
    }

    #[test]
    fn test_deserialize_rejects_unknown_category() {
        let json = r#"{ "category": 9, "code": 1, "chain": [] }"#;
        assert!(serde_json::from_str::<Diagnostic>(json).is_err());
    }

    #[test]
    fn test_with_detail_increases_depth() {
        let diag = Diagnostic::global(DiagnosticCategory::Error, 2345, "head")
            .with_detail(2322, "middle")
            .with_detail(2741, "leaf");
        let depths: Vec<_> = diag.messages().map(|n| n.depth).collect();
        assert_eq!(depths, vec![0, 1, 2]);
        assert_eq!(diag.head_text(), "head");
    }

    #[test]
    fn test_messages_are_bounded() {
        let mut diag = Diagnostic::global(DiagnosticCategory::Error, 1, "head");
        for _ in 0..(MAX_CHAIN_NODES * 2) {
            diag = diag.with_detail(1, "again");
        }
        assert_eq!(diag.messages().count(), MAX_CHAIN_NODES);
    }
}
