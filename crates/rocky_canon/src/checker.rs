//! TypeChecker and Program traits, and the compiler configuration.

use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticOrigin};
use crate::error::CanonResult;

/// Compiler options handed to the checker.
///
/// Serialized in `tsconfig.json` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerOptions {
    /// Output language level.
    pub target: String,
    /// Built-in library declarations.
    pub lib: Vec<String>,
    /// The watch runtime tolerates dead code.
    pub allow_unreachable_code: bool,
    /// The watch runtime tolerates unused labels.
    pub allow_unused_labels: bool,
    /// Only diagnostics are wanted.
    pub no_emit: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            target: "es5".to_string(),
            lib: vec!["es5".to_string(), "dom".to_string()],
            allow_unreachable_code: true,
            allow_unused_labels: true,
            no_emit: true,
        }
    }
}

/// A built program from which diagnostics are pulled.
pub trait Program {
    /// Compiler options diagnostics.
    fn options_diagnostics(&self) -> &[Diagnostic];

    /// Global (project-level) diagnostics.
    fn global_diagnostics(&self) -> &[Diagnostic];

    /// Syntactic diagnostics of every source file.
    fn syntactic_diagnostics(&self) -> &[Diagnostic];

    /// Semantic diagnostics of every source file.
    fn semantic_diagnostics(&self) -> &[Diagnostic];

    /// Full text of a file referenced by a diagnostic.
    fn source_text(&self, file: &str) -> Option<&str>;

    /// Diagnostics of one origin.
    fn diagnostics(&self, origin: DiagnosticOrigin) -> &[Diagnostic] {
        match origin {
            DiagnosticOrigin::Options => self.options_diagnostics(),
            DiagnosticOrigin::Global => self.global_diagnostics(),
            DiagnosticOrigin::Syntactic => self.syntactic_diagnostics(),
            DiagnosticOrigin::Semantic => self.semantic_diagnostics(),
        }
    }
}

/// Trait for type checking.
pub trait TypeChecker {
    /// Build a program from `files` (names relative to `root`).
    fn create_program(
        &self,
        root: &Path,
        files: &[String],
        options: &CompilerOptions,
    ) -> CanonResult<Box<dyn Program>>;
}

/// Every diagnostic list of a program, captured at once.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProgramSnapshot {
    #[serde(default)]
    pub options: Vec<Diagnostic>,
    #[serde(default)]
    pub global: Vec<Diagnostic>,
    #[serde(default)]
    pub syntactic: Vec<Diagnostic>,
    #[serde(default)]
    pub semantic: Vec<Diagnostic>,
    /// Text of each file referenced by a diagnostic.
    #[serde(default)]
    pub sources: FxHashMap<String, String>,
}

impl ProgramSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the text of a source file.
    pub fn with_source(mut self, file: impl Into<String>, text: impl Into<String>) -> Self {
        self.sources.insert(file.into(), text.into());
        self
    }

    /// Add a diagnostic to the list of the given origin.
    pub fn with_diagnostic(mut self, origin: DiagnosticOrigin, diagnostic: Diagnostic) -> Self {
        match origin {
            DiagnosticOrigin::Options => self.options.push(diagnostic),
            DiagnosticOrigin::Global => self.global.push(diagnostic),
            DiagnosticOrigin::Syntactic => self.syntactic.push(diagnostic),
            DiagnosticOrigin::Semantic => self.semantic.push(diagnostic),
        }
        self
    }

    /// Total number of diagnostics across all lists.
    pub fn len(&self) -> usize {
        self.options.len() + self.global.len() + self.syntactic.len() + self.semantic.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Program for ProgramSnapshot {
    fn options_diagnostics(&self) -> &[Diagnostic] {
        &self.options
    }

    fn global_diagnostics(&self) -> &[Diagnostic] {
        &self.global
    }

    fn syntactic_diagnostics(&self) -> &[Diagnostic] {
        &self.syntactic
    }

    fn semantic_diagnostics(&self) -> &[Diagnostic] {
        &self.semantic
    }

    fn source_text(&self, file: &str) -> Option<&str> {
        self.sources.get(file).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::DiagnosticCategory;

    #[test]
    fn test_compiler_options_json() {
        let json = serde_json::to_value(CompilerOptions::default()).unwrap();
        assert_eq!(json["target"], "es5");
        assert_eq!(json["allowUnreachableCode"], true);
        assert_eq!(json["allowUnusedLabels"], true);
        assert_eq!(json["noEmit"], true);
    }

    #[test]
    fn test_snapshot_routes_by_origin() {
        let snapshot = ProgramSnapshot::new()
            .with_diagnostic(
                DiagnosticOrigin::Syntactic,
                Diagnostic::in_file("a.ts", 0, 1, DiagnosticCategory::Error, 1005, "';' expected."),
            )
            .with_diagnostic(
                DiagnosticOrigin::Options,
                Diagnostic::global(DiagnosticCategory::Error, 5023, "Unknown option."),
            );

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.diagnostics(DiagnosticOrigin::Syntactic).len(), 1);
        assert_eq!(snapshot.diagnostics(DiagnosticOrigin::Options).len(), 1);
        assert!(snapshot.diagnostics(DiagnosticOrigin::Semantic).is_empty());
    }

    #[test]
    fn test_snapshot_from_bridge_json() {
        let json = r#"{
            "options": [],
            "global": [],
            "syntactic": [],
            "semantic": [{
                "file": "face.ts", "start": 4, "length": 5, "category": 1, "code": 2304,
                "chain": [{ "code": 2304, "text": "Cannot find name 'rockz'.", "category": 1, "depth": 0 }]
            }],
            "sources": { "face.ts": "var rockz;" }
        }"#;
        let snapshot: ProgramSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.semantic_diagnostics().len(), 1);
        assert_eq!(snapshot.source_text("face.ts"), Some("var rockz;"));
        assert_eq!(snapshot.source_text("missing.ts"), None);
    }
}
