//! Diagnostic collection.

use crate::checker::{CompilerOptions, Program, TypeChecker};
use crate::diagnostic::{Diagnostic, DiagnosticOrigin};
use crate::error::CanonResult;
use crate::line_index::{LineIndexCache, Position};
use crate::workspace::Workspace;

/// A diagnostic tagged with its origin and resolved position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectedDiagnostic {
    pub origin: DiagnosticOrigin,
    pub diagnostic: Diagnostic,
    /// Present whenever the diagnostic references a file.
    pub position: Option<Position>,
}

/// Gathers the four diagnostic lists of a program in presentation order.
///
/// Owns the line index cache, so each referenced file is scanned once no
/// matter how many diagnostics point into it.
#[derive(Debug, Default)]
pub struct Collector {
    line_indexes: LineIndexCache,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a program over the workspace and collect its diagnostics.
    pub fn run(
        &mut self,
        checker: &dyn TypeChecker,
        workspace: &Workspace,
        options: &CompilerOptions,
    ) -> CanonResult<Vec<CollectedDiagnostic>> {
        let program =
            checker.create_program(workspace.root(), &workspace.checker_names(), options)?;
        Ok(self.collect(program.as_ref()))
    }

    /// Pull options, global, syntactic and semantic diagnostics, in that order.
    pub fn collect(&mut self, program: &dyn Program) -> Vec<CollectedDiagnostic> {
        let mut collected = Vec::new();

        for origin in DiagnosticOrigin::ALL {
            let diagnostics = program.diagnostics(origin);
            tracing::info!("{} diagnostics: {}", origin.name(), diagnostics.len());

            for diagnostic in diagnostics {
                tracing::debug!(origin = origin.name(), ?diagnostic, "raw diagnostic");

                let position = diagnostic.file.as_deref().map(|file| {
                    self.line_indexes
                        .get_or_build(file, || {
                            program.source_text(file).unwrap_or_default().to_owned()
                        })
                        .position(diagnostic.start)
                });

                collected.push(CollectedDiagnostic {
                    origin,
                    diagnostic: diagnostic.clone(),
                    position,
                });
            }
        }

        collected
    }

    /// Line indexes built so far.
    pub fn line_indexes(&self) -> &LineIndexCache {
        &self.line_indexes
    }
}
