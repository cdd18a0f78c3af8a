//! # rocky_canon
//!
//! Canon - The standard of correctness for Rocky.js watchfaces.
//! Checks plain JavaScript against the Rocky.js declaration file with the
//! TypeScript compiler and turns its findings into a verdict.
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------------------------+
//! |                       rocky_canon                         |
//! +-----------------------------------------------------------+
//! |                                                           |
//! |  +-------------------+     +------------------------+     |
//! |  | Workspace         |     | TypeChecker            |     |
//! |  | - stage           |---->| - create_program       |     |
//! |  | - NameMap         |     |   (NodeChecker)        |     |
//! |  +-------------------+     +------------------------+     |
//! |           |                            |                  |
//! |           | normalize_annotations      v                  |
//! |           |                +------------------------+     |
//! |           |                | Collector              |     |
//! |           |                | - options/global/      |     |
//! |           |                |   syntactic/semantic   |     |
//! |           |                | - LineIndexCache       |     |
//! |           |                +------------------------+     |
//! |           |                            |                  |
//! |           v                            v                  |
//! |  +-------------------+     +------------------------+     |
//! |  | Verdict           |<----| Presenter              |     |
//! |  | - ExitStatus      |     | - classify / suppress  |     |
//! |  +-------------------+     | - RunStats             |     |
//! |                            +------------------------+     |
//! |                                                           |
//! +-----------------------------------------------------------+
//! ```

pub mod annotation;
pub mod checker;
pub mod collector;
pub mod diagnostic;
pub mod error;
pub mod executor;
pub mod line_index;
pub mod policy;
pub mod presenter;
pub mod style;
pub mod verdict;
pub mod workspace;

use std::io::Write;

pub use annotation::normalize_annotations;
pub use checker::{CompilerOptions, Program, ProgramSnapshot, TypeChecker};
pub use collector::{CollectedDiagnostic, Collector};
pub use diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticOrigin, MessageNode};
pub use error::{CanonError, CanonResult, CheckerNotFoundError, MissingTool, PackageManager};
pub use executor::{NodeChecker, NodeCheckerConfig};
pub use line_index::{LineIndex, LineIndexCache, Position};
pub use policy::{Severity, SuppressionPolicy, STUB_MARKER, STUB_MESSAGE};
pub use presenter::{PresentOptions, Presenter, RunStats};
pub use style::{Style, Tag};
pub use verdict::{format_summary, ExitStatus, Verdict};
pub use workspace::{NameMap, StagedFile, StagedSource, Workspace, BUNDLED_DEFINITIONS};

/// Settings for one check run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub compiler: CompilerOptions,
    pub present: PresentOptions,
    pub max_warnings: Option<usize>,
}

/// Result of [`check_workspace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    pub stats: RunStats,
    pub verdict: Verdict,
}

/// Run the checker over a staged workspace and write the report to `out`.
///
/// Summary and verdict are left to the caller.
pub fn check_workspace<W: Write>(
    checker: &dyn TypeChecker,
    workspace: &Workspace,
    options: &CheckOptions,
    out: &mut W,
) -> CanonResult<CheckOutcome> {
    let mut collector = Collector::new();
    let collected = collector.run(checker, workspace, &options.compiler)?;

    let presenter = Presenter::new(options.present, workspace.names(), collector.line_indexes());
    let stats = presenter.present(&collected, out)?;
    let verdict = Verdict::from_stats(&stats, options.max_warnings);

    tracing::info!(
        "{} nodes rendered: {}",
        stats.total,
        format_summary(stats.errors, stats.warnings)
    );

    Ok(CheckOutcome { stats, verdict })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::path::Path;
    use tempfile::TempDir;

    /// Replays a fixed snapshot, whatever the workspace contains.
    struct FakeChecker {
        snapshot: ProgramSnapshot,
        calls: Cell<usize>,
    }

    impl FakeChecker {
        fn new(snapshot: ProgramSnapshot) -> Self {
            Self {
                snapshot,
                calls: Cell::new(0),
            }
        }
    }

    impl TypeChecker for FakeChecker {
        fn create_program(
            &self,
            root: &Path,
            files: &[String],
            _options: &CompilerOptions,
        ) -> CanonResult<Box<dyn Program>> {
            assert!(root.join("tsconfig.json").is_file());
            assert_eq!(files.last().map(String::as_str), Some("0_rocky.d.ts"));
            self.calls.set(self.calls.get() + 1);
            Ok(Box::new(self.snapshot.clone()))
        }
    }

    const FACE: &str =
        "var rocky = require('rocky');\nrocky.on('minutechange', function() { rocky.requestDraw(); });\n";

    fn stage(dir: &TempDir) -> Workspace {
        let input = dir.path().join("face.js");
        std::fs::write(&input, FACE).unwrap();
        Workspace::stage(&[input], &[], &CompilerOptions::default()).unwrap()
    }

    fn run(
        checker: &FakeChecker,
        workspace: &Workspace,
        max_warnings: Option<usize>,
    ) -> (String, CheckOutcome) {
        let options = CheckOptions {
            max_warnings,
            ..CheckOptions::default()
        };
        let mut out = Vec::new();
        let outcome = check_workspace(checker, workspace, &options, &mut out).unwrap();
        (String::from_utf8(out).unwrap(), outcome)
    }

    fn semantic(code: u32, text: &str) -> Diagnostic {
        Diagnostic::in_file("face.ts", 30, 8, DiagnosticCategory::Error, code, text)
    }

    #[test]
    fn test_clean_script() {
        let dir = TempDir::new().unwrap();
        let workspace = stage(&dir);
        let checker = FakeChecker::new(ProgramSnapshot::new().with_source("face.ts", FACE));

        let (output, outcome) = run(&checker, &workspace, None);

        assert!(output.is_empty());
        assert_eq!(outcome.stats, RunStats::default());
        assert_eq!(outcome.verdict, Verdict::Clean);
        assert_eq!(outcome.verdict.exit_status(), ExitStatus::Success);
    }

    #[test]
    fn test_stub_marker_fails_run() {
        let dir = TempDir::new().unwrap();
        let workspace = stage(&dir);
        let checker = FakeChecker::new(
            ProgramSnapshot::new()
                .with_source("face.ts", FACE)
                .with_diagnostic(
                    DiagnosticOrigin::Semantic,
                    Diagnostic::in_file(
                        "face.ts",
                        30,
                        8,
                        DiagnosticCategory::Warning,
                        2345,
                        "Argument of type 'string' is not assignable to parameter of type 'IsNotImplementedInRockyYet'.",
                    ),
                ),
        );

        let (output, outcome) = run(&checker, &workspace, None);

        assert!(output.starts_with(&format!(
            "{}(2,1): ERROR TS2345: {}",
            dir.path().join("face.js").display(),
            STUB_MESSAGE
        )));
        assert_eq!(outcome.verdict.exit_status(), ExitStatus::Errors);
    }

    #[test]
    fn test_syntax_error_beats_warnings() {
        let dir = TempDir::new().unwrap();
        let workspace = stage(&dir);
        let checker = FakeChecker::new(
            ProgramSnapshot::new()
                .with_source("face.ts", FACE)
                .with_diagnostic(
                    DiagnosticOrigin::Semantic,
                    semantic(2339, "Property 'requestDraw' does not exist on type 'Rocky'."),
                )
                .with_diagnostic(
                    DiagnosticOrigin::Syntactic,
                    Diagnostic::in_file(
                        "face.ts",
                        0,
                        3,
                        DiagnosticCategory::Error,
                        1005,
                        "';' expected.",
                    ),
                ),
        );

        let (output, outcome) = run(&checker, &workspace, None);

        assert_eq!(outcome.stats.errors, 1);
        assert_eq!(outcome.stats.warnings, 1);
        assert_eq!(outcome.verdict.exit_status(), ExitStatus::Errors);
        // Syntactic diagnostics are reported before semantic ones
        let first = output.lines().next().unwrap();
        assert!(first.contains("ERROR TS1005"));
    }

    #[test]
    fn test_max_warnings() {
        let dir = TempDir::new().unwrap();
        let workspace = stage(&dir);
        let checker = FakeChecker::new(
            ProgramSnapshot::new()
                .with_source("face.ts", FACE)
                .with_diagnostic(
                    DiagnosticOrigin::Semantic,
                    semantic(2339, "Property 'a' does not exist on type 'Rocky'."),
                )
                .with_diagnostic(
                    DiagnosticOrigin::Semantic,
                    semantic(2339, "Property 'b' does not exist on type 'Rocky'."),
                ),
        );

        assert_eq!(
            run(&checker, &workspace, Some(2)).1.verdict.exit_status(),
            ExitStatus::Success
        );
        assert_eq!(
            run(&checker, &workspace, Some(1)).1.verdict.exit_status(),
            ExitStatus::WarningsExceeded
        );
    }

    #[test]
    fn test_rerun_is_identical() {
        let dir = TempDir::new().unwrap();
        let workspace = stage(&dir);
        let checker = FakeChecker::new(
            ProgramSnapshot::new()
                .with_source("face.ts", FACE)
                .with_diagnostic(
                    DiagnosticOrigin::Semantic,
                    semantic(2551, "Property 'requestDraww' does not exist on type 'Rocky'."),
                ),
        );

        let first = run(&checker, &workspace, None);
        let second = run(&checker, &workspace, None);

        assert_eq!(first, second);
        assert_eq!(checker.calls.get(), 2);
    }

    #[test]
    fn test_checker_failure_propagates() {
        struct Crashing;

        impl TypeChecker for Crashing {
            fn create_program(
                &self,
                _: &Path,
                _: &[String],
                _: &CompilerOptions,
            ) -> CanonResult<Box<dyn Program>> {
                Err(CanonError::CheckerExecution {
                    exit_code: 1,
                    message: "Cannot find module 'typescript'".to_string(),
                })
            }
        }

        let dir = TempDir::new().unwrap();
        let workspace = stage(&dir);
        let mut out = Vec::new();
        let err = check_workspace(&Crashing, &workspace, &CheckOptions::default(), &mut out)
            .unwrap_err();

        assert!(!err.is_usage());
        assert!(out.is_empty());
    }
}
