//! Run verdict and process exit status.

use crate::policy::Severity;
use crate::presenter::RunStats;
use crate::style::{Style, Tag};

/// Process exit status of a `rocky-lint` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitStatus {
    Success = 0,
    /// At least one ERROR was reported.
    Errors = 1,
    /// No errors, but more warnings than `--max-warnings` allows.
    WarningsExceeded = 2,
    /// Missing or invalid input; nothing was checked.
    Usage = 3,
    /// The checker could not be run.
    Fault = 4,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Outcome of a completed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Clean,
    Warnings { warnings: usize },
    TooManyWarnings { warnings: usize, max: usize },
    Errors { errors: usize },
}

impl Verdict {
    /// Decide the verdict. Warnings only fail the run when `max_warnings` is
    /// set and exceeded.
    pub fn from_stats(stats: &RunStats, max_warnings: Option<usize>) -> Self {
        if stats.errors > 0 {
            return Self::Errors {
                errors: stats.errors,
            };
        }
        match (stats.warnings, max_warnings) {
            (0, _) => Self::Clean,
            (warnings, Some(max)) if warnings > max => Self::TooManyWarnings { warnings, max },
            (warnings, _) => Self::Warnings { warnings },
        }
    }

    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Clean | Self::Warnings { .. } => ExitStatus::Success,
            Self::TooManyWarnings { .. } => ExitStatus::WarningsExceeded,
            Self::Errors { .. } => ExitStatus::Errors,
        }
    }

    /// Closing message shown after the summary line.
    pub fn message(&self, style: &Style) -> String {
        match self {
            Self::Clean => style.paint(Tag::Success, "No problems found."),
            Self::Warnings { .. } => warnings_advisory(style),
            Self::TooManyWarnings { warnings, max } => format!(
                "{}\n{}",
                warnings_advisory(style),
                style.paint(
                    Tag::Warning,
                    &format!("Too many warnings ({} > max {})", warnings, max)
                )
            ),
            Self::Errors { .. } => format!(
                "{} Lines marked {} will most likely fail on the watch. Fix them before deploying.",
                style.paint(Tag::Emphasis, "Hint:"),
                style.severity(Severity::Error)
            ),
        }
    }
}

fn warnings_advisory(style: &Style) -> String {
    format!(
        "{} Lines marked {} may work at runtime; the checker could not prove them correct.",
        style.paint(Tag::Emphasis, "Note:"),
        style.severity(Severity::Warning)
    )
}

/// `N errors, M warnings`
pub fn format_summary(errors: usize, warnings: usize) -> String {
    format!(
        "{} error{}, {} warning{}",
        errors,
        if errors == 1 { "" } else { "s" },
        warnings,
        if warnings == 1 { "" } else { "s" }
    )
}
