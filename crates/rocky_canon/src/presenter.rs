//! Human-readable diagnostic report.
//!
//! One line per chain node:
//!
//! ```text
//! watchface.js(12,5): ERROR TS2345: Argument of type ... is not assignable ...
//! watchface.js(12,5): ERROR TS2322:   Type ... is not assignable to type ...
//! ```
//!
//! With `pretty` set, the offending source line and a `~` span are printed
//! above the first line of each diagnostic.

use std::io::{self, Write};

use crate::collector::CollectedDiagnostic;
use crate::line_index::LineIndexCache;
use crate::policy::{classify, Severity, SuppressionPolicy};
use crate::style::{Style, Tag};
use crate::workspace::NameMap;

/// Presentation settings, derived once from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct PresentOptions {
    /// Print source excerpts.
    pub pretty: bool,
    /// Emit ANSI colors.
    pub color: bool,
    /// Noisy diagnostics to drop.
    pub suppression: SuppressionPolicy,
}

/// Counts of rendered chain nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub errors: usize,
    pub warnings: usize,
    pub total: usize,
}

impl RunStats {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            Severity::Info => {}
        }
        self.total += 1;
    }
}

/// Renders collected diagnostics and tallies their effective severities.
pub struct Presenter<'a> {
    options: PresentOptions,
    names: &'a NameMap,
    line_indexes: &'a LineIndexCache,
    style: Style,
}

impl<'a> Presenter<'a> {
    pub fn new(
        options: PresentOptions,
        names: &'a NameMap,
        line_indexes: &'a LineIndexCache,
    ) -> Self {
        Self {
            options,
            names,
            line_indexes,
            style: Style::new(options.color),
        }
    }

    /// Write the report for `diagnostics` to `out`.
    pub fn present<W: Write>(
        &self,
        diagnostics: &[CollectedDiagnostic],
        out: &mut W,
    ) -> io::Result<RunStats> {
        let mut stats = RunStats::default();

        for collected in diagnostics {
            if self
                .options
                .suppression
                .suppresses(collected.origin, &collected.diagnostic)
            {
                tracing::debug!(
                    "suppressed TS{} at {}",
                    collected.diagnostic.code,
                    self.location(collected)
                );
                continue;
            }
            self.present_one(collected, &mut stats, out)?;
        }

        Ok(stats)
    }

    fn present_one<W: Write>(
        &self,
        collected: &CollectedDiagnostic,
        stats: &mut RunStats,
        out: &mut W,
    ) -> io::Result<()> {
        let location = self.location(collected);

        for (i, node) in collected.diagnostic.messages().enumerate() {
            let (severity, text) = classify(collected.origin, node);
            stats.record(severity);

            if i == 0 && self.options.pretty {
                self.write_excerpt(collected, severity, out)?;
            }

            writeln!(
                out,
                "{}: {} TS{}: {}{}",
                location,
                self.style.severity(severity),
                node.code,
                "  ".repeat(node.depth),
                text
            )?;
        }

        Ok(())
    }

    /// `name(line,col)` with one-based numbers, or `global`.
    fn location(&self, collected: &CollectedDiagnostic) -> String {
        match (&collected.diagnostic.file, collected.position) {
            (Some(file), Some(position)) => format!(
                "{}({},{})",
                self.names.display_name(file),
                position.line + 1,
                position.column + 1
            ),
            (Some(file), None) => self.names.display_name(file).to_string(),
            (None, _) => "global".to_string(),
        }
    }

    fn write_excerpt<W: Write>(
        &self,
        collected: &CollectedDiagnostic,
        severity: Severity,
        out: &mut W,
    ) -> io::Result<()> {
        let (Some(file), Some(position)) = (&collected.diagnostic.file, collected.position) else {
            return Ok(());
        };
        let Some(index) = self.line_indexes.get(file) else {
            return Ok(());
        };
        let Some(line_text) = index.line_text(position.line) else {
            return Ok(());
        };

        let number = (position.line + 1).to_string();
        let available = index.line_len(position.line).saturating_sub(position.column);
        let span = collected.diagnostic.length.min(available).max(1) as usize;

        writeln!(
            out,
            "{} {}",
            self.style.paint(Tag::Muted, &format!("{} |", number)),
            line_text
        )?;
        writeln!(
            out,
            "{} {}{}",
            self.style
                .paint(Tag::Muted, &format!("{} |", " ".repeat(number.len()))),
            " ".repeat(position.column as usize),
            self.style.paint(severity, &"~".repeat(span))
        )
    }
}
