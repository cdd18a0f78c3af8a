//! Terminal styling.

use crate::policy::Severity;

/// Semantic style tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Error,
    Warning,
    Info,
    Success,
    Emphasis,
    Muted,
}

impl Tag {
    fn ansi(self) -> &'static str {
        match self {
            Self::Error => "\x1b[31m",
            Self::Warning => "\x1b[33m",
            Self::Info => "\x1b[36m",
            Self::Success => "\x1b[32m",
            Self::Emphasis => "\x1b[1m",
            Self::Muted => "\x1b[90m",
        }
    }
}

impl From<Severity> for Tag {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Tag::Info,
            Severity::Warning => Tag::Warning,
            Severity::Error => Tag::Error,
        }
    }
}

/// Maps tags to ANSI escapes, or to nothing when color is off.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    color: bool,
}

impl Style {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    /// Style that never emits escapes.
    pub fn plain() -> Self {
        Self::new(false)
    }

    pub fn paint(&self, tag: impl Into<Tag>, text: &str) -> String {
        if self.color {
            format!("{}{}\x1b[0m", tag.into().ansi(), text)
        } else {
            text.to_string()
        }
    }

    /// Severity label in its color.
    pub fn severity(&self, severity: Severity) -> String {
        self.paint(severity, severity.label())
    }
}
