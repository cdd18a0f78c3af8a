//! Domain rules for classifying checker diagnostics.
//!
//! The checker's own categories are not trusted as-is: every syntactic
//! finding is an error, semantic findings are advisory, and anything that
//! touches an API the runtime has not implemented yet is an error with a
//! fixed explanation.

use std::borrow::Cow;

use crate::diagnostic::{Diagnostic, DiagnosticCategory, DiagnosticOrigin, MessageNode};

/// Type name the declaration file uses for declared-but-unimplemented APIs.
pub const STUB_MARKER: &str = "IsNotImplementedInRockyYet";

/// Replacement text for messages mentioning [`STUB_MARKER`].
pub const STUB_MESSAGE: &str =
    "This API is declared for Rocky.js but is not implemented by the runtime yet.";

/// "Property '{0}' does not exist on type '{1}'."
const PROPERTY_DOES_NOT_EXIST: u32 = 2339;

/// Effective severity reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    /// Label shown in diagnostic lines.
    pub fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARN",
            Self::Error => "ERROR",
        }
    }
}

/// Which noisy semantic diagnostics to drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuppressionPolicy {
    /// Show everything.
    #[default]
    None,
    /// Drop "property does not exist" findings on inline object-literal
    /// types, which mostly come from ad-hoc objects in watchface code.
    ObjectLiteralProperty,
}

impl SuppressionPolicy {
    /// Whether the whole diagnostic should be left out of the report.
    pub fn suppresses(self, origin: DiagnosticOrigin, diagnostic: &Diagnostic) -> bool {
        match self {
            Self::None => false,
            Self::ObjectLiteralProperty => {
                origin == DiagnosticOrigin::Semantic
                    && diagnostic.code == PROPERTY_DOES_NOT_EXIST
                    && diagnostic.head_text().contains("on type '{")
                    && !has_stub_marker(diagnostic)
            }
        }
    }
}

/// Whether any message in the chain mentions [`STUB_MARKER`].
pub fn has_stub_marker(diagnostic: &Diagnostic) -> bool {
    diagnostic
        .messages()
        .any(|node| node.text.contains(STUB_MARKER))
}

/// Effective severity and display text of one chain node.
pub fn classify(origin: DiagnosticOrigin, node: &MessageNode) -> (Severity, Cow<'_, str>) {
    if node.text.contains(STUB_MARKER) {
        return (Severity::Error, Cow::Borrowed(STUB_MESSAGE));
    }

    let severity = match (origin, node.category) {
        (DiagnosticOrigin::Syntactic, _) => Severity::Error,
        (_, DiagnosticCategory::Suggestion | DiagnosticCategory::Message) => Severity::Info,
        _ => Severity::Warning,
    };

    (severity, Cow::Borrowed(node.text.as_str()))
}
