//! Inline type-comment normalization.
//!
//! Rocky.js scripts must run unmodified on the watch, so authors write type
//! hints as block comments: `function draw(ctx/*: CanvasRenderingContext2D */)`.
//! Before handing a script to the checker, each `/*: Type */` comment is
//! turned into the native annotation `: Type`.
//!
//! The rewrite is a single textual substitution. Comments inside string
//! literals are rewritten as well.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;

static TYPE_COMMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*:\s*([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\s*\*/")
        .expect("type comment pattern is valid")
});

/// Rewrite every `/*: dotted.path */` comment into `: dotted.path`.
///
/// Returns the input unchanged (borrowed) when it contains no such comment.
pub fn normalize_annotations(source: &str) -> Cow<'_, str> {
    TYPE_COMMENT.replace_all(source, ": $1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameter_annotation() {
        assert_eq!(
            normalize_annotations("function f(x/*: number */) {}"),
            "function f(x: number) {}"
        );
    }

    #[test]
    fn test_no_comment_is_noop() {
        let source = "var rocky = require('rocky');\n/* plain comment */\n";
        let result = normalize_annotations(source);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, source);
    }

    #[test]
    fn test_dotted_path() {
        assert_eq!(
            normalize_annotations("rocky.on('draw', function(event/*: rocky.DrawEvent */) {});"),
            "rocky.on('draw', function(event: rocky.DrawEvent) {});"
        );
    }

    #[test]
    fn test_multiple_comments() {
        assert_eq!(
            normalize_annotations("function m(a/*:number*/, b/*: rocky.TickEvent */) {}"),
            "function m(a: number, b: rocky.TickEvent) {}"
        );
    }

    #[test]
    fn test_non_identifier_comment_untouched() {
        let source = "var x = 1 /*: not a type! */;\nvar y/*:*/ = 2;";
        assert_eq!(normalize_annotations(source), source);
    }

    #[test]
    fn test_rewrites_inside_strings() {
        assert_eq!(
            normalize_annotations("var s = 'a/*: T */b';"),
            "var s = 'a: Tb';"
        );
    }
}
