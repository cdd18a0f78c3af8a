//! Offset to line/column conversion for checker source files.
//!
//! Checker offsets count UTF-16 code units, so line starts are stored in
//! those units alongside the byte starts used to slice line text.

use rustc_hash::FxHashMap;

/// Zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

/// Sorted line-start table for one source file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    text: String,
    /// Line starts in UTF-16 code units.
    line_starts: Vec<u32>,
    /// Line starts in bytes, parallel to `line_starts`.
    byte_starts: Vec<usize>,
}

impl LineIndex {
    /// Scan `text` once and record where each line starts.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        let mut byte_starts = vec![0];
        let mut units = 0u32;

        for (byte, ch) in text.char_indices() {
            units += ch.len_utf16() as u32;
            if ch == '\n' {
                line_starts.push(units);
                byte_starts.push(byte + 1);
            }
        }

        Self {
            text,
            line_starts,
            byte_starts,
        }
    }

    /// Number of lines (a trailing newline opens an empty last line).
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert a checker offset to a zero-based position.
    pub fn position(&self, offset: u32) -> Position {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        Position {
            line: line as u32,
            column: offset - self.line_starts[line],
        }
    }

    /// Text of a zero-based line without its line terminator.
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let line = line as usize;
        let start = *self.byte_starts.get(line)?;
        let end = self
            .byte_starts
            .get(line + 1)
            .map_or(self.text.len(), |next| next - 1);
        Some(self.text[start..end].trim_end_matches('\r'))
    }

    /// Length of a line in UTF-16 code units.
    pub fn line_len(&self, line: u32) -> u32 {
        self.line_text(line)
            .map_or(0, |text| text.encode_utf16().count() as u32)
    }
}

/// Line indexes keyed by checker-visible file name, built on first use.
#[derive(Debug, Default)]
pub struct LineIndexCache {
    indexes: FxHashMap<String, LineIndex>,
}

impl LineIndexCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index for `file`, if one was built.
    pub fn get(&self, file: &str) -> Option<&LineIndex> {
        self.indexes.get(file)
    }

    /// Index for `file`, building it from `text` on first request.
    pub fn get_or_build(&mut self, file: &str, text: impl FnOnce() -> String) -> &LineIndex {
        if !self.indexes.contains_key(file) {
            let index = LineIndex::new(text());
            tracing::debug!("built line index for {} ({} lines)", file, index.line_count());
            self.indexes.insert(file.to_owned(), index);
        }
        &self.indexes[file]
    }

    /// Number of files indexed so far.
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
