//! Tokens, lexical errors and offset-to-position mapping.

use crate::lexer::category::Category;
use crate::parser::ast::SourceLocation;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A classified lexeme. `offset` is the byte offset of its first byte.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub category: Category,
    pub lexeme: String,
    pub location: SourceLocation,
    pub offset: usize,
}

impl Token {
    pub fn new(category: Category, lexeme: impl Into<String>, location: SourceLocation, offset: usize) -> Self {
        Self {
            category,
            lexeme: lexeme.into(),
            location,
            offset,
        }
    }

    pub fn is(&self, category: Category, lexeme: &str) -> bool {
        self.category == category && self.lexeme == lexeme
    }

    /// Location just past the last byte of the lexeme. Lexemes never span
    /// lines except a comment's trailing newline.
    pub fn end_location(&self) -> SourceLocation {
        SourceLocation::new(self.location.line, self.location.column + self.lexeme.len())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.category, self.lexeme.escape_debug())
    }
}

/// Unrecognised input. Tokenization continues after it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error(
    "invalid token '{text}' at line {}, column {}; context='{context}'",
    location.line,
    location.column
)]
pub struct LexError {
    pub text: String,
    pub offset: usize,
    pub location: SourceLocation,
    pub context: String,
}

/// Maps byte offsets to 1-based line/column pairs.
///
/// The line is one more than the number of newlines before the offset; the
/// column is the distance from the closest preceding newline (or offset + 1
/// on the first line).
#[derive(Debug, Clone)]
pub struct LineIndex {
    newlines: Vec<usize>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let newlines = source
            .bytes()
            .enumerate()
            .filter_map(|(i, b)| (b == b'\n').then_some(i))
            .collect();
        Self { newlines }
    }

    pub fn location(&self, offset: usize) -> SourceLocation {
        let before = self.newlines.partition_point(|&nl| nl < offset);
        let column = match before {
            0 => offset + 1,
            n => offset - self.newlines[n - 1],
        };
        SourceLocation::new(before + 1, column)
    }

    /// Inverse of [`LineIndex::location`].
    pub fn offset(&self, location: SourceLocation) -> usize {
        match location.line {
            0 | 1 => location.column.saturating_sub(1),
            line => self.newlines.get(line - 2).map_or(0, |nl| nl + location.column),
        }
    }
}
