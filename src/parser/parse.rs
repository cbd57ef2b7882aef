//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct, the error type, the token
//! cursor helpers and panic-mode recovery.
//!
//! # Parser Architecture
//!
//! - This module: Parser struct, helpers, error reporting and resynchronization
//! - `statements`: assignments, `If … End`, `Print`
//! - `expressions`: relational → additive → multiplicative → unary → primary
//!
//! Parser methods are split across files using `impl Parser` blocks.
//!
//! # Error recovery
//!
//! A failing statement is reported, dropped, and parsing resumes at the next
//! statement boundary: `If`, `Print`, `End`, or an `identifier =` pair. While
//! in panic mode further reports are swallowed, so one mistake yields one
//! error.

use crate::lexer::keywords::KeywordSet;
use crate::lexer::token::Token;
use crate::lexer::tokenizer::is_significant;
use crate::lexer::Category;
use crate::parser::ast::*;
use serde::Serialize;
use thiserror::Error;

pub(crate) const KW_IF: &str = "If";
pub(crate) const KW_PRINT: &str = "Print";
pub(crate) const KW_END: &str = "End";

/// Deepest allowed nesting of parenthesized expressions, lists, call
/// arguments, unary signs and `If` blocks.
pub(crate) const MAX_NESTING: usize = 100;

/// Parser error type
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("Parse error at line {}, column {}: {message}", location.line, location.column)]
pub struct ParseError {
    pub message: String,
    /// Offending token; `None` at end of input
    pub token: Option<Token>,
    pub location: SourceLocation,
}

/// Recursive descent parser for LSD
pub struct Parser {
    pub(crate) tokens: Vec<Token>,
    pub(crate) position: usize,
    pub(crate) keywords: KeywordSet,
    errors: Vec<ParseError>,
    panic_mode: bool,
    depth: usize,
    eof_location: SourceLocation,
}

impl Parser {
    /// Comments and layout separators in `tokens` are dropped.
    pub fn new(tokens: Vec<Token>, keywords: KeywordSet) -> Self {
        let tokens: Vec<Token> = tokens.into_iter().filter(is_significant).collect();
        let eof_location = tokens
            .last()
            .map_or(SourceLocation::new(1, 1), Token::end_location);
        Self {
            tokens,
            position: 0,
            keywords,
            errors: Vec::new(),
            panic_mode: false,
            depth: 0,
            eof_location,
        }
    }

    /// Override where end-of-input errors point, e.g. past trailing comments.
    pub fn with_eof_location(mut self, location: SourceLocation) -> Self {
        self.eof_location = location;
        self
    }

    /// Parse the whole program. Always returns a program; statements that
    /// failed to parse are left out and their errors are in [`Parser::errors`].
    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::new();

        loop {
            program.statements.extend(self.parse_statement_list());

            let Some(stray) = self.peek().cloned() else {
                break;
            };
            self.advance();
            self.synchronize();
            let message = if self.is_at_end() {
                "unexpected token after end of program"
            } else {
                "unexpected token outside of a statement"
            };
            self.report(ParseError {
                message: format!("{}: {}", message, stray),
                location: stray.location,
                token: Some(stray),
            });
            self.panic_mode = false;
        }

        log::debug!(
            "parsed {} statements with {} errors",
            program.statements.len(),
            self.errors.len()
        );
        program
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// Statements until the next token that cannot start one. Failed
    /// statements are reported and skipped.
    pub(crate) fn parse_statement_list(&mut self) -> Vec<Statement> {
        let mut statements = Vec::new();

        while self.at_statement_start() {
            let start = self.position;
            match self.parse_statement() {
                Ok(statement) => statements.push(statement),
                Err(err) => {
                    self.report(err);
                    if self.position == start {
                        self.advance();
                    }
                    self.synchronize();
                }
            }
        }

        statements
    }

    // ===== Error reporting =====

    pub(crate) fn report(&mut self, err: ParseError) {
        if self.panic_mode {
            log::trace!("suppressed while recovering: {}", err);
            return;
        }
        log::debug!("{}", err);
        self.errors.push(err);
        self.panic_mode = true;
    }

    /// Skip to the next statement boundary and leave panic mode.
    pub(crate) fn synchronize(&mut self) {
        while !self.is_at_end() && !self.at_sync_point() {
            self.advance();
        }
        self.panic_mode = false;
    }

    fn at_sync_point(&self) -> bool {
        self.check_keyword(KW_IF)
            || self.check_keyword(KW_PRINT)
            || self.check_keyword(KW_END)
            || self.at_assignment_start()
    }

    /// An error at the current token: `"{message}, found {token}"`.
    pub(crate) fn error_here(&self, message: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError {
                message: format!("{}, found {}", message, token),
                token: Some(token.clone()),
                location: token.location,
            },
            None => ParseError {
                message: format!("{}, found end of input", message),
                token: None,
                location: self.eof_location,
            },
        }
    }

    /// Run `parse` one nesting level deeper, failing once [`MAX_NESTING`]
    /// levels are open.
    pub(crate) fn nested<T>(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        if self.depth >= MAX_NESTING {
            return Err(self.error_here("Nesting too deep"));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ===== Helper methods =====

    pub(crate) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.position + n)
    }

    pub(crate) fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    pub(crate) fn current_location(&self) -> SourceLocation {
        self.peek().map_or(self.eof_location, |t| t.location)
    }

    pub(crate) fn is_keyword(&self, token: &Token, keyword: &str) -> bool {
        token.category == Category::Keyword && self.keywords.matches(&token.lexeme, keyword)
    }

    /// `If`, `Print` and `End` belong to the statement grammar and can never
    /// appear inside an expression.
    pub(crate) fn is_statement_keyword(&self, token: &Token) -> bool {
        [KW_IF, KW_PRINT, KW_END]
            .iter()
            .any(|kw| self.is_keyword(token, kw))
    }

    pub(crate) fn check_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| self.is_keyword(t, keyword))
    }

    pub(crate) fn check_separator(&self, lexeme: &str) -> bool {
        self.peek().is_some_and(|t| t.is(Category::Separator, lexeme))
    }

    pub(crate) fn match_separator(&mut self, lexeme: &str) -> bool {
        if self.check_separator(lexeme) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_separator(&mut self, lexeme: &str, ctx: &str) -> Result<(), ParseError> {
        if self.match_separator(lexeme) {
            Ok(())
        } else {
            Err(self.error_here(&format!("Expected '{}' {}", lexeme, ctx)))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: &str, ctx: &str) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(&format!("Expected '{}' {}", keyword, ctx)))
        }
    }

    /// `identifier =` starts an assignment.
    pub(crate) fn at_assignment_start(&self) -> bool {
        matches!(
            (self.peek(), self.peek_ahead(1)),
            (Some(name), Some(eq))
                if name.category == Category::Identifier && eq.category == Category::Assign
        )
    }

    pub(crate) fn at_statement_start(&self) -> bool {
        match self.peek() {
            Some(token) if token.category == Category::Identifier => true,
            Some(token) => self.is_keyword(token, KW_IF) || self.is_keyword(token, KW_PRINT),
            None => false,
        }
    }
}

/// Parse an already tokenized program.
pub fn parse_tokens(tokens: Vec<Token>, keywords: KeywordSet) -> (Program, Vec<ParseError>) {
    let mut parser = Parser::new(tokens, keywords);
    let program = parser.parse_program();
    (program, parser.take_errors())
}
