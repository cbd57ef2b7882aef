//! Statement parsing implementation
//!
//! # Grammar
//!
//! ```text
//! statement   ::= assignment | conditional | print
//! assignment  ::= identifier "=" expression
//! conditional ::= "If" expression statement* "End"
//! print       ::= "Print" ( string_literal | expression )
//! ```
//!
//! All parsing methods are implemented as `pub(crate)` methods on the [`Parser`] struct.

use crate::lexer::Category;
use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser, KW_END, KW_IF, KW_PRINT};

impl Parser {
    /// Parse a statement
    pub(crate) fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        let loc = self.current_location();

        if self.check_keyword(KW_IF) {
            self.advance();
            return self.nested(|parser| parser.parse_conditional(loc));
        }

        if self.check_keyword(KW_PRINT) {
            self.advance();
            return self.parse_print(loc);
        }

        self.parse_assignment(loc)
    }

    fn parse_assignment(&mut self, location: SourceLocation) -> Result<Statement, ParseError> {
        let name = match self.peek() {
            Some(token) if token.category == Category::Identifier => token.lexeme.clone(),
            _ => return Err(self.error_here("Expected statement")),
        };
        self.advance();

        if !self.peek().is_some_and(|t| t.category == Category::Assign) {
            return Err(self.error_here(&format!("Expected '=' after '{}'", name)));
        }
        self.advance();

        let value = self.parse_expression()?;
        Ok(Statement::Assignment {
            name,
            value,
            location,
        })
    }

    fn parse_conditional(&mut self, location: SourceLocation) -> Result<Statement, ParseError> {
        let condition = self.parse_expression()?;
        let body = self.parse_statement_list();
        self.expect_keyword(
            KW_END,
            &format!("to close 'If' at line {}", location.line),
        )?;

        Ok(Statement::Conditional {
            condition,
            body,
            location,
        })
    }

    fn parse_print(&mut self, location: SourceLocation) -> Result<Statement, ParseError> {
        let value = if self.at_plain_text() {
            let text = self
                .advance()
                .map(|t| strip_quotes(&t.lexeme).to_string())
                .unwrap_or_default();
            PrintValue::Text(text)
        } else {
            PrintValue::Expression(self.parse_expression()?)
        };

        if self.check_separator(")") {
            return Err(self.error_here("Unexpected ')' after print value"));
        }

        Ok(Statement::Print { value, location })
    }

    /// A string literal that is not the left operand of an operator.
    fn at_plain_text(&self) -> bool {
        let is_string = self.peek().is_some_and(|t| t.category == Category::String);
        let followed_by_operator = self
            .peek_ahead(1)
            .is_some_and(|t| t.category == Category::Operator);
        is_string && !followed_by_operator
    }
}

pub(crate) fn strip_quotes(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme)
}
