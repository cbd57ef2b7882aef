//! Expression parsing implementation
//!
//! One method per precedence tier, lowest binding first:
//!
//! ```text
//! relational     ::= additive ( ( ">" | "<" | ">=" | "<=" | "==" | "!=" ) additive )*
//! additive       ::= multiplicative ( ( "+" | "-" ) multiplicative )*
//! multiplicative ::= unary ( ( "*" | "/" ) unary )*
//! unary          ::= ( "+" | "-" ) unary | primary
//! primary        ::= integer | decimal | scientific | string
//!                  | name ( "(" args? ")" | bare_args )?
//!                  | "[" args? "]" | "(" expression ")"
//! ```
//!
//! A tier with operators becomes a [`BinaryChain`]; a tier without operators
//! returns its operand unchanged, so `x` parses to a bare identifier.
//!
//! `name` is an identifier or any keyword that does not belong to the
//! statement grammar, which is how `CalculateMean(...)` reaches the call rule.
//! A name directly followed by an operand (`CalculateSum valores`) is a call
//! without parentheses, unless that operand begins the next assignment.

use crate::lexer::token::Token;
use crate::lexer::Category;
use crate::parser::ast::*;
use crate::parser::parse::{ParseError, Parser};
use crate::parser::statements::strip_quotes;

impl Parser {
    /// Parse expression (top-level entry point). Parentheses, lists and call
    /// arguments all come back through here, so each counts as one level of
    /// nesting.
    pub(crate) fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        self.nested(Self::parse_relational)
    }

    fn parse_relational(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_additive()?;
        let mut rest = Vec::new();
        while let Some(op) = self.match_operator::<RelOp>() {
            rest.push((op, self.parse_additive()?));
        }
        Ok(chain(first, rest, Expression::Relational))
    }

    fn parse_additive(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_multiplicative()?;
        let mut rest = Vec::new();
        while let Some(op) = self.match_operator::<AddOp>() {
            rest.push((op, self.parse_multiplicative()?));
        }
        Ok(chain(first, rest, Expression::Additive))
    }

    fn parse_multiplicative(&mut self) -> Result<Expression, ParseError> {
        let first = self.parse_unary()?;
        let mut rest = Vec::new();
        while let Some(op) = self.match_operator::<MulOp>() {
            rest.push((op, self.parse_unary()?));
        }
        Ok(chain(first, rest, Expression::Multiplicative))
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        let location = self.current_location();
        if let Some(op) = self.match_operator::<UnaryOp>() {
            let operand = Box::new(self.nested(Self::parse_unary)?);
            return Ok(Expression::Unary {
                op,
                operand,
                location,
            });
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        let Some(token) = self.peek().cloned() else {
            return Err(self.error_here("Expected expression"));
        };
        let loc = token.location;

        match token.category {
            Category::Integer => {
                self.advance();
                token
                    .lexeme
                    .parse::<i64>()
                    .map(|v| Expression::IntegerLiteral(v, loc))
                    .map_err(|_| literal_error(&token, "integer literal out of range"))
            }
            Category::Decimal | Category::Scientific => {
                self.advance();
                token
                    .lexeme
                    .parse::<f64>()
                    .map(|v| Expression::DecimalLiteral(v, loc))
                    .map_err(|_| literal_error(&token, "malformed number"))
            }
            Category::String => {
                self.advance();
                Ok(Expression::StringLiteral(
                    strip_quotes(&token.lexeme).to_string(),
                    loc,
                ))
            }
            Category::Identifier => self.parse_name(token),
            Category::Keyword if !self.is_statement_keyword(&token) => self.parse_name(token),
            Category::Keyword => Err(self.error_here(&format!(
                "Keyword '{}' cannot be used in an expression",
                token.lexeme
            ))),
            Category::Separator if token.lexeme == "[" => {
                self.advance();
                let elements = if self.check_separator("]") {
                    Vec::new()
                } else {
                    self.parse_expression_list()?
                };
                self.expect_separator("]", "to close list")?;
                Ok(Expression::List {
                    elements,
                    location: loc,
                })
            }
            Category::Separator if token.lexeme == "(" => {
                self.advance();
                let inner = Box::new(self.parse_expression()?);
                self.expect_separator(")", "after expression")?;
                Ok(Expression::Parenthesized {
                    inner,
                    location: loc,
                })
            }
            _ => Err(self.error_here("Expected expression")),
        }
    }

    /// Identifier or call; `token` is the current (name) token.
    fn parse_name(&mut self, token: Token) -> Result<Expression, ParseError> {
        self.advance();
        let name = token.lexeme;
        let location = token.location;

        if self.match_separator("(") {
            let args = if self.check_separator(")") {
                Vec::new()
            } else {
                self.parse_expression_list()?
            };
            self.expect_separator(")", &format!("to close call to '{}'", name))?;
            return Ok(Expression::FunctionCall {
                name,
                args,
                location,
            });
        }

        if self.at_bare_argument() {
            let args = self.parse_expression_list()?;
            return Ok(Expression::FunctionCall {
                name,
                args,
                location,
            });
        }

        Ok(Expression::Identifier(name, location))
    }

    fn parse_expression_list(&mut self) -> Result<Vec<Expression>, ParseError> {
        let mut items = vec![self.parse_expression()?];
        while self.match_separator(",") {
            items.push(self.parse_expression()?);
        }
        Ok(items)
    }

    /// Whether the current token can open a parenthesis-free argument list.
    fn at_bare_argument(&self) -> bool {
        let Some(token) = self.peek() else {
            return false;
        };
        match token.category {
            Category::Integer | Category::Decimal | Category::Scientific | Category::String => true,
            Category::Identifier => !self.at_assignment_start(),
            Category::Keyword => !self.is_statement_keyword(token),
            Category::Separator => token.lexeme == "[",
            _ => false,
        }
    }

    fn match_operator<Op: Operator>(&mut self) -> Option<Op> {
        let op = self
            .peek()
            .filter(|t| t.category == Category::Operator)
            .and_then(|t| Op::from_lexeme(&t.lexeme))?;
        self.advance();
        Some(op)
    }
}

fn chain<Op>(
    first: Expression,
    rest: Vec<(Op, Expression)>,
    wrap: fn(BinaryChain<Op>) -> Expression,
) -> Expression {
    if rest.is_empty() {
        return first;
    }
    let location = first.location();
    wrap(BinaryChain {
        first: Box::new(first),
        rest,
        location,
    })
}

fn literal_error(token: &Token, message: &str) -> ParseError {
    ParseError {
        message: format!("{}: {}", message, token.lexeme),
        token: Some(token.clone()),
        location: token.location,
    }
}
