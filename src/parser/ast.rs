// AST definitions for LSD programs

use serde::Serialize;
use std::fmt;

/// Source location information for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl Default for SourceLocation {
    fn default() -> Self {
        SourceLocation::new(1, 1)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Relational operators. They chain left to right: `a < b < c` compares the
/// result of `a < b` with `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RelOp {
    Gt,
    Lt,
    Ge,
    Le,
    Eq,
    Ne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AddOp {
    Add,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MulOp {
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Minus,
}

/// Operator enums that map to and from a lexeme.
pub trait Operator: Copy {
    fn from_lexeme(lexeme: &str) -> Option<Self>;
    fn symbol(self) -> &'static str;
}

impl Operator for RelOp {
    fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            ">" => Some(RelOp::Gt),
            "<" => Some(RelOp::Lt),
            ">=" => Some(RelOp::Ge),
            "<=" => Some(RelOp::Le),
            "==" => Some(RelOp::Eq),
            "!=" => Some(RelOp::Ne),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            RelOp::Gt => ">",
            RelOp::Lt => "<",
            RelOp::Ge => ">=",
            RelOp::Le => "<=",
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
        }
    }
}

impl Operator for AddOp {
    fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(AddOp::Add),
            "-" => Some(AddOp::Sub),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            AddOp::Add => "+",
            AddOp::Sub => "-",
        }
    }
}

impl Operator for MulOp {
    fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "*" => Some(MulOp::Mul),
            "/" => Some(MulOp::Div),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            MulOp::Mul => "*",
            MulOp::Div => "/",
        }
    }
}

impl Operator for UnaryOp {
    fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(UnaryOp::Plus),
            "-" => Some(UnaryOp::Minus),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
        }
    }
}

/// Left-associative chain `first (op operand)*` with at least one operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinaryChain<Op> {
    pub first: Box<Expression>,
    pub rest: Vec<(Op, Expression)>,
    pub location: SourceLocation,
}

/// Expression nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Expression {
    Relational(BinaryChain<RelOp>),
    Additive(BinaryChain<AddOp>),
    Multiplicative(BinaryChain<MulOp>),
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
        location: SourceLocation,
    },
    IntegerLiteral(i64, SourceLocation),
    /// Decimal and scientific literals
    DecimalLiteral(f64, SourceLocation),
    /// String literal with its quotes removed
    StringLiteral(String, SourceLocation),
    Identifier(String, SourceLocation),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
        location: SourceLocation,
    },
    List {
        elements: Vec<Expression>,
        location: SourceLocation,
    },
    Parenthesized {
        inner: Box<Expression>,
        location: SourceLocation,
    },
}

impl Expression {
    pub fn location(&self) -> SourceLocation {
        match self {
            Expression::Relational(chain) => chain.location,
            Expression::Additive(chain) => chain.location,
            Expression::Multiplicative(chain) => chain.location,
            Expression::Unary { location, .. } => *location,
            Expression::IntegerLiteral(_, loc) => *loc,
            Expression::DecimalLiteral(_, loc) => *loc,
            Expression::StringLiteral(_, loc) => *loc,
            Expression::Identifier(_, loc) => *loc,
            Expression::FunctionCall { location, .. } => *location,
            Expression::List { location, .. } => *location,
            Expression::Parenthesized { location, .. } => *location,
        }
    }
}

/// What a `Print` statement prints
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum PrintValue {
    /// A bare string literal, quotes removed
    Text(String),
    Expression(Expression),
}

/// Statement nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Statement {
    Assignment {
        name: String,
        value: Expression,
        location: SourceLocation,
    },
    Conditional {
        condition: Expression,
        body: Vec<Statement>,
        location: SourceLocation,
    },
    Print {
        value: PrintValue,
        location: SourceLocation,
    },
}

impl Statement {
    pub fn location(&self) -> SourceLocation {
        match self {
            Statement::Assignment { location, .. } => *location,
            Statement::Conditional { location, .. } => *location,
            Statement::Print { location, .. } => *location,
        }
    }
}

/// Top-level program structure
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn new() -> Self {
        Program::default()
    }
}
