//! Static type inference and checking
//!
//! Two passes over the AST:
//!
//! 1. every assigned name, including those assigned inside `If` bodies, is
//!    declared with type `UNKNOWN`;
//! 2. expressions are typed bottom-up and each assignment refines the
//!    declared type of its target.
//!
//! Because of pass 1, reading a variable before the statement that assigns
//! it is not reported; reading a name that is never assigned is.
//!
//! Errors are definite type violations. Warnings flag code that is legal but
//! suspicious, such as calls to functions the analyzer does not know.

use crate::interpreter::builtins::Builtin;
use crate::parser::ast::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Type {
    Int,
    Decimal,
    String,
    List,
    Bool,
    Unknown,
}

impl Type {
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Int | Type::Decimal)
    }

    /// Numeric or not yet known.
    fn may_be_numeric(self) -> bool {
        self.is_numeric() || self == Type::Unknown
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::Int => "INT",
            Type::Decimal => "DECIMAL",
            Type::String => "STRING",
            Type::List => "LIST",
            Type::Bool => "BOOL",
            Type::Unknown => "UNKNOWN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Analysis {
    pub errors: Vec<Diagnostic>,
    pub warnings: Vec<Diagnostic>,
    pub symbols: BTreeMap<String, Type>,
}

impl Analysis {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

pub fn analyze(program: &Program) -> Analysis {
    let mut analyzer = Analyzer::default();
    analyzer.declare(&program.statements);
    analyzer.check_block(&program.statements);
    log::debug!(
        "semantic analysis: {} symbols, {} errors, {} warnings",
        analyzer.analysis.symbols.len(),
        analyzer.analysis.errors.len(),
        analyzer.analysis.warnings.len()
    );
    analyzer.analysis
}

#[derive(Default)]
struct Analyzer {
    analysis: Analysis,
}

impl Analyzer {
    fn error(&mut self, location: SourceLocation, message: String) {
        self.analysis.errors.push(Diagnostic { message, location });
    }

    fn warning(&mut self, location: SourceLocation, message: String) {
        self.analysis.warnings.push(Diagnostic { message, location });
    }

    fn declare(&mut self, statements: &[Statement]) {
        for statement in statements {
            match statement {
                Statement::Assignment { name, .. } => {
                    self.analysis
                        .symbols
                        .entry(name.clone())
                        .or_insert(Type::Unknown);
                }
                Statement::Conditional { body, .. } => self.declare(body),
                Statement::Print { .. } => {}
            }
        }
    }

    fn check_block(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.check_statement(statement);
        }
    }

    fn check_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Assignment {
                name,
                value,
                location,
            } => {
                let ty = self.infer(value);
                self.assign(name, ty, *location);
            }
            Statement::Conditional {
                condition, body, ..
            } => {
                let ty = self.infer(condition);
                if ty != Type::Bool && ty != Type::Unknown {
                    self.error(
                        condition.location(),
                        format!("If condition must be BOOL, found {}", ty),
                    );
                }
                self.check_block(body);
            }
            Statement::Print { value, .. } => {
                if let PrintValue::Expression(expr) = value {
                    self.infer(expr);
                }
            }
        }
    }

    fn assign(&mut self, name: &str, ty: Type, location: SourceLocation) {
        let current = self
            .analysis
            .symbols
            .get(name)
            .copied()
            .unwrap_or(Type::Unknown);
        let merged = match (current, ty) {
            (Type::Unknown, new) => new,
            (old, Type::Unknown) => old,
            (old, new) if old == new => old,
            (old, new) if old.is_numeric() && new.is_numeric() => Type::Decimal,
            (old, new) => {
                self.error(
                    location,
                    format!("cannot assign {} to '{}', which holds {}", new, name, old),
                );
                old
            }
        };
        self.analysis.symbols.insert(name.to_string(), merged);
    }

    fn infer(&mut self, expr: &Expression) -> Type {
        match expr {
            Expression::IntegerLiteral(..) => Type::Int,
            Expression::DecimalLiteral(..) => Type::Decimal,
            Expression::StringLiteral(..) => Type::String,
            Expression::Identifier(name, location) => {
                match self.analysis.symbols.get(name) {
                    Some(ty) => *ty,
                    None => {
                        self.error(*location, format!("undeclared variable '{}'", name));
                        Type::Unknown
                    }
                }
            }
            Expression::Parenthesized { inner, .. } => self.infer(inner),
            Expression::Unary {
                op,
                operand,
                location,
            } => {
                let ty = self.infer(operand);
                if ty.may_be_numeric() {
                    ty
                } else {
                    self.error(
                        *location,
                        format!("unary '{}' needs a number, found {}", op.symbol(), ty),
                    );
                    Type::Unknown
                }
            }
            Expression::Additive(chain) => self.infer_arithmetic(chain),
            Expression::Multiplicative(chain) => self.infer_arithmetic(chain),
            Expression::Relational(chain) => {
                let mut left = self.infer(&chain.first);
                for (op, operand) in &chain.rest {
                    let right = self.infer(operand);
                    if !comparable(left, right) {
                        self.error(
                            operand.location(),
                            format!("cannot compare {} with {} using '{}'", left, right, op.symbol()),
                        );
                    }
                    left = Type::Bool;
                }
                Type::Bool
            }
            Expression::List { elements, location } => {
                let mut kinds: Vec<Type> = Vec::new();
                for element in elements {
                    let ty = match self.infer(element) {
                        Type::Int => Type::Decimal,
                        other => other,
                    };
                    if ty != Type::Unknown && !kinds.contains(&ty) {
                        kinds.push(ty);
                    }
                }
                if kinds.len() > 1 {
                    let names: Vec<String> = kinds.iter().map(Type::to_string).collect();
                    self.warning(
                        *location,
                        format!("list mixes element types: {}", names.join(", ")),
                    );
                }
                Type::List
            }
            Expression::FunctionCall {
                name,
                args,
                location,
            } => {
                let arg_types: Vec<Type> = args.iter().map(|a| self.infer(a)).collect();
                let Some(builtin) = Builtin::from_name(name) else {
                    self.warning(*location, format!("unknown function '{}'", name));
                    return Type::Unknown;
                };
                if arg_types.len() != builtin.arity() {
                    self.error(
                        *location,
                        format!(
                            "{} expects {} argument, found {}",
                            name,
                            builtin.arity(),
                            arg_types.len()
                        ),
                    );
                } else if !matches!(arg_types[0], Type::List | Type::Unknown) {
                    self.error(
                        *location,
                        format!("{} expects a LIST argument, found {}", name, arg_types[0]),
                    );
                }
                Type::Decimal
            }
        }
    }

    /// Additive and multiplicative chains.
    fn infer_arithmetic<Op: Operator>(&mut self, chain: &BinaryChain<Op>) -> Type {
        let mut acc = self.infer(&chain.first);
        for (op, operand) in &chain.rest {
            let right = self.infer(operand);
            let symbol = op.symbol();
            acc = match (acc, right) {
                (Type::String, Type::String) if symbol == "+" => Type::String,
                (Type::Unknown, other) | (other, Type::Unknown) if other.may_be_numeric() || other == Type::String => {
                    Type::Unknown
                }
                (l, r) if l.is_numeric() && r.is_numeric() => {
                    if symbol == "/" || l == Type::Decimal || r == Type::Decimal {
                        Type::Decimal
                    } else {
                        Type::Int
                    }
                }
                (l, r) => {
                    self.error(
                        operand.location(),
                        format!("operator '{}' cannot be applied to {} and {}", symbol, l, r),
                    );
                    Type::Unknown
                }
            };
        }
        acc
    }
}

fn comparable(left: Type, right: Type) -> bool {
    left == Type::Unknown
        || right == Type::Unknown
        || (left.is_numeric() && right.is_numeric())
        || left == right
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Frontend;

    fn check(source: &str) -> Analysis {
        let outcome = Frontend::default().parse(source).unwrap();
        assert!(!outcome.has_errors(), "{:?}", outcome);
        analyze(&outcome.program)
    }

    #[test]
    fn test_infers_symbol_types() {
        let analysis = check(
            "nota1 = 8.5\nn = 3\nsoma = nota1 + n\nmedia = soma / n\nq = n * 2\n\
             valores = [nota1, n]\nok = media >= 7.0\nnome = \"x\"\nm = CalculateMean(valores)",
        );
        assert!(analysis.is_ok(), "{:?}", analysis.errors);
        let s = &analysis.symbols;
        assert_eq!(s["nota1"], Type::Decimal);
        assert_eq!(s["n"], Type::Int);
        assert_eq!(s["soma"], Type::Decimal);
        assert_eq!(s["media"], Type::Decimal);
        assert_eq!(s["q"], Type::Int);
        assert_eq!(s["valores"], Type::List);
        assert_eq!(s["ok"], Type::Bool);
        assert_eq!(s["nome"], Type::String);
        assert_eq!(s["m"], Type::Decimal);
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn test_declarations_inside_conditional() {
        let analysis = check("If 1 < 2\nz = 1\nEnd\nPrint z");
        assert!(analysis.is_ok());
        assert_eq!(analysis.symbols["z"], Type::Int);
    }

    #[test]
    fn test_errors() {
        let analysis = check("Print y");
        assert_eq!(analysis.errors.len(), 1);
        assert!(analysis.errors[0].message.contains("undeclared variable 'y'"));

        let analysis = check("If 1\nEnd");
        assert!(analysis.errors[0].message.contains("must be BOOL"));

        let analysis = check("x = \"a\" * 2");
        assert!(analysis.errors[0].message.contains("cannot be applied"));

        let analysis = check("x = 1 < \"a\"");
        assert!(analysis.errors[0].message.contains("cannot compare"));

        let analysis = check("x = -\"a\"");
        assert!(analysis.errors[0].message.contains("needs a number"));

        let analysis = check("x = 1\nx = \"s\"");
        assert!(analysis.errors[0].message.contains("cannot assign STRING"));

        let analysis = check("x = CalculateSum(1)");
        assert!(analysis.errors[0].message.contains("expects a LIST"));
    }

    #[test]
    fn test_numeric_reassignment_promotes() {
        let analysis = check("x = 1\nx = 2.5");
        assert!(analysis.is_ok());
        assert_eq!(analysis.symbols["x"], Type::Decimal);
    }

    #[test]
    fn test_warnings() {
        let analysis = check("x = Foo(1)\ny = [1, \"a\"]");
        assert!(analysis.is_ok());
        assert_eq!(analysis.warnings.len(), 2);
        assert_eq!(analysis.symbols["x"], Type::Unknown);
    }

    #[test]
    fn test_string_concatenation() {
        let analysis = check("s = \"a\" + \"b\"");
        assert!(analysis.is_ok());
        assert_eq!(analysis.symbols["s"], Type::String);
    }
}
