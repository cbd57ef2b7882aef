// Execution engine for the LSD interpreter

use crate::interpreter::builtins::Builtin;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::value::Value;
use crate::parser::ast::*;
use rustc_hash::FxHashMap;
use std::cmp::Ordering;

/// Tree-walking interpreter over a parsed [`Program`]
#[derive(Debug, Default)]
pub struct Interpreter {
    /// Variable bindings, global scope only
    variables: FxHashMap<String, Value>,

    /// Lines printed so far, in order
    output: Vec<String>,

    /// Location of the statement being executed
    current_location: SourceLocation,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Execute every statement. On error, output printed before the failing
    /// statement stays available through [`Interpreter::output`].
    pub fn run(&mut self, program: &Program) -> Result<(), RuntimeError> {
        self.execute_block(&program.statements)?;
        log::debug!(
            "execution finished: {} variables, {} lines printed",
            self.variables.len(),
            self.output.len()
        );
        Ok(())
    }

    pub fn output(&self) -> &[String] {
        &self.output
    }

    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn current_location(&self) -> SourceLocation {
        self.current_location
    }

    fn execute_block(&mut self, statements: &[Statement]) -> Result<(), RuntimeError> {
        for statement in statements {
            self.execute(statement)?;
        }
        Ok(())
    }

    fn execute(&mut self, statement: &Statement) -> Result<(), RuntimeError> {
        self.current_location = statement.location();

        match statement {
            Statement::Assignment { name, value, .. } => {
                let value = self.evaluate(value)?;
                log::trace!("{} = {}", name, value);
                self.variables.insert(name.clone(), value);
            }
            Statement::Conditional {
                condition, body, ..
            } => match self.evaluate(condition)? {
                Value::Bool(true) => self.execute_block(body)?,
                Value::Bool(false) => {}
                other => {
                    return Err(RuntimeError::TypeError {
                        expected: "BOOL condition".to_string(),
                        got: other.type_name().to_string(),
                        location: condition.location(),
                    })
                }
            },
            Statement::Print { value, .. } => {
                let line = match value {
                    PrintValue::Text(text) => text.clone(),
                    PrintValue::Expression(expr) => self.evaluate(expr)?.to_string(),
                };
                self.output.push(line);
            }
        }

        Ok(())
    }

    pub(crate) fn evaluate(&mut self, expr: &Expression) -> Result<Value, RuntimeError> {
        match expr {
            Expression::IntegerLiteral(n, _) => Ok(Value::Int(*n)),
            Expression::DecimalLiteral(d, _) => Ok(Value::Decimal(*d)),
            Expression::StringLiteral(s, _) => Ok(Value::Str(s.clone())),
            Expression::Identifier(name, location) => {
                self.variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| RuntimeError::UndefinedVariable {
                        name: name.clone(),
                        location: *location,
                    })
            }
            Expression::Parenthesized { inner, .. } => self.evaluate(inner),
            Expression::List { elements, .. } => {
                let items = elements
                    .iter()
                    .map(|e| self.evaluate(e))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::List(items))
            }
            Expression::Unary {
                op,
                operand,
                location,
            } => {
                let value = self.evaluate(operand)?;
                unary(*op, value, *location)
            }
            Expression::Additive(chain) => {
                self.fold_chain(chain, |op, l, r, loc| match op {
                    AddOp::Add => add(l, r, loc),
                    AddOp::Sub => arithmetic("-", l, r, loc, i64::checked_sub, |a, b| a - b),
                })
            }
            Expression::Multiplicative(chain) => {
                self.fold_chain(chain, |op, l, r, loc| match op {
                    MulOp::Mul => arithmetic("*", l, r, loc, i64::checked_mul, |a, b| a * b),
                    MulOp::Div => divide(l, r, loc),
                })
            }
            Expression::Relational(chain) => {
                self.fold_chain(chain, |op, l, r, loc| compare(op, &l, &r, loc).map(Value::Bool))
            }
            Expression::FunctionCall {
                name,
                args,
                location,
            } => {
                let builtin =
                    Builtin::from_name(name).ok_or_else(|| RuntimeError::UndefinedFunction {
                        name: name.clone(),
                        location: *location,
                    })?;
                let args = args
                    .iter()
                    .map(|a| self.evaluate(a))
                    .collect::<Result<Vec<_>, _>>()?;
                self.call_builtin(builtin, args, *location)
            }
        }
    }

    /// Evaluate a left-associative chain, applying `apply` pairwise.
    fn fold_chain<Op: Operator>(
        &mut self,
        chain: &BinaryChain<Op>,
        apply: impl Fn(Op, Value, Value, SourceLocation) -> Result<Value, RuntimeError>,
    ) -> Result<Value, RuntimeError> {
        let mut acc = self.evaluate(&chain.first)?;
        for (op, operand) in &chain.rest {
            let right = self.evaluate(operand)?;
            acc = apply(*op, acc, right, operand.location())?;
        }
        Ok(acc)
    }
}

fn type_error(expected: &str, got: String, location: SourceLocation) -> RuntimeError {
    RuntimeError::TypeError {
        expected: expected.to_string(),
        got,
        location,
    }
}

fn unary(op: UnaryOp, value: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
    match (op, value) {
        (UnaryOp::Plus, v @ (Value::Int(_) | Value::Decimal(_))) => Ok(v),
        (UnaryOp::Minus, Value::Int(n)) => {
            n.checked_neg()
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: "-".to_string(),
                    location,
                })
        }
        (UnaryOp::Minus, Value::Decimal(d)) => Ok(Value::Decimal(-d)),
        (op, other) => Err(type_error(
            &format!("number for unary '{}'", op.symbol()),
            other.type_name().to_string(),
            location,
        )),
    }
}

fn add(left: Value, right: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => Ok(Value::Str(a + &b)),
        (l, r) => arithmetic("+", l, r, location, i64::checked_add, |a, b| a + b),
    }
}

fn arithmetic(
    symbol: &str,
    left: Value,
    right: Value,
    location: SourceLocation,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            int_op(*a, *b)
                .map(Value::Int)
                .ok_or_else(|| RuntimeError::IntegerOverflow {
                    operation: symbol.to_string(),
                    location,
                })
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => Ok(Value::Decimal(float_op(a, b))),
            _ => Err(type_error(
                &format!("numbers for '{}'", symbol),
                format!("{} and {}", left.type_name(), right.type_name()),
                location,
            )),
        },
    }
}

/// `/` always yields a decimal.
fn divide(left: Value, right: Value, location: SourceLocation) -> Result<Value, RuntimeError> {
    match (left.as_number(), right.as_number()) {
        (Some(_), Some(b)) if b == 0.0 => Err(RuntimeError::DivisionByZero { location }),
        (Some(a), Some(b)) => Ok(Value::Decimal(a / b)),
        _ => Err(type_error(
            "numbers for '/'",
            format!("{} and {}", left.type_name(), right.type_name()),
            location,
        )),
    }
}

fn compare(
    op: RelOp,
    left: &Value,
    right: &Value,
    location: SourceLocation,
) -> Result<bool, RuntimeError> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(_), Value::Bool(_)) | (Value::List(_), Value::List(_)) => {
            return match op {
                RelOp::Eq => Ok(left == right),
                RelOp::Ne => Ok(left != right),
                _ => Err(type_error(
                    &format!("ordered operands for '{}'", op.symbol()),
                    format!("{} and {}", left.type_name(), right.type_name()),
                    location,
                )),
            };
        }
        _ => match (left.as_number(), right.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => {
                return Err(type_error(
                    &format!("comparable operands for '{}'", op.symbol()),
                    format!("{} and {}", left.type_name(), right.type_name()),
                    location,
                ))
            }
        },
    };

    // NaN compares false with everything except `!=`
    let Some(ordering) = ordering else {
        return Ok(op == RelOp::Ne);
    };
    Ok(match op {
        RelOp::Gt => ordering == Ordering::Greater,
        RelOp::Lt => ordering == Ordering::Less,
        RelOp::Ge => ordering != Ordering::Less,
        RelOp::Le => ordering != Ordering::Greater,
        RelOp::Eq => ordering == Ordering::Equal,
        RelOp::Ne => ordering != Ordering::Equal,
    })
}

/// Run `program` and return its printed lines.
pub fn run_program(program: &Program) -> Result<Vec<String>, RuntimeError> {
    let mut interpreter = Interpreter::new();
    interpreter.run(program)?;
    Ok(interpreter.into_output())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Frontend;

    fn run(source: &str) -> Result<Vec<String>, RuntimeError> {
        let outcome = Frontend::default().parse(source).unwrap();
        assert!(!outcome.has_errors(), "{:?}", outcome);
        run_program(&outcome.program)
    }

    #[test]
    fn test_arithmetic_promotion() {
        let out = run("a = 7\nb = 2\nPrint a + b\nPrint a / b\nPrint a * 1.5\nPrint a - 10").unwrap();
        assert_eq!(out, vec!["9", "3.5", "10.5", "-3"]);
    }

    #[test]
    fn test_conditional() {
        let out = run("x = 10\nIf x > 5\nPrint x\nEnd\nIf x < 5\nPrint \"no\"\nEnd").unwrap();
        assert_eq!(out, vec!["10"]);
    }

    #[test]
    fn test_strings_and_lists() {
        let out = run("s = \"ab\" + \"cd\"\nPrint s\nPrint [1, 2.5, s]").unwrap();
        assert_eq!(out, vec!["abcd", "[1, 2.5, 'abcd']"]);
    }

    #[test]
    fn test_builtins() {
        let out = run("v = [8.5, 7.0, 9.0]\nPrint CalculateSum(v)\nPrint CalculateMean v").unwrap();
        assert_eq!(out, vec!["24.5", format!("{}", 24.5 / 3.0).as_str()]);
    }

    #[test]
    fn test_relational_results() {
        let out = run("Print 1 < 2\nPrint 2.0 == 2\nPrint \"a\" != \"b\"").unwrap();
        assert_eq!(out, vec!["True", "True", "True"]);
    }

    #[test]
    fn test_runtime_errors() {
        assert!(matches!(
            run("Print 1 / (2 - 2)"),
            Err(RuntimeError::DivisionByZero { .. })
        ));
        assert!(matches!(
            run("Print y"),
            Err(RuntimeError::UndefinedVariable { .. })
        ));
        assert!(matches!(
            run("Print Foo(1)"),
            Err(RuntimeError::UndefinedFunction { .. })
        ));
        assert!(matches!(
            run("If 1\nPrint 1\nEnd"),
            Err(RuntimeError::TypeError { .. })
        ));
        assert!(matches!(
            run("Print \"a\" - 1"),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_output_kept_on_error() {
        let outcome = Frontend::default().parse("Print 1\nPrint z").unwrap();
        let mut interpreter = Interpreter::new();
        let err = interpreter.run(&outcome.program).unwrap_err();
        assert_eq!(err.location(), SourceLocation::new(2, 7));
        assert_eq!(interpreter.output(), ["1"]);
        assert_eq!(interpreter.current_location(), SourceLocation::new(2, 1));
    }
}
