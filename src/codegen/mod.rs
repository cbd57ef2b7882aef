//! Textual LLVM IR generation
//!
//! Every LSD number is lowered to `double`. Each variable gets one stack slot
//! (`%name.addr`), allocated and zeroed at the top of `@main`. Relational
//! results are widened to `0.0`/`1.0`, and `If` branches on the condition
//! being non-zero. Output goes through `printf` with `"%f\n"` for numbers and
//! `"%s\n"` for text.
//!
//! Strings only exist as print operands and lists only as the literal
//! argument of `CalculateMean`/`CalculateSum`, which are folded at compile
//! time. Anything else is a [`CodegenError`].

mod strings;

use crate::interpreter::builtins::Builtin;
use crate::parser::ast::*;
use std::collections::BTreeSet;
use std::fmt::Write;
use strings::StringPool;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodegenError {
    #[error("Codegen error at {location}: {message}")]
    Unsupported {
        message: String,
        location: SourceLocation,
    },

    #[error("Codegen error at {location}: undefined variable '{name}'")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },
}

/// Target triple for the host, used when none is given.
pub fn host_triple() -> String {
    let arch = std::env::consts::ARCH;
    match std::env::consts::OS {
        "macos" => format!("{}-apple-macosx", arch),
        "windows" => format!("{}-pc-windows-msvc", arch),
        os => format!("{}-pc-{}-gnu", arch, os),
    }
}

/// Generate a module for the host triple.
pub fn generate(program: &Program) -> Result<String, CodegenError> {
    IrGenerator::new(host_triple()).generate(program)
}

pub struct IrGenerator {
    target_triple: String,
    body: String,
    strings: StringPool,
    variables: BTreeSet<String>,
    next_temp: usize,
    next_label: usize,
}

/// A double constant LLVM accepts: exact decimal for integral values,
/// hexadecimal bit pattern otherwise.
fn double_const(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("0x{:016X}", value.to_bits())
    }
}

fn unsupported(message: impl Into<String>, location: SourceLocation) -> CodegenError {
    CodegenError::Unsupported {
        message: message.into(),
        location,
    }
}

fn fcmp_predicate(op: RelOp) -> &'static str {
    match op {
        RelOp::Gt => "ogt",
        RelOp::Lt => "olt",
        RelOp::Ge => "oge",
        RelOp::Le => "ole",
        RelOp::Eq => "oeq",
        RelOp::Ne => "one",
    }
}

/// Strip parentheses around a bare string literal.
fn as_text(expr: &Expression) -> Option<&str> {
    match expr {
        Expression::StringLiteral(text, _) => Some(text),
        Expression::Parenthesized { inner, .. } => as_text(inner),
        _ => None,
    }
}

impl IrGenerator {
    pub fn new(target_triple: impl Into<String>) -> Self {
        Self {
            target_triple: target_triple.into(),
            body: String::new(),
            strings: StringPool::default(),
            variables: BTreeSet::new(),
            next_temp: 0,
            next_label: 0,
        }
    }

    pub fn generate(mut self, program: &Program) -> Result<String, CodegenError> {
        collect_variables(&program.statements, &mut self.variables);
        for statement in &program.statements {
            self.statement(statement)?;
        }

        let mut module = String::new();
        let _ = writeln!(module, "; ModuleID = 'lsd'");
        let _ = writeln!(module, "source_filename = \"lsd\"");
        let _ = writeln!(module, "target triple = \"{}\"", self.target_triple);
        let _ = writeln!(module);
        for definition in self.strings.definitions() {
            let _ = writeln!(module, "{}", definition);
        }
        let _ = writeln!(module);
        let _ = writeln!(module, "declare i32 @printf(i8*, ...)");
        let _ = writeln!(module);
        let _ = writeln!(module, "define i32 @main() {{");
        let _ = writeln!(module, "entry:");
        for name in &self.variables {
            let _ = writeln!(module, "  %{}.addr = alloca double", name);
            let _ = writeln!(module, "  store double 0.0, double* %{}.addr", name);
        }
        module.push_str(&self.body);
        let _ = writeln!(module, "  ret i32 0");
        let _ = writeln!(module, "}}");

        log::debug!(
            "generated IR: {} variables, {} bytes",
            self.variables.len(),
            module.len()
        );
        Ok(module)
    }

    fn emit(&mut self, instruction: impl AsRef<str>) {
        self.body.push_str("  ");
        self.body.push_str(instruction.as_ref());
        self.body.push('\n');
    }

    fn label(&mut self, name: &str) {
        self.body.push_str(name);
        self.body.push_str(":\n");
    }

    fn temp(&mut self) -> String {
        let name = format!("%t{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    fn statement(&mut self, statement: &Statement) -> Result<(), CodegenError> {
        match statement {
            Statement::Assignment { name, value, .. } => {
                let value = self.expression(value)?;
                self.emit(format!("store double {}, double* %{}.addr", value, name));
            }
            Statement::Conditional {
                condition, body, ..
            } => {
                let value = self.expression(condition)?;
                let flag = self.temp();
                let n = self.next_label;
                self.next_label += 1;
                let then_label = format!("then{}", n);
                let end_label = format!("endif{}", n);

                self.emit(format!("{} = fcmp one double {}, 0.0", flag, value));
                self.emit(format!(
                    "br i1 {}, label %{}, label %{}",
                    flag, then_label, end_label
                ));
                self.label(&then_label);
                for statement in body {
                    self.statement(statement)?;
                }
                self.emit(format!("br label %{}", end_label));
                self.label(&end_label);
            }
            Statement::Print { value, .. } => match value {
                PrintValue::Text(text) => self.print_text(text),
                PrintValue::Expression(expr) => match as_text(expr) {
                    Some(text) => self.print_text(text),
                    None => {
                        let value = self.expression(expr)?;
                        let fmt_ptr = self.string_pointer("fmt", "%f\n");
                        let result = self.temp();
                        self.emit(format!(
                            "{} = call i32 (i8*, ...) @printf(i8* {}, double {})",
                            result, fmt_ptr, value
                        ));
                    }
                },
            },
        }
        Ok(())
    }

    fn print_text(&mut self, text: &str) {
        let text_ptr = self.string_pointer("str", text);
        let fmt_ptr = self.string_pointer("fmt", "%s\n");
        let result = self.temp();
        self.emit(format!(
            "{} = call i32 (i8*, ...) @printf(i8* {}, i8* {})",
            result, fmt_ptr, text_ptr
        ));
    }

    /// `i8*` to the first byte of an interned string.
    fn string_pointer(&mut self, prefix: &str, text: &str) -> String {
        let global = self.strings.intern(prefix, text);
        let array = self
            .strings
            .array_type(&global)
            .unwrap_or_else(|| "[1 x i8]".to_string());
        let ptr = self.temp();
        self.emit(format!(
            "{} = getelementptr inbounds {}, {}* {}, i64 0, i64 0",
            ptr, array, array, global
        ));
        ptr
    }

    /// Lower `expr` to a `double` operand (temporary or constant).
    fn expression(&mut self, expr: &Expression) -> Result<String, CodegenError> {
        match expr {
            Expression::IntegerLiteral(n, _) => Ok(double_const(*n as f64)),
            Expression::DecimalLiteral(d, _) => Ok(double_const(*d)),
            Expression::StringLiteral(_, location) => Err(unsupported(
                "string values can only be printed",
                *location,
            )),
            Expression::List { location, .. } => Err(unsupported(
                "lists can only be passed directly to CalculateMean or CalculateSum",
                *location,
            )),
            Expression::Identifier(name, location) => {
                if !self.variables.contains(name) {
                    return Err(CodegenError::UndefinedVariable {
                        name: name.clone(),
                        location: *location,
                    });
                }
                let t = self.temp();
                self.emit(format!("{} = load double, double* %{}.addr", t, name));
                Ok(t)
            }
            Expression::Parenthesized { inner, .. } => self.expression(inner),
            Expression::Unary { op, operand, .. } => {
                let value = self.expression(operand)?;
                match op {
                    UnaryOp::Plus => Ok(value),
                    UnaryOp::Minus => {
                        let t = self.temp();
                        self.emit(format!("{} = fneg double {}", t, value));
                        Ok(t)
                    }
                }
            }
            Expression::Additive(chain) => self.chain(chain, |op| match op {
                AddOp::Add => "fadd",
                AddOp::Sub => "fsub",
            }),
            Expression::Multiplicative(chain) => self.chain(chain, |op| match op {
                MulOp::Mul => "fmul",
                MulOp::Div => "fdiv",
            }),
            Expression::Relational(chain) => {
                let mut acc = self.expression(&chain.first)?;
                for (op, operand) in &chain.rest {
                    let right = self.expression(operand)?;
                    let bit = self.temp();
                    self.emit(format!(
                        "{} = fcmp {} double {}, {}",
                        bit,
                        fcmp_predicate(*op),
                        acc,
                        right
                    ));
                    let widened = self.temp();
                    self.emit(format!("{} = uitofp i1 {} to double", widened, bit));
                    acc = widened;
                }
                Ok(acc)
            }
            Expression::FunctionCall {
                name,
                args,
                location,
            } => self.fold_builtin(name, args, *location),
        }
    }

    fn chain<Op: Operator>(
        &mut self,
        chain: &BinaryChain<Op>,
        opcode: impl Fn(Op) -> &'static str,
    ) -> Result<String, CodegenError> {
        let mut acc = self.expression(&chain.first)?;
        for (op, operand) in &chain.rest {
            let right = self.expression(operand)?;
            let t = self.temp();
            self.emit(format!("{} = {} double {}, {}", t, opcode(*op), acc, right));
            acc = t;
        }
        Ok(acc)
    }

    fn fold_builtin(
        &mut self,
        name: &str,
        args: &[Expression],
        location: SourceLocation,
    ) -> Result<String, CodegenError> {
        let builtin = Builtin::from_name(name)
            .ok_or_else(|| unsupported(format!("unknown function '{}'", name), location))?;
        let elements = match args {
            [Expression::List { elements, .. }] => elements,
            _ => {
                return Err(unsupported(
                    format!("{} needs a list literal argument", name),
                    location,
                ))
            }
        };

        let mut sum = double_const(0.0);
        for element in elements {
            let value = self.expression(element)?;
            let t = self.temp();
            self.emit(format!("{} = fadd double {}, {}", t, sum, value));
            sum = t;
        }

        match builtin {
            Builtin::CalculateSum => Ok(sum),
            Builtin::CalculateMean if elements.is_empty() => Ok(double_const(0.0)),
            Builtin::CalculateMean => {
                let t = self.temp();
                self.emit(format!(
                    "{} = fdiv double {}, {}",
                    t,
                    sum,
                    double_const(elements.len() as f64)
                ));
                Ok(t)
            }
        }
    }
}

fn collect_variables(statements: &[Statement], out: &mut BTreeSet<String>) {
    for statement in statements {
        match statement {
            Statement::Assignment { name, .. } => {
                out.insert(name.clone());
            }
            Statement::Conditional { body, .. } => collect_variables(body, out),
            Statement::Print { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Frontend;

    fn ir(source: &str) -> Result<String, CodegenError> {
        let outcome = Frontend::default().parse(source).unwrap();
        assert!(!outcome.has_errors(), "{:?}", outcome);
        IrGenerator::new("x86_64-pc-linux-gnu").generate(&outcome.program)
    }

    #[test]
    fn test_module_shape() {
        let module = ir("x = 10\nPrint x").unwrap();
        assert!(module.starts_with("; ModuleID = 'lsd'\n"));
        assert!(module.contains("target triple = \"x86_64-pc-linux-gnu\""));
        assert!(module.contains("declare i32 @printf(i8*, ...)"));
        assert!(module.contains("define i32 @main() {\nentry:\n  %x.addr = alloca double\n"));
        assert!(module.contains("  store double 10.0, double* %x.addr\n"));
        assert!(module.contains("  %t0 = load double, double* %x.addr\n"));
        assert!(module.contains("@fmt.0 = private unnamed_addr constant [4 x i8] c\"%f\\0A\\00\""));
        assert!(module.trim_end().ends_with("  ret i32 0\n}"));
    }

    #[test]
    fn test_conditional_branches() {
        let module = ir("x = 10\nIf x > 5\nPrint \"big\"\nEnd").unwrap();
        assert!(module.contains("%t1 = fcmp ogt double %t0, 5.0"));
        assert!(module.contains("%t2 = uitofp i1 %t1 to double"));
        assert!(module.contains("%t3 = fcmp one double %t2, 0.0"));
        assert!(module.contains("br i1 %t3, label %then0, label %endif0"));
        assert!(module.contains("\nthen0:\n"));
        assert!(module.contains("  br label %endif0\nendif0:\n"));
        assert!(module.contains("c\"big\\00\""));
    }

    #[test]
    fn test_arithmetic_and_constants() {
        let module = ir("y = -(2 * 1.5) / 4").unwrap();
        assert!(module.contains("= fmul double 2.0, 0x3FF8000000000000"));
        assert!(module.contains("= fneg double %t0"));
        assert!(module.contains("= fdiv double %t1, 4.0"));
    }

    #[test]
    fn test_builtins_fold() {
        let module = ir("m = CalculateMean([1, 2, 3])").unwrap();
        assert!(module.contains("%t0 = fadd double 0.0, 1.0"));
        assert!(module.contains("%t3 = fdiv double %t2, 3.0"));
        let module = ir("s = CalculateSum([])").unwrap();
        assert!(module.contains("store double 0.0, double* %s.addr"));
        assert!(!module.contains("fadd"));
    }

    #[test]
    fn test_print_parenthesized_string() {
        let module = ir("Print (\"Aprovado\")").unwrap();
        assert!(module.contains("c\"Aprovado\\00\""));
        assert!(module.contains("c\"%s\\0A\\00\""));
    }

    #[test]
    fn test_unsupported() {
        assert!(matches!(ir("v = [1, 2]"), Err(CodegenError::Unsupported { .. })));
        assert!(matches!(ir("s = \"a\""), Err(CodegenError::Unsupported { .. })));
        assert!(matches!(ir("v = [1]\nm = CalculateMean(v)"), Err(CodegenError::Unsupported { .. })));
        assert!(matches!(ir("Print q"), Err(CodegenError::UndefinedVariable { .. })));
        assert!(matches!(ir("x = Foo(1)"), Err(CodegenError::Unsupported { .. })));
    }

    #[test]
    fn test_double_const() {
        assert_eq!(double_const(7.0), "7.0");
        assert_eq!(double_const(-3.0), "-3.0");
        assert_eq!(double_const(0.1), "0x3FB999999999999A");
    }
}
