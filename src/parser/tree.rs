//! Indented text rendering of an AST, one node per line.

use crate::parser::ast::*;
use std::fmt::Write;

const INDENT: &str = "  ";

pub fn render(program: &Program) -> String {
    let mut out = String::from("Program\n");
    for statement in &program.statements {
        render_statement(&mut out, statement, 1);
    }
    out
}

fn line(out: &mut String, depth: usize, text: impl std::fmt::Display) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    let _ = writeln!(out, "{}", text);
}

fn render_statement(out: &mut String, statement: &Statement, depth: usize) {
    match statement {
        Statement::Assignment { name, value, .. } => {
            line(out, depth, format_args!("Assignment {}", name));
            render_expression(out, value, depth + 1);
        }
        Statement::Conditional {
            condition, body, ..
        } => {
            line(out, depth, "Conditional");
            line(out, depth + 1, "condition:");
            render_expression(out, condition, depth + 2);
            line(out, depth + 1, "body:");
            for statement in body {
                render_statement(out, statement, depth + 2);
            }
        }
        Statement::Print { value, .. } => match value {
            PrintValue::Text(text) => line(out, depth, format_args!("Print {:?}", text)),
            PrintValue::Expression(expr) => {
                line(out, depth, "Print");
                render_expression(out, expr, depth + 1);
            }
        },
    }
}

fn render_chain<Op: Operator>(out: &mut String, label: &str, chain: &BinaryChain<Op>, depth: usize) {
    line(out, depth, label);
    render_expression(out, &chain.first, depth + 1);
    for (op, operand) in &chain.rest {
        line(out, depth + 1, op.symbol());
        render_expression(out, operand, depth + 1);
    }
}

fn render_expression(out: &mut String, expr: &Expression, depth: usize) {
    match expr {
        Expression::Relational(chain) => render_chain(out, "Relational", chain, depth),
        Expression::Additive(chain) => render_chain(out, "Additive", chain, depth),
        Expression::Multiplicative(chain) => render_chain(out, "Multiplicative", chain, depth),
        Expression::Unary { op, operand, .. } => {
            line(out, depth, format_args!("Unary {}", op.symbol()));
            render_expression(out, operand, depth + 1);
        }
        Expression::IntegerLiteral(v, _) => line(out, depth, format_args!("Integer {}", v)),
        Expression::DecimalLiteral(v, _) => line(out, depth, format_args!("Decimal {:?}", v)),
        Expression::StringLiteral(s, _) => line(out, depth, format_args!("String {:?}", s)),
        Expression::Identifier(name, _) => line(out, depth, format_args!("Identifier {}", name)),
        Expression::FunctionCall { name, args, .. } => {
            line(out, depth, format_args!("Call {}", name));
            for arg in args {
                render_expression(out, arg, depth + 1);
            }
        }
        Expression::List { elements, .. } => {
            line(out, depth, format_args!("List ({})", elements.len()));
            for element in elements {
                render_expression(out, element, depth + 1);
            }
        }
        Expression::Parenthesized { inner, .. } => {
            line(out, depth, "Parenthesized");
            render_expression(out, inner, depth + 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let loc = SourceLocation::new(1, 1);
        let program = Program {
            statements: vec![
                Statement::Assignment {
                    name: "x".to_string(),
                    value: Expression::Additive(BinaryChain {
                        first: Box::new(Expression::IntegerLiteral(1, loc)),
                        rest: vec![(AddOp::Add, Expression::DecimalLiteral(2.0, loc))],
                        location: loc,
                    }),
                    location: loc,
                },
                Statement::Print {
                    value: PrintValue::Text("ok".to_string()),
                    location: loc,
                },
            ],
        };
        let expected = "\
Program
  Assignment x
    Additive
      Integer 1
      +
      Decimal 2.0
  Print \"ok\"
";
        assert_eq!(render(&program), expected);
    }
}
