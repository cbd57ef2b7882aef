//! Built-in function implementations
//!
//! - `CalculateMean(list)`: arithmetic mean as a decimal, `0.0` for an empty list
//! - `CalculateSum(list)`: sum as a decimal
//!
//! Both take exactly one list of numbers.

use crate::interpreter::engine::Interpreter;
use crate::interpreter::errors::RuntimeError;
use crate::interpreter::value::Value;
use crate::parser::ast::SourceLocation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    CalculateMean,
    CalculateSum,
}

impl Builtin {
    pub const ALL: [Builtin; 2] = [Builtin::CalculateMean, Builtin::CalculateSum];

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::CalculateMean => "CalculateMean",
            Builtin::CalculateSum => "CalculateSum",
        }
    }

    pub fn arity(self) -> usize {
        1
    }
}

impl Interpreter {
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        location: SourceLocation,
    ) -> Result<Value, RuntimeError> {
        if args.len() != builtin.arity() {
            return Err(RuntimeError::ArgumentCountMismatch {
                function: builtin.name().to_string(),
                expected: builtin.arity(),
                got: args.len(),
                location,
            });
        }

        let numbers = numeric_list(builtin, &args[0], location)?;
        let sum: f64 = numbers.iter().sum();
        let result = match builtin {
            Builtin::CalculateSum => sum,
            Builtin::CalculateMean if numbers.is_empty() => 0.0,
            Builtin::CalculateMean => sum / numbers.len() as f64,
        };
        Ok(Value::Decimal(result))
    }
}

fn numeric_list(
    builtin: Builtin,
    arg: &Value,
    location: SourceLocation,
) -> Result<Vec<f64>, RuntimeError> {
    let Value::List(items) = arg else {
        return Err(RuntimeError::TypeError {
            expected: format!("LIST argument to {}", builtin.name()),
            got: arg.type_name().to_string(),
            location,
        });
    };
    items
        .iter()
        .map(|item| {
            item.as_number().ok_or_else(|| RuntimeError::TypeError {
                expected: format!("numeric list elements in {}", builtin.name()),
                got: item.type_name().to_string(),
                location,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(builtin: Builtin, args: Vec<Value>) -> Result<Value, RuntimeError> {
        Interpreter::new().call_builtin(builtin, args, SourceLocation::new(1, 1))
    }

    #[test]
    fn test_mean_and_sum() {
        let list = Value::List(vec![Value::Int(1), Value::Decimal(2.5), Value::Int(3)]);
        assert_eq!(call(Builtin::CalculateSum, vec![list.clone()]), Ok(Value::Decimal(6.5)));
        let mean = call(Builtin::CalculateMean, vec![list]).unwrap();
        assert_eq!(mean, Value::Decimal(6.5 / 3.0));
    }

    #[test]
    fn test_empty_list() {
        let empty = Value::List(Vec::new());
        assert_eq!(call(Builtin::CalculateMean, vec![empty.clone()]), Ok(Value::Decimal(0.0)));
        assert_eq!(call(Builtin::CalculateSum, vec![empty]), Ok(Value::Decimal(0.0)));
    }

    #[test]
    fn test_bad_arguments() {
        assert!(matches!(
            call(Builtin::CalculateSum, vec![]),
            Err(RuntimeError::ArgumentCountMismatch { got: 0, .. })
        ));
        assert!(matches!(
            call(Builtin::CalculateSum, vec![Value::Int(1)]),
            Err(RuntimeError::TypeError { .. })
        ));
        let mixed = Value::List(vec![Value::Int(1), Value::Str("x".to_string())]);
        assert!(matches!(
            call(Builtin::CalculateMean, vec![mixed]),
            Err(RuntimeError::TypeError { .. })
        ));
    }

    #[test]
    fn test_lookup() {
        assert_eq!(Builtin::from_name("CalculateMean"), Some(Builtin::CalculateMean));
        assert_eq!(Builtin::from_name("calculatemean"), None);
    }
}
