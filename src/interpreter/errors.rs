//! Runtime error types for the LSD interpreter
//!
//! All runtime errors are fatal: they stop execution. Output printed before
//! the error is kept by the interpreter.

use crate::parser::ast::SourceLocation;
use thiserror::Error;

/// Runtime errors that can occur during execution
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// Read of a name that was never assigned
    #[error("Runtime error at {location}: undefined variable '{name}'")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    /// Call to a name that is not a built-in
    #[error("Runtime error at {location}: undefined function '{name}'")]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    #[error("Runtime error at {location}: expected {expected}, got {got}")]
    TypeError {
        expected: String,
        got: String,
        location: SourceLocation,
    },

    #[error("Runtime error at {location}: division by zero")]
    DivisionByZero { location: SourceLocation },

    #[error("Runtime error at {location}: '{function}' expects {expected} argument(s), got {got}")]
    ArgumentCountMismatch {
        function: String,
        expected: usize,
        got: usize,
        location: SourceLocation,
    },

    /// Integer arithmetic left the 64-bit range
    #[error("Runtime error at {location}: integer overflow in '{operation}'")]
    IntegerOverflow {
        operation: String,
        location: SourceLocation,
    },
}

impl RuntimeError {
    pub fn location(&self) -> SourceLocation {
        match self {
            RuntimeError::UndefinedVariable { location, .. } => *location,
            RuntimeError::UndefinedFunction { location, .. } => *location,
            RuntimeError::TypeError { location, .. } => *location,
            RuntimeError::DivisionByZero { location } => *location,
            RuntimeError::ArgumentCountMismatch { location, .. } => *location,
            RuntimeError::IntegerOverflow { location, .. } => *location,
        }
    }
}
