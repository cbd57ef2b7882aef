//! LSD interpreter
//!
//! - [`engine`]: tree-walking [`engine::Interpreter`]
//! - [`builtins`]: `CalculateMean` and `CalculateSum`
//! - [`value`]: runtime values
//! - [`errors`]: runtime error types
//!
//! # Execution Model
//!
//! Statements run in order against a single global scope. `Print` appends a
//! line to the interpreter's output instead of writing to stdout, so callers
//! decide where output goes.

pub mod builtins;
pub mod engine;
pub mod errors;
pub mod value;
