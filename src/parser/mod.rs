//! LSD parser
//!
//! Turns the token stream into an AST:
//! - [`parse`]: the [`parse::Parser`] struct, error type and recovery
//! - `statements` / `expressions`: grammar rules as `impl Parser` blocks
//! - [`ast`]: AST node definitions
//! - [`tree`]: indented rendering for inspection
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with one tier per precedence level and
//! panic-mode recovery. No external parser generator dependencies.

pub mod ast;
mod expressions;
pub mod parse;
mod statements;
pub mod tree;
