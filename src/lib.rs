//! # Introduction
//!
//! `lsd` is the toolchain for LSD, a small teaching language with
//! assignments, `If … End` blocks, `Print`, lists and two built-in
//! aggregate functions. The lexer is not hand-written: it is derived from
//! one automaton per token category, combined into an NFA and determinised
//! by subset construction.
//!
//! ## Pipeline
//!
//! ```text
//! Source → Lexer (DFA) → Parser → AST → { Semantic analysis, Interpreter, IR }
//! ```
//!
//! 1. [`lexer`]: category automata, NFA combination, subset construction and
//!    the longest-match tokenizer.
//! 2. [`parser`]: recursive descent with panic-mode recovery.
//! 3. [`semantic`]: two-pass type inference.
//! 4. [`interpreter`]: tree-walking execution that collects printed lines.
//! 5. [`codegen`]: textual LLVM IR.
//!
//! [`frontend::Frontend`] wires the first two stages together and
//! [`config::FrontendConfig`] holds the knobs (keywords and how they are
//! matched, whitespace, the tokenizer step ceiling).
//!
//! ## Example program
//!
//! ```text
//! nota1 = 8.5
//! nota2 = 7.0
//! media = (nota1 + nota2) / 2
//! If media >= 7.0
//! Print "Aprovado"
//! End
//! Print CalculateMean([nota1, nota2])
//! ```

pub mod codegen;
pub mod config;
pub mod frontend;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod semantic;
