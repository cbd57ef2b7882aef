//! Lexical analysis
//!
//! The lexer is assembled from small automata rather than written by hand:
//! - [`automaton`]: the deterministic [`automaton::Automaton`] value type
//! - [`builders`]: one automaton per lexical category, plus the keyword trie
//! - [`nfa`]: disjoint union of the category automata with ε-moves
//! - [`dfa`]: subset construction with priority-based category resolution
//! - [`tokenizer`]: longest-match scanning with error recovery
//! - [`keywords`]: keyword lookup shared with the parser
//!
//! ```text
//! builders → nfa::combine → dfa::subset_construction → Tokenizer → tokens
//! ```

pub mod automaton;
pub mod builders;
pub mod category;
pub mod dfa;
pub mod keywords;
pub mod nfa;
pub mod token;
pub mod tokenizer;

pub use category::Category;
pub use token::{LexError, Token};
