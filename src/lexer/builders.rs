//! One builder per lexical category.
//!
//! Every builder returns a fresh [`Automaton`] whose state 0 is the start
//! state. The shapes follow the lexical rules of the language:
//!
//! | Category   | Accepted strings                                   |
//! |------------|----------------------------------------------------|
//! | identifier | letter or `_`, then letters, digits, `_`           |
//! | integer    | `[1-9][0-9]*` (no bare `0`, no leading zeros)      |
//! | decimal    | integer part, `.`, one or more digits              |
//! | scientific | integer or decimal mantissa, `e`/`E`, sign, digits |
//! | string     | `"` printable-except-quote* `"`                    |
//! | comment    | `//` printable* `\n`                               |
//! | assign     | `=`                                                |
//! | operator   | `+ - * / < > ! =` and `== != <= >=`                |
//! | separator  | `( ) [ ] , .` space, newline                       |

use crate::lexer::automaton::{Automaton, StateId};
use crate::lexer::category::Category;

const LETTERS: [std::ops::RangeInclusive<u8>; 2] = [b'a'..=b'z', b'A'..=b'Z'];

fn letters() -> impl Iterator<Item = u8> {
    LETTERS.into_iter().flatten()
}

fn digits() -> impl Iterator<Item = u8> {
    b'0'..=b'9'
}

fn nonzero_digits() -> impl Iterator<Item = u8> {
    b'1'..=b'9'
}

/// Bytes allowed inside strings and comments.
pub(crate) const PRINTABLE: std::ops::RangeInclusive<u8> = 32..=126;

fn printable() -> impl Iterator<Item = u8> {
    PRINTABLE
}

/// Dispatch to the builder for `category`. Keywords have no fixed shape and
/// yield `None`; see [`keyword_trie`].
pub fn build(category: Category) -> Option<Automaton> {
    let automaton = match category {
        Category::Identifier => identifier(),
        Category::Integer => integer(),
        Category::Decimal => decimal(),
        Category::Scientific => scientific(),
        Category::String => string(),
        Category::Comment => line_comment(),
        Category::Assign => assign(),
        Category::Operator => operator(),
        Category::Separator => separator(),
        Category::Keyword => return None,
    };
    Some(automaton)
}

pub fn identifier() -> Automaton {
    let mut a = Automaton::new(2);
    a.add_transitions(0, letters().chain([b'_']), 1);
    a.add_transitions(1, letters().chain(digits()).chain([b'_']), 1);
    a.set_accepting(1);
    a
}

pub fn integer() -> Automaton {
    let mut a = Automaton::new(2);
    a.add_transitions(0, nonzero_digits(), 1);
    a.add_transitions(1, digits(), 1);
    a.set_accepting(1);
    a
}

/// Adds `[1-9][0-9]* . [0-9]+` to `a`, returning (integer part, fraction part).
fn decimal_prefix(a: &mut Automaton) -> (StateId, StateId) {
    let int_part = a.add_state();
    let dot = a.add_state();
    let frac = a.add_state();
    a.add_transitions(0, nonzero_digits(), int_part);
    a.add_transitions(int_part, digits(), int_part);
    a.add_transition(int_part, b'.', dot);
    a.add_transitions(dot, digits(), frac);
    a.add_transitions(frac, digits(), frac);
    (int_part, frac)
}

pub fn decimal() -> Automaton {
    let mut a = Automaton::new(1);
    let (_, frac) = decimal_prefix(&mut a);
    a.set_accepting(frac);
    a
}

pub fn scientific() -> Automaton {
    let mut a = Automaton::new(1);
    let (int_part, frac) = decimal_prefix(&mut a);
    let exp = a.add_state();
    let sign = a.add_state();
    let exp_digits = a.add_state();
    for mantissa in [int_part, frac] {
        a.add_transitions(mantissa, [b'e', b'E'], exp);
    }
    a.add_transitions(exp, [b'+', b'-'], sign);
    a.add_transitions(exp, digits(), exp_digits);
    a.add_transitions(sign, digits(), exp_digits);
    a.add_transitions(exp_digits, digits(), exp_digits);
    a.set_accepting(exp_digits);
    a
}

pub fn string() -> Automaton {
    let mut a = Automaton::new(3);
    a.add_transition(0, b'"', 1);
    a.add_transitions(1, printable().filter(|&c| c != b'"'), 1);
    a.add_transition(1, b'"', 2);
    a.set_accepting(2);
    a
}

/// `//` up to and including the newline. A comment cut off by end of input
/// is not accepted here; the tokenizer deals with that case.
pub fn line_comment() -> Automaton {
    let mut a = Automaton::new(4);
    a.add_transition(0, b'/', 1);
    a.add_transition(1, b'/', 2);
    a.add_transitions(2, printable(), 2);
    a.add_transition(2, b'\n', 3);
    a.set_accepting(3);
    a
}

pub fn assign() -> Automaton {
    let mut a = Automaton::new(2);
    a.add_transition(0, b'=', 1);
    a.set_accepting(1);
    a
}

pub fn operator() -> Automaton {
    let mut a = Automaton::new(3);
    // `=`, `!`, `<`, `>` may take a trailing `=`; arithmetic operators may not
    a.add_transitions(0, *b"=!<>", 1);
    a.add_transitions(0, *b"+-*/", 2);
    a.add_transition(1, b'=', 2);
    a.set_accepting(1);
    a.set_accepting(2);
    a
}

pub fn separator() -> Automaton {
    let mut a = Automaton::new(2);
    a.add_transitions(0, *b"()[],. \n", 1);
    a.set_accepting(1);
    a
}

/// Prefix-sharing trie over `keywords`; each keyword's last state accepts.
/// Empty entries are ignored.
pub fn keyword_trie<S: AsRef<str>>(keywords: &[S]) -> Automaton {
    let mut a = Automaton::new(1);
    for keyword in keywords {
        let keyword = keyword.as_ref();
        if keyword.is_empty() {
            continue;
        }
        let mut state = a.start();
        for &symbol in keyword.as_bytes() {
            state = match a.step(state, symbol) {
                Some(next) => next,
                None => {
                    let next = a.add_state();
                    a.add_transition(state, symbol, next);
                    next
                }
            };
        }
        a.set_accepting(state);
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier() {
        let a = identifier();
        assert!(a.accepts("Data"));
        assert!(a.accepts("_tmp1"));
        assert!(a.accepts("resultado_final"));
        assert!(!a.accepts("1abc"));
        assert!(!a.accepts("data space"));
        assert!(!a.accepts(""));
    }

    #[test]
    fn test_integer_rejects_zero_and_leading_zeros() {
        let a = integer();
        assert!(a.accepts("7"));
        assert!(a.accepts("100"));
        assert!(!a.accepts("0"));
        assert!(!a.accepts("007"));
        assert!(!a.accepts("-3"));
    }

    #[test]
    fn test_decimal() {
        let a = decimal();
        assert!(a.accepts("8.5"));
        assert!(a.accepts("10.25"));
        assert!(!a.accepts(".5"));
        assert!(!a.accepts("1."));
        assert!(!a.accepts("02.3"));
        assert!(!a.accepts("12"));
    }

    #[test]
    fn test_scientific() {
        let a = scientific();
        assert!(a.accepts("1.23e-4"));
        assert!(a.accepts("5E10"));
        assert!(a.accepts("3.0e+2"));
        assert!(!a.accepts("1.23e"));
        assert!(!a.accepts("1e-"));
        assert!(!a.accepts("1.5"));
    }

    #[test]
    fn test_string() {
        let a = string();
        assert!(a.accepts("\"Aprovado\""));
        assert!(a.accepts("\"\""));
        assert!(!a.accepts("\"open"));
        assert!(!a.accepts("\"a\"b\""));
        assert!(!a.accepts("\"line\nbreak\""));
    }

    #[test]
    fn test_comment_needs_newline() {
        let a = line_comment();
        assert!(a.accepts("// note\n"));
        assert!(a.accepts("// a // b\n"));
        assert!(!a.accepts("// note"));
        assert!(!a.accepts("/ note\n"));
    }

    #[test]
    fn test_assign_and_operator() {
        assert!(assign().accepts("="));
        assert!(!assign().accepts("=="));
        let op = operator();
        for lexeme in ["+", "-", "*", "/", "<", ">", "!", "=", "==", "!=", "<=", ">="] {
            assert!(op.accepts(lexeme), "{lexeme}");
        }
        assert!(!op.accepts("+="));
        assert!(!op.accepts("==="));
    }

    #[test]
    fn test_separator_is_single_char() {
        let a = separator();
        for lexeme in ["(", ")", "[", "]", ",", ".", " ", "\n"] {
            assert!(a.accepts(lexeme));
        }
        assert!(!a.accepts("()"));
    }

    #[test]
    fn test_keyword_trie_shares_prefixes() {
        let a = keyword_trie(&["CalculateMean", "CalculateSum", "If", ""]);
        assert!(a.accepts("CalculateMean"));
        assert!(a.accepts("CalculateSum"));
        assert!(a.accepts("If"));
        assert!(!a.accepts("Calculate"));
        assert!(!a.accepts(""));
        // "Calculate" is shared: 1 start + 9 shared + 4 + 3 + 2
        assert_eq!(a.state_count(), 1 + 9 + 4 + 3 + 2);
    }

    #[test]
    fn test_build_dispatch() {
        assert!(build(Category::Keyword).is_none());
        for category in Category::PATTERNS {
            assert!(build(category).is_some());
        }
    }
}
