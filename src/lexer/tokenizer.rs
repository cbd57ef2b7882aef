//! Longest-match tokenizer driven by the combined DFA.
//!
//! At each position the tokenizer skips whitespace, then walks the DFA as far
//! as it will go, remembering the last final state it passed. Unmatched input
//! becomes a [`LexError`] and the cursor jumps to the next place a token can
//! start (or the next whitespace), so one bad character never hides the rest
//! of the file.

use crate::lexer::builders;
use crate::lexer::category::Category;
use crate::lexer::dfa::Dfa;
use crate::lexer::keywords::KeywordSet;
use crate::lexer::token::{LexError, LineIndex, Token};
use serde::Serialize;
use thiserror::Error;

/// Separators the parser cares about; every other separator is layout.
pub const STRUCTURAL_SEPARATORS: [&str; 5] = ["(", ")", "[", "]", ","];

const CONTEXT_RADIUS: usize = 10;

#[derive(Debug, Clone)]
pub struct TokenizerOptions {
    /// Bytes skipped between tokens.
    pub whitespace: Vec<u8>,
    /// The step ceiling is `max(len * step_factor, step_floor)`.
    pub step_factor: usize,
    pub step_floor: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            whitespace: b" \t\r\n".to_vec(),
            step_factor: 20,
            step_floor: 1_000_000,
        }
    }
}

/// Fatal tokenizer failure. Only raised when the step ceiling is hit, which
/// means the tokenizer itself is broken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenizeError {
    #[error("internal error: tokenizer exceeded {limit} steps at offset {offset}")]
    StepLimitExceeded { limit: usize, offset: usize },
}

/// Every token in source order plus every lexical error in source order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl TokenStream {
    /// Tokens the parser consumes: comments and layout separators removed.
    pub fn significant(&self) -> Vec<Token> {
        self.tokens.iter().filter(|t| is_significant(t)).cloned().collect()
    }
}

pub fn is_significant(token: &Token) -> bool {
    match token.category {
        Category::Comment => false,
        Category::Separator => STRUCTURAL_SEPARATORS.contains(&token.lexeme.as_str()),
        _ => true,
    }
}

pub struct Tokenizer<'a> {
    dfa: &'a Dfa,
    keywords: &'a KeywordSet,
    options: &'a TokenizerOptions,
}

impl<'a> Tokenizer<'a> {
    pub fn new(dfa: &'a Dfa, keywords: &'a KeywordSet, options: &'a TokenizerOptions) -> Self {
        Self {
            dfa,
            keywords,
            options,
        }
    }

    pub fn tokenize(&self, source: &str) -> Result<TokenStream, TokenizeError> {
        let bytes = source.as_bytes();
        let lines = LineIndex::new(source);
        let limit = (bytes.len().saturating_mul(self.options.step_factor)).max(self.options.step_floor);
        let mut stream = TokenStream::default();
        let mut steps = 0usize;
        let mut pos = 0usize;

        loop {
            while pos < bytes.len() && self.is_whitespace(bytes[pos]) {
                pos += 1;
            }
            if pos >= bytes.len() {
                break;
            }

            steps += 1;
            if steps > limit {
                return Err(TokenizeError::StepLimitExceeded { limit, offset: pos });
            }

            let matched = self
                .unterminated_comment(bytes, pos)
                .or_else(|| self.dfa.longest_match(bytes, pos));

            match matched {
                Some((len, category)) => {
                    let lexeme = String::from_utf8_lossy(&bytes[pos..pos + len]).into_owned();
                    let category = if category == Category::Identifier && self.keywords.contains(&lexeme) {
                        Category::Keyword
                    } else {
                        category
                    };
                    let token = Token::new(category, lexeme, lines.location(pos), pos);
                    log::trace!("token {} at {}", token, token.location);
                    stream.tokens.push(token);
                    pos += len;
                }
                None => {
                    let mut skip_to = pos + 1;
                    while skip_to < bytes.len()
                        && !self.is_whitespace(bytes[skip_to])
                        && self.dfa.longest_match(bytes, skip_to).is_none()
                    {
                        steps += 1;
                        if steps > limit {
                            return Err(TokenizeError::StepLimitExceeded { limit, offset: skip_to });
                        }
                        skip_to += 1;
                    }
                    let error = LexError {
                        text: String::from_utf8_lossy(&bytes[pos..skip_to]).into_owned(),
                        offset: pos,
                        location: lines.location(pos),
                        context: context_snippet(bytes, pos, skip_to),
                    };
                    log::warn!("{}", error);
                    stream.errors.push(error);
                    pos = skip_to;
                }
            }
        }

        Ok(stream)
    }

    fn is_whitespace(&self, byte: u8) -> bool {
        self.options.whitespace.contains(&byte)
    }

    /// A `//` comment that runs into end of input without a newline is still
    /// a comment; the comment automaton only accepts newline-terminated ones.
    /// The body must stay within the bytes the automaton allows.
    fn unterminated_comment(&self, bytes: &[u8], pos: usize) -> Option<(usize, Category)> {
        let rest = &bytes[pos..];
        let body = rest.strip_prefix(b"//")?;
        if body.iter().all(|b| builders::PRINTABLE.contains(b)) {
            Some((rest.len(), Category::Comment))
        } else {
            None
        }
    }
}

fn context_snippet(bytes: &[u8], start: usize, end: usize) -> String {
    let lo = start.saturating_sub(CONTEXT_RADIUS);
    let hi = (end + CONTEXT_RADIUS).min(bytes.len());
    String::from_utf8_lossy(&bytes[lo..hi]).replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::dfa::standard_dfa;
    use crate::lexer::keywords::KeywordMatch;
    use crate::parser::ast::SourceLocation;

    fn lex_with(source: &str, keywords: &KeywordSet) -> TokenStream {
        let dfa = standard_dfa();
        let options = TokenizerOptions::default();
        Tokenizer::new(&dfa, keywords, &options).tokenize(source).unwrap()
    }

    fn lex(source: &str) -> TokenStream {
        lex_with(source, &KeywordSet::default())
    }

    fn summary(stream: &TokenStream) -> Vec<(Category, &str)> {
        stream
            .tokens
            .iter()
            .map(|t| (t.category, t.lexeme.as_str()))
            .collect()
    }

    #[test]
    fn test_single_identifier() {
        let stream = lex("Data");
        assert_eq!(summary(&stream), vec![(Category::Identifier, "Data")]);
        assert!(stream.errors.is_empty());
    }

    #[test]
    fn test_scientific_is_one_token() {
        let stream = lex("1.23e-4");
        assert_eq!(summary(&stream), vec![(Category::Scientific, "1.23e-4")]);
    }

    #[test]
    fn test_longest_match_and_keywords() {
        let stream = lex("If media >= 7.0\nPrint (\"ok\")\nEnd");
        assert_eq!(
            summary(&stream),
            vec![
                (Category::Keyword, "If"),
                (Category::Identifier, "media"),
                (Category::Operator, ">="),
                (Category::Decimal, "7.0"),
                (Category::Keyword, "Print"),
                (Category::Separator, "("),
                (Category::String, "\"ok\""),
                (Category::Separator, ")"),
                (Category::Keyword, "End"),
            ]
        );
    }

    #[test]
    fn test_keyword_rule_is_configurable() {
        let exact = lex("if");
        assert_eq!(exact.tokens[0].category, Category::Identifier);

        let relaxed = KeywordSet::new(&["If"], KeywordMatch::CaseInsensitive);
        let stream = lex_with("if", &relaxed);
        assert_eq!(stream.tokens[0].category, Category::Keyword);
    }

    #[test]
    fn test_assign_versus_equality() {
        let stream = lex("x = y == 1");
        let cats: Vec<_> = stream.tokens.iter().map(|t| t.category).collect();
        assert_eq!(
            cats,
            vec![
                Category::Identifier,
                Category::Assign,
                Category::Identifier,
                Category::Operator,
                Category::Integer,
            ]
        );
    }

    #[test]
    fn test_comments_and_filtering() {
        let stream = lex("x = 1 // note\ny = 2 // tail");
        assert_eq!(stream.tokens[3].category, Category::Comment);
        assert_eq!(stream.tokens[3].lexeme, "// note\n");
        let last = stream.tokens.last().unwrap();
        assert_eq!(last.category, Category::Comment);
        assert_eq!(last.lexeme, "// tail");
        assert!(stream.errors.is_empty());

        let significant = stream.significant();
        assert_eq!(significant.len(), 6);
        assert!(significant.iter().all(|t| t.category != Category::Comment));
    }

    #[test]
    fn test_comment_body_rules_ignore_trailing_newline() {
        let terminated = lex("x = 1 // a\tb\n");
        let at_end = lex("x = 1 // a\tb");
        assert_eq!(summary(&terminated), summary(&at_end));
        assert!(at_end.tokens.iter().all(|t| t.category != Category::Comment));
        assert_eq!(at_end.tokens[3].lexeme, "/");
    }

    #[test]
    fn test_layout_separators_are_filtered() {
        let stream = lex("[a, b].");
        let lexemes: Vec<_> = stream.significant().into_iter().map(|t| t.lexeme).collect();
        assert_eq!(lexemes, vec!["[", "a", ",", "b", "]"]);
    }

    #[test]
    fn test_error_recovery() {
        let stream = lex("x = 1 @# y\nz = 0");
        assert_eq!(stream.errors.len(), 2);

        let first = &stream.errors[0];
        assert_eq!(first.text, "@#");
        assert_eq!(first.location, SourceLocation::new(1, 7));
        assert_eq!(first.context, "x = 1 @# y\\nz = 0");

        // bare zero is not an integer
        let second = &stream.errors[1];
        assert_eq!(second.text, "0");
        assert_eq!(second.location, SourceLocation::new(2, 5));

        let lexemes: Vec<_> = stream.tokens.iter().map(|t| t.lexeme.as_str()).collect();
        assert_eq!(lexemes, vec!["x", "=", "1", "y", "z", "="]);
    }

    #[test]
    fn test_error_stops_where_token_restarts() {
        let stream = lex("@@abc");
        assert_eq!(stream.errors.len(), 1);
        assert_eq!(stream.errors[0].text, "@@");
        assert_eq!(summary(&stream), vec![(Category::Identifier, "abc")]);
    }

    #[test]
    fn test_positions() {
        let stream = lex("a\n  bb\n\tc");
        let locs: Vec<_> = stream.tokens.iter().map(|t| t.location).collect();
        assert_eq!(
            locs,
            vec![
                SourceLocation::new(1, 1),
                SourceLocation::new(2, 3),
                SourceLocation::new(3, 2),
            ]
        );
        assert_eq!(stream.tokens[1].offset, 4);
    }

    #[test]
    fn test_step_limit() {
        let dfa = standard_dfa();
        let keywords = KeywordSet::default();
        let options = TokenizerOptions {
            step_factor: 0,
            step_floor: 2,
            ..TokenizerOptions::default()
        };
        let result = Tokenizer::new(&dfa, &keywords, &options).tokenize("a b c");
        assert_eq!(
            result.unwrap_err(),
            TokenizeError::StepLimitExceeded { limit: 2, offset: 4 }
        );
    }

    #[test]
    fn test_empty_and_blank_input() {
        assert!(lex("").tokens.is_empty());
        let blank = lex(" \n\t\r\n");
        assert!(blank.tokens.is_empty());
        assert!(blank.errors.is_empty());
    }
}
