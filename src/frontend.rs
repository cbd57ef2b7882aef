//! Source text to AST in one call.
//!
//! [`Frontend`] owns the combined DFA (built once, shared through an `Arc`)
//! and the keyword configuration, and runs tokenizer and parser back to back.

use crate::config::FrontendConfig;
use crate::lexer::dfa::{standard_dfa, Dfa};
use crate::lexer::keywords::KeywordSet;
use crate::lexer::token::{LexError, LineIndex};
use crate::lexer::tokenizer::{TokenStream, TokenizeError, Tokenizer, TokenizerOptions};
use crate::parser::ast::Program;
use crate::parser::parse::{ParseError, Parser, KW_END, KW_IF, KW_PRINT};
use serde::Serialize;
use std::sync::Arc;

/// Result of [`Frontend::parse`]: the (possibly partial) program and both
/// error channels.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub program: Program,
    pub lex_errors: Vec<LexError>,
    pub parse_errors: Vec<ParseError>,
}

impl ParseOutcome {
    pub fn has_errors(&self) -> bool {
        !self.lex_errors.is_empty() || !self.parse_errors.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct Frontend {
    dfa: Arc<Dfa>,
    keywords: KeywordSet,
    options: TokenizerOptions,
}

impl Frontend {
    pub fn new(config: &FrontendConfig) -> Self {
        Self::with_dfa(Arc::new(standard_dfa()), config)
    }

    /// Reuse an existing DFA.
    pub fn with_dfa(dfa: Arc<Dfa>, config: &FrontendConfig) -> Self {
        let keywords = config.keyword_set();
        for required in [KW_IF, KW_PRINT, KW_END] {
            if !keywords.contains(required) {
                log::warn!(
                    "keyword list has no '{}'; statements using it will not parse",
                    required
                );
            }
        }
        Self {
            dfa,
            keywords,
            options: config.tokenizer_options(),
        }
    }

    pub fn dfa(&self) -> &Arc<Dfa> {
        &self.dfa
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn tokenize(&self, source: &str) -> Result<TokenStream, TokenizeError> {
        Tokenizer::new(&self.dfa, &self.keywords, &self.options).tokenize(source)
    }

    pub fn parse(&self, source: &str) -> Result<ParseOutcome, TokenizeError> {
        let stream = self.tokenize(source)?;
        let eof = LineIndex::new(source).location(source.len());
        let mut parser = Parser::new(stream.tokens, self.keywords.clone()).with_eof_location(eof);
        let program = parser.parse_program();
        Ok(ParseOutcome {
            program,
            lex_errors: stream.errors,
            parse_errors: parser.take_errors(),
        })
    }
}

impl Default for Frontend {
    fn default() -> Self {
        Self::new(&FrontendConfig::default())
    }
}
