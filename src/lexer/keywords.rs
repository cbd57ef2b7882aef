//! Keyword recognition shared by the tokenizer and the parser.

use crate::lexer::automaton::Automaton;
use crate::lexer::builders;
use serde::Deserialize;

/// How lexemes are compared with keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeywordMatch {
    #[default]
    Exact,
    CaseInsensitive,
}

pub const DEFAULT_KEYWORDS: [&str; 5] = ["If", "Print", "End", "CalculateMean", "CalculateSum"];

/// A keyword list plus its comparison rule, backed by a keyword trie.
#[derive(Debug, Clone)]
pub struct KeywordSet {
    words: Vec<String>,
    rule: KeywordMatch,
    trie: Automaton,
}

impl KeywordSet {
    pub fn new<S: AsRef<str>>(words: &[S], rule: KeywordMatch) -> Self {
        let words: Vec<String> = words.iter().map(|w| w.as_ref().to_string()).collect();
        let normalized: Vec<String> = words.iter().map(|w| normalize(w, rule)).collect();
        Self {
            trie: builders::keyword_trie(&normalized),
            words,
            rule,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn rule(&self) -> KeywordMatch {
        self.rule
    }

    /// True if `lexeme` is one of the configured keywords.
    pub fn contains(&self, lexeme: &str) -> bool {
        self.trie.accepts(&normalize(lexeme, self.rule))
    }

    /// True if `lexeme` spells `keyword` under this set's rule.
    pub fn matches(&self, lexeme: &str, keyword: &str) -> bool {
        match self.rule {
            KeywordMatch::Exact => lexeme == keyword,
            KeywordMatch::CaseInsensitive => lexeme.eq_ignore_ascii_case(keyword),
        }
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(&DEFAULT_KEYWORDS, KeywordMatch::default())
    }
}

fn normalize(word: &str, rule: KeywordMatch) -> String {
    match rule {
        KeywordMatch::Exact => word.to_string(),
        KeywordMatch::CaseInsensitive => word.to_ascii_lowercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_rule() {
        let set = KeywordSet::default();
        assert!(set.contains("If"));
        assert!(set.contains("CalculateSum"));
        assert!(!set.contains("if"));
        assert!(!set.contains("Iff"));
        assert!(set.matches("End", "End"));
        assert!(!set.matches("END", "End"));
    }

    #[test]
    fn test_case_insensitive_rule() {
        let set = KeywordSet::new(&["If", "Print"], KeywordMatch::CaseInsensitive);
        assert!(set.contains("if"));
        assert!(set.contains("PRINT"));
        assert!(!set.contains("End"));
        assert!(set.matches("iF", "If"));
    }
}
