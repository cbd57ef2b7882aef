//! Front-end configuration, loadable from JSON.
//!
//! ```json
//! {
//!   "keywords": ["If", "Print", "End", "CalculateMean", "CalculateSum"],
//!   "keyword_match": "case-insensitive",
//!   "whitespace": " \t\r\n",
//!   "step_factor": 20,
//!   "step_floor": 1000000
//! }
//! ```
//!
//! Every field is optional; missing fields take their defaults.

use crate::lexer::keywords::{KeywordMatch, KeywordSet, DEFAULT_KEYWORDS};
use crate::lexer::tokenizer::TokenizerOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrontendConfig {
    pub keywords: Vec<String>,
    pub keyword_match: KeywordMatch,
    pub whitespace: String,
    pub step_factor: usize,
    pub step_floor: usize,
}

impl Default for FrontendConfig {
    fn default() -> Self {
        let options = TokenizerOptions::default();
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            keyword_match: KeywordMatch::default(),
            whitespace: String::from_utf8_lossy(&options.whitespace).into_owned(),
            step_factor: options.step_factor,
            step_floor: options.step_floor,
        }
    }
}

impl FrontendConfig {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::new(&self.keywords, self.keyword_match)
    }

    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            whitespace: self.whitespace.bytes().collect(),
            step_factor: self.step_factor,
            step_floor: self.step_floor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FrontendConfig::default();
        assert_eq!(config.keywords.len(), 5);
        assert_eq!(config.keyword_match, KeywordMatch::Exact);
        assert_eq!(config.tokenizer_options().whitespace, b" \t\r\n".to_vec());
    }

    #[test]
    fn test_partial_json() {
        let config = FrontendConfig::from_json(
            r#"{ "keywords": ["If", "End"], "keyword_match": "case-insensitive" }"#,
        )
        .unwrap();
        assert_eq!(config.keywords, vec!["If", "End"]);
        assert_eq!(config.keyword_match, KeywordMatch::CaseInsensitive);
        assert_eq!(config.step_factor, 20);
        assert!(config.keyword_set().contains("end"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(FrontendConfig::from_json(r#"{ "keyword": [] }"#).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = FrontendConfig::load(Path::new("/nonexistent/lsd.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
