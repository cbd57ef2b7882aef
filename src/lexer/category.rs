//! Lexical categories and the priority order used to resolve DFA states that
//! accept for more than one category.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::fmt;

/// Token category.
///
/// The declaration order doubles as the tie-break order when two categories
/// share a priority rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Comment,
    String,
    Scientific,
    Decimal,
    Integer,
    Identifier,
    Assign,
    Operator,
    Separator,
    Keyword,
}

impl Category {
    /// Categories that own an automaton in the combined machine, highest
    /// priority first. Keywords are recognised after the fact.
    pub const PATTERNS: [Category; 9] = [
        Category::Comment,
        Category::String,
        Category::Scientific,
        Category::Decimal,
        Category::Integer,
        Category::Identifier,
        Category::Assign,
        Category::Operator,
        Category::Separator,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Category::Comment => "COMMENT",
            Category::String => "STRING",
            Category::Scientific => "SCIENTIFIC",
            Category::Decimal => "DECIMAL",
            Category::Integer => "INTEGER",
            Category::Identifier => "IDENTIFIER",
            Category::Assign => "ASSIGN",
            Category::Operator => "OPERATOR",
            Category::Separator => "SEPARATOR",
            Category::Keyword => "KEYWORD",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rank table consulted by subset construction; lower rank wins.
#[derive(Debug, Clone)]
pub struct Priorities {
    ranks: FxHashMap<Category, u32>,
}

impl Priorities {
    /// Build a table from categories listed highest priority first.
    pub fn from_order(order: &[Category]) -> Self {
        let ranks = order
            .iter()
            .enumerate()
            .map(|(rank, &category)| (category, rank as u32))
            .collect();
        Self { ranks }
    }

    /// Rank of `category`. Unlisted categories sort after every listed one.
    pub fn rank(&self, category: Category) -> u32 {
        self.ranks.get(&category).copied().unwrap_or(u32::MAX)
    }

    /// Pick the winning category among `candidates`.
    pub fn resolve<I>(&self, candidates: I) -> Option<Category>
    where
        I: IntoIterator<Item = Category>,
    {
        candidates
            .into_iter()
            .min_by_key(|&category| (self.rank(category), category))
    }
}

impl Default for Priorities {
    fn default() -> Self {
        Self::from_order(&Category::PATTERNS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_order() {
        let p = Priorities::default();
        assert!(p.rank(Category::Comment) < p.rank(Category::String));
        assert!(p.rank(Category::Assign) < p.rank(Category::Operator));
        assert_eq!(p.rank(Category::Keyword), u32::MAX);
    }

    #[test]
    fn test_resolve_picks_lowest_rank() {
        let p = Priorities::default();
        let winner = p.resolve([Category::Operator, Category::Assign]);
        assert_eq!(winner, Some(Category::Assign));
        assert_eq!(p.resolve(std::iter::empty()), None);
    }

    #[test]
    fn test_resolve_ties_by_declaration_order() {
        let p = Priorities::from_order(&[]);
        let winner = p.resolve([Category::Separator, Category::Integer]);
        assert_eq!(winner, Some(Category::Integer));
    }
}
