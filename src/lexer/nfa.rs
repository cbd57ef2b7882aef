//! Disjoint union of category automata under a synthetic start state.
//!
//! Each category automaton is copied into its own id range, so state `q` of
//! the `i`-th automaton becomes `offset_i + q`. Epsilon edges live in a table
//! of their own and never share the byte alphabet.

use crate::lexer::automaton::{Automaton, StateId};
use crate::lexer::category::Category;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;
use std::fmt;

/// Where a combined state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The synthetic start state.
    Start,
    /// State `state` of the `index`-th automaton, built for `category`.
    Member {
        index: usize,
        category: Category,
        state: StateId,
    },
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Start => write!(f, "S_COMBINED"),
            Origin::Member { index, state, .. } => write!(f, "A{}_q{}", index, state),
        }
    }
}

/// Nondeterministic automaton with epsilon moves.
#[derive(Debug, Clone)]
pub struct Nfa {
    pub alphabet: BTreeSet<u8>,
    pub transitions: FxHashMap<(StateId, u8), BTreeSet<StateId>>,
    pub epsilon: FxHashMap<StateId, BTreeSet<StateId>>,
    pub start: StateId,
    pub accepting: BTreeSet<StateId>,
    /// Category of every accepting state.
    pub token_map: FxHashMap<StateId, Category>,
    pub origins: Vec<Origin>,
}

impl Nfa {
    pub fn state_count(&self) -> usize {
        self.origins.len()
    }

    /// Destinations of `state` on `symbol`.
    pub fn targets(&self, state: StateId, symbol: u8) -> impl Iterator<Item = StateId> + '_ {
        self.transitions
            .get(&(state, symbol))
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn epsilon_targets(&self, state: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.epsilon.get(&state).into_iter().flatten().copied()
    }
}

/// Combine `(category, automaton)` pairs into one epsilon-NFA.
pub fn combine(parts: &[(Category, Automaton)]) -> Nfa {
    let start: StateId = 0;
    let mut nfa = Nfa {
        alphabet: BTreeSet::new(),
        transitions: FxHashMap::default(),
        epsilon: FxHashMap::default(),
        start,
        accepting: BTreeSet::new(),
        token_map: FxHashMap::default(),
        origins: vec![Origin::Start],
    };

    for (index, (category, automaton)) in parts.iter().enumerate() {
        let offset = nfa.origins.len();
        nfa.origins.extend((0..automaton.state_count()).map(|state| Origin::Member {
            index,
            category: *category,
            state,
        }));
        nfa.alphabet.extend(automaton.alphabet().iter().copied());

        for (from, symbol, to) in automaton.edges() {
            nfa.transitions
                .entry((offset + from, symbol))
                .or_default()
                .insert(offset + to);
        }
        for state in automaton.accepting_states() {
            nfa.accepting.insert(offset + state);
            nfa.token_map.insert(offset + state, *category);
        }
        nfa.epsilon
            .entry(start)
            .or_default()
            .insert(offset + automaton.start());
    }

    log::debug!(
        "combined {} automata into an NFA with {} states and {} symbols",
        parts.len(),
        nfa.state_count(),
        nfa.alphabet.len()
    );
    nfa
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::builders;

    #[test]
    fn test_combine_offsets_and_tags() {
        let parts = vec![
            (Category::Assign, builders::assign()),
            (Category::Operator, builders::operator()),
        ];
        let nfa = combine(&parts);

        // start + 2 assign states + 3 operator states
        assert_eq!(nfa.state_count(), 6);
        assert_eq!(nfa.epsilon_targets(0).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(nfa.targets(1, b'=').count(), 1);
        assert_eq!(nfa.targets(3, b'=').collect::<Vec<_>>(), vec![4]);

        assert_eq!(nfa.token_map[&2], Category::Assign);
        assert_eq!(nfa.token_map[&4], Category::Operator);
        assert_eq!(nfa.token_map[&5], Category::Operator);
        assert_eq!(nfa.accepting.len(), nfa.token_map.len());
    }

    #[test]
    fn test_origin_labels() {
        let nfa = combine(&[(Category::Assign, builders::assign())]);
        assert_eq!(nfa.origins[0].to_string(), "S_COMBINED");
        assert_eq!(nfa.origins[2].to_string(), "A0_q1");
    }

    #[test]
    fn test_alphabet_is_union() {
        let nfa = combine(&[
            (Category::Assign, builders::assign()),
            (Category::Separator, builders::separator()),
        ]);
        assert!(nfa.alphabet.contains(&b'='));
        assert!(nfa.alphabet.contains(&b'('));
        assert!(!nfa.alphabet.contains(&b'a'));
    }
}
