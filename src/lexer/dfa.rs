//! Subset construction and the combined lexical DFA.
//!
//! A DFA state is the ε-closure of a set of NFA states, kept as an ordered
//! set so that equal subsets intern to the same id. States are numbered in
//! discovery order (`D0` is the start) by a breadth-first worklist that
//! visits symbols in ascending byte order, so the same input always yields
//! the same numbering.

use crate::lexer::automaton::{Automaton, StateId};
use crate::lexer::builders;
use crate::lexer::category::{Category, Priorities};
use crate::lexer::nfa::{self, Nfa};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::{BTreeSet, VecDeque};

/// Deterministic automaton recognising every lexical category at once.
#[derive(Debug, Clone)]
pub struct Dfa {
    transitions: Vec<FxHashMap<u8, StateId>>,
    finals: FxHashMap<StateId, Category>,
    subsets: Vec<BTreeSet<StateId>>,
    alphabet: BTreeSet<u8>,
}

/// Size figures for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct DfaStats {
    pub states: usize,
    pub final_states: usize,
    pub transitions: usize,
    pub alphabet: usize,
    pub finals_by_category: Vec<(Category, usize)>,
}

impl Dfa {
    pub const START: StateId = 0;

    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn step(&self, state: StateId, symbol: u8) -> Option<StateId> {
        self.transitions.get(state)?.get(&symbol).copied()
    }

    /// Category of a final state, `None` for non-final states.
    pub fn category(&self, state: StateId) -> Option<Category> {
        self.finals.get(&state).copied()
    }

    pub fn is_final(&self, state: StateId) -> bool {
        self.finals.contains_key(&state)
    }

    /// NFA states merged into `state`.
    pub fn subset(&self, state: StateId) -> Option<&BTreeSet<StateId>> {
        self.subsets.get(state)
    }

    pub fn alphabet(&self) -> &BTreeSet<u8> {
        &self.alphabet
    }

    /// Longest prefix of `input[from..]` that ends in a final state, as
    /// `(length, category)`.
    pub fn longest_match(&self, input: &[u8], from: usize) -> Option<(usize, Category)> {
        let mut state = Self::START;
        let mut best = None;
        for (len, &symbol) in input.get(from..)?.iter().enumerate() {
            match self.step(state, symbol) {
                Some(next) => state = next,
                None => break,
            }
            if let Some(category) = self.category(state) {
                best = Some((len + 1, category));
            }
        }
        best
    }

    /// Whole-string classification: the category if all of `text` is one token.
    pub fn classify(&self, text: &str) -> Option<Category> {
        match self.longest_match(text.as_bytes(), 0) {
            Some((len, category)) if len == text.len() => Some(category),
            _ => None,
        }
    }

    pub fn stats(&self) -> DfaStats {
        let mut by_category: FxHashMap<Category, usize> = FxHashMap::default();
        for category in self.finals.values() {
            *by_category.entry(*category).or_default() += 1;
        }
        let mut finals_by_category: Vec<_> = by_category.into_iter().collect();
        finals_by_category.sort();
        DfaStats {
            states: self.state_count(),
            final_states: self.finals.len(),
            transitions: self.transitions.iter().map(FxHashMap::len).sum(),
            alphabet: self.alphabet.len(),
            finals_by_category,
        }
    }
}

/// ε-closure of `states`.
pub fn epsilon_closure(nfa: &Nfa, states: &BTreeSet<StateId>) -> BTreeSet<StateId> {
    let mut closure = states.clone();
    let mut stack: Vec<StateId> = states.iter().copied().collect();
    while let Some(state) = stack.pop() {
        for next in nfa.epsilon_targets(state) {
            if closure.insert(next) {
                stack.push(next);
            }
        }
    }
    closure
}

/// States reachable from `states` on `symbol` (without closure).
pub fn move_on(nfa: &Nfa, states: &BTreeSet<StateId>, symbol: u8) -> BTreeSet<StateId> {
    states
        .iter()
        .flat_map(|&state| nfa.targets(state, symbol))
        .collect()
}

/// Determinise `nfa`, resolving multi-category final states with `priorities`.
pub fn subset_construction(nfa: &Nfa, priorities: &Priorities) -> Dfa {
    let start = epsilon_closure(nfa, &BTreeSet::from([nfa.start]));

    let mut ids: FxHashMap<BTreeSet<StateId>, StateId> = FxHashMap::default();
    let mut subsets = vec![start.clone()];
    let mut transitions = vec![FxHashMap::default()];
    ids.insert(start, Dfa::START);

    let mut worklist = VecDeque::from([Dfa::START]);
    while let Some(current) = worklist.pop_front() {
        for &symbol in &nfa.alphabet {
            let moved = move_on(nfa, &subsets[current], symbol);
            if moved.is_empty() {
                continue;
            }
            let target = epsilon_closure(nfa, &moved);
            let id = match ids.get(&target) {
                Some(&id) => id,
                None => {
                    let id = subsets.len();
                    ids.insert(target.clone(), id);
                    subsets.push(target);
                    transitions.push(FxHashMap::default());
                    worklist.push_back(id);
                    id
                }
            };
            transitions[current].insert(symbol, id);
        }
    }

    let finals = subsets
        .iter()
        .enumerate()
        .filter_map(|(id, subset)| {
            let candidates = subset
                .iter()
                .filter(|state| nfa.accepting.contains(state))
                .filter_map(|state| nfa.token_map.get(state).copied());
            priorities.resolve(candidates).map(|category| (id, category))
        })
        .collect::<FxHashMap<_, _>>();

    let dfa = Dfa {
        transitions,
        finals,
        subsets,
        alphabet: nfa.alphabet.clone(),
    };
    log::debug!(
        "subset construction: {} NFA states -> {} DFA states ({} final)",
        nfa.state_count(),
        dfa.state_count(),
        dfa.finals.len()
    );
    dfa
}

/// Combine `categories` and determinise the result.
pub fn build_combined_dfa(categories: &[(Category, Automaton)], priorities: &Priorities) -> Dfa {
    let nfa = nfa::combine(categories);
    subset_construction(&nfa, priorities)
}

/// The standard lexical machine: every pattern category with its default
/// builder and the default priority order.
pub fn standard_dfa() -> Dfa {
    let parts: Vec<(Category, Automaton)> = Category::PATTERNS
        .iter()
        .filter_map(|&category| builders::build(category).map(|a| (category, a)))
        .collect();
    build_combined_dfa(&parts, &Priorities::default())
}
