//! Deterministic finite automaton over byte symbols.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;

pub type StateId = usize;

/// A deterministic automaton with a partial transition function.
///
/// States are numbered `0..state_count`. A `(state, symbol)` pair has at most
/// one destination, which [`Automaton::add_transition`] enforces by
/// overwriting.
#[derive(Debug, Clone)]
pub struct Automaton {
    state_count: usize,
    alphabet: BTreeSet<u8>,
    transitions: FxHashMap<(StateId, u8), StateId>,
    start: StateId,
    accepting: FxHashSet<StateId>,
}

impl Automaton {
    /// Create an automaton with `state_count` states and start state 0.
    pub fn new(state_count: usize) -> Self {
        Self {
            state_count,
            alphabet: BTreeSet::new(),
            transitions: FxHashMap::default(),
            start: 0,
            accepting: FxHashSet::default(),
        }
    }

    /// Append a fresh state and return its id.
    pub fn add_state(&mut self) -> StateId {
        self.state_count += 1;
        self.state_count - 1
    }

    pub fn add_transition(&mut self, from: StateId, symbol: u8, to: StateId) {
        debug_assert!(from < self.state_count && to < self.state_count);
        self.alphabet.insert(symbol);
        self.transitions.insert((from, symbol), to);
    }

    /// Add the same edge for every symbol in `symbols`.
    pub fn add_transitions<I>(&mut self, from: StateId, symbols: I, to: StateId)
    where
        I: IntoIterator<Item = u8>,
    {
        for symbol in symbols {
            self.add_transition(from, symbol, to);
        }
    }

    /// Declare symbols as part of the alphabet without adding edges.
    pub fn extend_alphabet<I>(&mut self, symbols: I)
    where
        I: IntoIterator<Item = u8>,
    {
        self.alphabet.extend(symbols);
    }

    pub fn set_accepting(&mut self, state: StateId) {
        self.accepting.insert(state);
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn alphabet(&self) -> &BTreeSet<u8> {
        &self.alphabet
    }

    pub fn is_accepting(&self, state: StateId) -> bool {
        self.accepting.contains(&state)
    }

    pub fn accepting_states(&self) -> impl Iterator<Item = StateId> + '_ {
        self.accepting.iter().copied()
    }

    pub fn step(&self, state: StateId, symbol: u8) -> Option<StateId> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// All edges as `(from, symbol, to)`.
    pub fn edges(&self) -> impl Iterator<Item = (StateId, u8, StateId)> + '_ {
        self.transitions
            .iter()
            .map(|(&(from, symbol), &to)| (from, symbol, to))
    }

    /// Whole-string acceptance: every byte must be consumed and the run must
    /// end in an accepting state.
    pub fn accepts(&self, text: &str) -> bool {
        let mut state = self.start;
        for &symbol in text.as_bytes() {
            if !self.alphabet.contains(&symbol) {
                return false;
            }
            match self.step(state, symbol) {
                Some(next) => state = next,
                None => return false,
            }
        }
        self.is_accepting(state)
    }
}
