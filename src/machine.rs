//! This module defines [`MachineDefinition`], the formal 7-tuple of a
//! deterministic Turing machine plus its tape count: states, input alphabet,
//! tape alphabet, initial state, accept states, blank symbol and transition
//! function.
//!
//! A definition is built through validated mutators and then treated as
//! read-only: the simulator borrows it for the duration of a run and many
//! simulators may share one definition. There is a single k-tape
//! representation; single-tape machines are the k = 1 case built with
//! [`MachineDefinition::single_tape`].

use std::collections::{HashMap, HashSet};

use crate::transition::{MultiTransition, Transition};
use crate::types::{ConstructionError, DEFAULT_BLANK_SYMBOL};

/// Composite lookup key of the transition function: the source state plus the
/// symbols under all heads, compared and hashed structurally.
type TransitionKey = (String, Vec<char>);

/// A deterministic Turing machine definition.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineDefinition {
    states: HashSet<String>,
    input_alphabet: HashSet<char>,
    tape_alphabet: HashSet<char>,
    initial_state: Option<String>,
    accept_states: HashSet<String>,
    blank: char,
    tape_count: usize,
    transitions: HashMap<TransitionKey, MultiTransition>,
}

impl MachineDefinition {
    /// Creates an empty definition for a `tape_count`-tape machine.
    ///
    /// The blank symbol is part of the tape alphabet from the start.
    pub fn new(tape_count: usize, blank: char) -> Result<Self, ConstructionError> {
        if tape_count == 0 {
            return Err(ConstructionError::ZeroTapeCount);
        }

        let mut tape_alphabet = HashSet::new();
        tape_alphabet.insert(blank);

        Ok(Self {
            states: HashSet::new(),
            input_alphabet: HashSet::new(),
            tape_alphabet,
            initial_state: None,
            accept_states: HashSet::new(),
            blank,
            tape_count,
            transitions: HashMap::new(),
        })
    }

    /// Creates an empty single-tape definition.
    pub fn single_tape(blank: char) -> Self {
        let mut tape_alphabet = HashSet::new();
        tape_alphabet.insert(blank);

        Self {
            states: HashSet::new(),
            input_alphabet: HashSet::new(),
            tape_alphabet,
            initial_state: None,
            accept_states: HashSet::new(),
            blank,
            tape_count: 1,
            transitions: HashMap::new(),
        }
    }

    /// Declares a state. Declaring a state twice is harmless.
    pub fn add_state(&mut self, state: &str) -> Result<(), ConstructionError> {
        if state.is_empty() {
            return Err(ConstructionError::EmptyStateName);
        }
        self.states.insert(state.to_string());
        Ok(())
    }

    /// Adds a symbol to the input alphabet (and, with it, to the tape
    /// alphabet). The blank symbol is rejected.
    pub fn add_input_symbol(&mut self, symbol: char) -> Result<(), ConstructionError> {
        if symbol == self.blank {
            return Err(ConstructionError::BlankInInputAlphabet(symbol));
        }
        self.input_alphabet.insert(symbol);
        self.tape_alphabet.insert(symbol);
        Ok(())
    }

    /// Adds a symbol to the tape alphabet.
    pub fn add_tape_symbol(&mut self, symbol: char) {
        self.tape_alphabet.insert(symbol);
    }

    /// Sets the initial state, declaring it if necessary.
    pub fn set_initial_state(&mut self, state: &str) -> Result<(), ConstructionError> {
        self.add_state(state)?;
        self.initial_state = Some(state.to_string());
        Ok(())
    }

    /// Adds an accept state, declaring it if necessary.
    pub fn add_accept_state(&mut self, state: &str) -> Result<(), ConstructionError> {
        self.add_state(state)?;
        self.accept_states.insert(state.to_string());
        Ok(())
    }

    /// Replaces the blank symbol. The new blank joins the tape alphabet; the
    /// previous one stays a tape symbol.
    pub fn set_blank_symbol(&mut self, symbol: char) {
        self.blank = symbol;
        self.tape_alphabet.insert(symbol);
    }

    /// Registers a transition.
    ///
    /// The rule must cover exactly this machine's tape count and may only
    /// reference declared states; its read and write symbols are registered
    /// into the tape alphabet as a side effect. Registering a second rule for
    /// an already-covered (state, read symbols) key fails; this is what makes
    /// the transition function deterministic.
    pub fn add_transition(&mut self, transition: MultiTransition) -> Result<(), ConstructionError> {
        if transition.tape_count() != self.tape_count {
            return Err(ConstructionError::TapeCountMismatch {
                expected: self.tape_count,
                found: transition.tape_count(),
            });
        }
        if !self.states.contains(transition.from_state()) {
            return Err(ConstructionError::UndeclaredState(
                transition.from_state().to_string(),
            ));
        }
        if !self.states.contains(transition.to_state()) {
            return Err(ConstructionError::UndeclaredState(
                transition.to_state().to_string(),
            ));
        }

        for index in 0..transition.tape_count() {
            self.tape_alphabet.insert(transition.read(index));
            self.tape_alphabet.insert(transition.write(index));
        }

        let key = (
            transition.from_state().to_string(),
            transition.reads().to_vec(),
        );
        if self.transitions.contains_key(&key) {
            return Err(ConstructionError::DuplicateTransition {
                state: key.0,
                symbols: key
                    .1
                    .iter()
                    .map(|symbol| format!("'{symbol}'"))
                    .collect::<Vec<_>>()
                    .join(","),
            });
        }

        self.transitions.insert(key, transition);
        Ok(())
    }

    /// Registers a single-tape rule, lifting it onto tape 0 for machines with
    /// more than one tape.
    pub fn add_mono_transition(&mut self, transition: Transition) -> Result<(), ConstructionError> {
        let lifted = MultiTransition::from_mono(&transition, self.tape_count, 0, self.blank)?;
        self.add_transition(lifted)
    }

    /// Looks up the transition for `state` reading `symbols`. `None` when the
    /// machine has no rule for that key or when `symbols` has the wrong arity.
    pub fn transition(&self, state: &str, symbols: &[char]) -> Option<&MultiTransition> {
        if symbols.len() != self.tape_count {
            return None;
        }
        let key = (state.to_string(), symbols.to_vec());
        self.transitions.get(&key)
    }

    /// Single-tape convenience for [`MachineDefinition::transition`].
    pub fn mono_transition(&self, state: &str, symbol: char) -> Option<&MultiTransition> {
        self.transition(state, &[symbol])
    }

    pub fn states(&self) -> &HashSet<String> {
        &self.states
    }

    pub fn input_alphabet(&self) -> &HashSet<char> {
        &self.input_alphabet
    }

    pub fn tape_alphabet(&self) -> &HashSet<char> {
        &self.tape_alphabet
    }

    pub fn initial_state(&self) -> Option<&str> {
        self.initial_state.as_deref()
    }

    pub fn accept_states(&self) -> &HashSet<String> {
        &self.accept_states
    }

    pub fn blank_symbol(&self) -> char {
        self.blank
    }

    pub fn tape_count(&self) -> usize {
        self.tape_count
    }

    /// Iterates over all registered transitions in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = &MultiTransition> {
        self.transitions.values()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_accept_state(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    pub fn is_input_symbol(&self, symbol: char) -> bool {
        self.input_alphabet.contains(&symbol)
    }

    pub fn is_tape_symbol(&self, symbol: char) -> bool {
        self.tape_alphabet.contains(&symbol)
    }

    /// True when every character of `word` is an input symbol. The empty word
    /// is always valid.
    pub fn is_valid_input_word(&self, word: &str) -> bool {
        word.chars().all(|symbol| self.is_input_symbol(symbol))
    }

    /// Aggregate invariant check over the whole definition:
    ///
    /// - at least one state, and a declared initial state
    /// - accept states are a subset of the states
    /// - the blank symbol is a tape symbol and not an input symbol
    /// - the input alphabet is a subset of the tape alphabet
    /// - every transition has the machine's arity and references only
    ///   declared states and tape symbols
    pub fn is_valid(&self) -> bool {
        if self.states.is_empty() {
            return false;
        }

        match &self.initial_state {
            Some(state) if self.states.contains(state) => {}
            _ => return false,
        }

        if !self.accept_states.is_subset(&self.states) {
            return false;
        }

        if !self.tape_alphabet.contains(&self.blank) {
            return false;
        }

        if !self.input_alphabet.is_subset(&self.tape_alphabet) {
            return false;
        }
        if self.input_alphabet.contains(&self.blank) {
            return false;
        }

        self.transitions.values().all(|transition| {
            transition.tape_count() == self.tape_count
                && self.states.contains(transition.from_state())
                && self.states.contains(transition.to_state())
                && transition
                    .reads()
                    .iter()
                    .chain(transition.writes())
                    .all(|symbol| self.tape_alphabet.contains(symbol))
        })
    }

    /// Rebuilds this machine as a `tape_count`-tape machine.
    ///
    /// States, alphabets, initial and accept states carry over; every
    /// transition is lifted onto tape 0, leaving the added tapes inert.
    pub fn widen(&self, tape_count: usize) -> Result<MachineDefinition, ConstructionError> {
        let mut machine = MachineDefinition::new(tape_count, self.blank)?;

        for state in &self.states {
            machine.add_state(state)?;
        }
        for &symbol in &self.input_alphabet {
            machine.add_input_symbol(symbol)?;
        }
        for &symbol in &self.tape_alphabet {
            machine.add_tape_symbol(symbol);
        }
        if let Some(state) = &self.initial_state {
            machine.set_initial_state(state)?;
        }
        for state in &self.accept_states {
            machine.add_accept_state(state)?;
        }

        for transition in self.transitions.values() {
            if transition.tape_count() != 1 {
                return Err(ConstructionError::TapeCountMismatch {
                    expected: 1,
                    found: transition.tape_count(),
                });
            }
            let mono = Transition::new(
                transition.from_state(),
                transition.read(0),
                transition.to_state(),
                transition.write(0),
                transition.movement(0),
            );
            machine.add_mono_transition(mono)?;
        }

        Ok(machine)
    }

    /// Drops everything but the blank symbol and the tape count.
    pub fn clear(&mut self) {
        self.states.clear();
        self.input_alphabet.clear();
        self.tape_alphabet.clear();
        self.initial_state = None;
        self.accept_states.clear();
        self.transitions.clear();
        self.tape_alphabet.insert(self.blank);
    }
}

impl Default for MachineDefinition {
    fn default() -> Self {
        Self::single_tape(DEFAULT_BLANK_SYMBOL)
    }
}

impl std::fmt::Display for MachineDefinition {
    /// Human-readable summary of the definition, with sets sorted for stable
    /// output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sorted_states = |set: &HashSet<String>| {
            let mut names: Vec<_> = set.iter().cloned().collect();
            names.sort();
            names.join(", ")
        };
        let sorted_symbols = |set: &HashSet<char>| {
            let mut symbols: Vec<_> = set.iter().map(|c| format!("'{c}'")).collect();
            symbols.sort();
            symbols.join(", ")
        };

        writeln!(f, "tapes: {}", self.tape_count)?;
        writeln!(
            f,
            "states ({}): {{{}}}",
            self.states.len(),
            sorted_states(&self.states)
        )?;
        writeln!(f, "initial state: {}", self.initial_state().unwrap_or("-"))?;
        writeln!(
            f,
            "accept states ({}): {{{}}}",
            self.accept_states.len(),
            sorted_states(&self.accept_states)
        )?;
        writeln!(
            f,
            "input alphabet ({}): {{{}}}",
            self.input_alphabet.len(),
            sorted_symbols(&self.input_alphabet)
        )?;
        writeln!(
            f,
            "tape alphabet ({}): {{{}}}",
            self.tape_alphabet.len(),
            sorted_symbols(&self.tape_alphabet)
        )?;
        writeln!(f, "blank symbol: '{}'", self.blank)?;
        writeln!(f, "transitions: {}", self.transitions.len())?;
        write!(f, "valid: {}", if self.is_valid() { "yes" } else { "no" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Movement;

    fn scanner() -> MachineDefinition {
        let mut machine = MachineDefinition::single_tape('.');
        machine.add_state("q0").unwrap();
        machine.add_accept_state("qf").unwrap();
        machine.set_initial_state("q0").unwrap();
        machine.add_input_symbol('1').unwrap();
        machine
            .add_mono_transition(Transition::new("q0", '1', "q0", '1', Movement::Right))
            .unwrap();
        machine
            .add_mono_transition(Transition::new("q0", '.', "qf", '.', Movement::Stay))
            .unwrap();
        machine
    }

    #[test]
    fn empty_state_names_are_rejected() {
        let mut machine = MachineDefinition::single_tape('.');
        assert_eq!(machine.add_state(""), Err(ConstructionError::EmptyStateName));
    }

    #[test]
    fn blank_cannot_join_the_input_alphabet() {
        let mut machine = MachineDefinition::single_tape('.');
        assert_eq!(
            machine.add_input_symbol('.'),
            Err(ConstructionError::BlankInInputAlphabet('.'))
        );
    }

    #[test]
    fn input_symbols_are_also_tape_symbols() {
        let mut machine = MachineDefinition::single_tape('.');
        machine.add_input_symbol('1').unwrap();
        assert!(machine.is_tape_symbol('1'));
        assert!(machine.is_tape_symbol('.'));
        assert!(!machine.is_input_symbol('.'));
    }

    #[test]
    fn initial_and_accept_states_auto_register() {
        let mut machine = MachineDefinition::single_tape('.');
        machine.set_initial_state("start").unwrap();
        machine.add_accept_state("done").unwrap();
        assert!(machine.states().contains("start"));
        assert!(machine.states().contains("done"));
        assert_eq!(machine.initial_state(), Some("start"));
        assert!(machine.is_accept_state("done"));
    }

    #[test]
    fn zero_tapes_are_rejected() {
        assert_eq!(
            MachineDefinition::new(0, '.').unwrap_err(),
            ConstructionError::ZeroTapeCount
        );
    }

    #[test]
    fn transitions_require_declared_states() {
        let mut machine = MachineDefinition::single_tape('.');
        machine.add_state("q0").unwrap();

        let rule = Transition::new("q0", '1', "missing", '1', Movement::Right);
        assert_eq!(
            machine.add_mono_transition(rule),
            Err(ConstructionError::UndeclaredState("missing".to_string()))
        );
    }

    #[test]
    fn transitions_register_their_symbols() {
        let machine = scanner();
        assert!(machine.is_tape_symbol('1'));
        assert_eq!(machine.transition_count(), 2);
    }

    #[test]
    fn duplicate_keys_enforce_determinism() {
        let mut machine = scanner();
        let duplicate = Transition::new("q0", '1', "qf", '.', Movement::Left);
        match machine.add_mono_transition(duplicate) {
            Err(ConstructionError::DuplicateTransition { state, .. }) => assert_eq!(state, "q0"),
            other => panic!("expected a duplicate-transition error, got {other:?}"),
        }
        // The original rule is untouched.
        let rule = machine.mono_transition("q0", '1').unwrap();
        assert_eq!(rule.to_state(), "q0");
    }

    #[test]
    fn arity_must_match_the_machine() {
        let mut machine = MachineDefinition::new(2, '.').unwrap();
        machine.add_state("q0").unwrap();
        let rule =
            MultiTransition::new("q0", vec!['1'], "q0", vec!['1'], vec![Movement::Right]).unwrap();
        assert_eq!(
            machine.add_transition(rule),
            Err(ConstructionError::TapeCountMismatch {
                expected: 2,
                found: 1
            })
        );
    }

    #[test]
    fn lookup_misses_on_wrong_arity() {
        let machine = scanner();
        assert!(machine.transition("q0", &['1']).is_some());
        assert!(machine.transition("q0", &['1', '1']).is_none());
        assert!(machine.transition("q0", &['0']).is_none());
    }

    #[test]
    fn validity_requires_an_initial_state() {
        let mut machine = MachineDefinition::single_tape('.');
        machine.add_state("q0").unwrap();
        assert!(!machine.is_valid());

        machine.set_initial_state("q0").unwrap();
        assert!(machine.is_valid());
    }

    #[test]
    fn moving_the_blank_into_the_input_alphabet_invalidates() {
        let mut machine = scanner();
        assert!(machine.is_valid());

        // Re-pointing the blank at an existing input symbol must be caught by
        // the aggregate check.
        machine.set_blank_symbol('1');
        assert!(!machine.is_valid());
    }

    #[test]
    fn clear_keeps_blank_and_tape_count() {
        let mut machine = scanner();
        machine.clear();
        assert!(machine.states().is_empty());
        assert_eq!(machine.initial_state(), None);
        assert_eq!(machine.blank_symbol(), '.');
        assert_eq!(machine.tape_count(), 1);
        assert!(machine.is_tape_symbol('.'));
        assert!(!machine.is_valid());
    }

    #[test]
    fn widening_lifts_every_rule_onto_tape_zero() {
        let widened = scanner().widen(3).unwrap();
        assert!(widened.is_valid());
        assert_eq!(widened.tape_count(), 3);
        assert_eq!(widened.transition_count(), 2);

        let rule = widened.transition("q0", &['1', '.', '.']).unwrap();
        assert_eq!(rule.writes(), &['1', '.', '.']);
        assert_eq!(
            rule.movements(),
            &[Movement::Right, Movement::Stay, Movement::Stay]
        );
        // The widened machine only reads the extra tapes as blanks.
        assert!(widened.transition("q0", &['1', '1', '.']).is_none());
    }

    #[test]
    fn summary_mentions_the_shape() {
        let summary = scanner().to_string();
        assert!(summary.contains("tapes: 1"));
        assert!(summary.contains("initial state: q0"));
        assert!(summary.contains("valid: yes"));
    }
}
