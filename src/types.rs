//! This module defines the primitive types shared across the simulator: head
//! movements, simulation outcomes, and the error taxonomies for machine
//! construction, simulation, and definition loading.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rule;

/// The blank symbol a machine starts out with before a definition overrides it.
pub const DEFAULT_BLANK_SYMBOL: char = '.';

/// A head movement, applied to one tape after its cell has been written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Movement {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Movement {
    /// Parses a movement from its letter form (`L`, `R`, `S`, case-insensitive).
    pub fn from_letter(letter: char) -> Option<Movement> {
        match letter {
            'L' | 'l' => Some(Movement::Left),
            'R' | 'r' => Some(Movement::Right),
            'S' | 's' => Some(Movement::Stay),
            _ => None,
        }
    }

    /// Returns the canonical letter form of this movement.
    pub fn letter(self) -> char {
        match self {
            Movement::Left => 'L',
            Movement::Right => 'R',
            Movement::Stay => 'S',
        }
    }
}

impl std::fmt::Display for Movement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// The verdict of one simulation run.
///
/// Simulation never fails with an `Err`: every run ends in exactly one of
/// these values. An `Infinite` verdict can be disambiguated through
/// `Simulator::is_infinite_loop_detected`, and an `Error` verdict carries its
/// cause in `Simulator::last_error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimulationResult {
    /// The run reached an accept state.
    Accepted,
    /// The run reached a configuration with no applicable transition.
    Rejected,
    /// The run was cut off, either by the step limit or by a repeated
    /// configuration.
    Infinite,
    /// The run never started: the machine or the input word was unusable.
    Error,
}

impl std::fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            SimulationResult::Accepted => "ACCEPT",
            SimulationResult::Rejected => "REJECT",
            SimulationResult::Infinite => "INFINITE",
            SimulationResult::Error => "ERROR",
        };
        write!(f, "{label}")
    }
}

/// Errors raised while building a machine definition.
///
/// These are hard failures at the mutator call that caused them: the
/// definition under construction is unusable until the caller fixes the
/// offending call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    /// A state was declared with an empty name.
    #[error("state name cannot be empty")]
    EmptyStateName,
    /// The blank symbol was added to the input alphabet.
    #[error("the blank symbol '{0}' cannot be part of the input alphabet")]
    BlankInInputAlphabet(char),
    /// A transition referenced a state that was never declared.
    #[error("state '{0}' is not declared")]
    UndeclaredState(String),
    /// A second transition was registered for an already-covered
    /// (state, read symbols) key.
    #[error("a transition for state '{state}' reading [{symbols}] already exists")]
    DuplicateTransition { state: String, symbols: String },
    /// A transition covers a different number of tapes than the machine has.
    #[error("transition covers {found} tapes but the machine has {expected}")]
    TapeCountMismatch { expected: usize, found: usize },
    /// The read, write and movement vectors of a transition differ in length,
    /// or are empty.
    #[error("read, write and movement vectors must share one length greater than zero")]
    MalformedTransition,
    /// A machine was requested with zero tapes.
    #[error("a machine needs at least one tape")]
    ZeroTapeCount,
    /// A single-tape transition was lifted onto a tape index that does not
    /// exist.
    #[error("target tape {target} is out of range for {tape_count} tapes")]
    TargetTapeOutOfRange { target: usize, tape_count: usize },
}

/// The reason a simulation run ended in [`SimulationResult::Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// The machine definition does not satisfy its own invariants.
    #[error("the machine definition is not valid")]
    InvalidMachine,
    /// The input word contains a symbol outside the input alphabet.
    #[error("input word contains '{0}', which is outside the input alphabet")]
    SymbolOutsideAlphabet(char),
}

/// Errors raised while loading, saving, or interchanging machine definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// A file could not be read or written.
    #[error("file error: {0}")]
    File(String),
    /// The definition text does not match the grammar.
    #[error("syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    /// A line matched the grammar but not the definition format.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },
    /// A well-formed line drove a machine mutator into an error.
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    /// The definition parsed but the resulting machine is not valid.
    #[error("the loaded definition is not a valid machine")]
    InvalidMachine,
    /// JSON interchange failed.
    #[error("interchange error: {0}")]
    Interchange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_letters_round_trip() {
        for movement in [Movement::Left, Movement::Right, Movement::Stay] {
            assert_eq!(Movement::from_letter(movement.letter()), Some(movement));
        }
        assert_eq!(Movement::from_letter('x'), None);
        assert_eq!(Movement::from_letter('r'), Some(Movement::Right));
    }

    #[test]
    fn movement_serialization() {
        let json = serde_json::to_string(&Movement::Left).unwrap();
        assert_eq!(json, "\"Left\"");

        let parsed: Movement = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Movement::Left);
    }

    #[test]
    fn result_display_labels() {
        assert_eq!(SimulationResult::Accepted.to_string(), "ACCEPT");
        assert_eq!(SimulationResult::Rejected.to_string(), "REJECT");
        assert_eq!(SimulationResult::Infinite.to_string(), "INFINITE");
        assert_eq!(SimulationResult::Error.to_string(), "ERROR");
    }

    #[test]
    fn construction_error_display() {
        let error = ConstructionError::DuplicateTransition {
            state: "q0".to_string(),
            symbols: "'1'".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("q0"));
        assert!(message.contains("already exists"));
    }
}
