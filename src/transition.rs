//! Immutable transition rules.
//!
//! [`Transition`] is the single-tape 5-tuple; [`MultiTransition`] generalizes
//! it to k tapes with one read symbol, write symbol and movement per tape.
//! The engine stores transitions in the k-tape form; a single-tape rule is
//! the k = 1 case, and [`MultiTransition::from_mono`] embeds one into a wider
//! machine by leaving every other tape untouched.

use serde::{Deserialize, Serialize};

use crate::types::{ConstructionError, Movement};

/// A single-tape transition rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// State the machine must be in for this rule to apply.
    pub from_state: String,
    /// Symbol that must be under the head.
    pub read: char,
    /// State the machine moves to.
    pub to_state: String,
    /// Symbol written before the head moves.
    pub write: char,
    /// Head movement applied after the write.
    pub movement: Movement,
}

impl Transition {
    pub fn new(
        from_state: impl Into<String>,
        read: char,
        to_state: impl Into<String>,
        write: char,
        movement: Movement,
    ) -> Self {
        Self {
            from_state: from_state.into(),
            read,
            to_state: to_state.into(),
            write,
            movement,
        }
    }

    /// Pure equality check against the rule's source side. The transition
    /// table key makes this redundant during lookup; it exists for callers
    /// that hold a rule directly.
    pub fn is_applicable(&self, state: &str, symbol: char) -> bool {
        self.from_state == state && self.read == symbol
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.from_state, self.read, self.to_state, self.write, self.movement
        )
    }
}

/// A k-tape transition rule.
///
/// The read, write and movement vectors always share one length k > 0; the
/// constructor rejects anything else, so every constructed value is well
/// formed. Slot i of each vector applies to tape i.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTransition {
    from_state: String,
    reads: Vec<char>,
    to_state: String,
    writes: Vec<char>,
    movements: Vec<Movement>,
}

impl MultiTransition {
    /// Builds a k-tape rule, failing when the three vectors differ in length
    /// or are empty.
    pub fn new(
        from_state: impl Into<String>,
        reads: Vec<char>,
        to_state: impl Into<String>,
        writes: Vec<char>,
        movements: Vec<Movement>,
    ) -> Result<Self, ConstructionError> {
        if reads.is_empty() || writes.len() != reads.len() || movements.len() != reads.len() {
            return Err(ConstructionError::MalformedTransition);
        }

        Ok(Self {
            from_state: from_state.into(),
            reads,
            to_state: to_state.into(),
            writes,
            movements,
        })
    }

    /// Embeds a single-tape rule into a `tape_count`-tape rule acting on
    /// `target_tape`.
    ///
    /// Every other tape reads blank, writes blank and stays put, so the
    /// embedding is structural: the extra tapes of the resulting machine are
    /// inert, and the rule only applies while they are actually blank under
    /// their heads.
    pub fn from_mono(
        mono: &Transition,
        tape_count: usize,
        target_tape: usize,
        blank: char,
    ) -> Result<Self, ConstructionError> {
        if tape_count == 0 {
            return Err(ConstructionError::ZeroTapeCount);
        }
        if target_tape >= tape_count {
            return Err(ConstructionError::TargetTapeOutOfRange {
                target: target_tape,
                tape_count,
            });
        }

        let mut reads = vec![blank; tape_count];
        let mut writes = vec![blank; tape_count];
        let mut movements = vec![Movement::Stay; tape_count];
        reads[target_tape] = mono.read;
        writes[target_tape] = mono.write;
        movements[target_tape] = mono.movement;

        Self::new(
            mono.from_state.clone(),
            reads,
            mono.to_state.clone(),
            writes,
            movements,
        )
    }

    pub fn from_state(&self) -> &str {
        &self.from_state
    }

    pub fn to_state(&self) -> &str {
        &self.to_state
    }

    pub fn reads(&self) -> &[char] {
        &self.reads
    }

    pub fn writes(&self) -> &[char] {
        &self.writes
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    /// Read symbol for tape `index`.
    pub fn read(&self, index: usize) -> char {
        self.reads[index]
    }

    /// Write symbol for tape `index`.
    pub fn write(&self, index: usize) -> char {
        self.writes[index]
    }

    /// Movement for tape `index`.
    pub fn movement(&self, index: usize) -> Movement {
        self.movements[index]
    }

    /// Number of tapes this rule covers.
    pub fn tape_count(&self) -> usize {
        self.reads.len()
    }

    /// Pure equality check against the rule's source side.
    pub fn is_applicable(&self, state: &str, symbols: &[char]) -> bool {
        self.from_state == state && self.reads == symbols
    }
}

impl std::fmt::Display for MultiTransition {
    /// Renders the definition-file form: `from r1,..,rk to w1,..,wk m1,..,mk`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join_chars = |symbols: &[char]| {
            symbols
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join(",")
        };
        let movements = self
            .movements
            .iter()
            .map(|m| m.letter().to_string())
            .collect::<Vec<_>>()
            .join(",");

        write!(
            f,
            "{} {} {} {} {}",
            self.from_state,
            join_chars(&self.reads),
            self.to_state,
            join_chars(&self.writes),
            movements
        )
    }
}
