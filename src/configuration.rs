//! Instantaneous machine configurations.
//!
//! A [`Configuration`] is the snapshot a simulator mutates step by step:
//! current state, all tapes with their heads, and the number of steps taken
//! so far. Equivalence between configurations deliberately ignores the step
//! count: a machine that returns to a state it has already been in, with
//! identical tape contents and head positions, is looping no matter how many
//! steps lie between the two visits. [`Fingerprint`] captures exactly that
//! equivalence as a hashable key.

use crate::tape::{MultiTape, Tape};

/// A snapshot of a running machine.
#[derive(Debug, Clone)]
pub struct Configuration {
    state: String,
    tapes: MultiTape,
    step_count: usize,
}

/// The cycle-detection key of a configuration: state, head positions and
/// tape contents, with the step count excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    state: String,
    heads: Vec<i64>,
    contents: Vec<String>,
}

impl Configuration {
    /// Creates the starting configuration of a run: `input` on tape 0, all
    /// heads at position 0, step count 0.
    pub fn new(initial_state: &str, tape_count: usize, input: &str, blank: char) -> Self {
        Self {
            state: initial_state.to_string(),
            tapes: MultiTape::with_input(tape_count, input, blank),
            step_count: 0,
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn set_state(&mut self, state: impl Into<String>) {
        self.state = state.into();
    }

    pub fn tapes(&self) -> &MultiTape {
        &self.tapes
    }

    pub fn tapes_mut(&mut self) -> &mut MultiTape {
        &mut self.tapes
    }

    /// The first tape. Convenience for single-tape machines.
    pub fn tape(&self) -> &Tape {
        self.tapes.tape(0)
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn increment_step_count(&mut self) {
        self.step_count += 1;
    }

    /// Rewinds the snapshot to a fresh start: new state, `input` on tape 0,
    /// everything else blank, step count 0.
    pub fn reset(&mut self, state: &str, input: &str) {
        self.state = state.to_string();
        self.tapes.reset(input);
        self.step_count = 0;
    }

    /// Returns this configuration's cycle-detection key.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint {
            state: self.state.clone(),
            heads: self.tapes.head_positions(),
            contents: self.tapes.contents(),
        }
    }

    /// Structural equivalence over state, head positions and tape contents.
    /// Step counts are not compared.
    pub fn is_equivalent(&self, other: &Configuration) -> bool {
        self.state == other.state
            && self.tapes.head_positions() == other.tapes.head_positions()
            && self.tapes.contents() == other.tapes.contents()
    }

    /// Multi-line rendering: the summary line plus a window of each tape
    /// around its head.
    pub fn describe(&self, window: i64) -> String {
        format!("{}\n{}", self, indent(&self.tapes.render(window)))
    }
}

impl PartialEq for Configuration {
    /// Equality is [`Configuration::is_equivalent`]: step counts are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl std::fmt::Display for Configuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let heads = self
            .tapes
            .head_positions()
            .iter()
            .map(|position| position.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let reading = self
            .tapes
            .read_all()
            .iter()
            .map(|symbol| format!("'{symbol}'"))
            .collect::<Vec<_>>()
            .join(",");

        write!(
            f,
            "step {} | state {} | heads [{}] | reading [{}]",
            self.step_count, self.state, heads, reading
        )
    }
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|line| format!("  {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
