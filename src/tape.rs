//! Sparse, unbounded tape storage.
//!
//! A tape maps integer positions to symbols; positions without an entry
//! implicitly hold the blank symbol, and writing the blank removes the entry
//! again, so a tape only ever stores non-blank cells. Head positions are
//! signed and unbounded in both directions. [`MultiTape`] composes several
//! independent tapes behind index-addressed operations.

use std::collections::HashMap;

use crate::types::Movement;

/// One unbounded tape with a read/write head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: HashMap<i64, char>,
    head: i64,
    blank: char,
}

impl Tape {
    /// Creates an empty tape with the head at position 0.
    pub fn new(blank: char) -> Self {
        Self {
            cells: HashMap::new(),
            head: 0,
            blank,
        }
    }

    /// Creates a tape holding `input` starting at position 0, head at 0.
    pub fn with_input(input: &str, blank: char) -> Self {
        let mut tape = Self::new(blank);
        tape.reset(input);
        tape
    }

    /// Returns the symbol under the head, the blank symbol for unwritten cells.
    pub fn read(&self) -> char {
        self.cells.get(&self.head).copied().unwrap_or(self.blank)
    }

    /// Writes `symbol` at the head position.
    ///
    /// Writing the blank symbol removes the cell entry instead, keeping the
    /// invariant that only non-blank cells are stored.
    pub fn write(&mut self, symbol: char) {
        if symbol == self.blank {
            self.cells.remove(&self.head);
        } else {
            self.cells.insert(self.head, symbol);
        }
    }

    /// Moves the head one position to the left. The tape has no edge.
    pub fn move_left(&mut self) {
        self.head -= 1;
    }

    /// Moves the head one position to the right. The tape has no edge.
    pub fn move_right(&mut self) {
        self.head += 1;
    }

    /// Returns the current head position.
    pub fn head_position(&self) -> i64 {
        self.head
    }

    /// Places the head at an arbitrary position.
    pub fn set_head_position(&mut self, position: i64) {
        self.head = position;
    }

    /// Returns the blank symbol of this tape.
    pub fn blank_symbol(&self) -> char {
        self.blank
    }

    /// Clears the tape, writes `input` starting at position 0 and returns the
    /// head to position 0. Blank symbols in `input` stay unstored.
    pub fn reset(&mut self, input: &str) {
        self.cells.clear();
        self.head = 0;

        for (position, symbol) in input.chars().enumerate() {
            if symbol != self.blank {
                self.cells.insert(position as i64, symbol);
            }
        }
    }

    /// Returns the minimal window covering all non-blank cells, gaps filled
    /// with the blank symbol. An all-blank tape yields the empty string.
    pub fn content(&self) -> String {
        let (min, max) = match self.occupied_range() {
            Some(range) => range,
            None => return String::new(),
        };

        (min..=max)
            .map(|position| self.cells.get(&position).copied().unwrap_or(self.blank))
            .collect()
    }

    /// Returns the number of stored (non-blank) cells.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Returns true when the tape holds only blanks.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Renders a window of `window` cells on either side of the head, the
    /// head cell bracketed.
    pub fn render(&self, window: i64) -> String {
        let mut out = String::new();

        for position in (self.head - window)..=(self.head + window) {
            let symbol = self.cells.get(&position).copied().unwrap_or(self.blank);
            if position == self.head {
                out.push('[');
                out.push(symbol);
                out.push(']');
            } else {
                out.push(' ');
                out.push(symbol);
                out.push(' ');
            }
        }

        out
    }

    fn occupied_range(&self) -> Option<(i64, i64)> {
        let min = self.cells.keys().min()?;
        let max = self.cells.keys().max()?;
        Some((*min, *max))
    }
}

/// An ordered collection of independent tapes sharing one blank symbol.
///
/// Operations are addressed by tape index; indices must be below
/// [`MultiTape::tape_count`], out-of-range access panics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiTape {
    tapes: Vec<Tape>,
}

impl MultiTape {
    /// Creates `tape_count` empty tapes.
    pub fn new(tape_count: usize, blank: char) -> Self {
        Self {
            tapes: (0..tape_count).map(|_| Tape::new(blank)).collect(),
        }
    }

    /// Creates `tape_count` tapes with `input` placed on tape 0; the
    /// remaining tapes start blank.
    pub fn with_input(tape_count: usize, input: &str, blank: char) -> Self {
        let mut tapes = Self::new(tape_count, blank);
        tapes.reset(input);
        tapes
    }

    /// Returns the number of tapes.
    pub fn tape_count(&self) -> usize {
        self.tapes.len()
    }

    /// Reads the symbol under the head of tape `index`.
    pub fn read(&self, index: usize) -> char {
        self.tapes[index].read()
    }

    /// Writes `symbol` under the head of tape `index`.
    pub fn write(&mut self, index: usize, symbol: char) {
        self.tapes[index].write(symbol);
    }

    /// Applies `movement` to the head of tape `index`; `Stay` is a no-op.
    pub fn move_head(&mut self, index: usize, movement: Movement) {
        match movement {
            Movement::Left => self.tapes[index].move_left(),
            Movement::Right => self.tapes[index].move_right(),
            Movement::Stay => {}
        }
    }

    /// Returns the head position of tape `index`.
    pub fn head_position(&self, index: usize) -> i64 {
        self.tapes[index].head_position()
    }

    /// Returns the head positions of all tapes, in tape order.
    pub fn head_positions(&self) -> Vec<i64> {
        self.tapes.iter().map(Tape::head_position).collect()
    }

    /// Reads the symbols under all heads, in tape order.
    pub fn read_all(&self) -> Vec<char> {
        self.tapes.iter().map(Tape::read).collect()
    }

    /// Returns the content window of every tape, in tape order.
    pub fn contents(&self) -> Vec<String> {
        self.tapes.iter().map(Tape::content).collect()
    }

    /// Returns a view of tape `index`.
    pub fn tape(&self, index: usize) -> &Tape {
        &self.tapes[index]
    }

    /// Resets tape 0 to `input` and clears all other tapes.
    pub fn reset(&mut self, input: &str) {
        for (index, tape) in self.tapes.iter_mut().enumerate() {
            if index == 0 {
                tape.reset(input);
            } else {
                tape.reset("");
            }
        }
    }

    /// Renders every tape as one line, heads bracketed.
    pub fn render(&self, window: i64) -> String {
        self.tapes
            .iter()
            .enumerate()
            .map(|(index, tape)| format!("tape {index}: {}", tape.render(window)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
