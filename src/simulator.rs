//! The execution engine.
//!
//! A [`Simulator`] borrows a read-only [`MachineDefinition`] and owns the
//! live [`Configuration`] of one run, together with the run's trace buffer
//! and the set of configuration fingerprints already visited. Each step
//! reads the symbols under all heads, looks up the one applicable transition,
//! then writes, moves, switches state and counts the step, in that order, so
//! a transition never observes its own write before moving.
//!
//! Runs never panic and never return `Err`: every call to
//! [`Simulator::simulate`] produces a [`SimulationResult`], with
//! [`Simulator::last_error`] holding the cause of an `Error` verdict and
//! [`Simulator::is_infinite_loop_detected`] separating a detected cycle from
//! an exhausted step limit.
//!
//! Cycle detection is a heuristic early exit, not a completeness guarantee:
//! revisiting a fingerprint proves non-termination, but a non-terminating
//! machine on an unbounded tape may never revisit one, so the step limit
//! remains the only hard cutoff.

use std::collections::HashSet;

use crate::configuration::{Configuration, Fingerprint};
use crate::machine::MachineDefinition;
use crate::types::{SimulationError, SimulationResult};

/// Lifecycle of a simulator.
///
/// `Idle` before the first run and after a reset, `Running` only inside
/// `simulate`; the remaining values are terminal per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Idle,
    Running,
    Accepted,
    Rejected,
    /// Cut off by the step limit without a detected cycle.
    InfiniteByLimit,
    /// Cut off by a repeated configuration fingerprint.
    InfiniteByCycle,
    Error,
}

/// Drives one machine over input words, one run at a time.
///
/// The definition is borrowed immutably, so any number of simulators can
/// share a machine; everything mutable belongs to the simulator itself and
/// is discarded on the next run or reset.
pub struct Simulator<'m> {
    machine: &'m MachineDefinition,
    config: Configuration,
    trace: Vec<Configuration>,
    visited: HashSet<Fingerprint>,
    trace_enabled: bool,
    max_steps: usize,
    status: RunStatus,
    last_error: Option<SimulationError>,
}

impl<'m> Simulator<'m> {
    pub fn new(machine: &'m MachineDefinition) -> Self {
        let config = Configuration::new(
            machine.initial_state().unwrap_or(""),
            machine.tape_count(),
            "",
            machine.blank_symbol(),
        );

        Self {
            machine,
            config,
            trace: Vec::new(),
            visited: HashSet::new(),
            trace_enabled: false,
            max_steps: 1000,
            status: RunStatus::Idle,
            last_error: None,
        }
    }

    /// Runs the machine on `input_word` until a verdict is reached.
    ///
    /// `max_steps` of 0 means no step limit; combined with a machine that
    /// neither halts nor revisits a configuration, such a run does not
    /// return, so callers wanting a guaranteed cutoff must pass a limit.
    ///
    /// The previous run's configuration, trace and visited set are discarded
    /// first. The word is placed on tape 0; all other tapes start blank.
    pub fn simulate(
        &mut self,
        input_word: &str,
        trace_enabled: bool,
        max_steps: usize,
    ) -> SimulationResult {
        self.trace_enabled = trace_enabled;
        self.max_steps = max_steps;

        if !self.machine.is_valid() {
            return self.fail(SimulationError::InvalidMachine);
        }
        if let Some(symbol) = input_word
            .chars()
            .find(|&symbol| !self.machine.is_input_symbol(symbol))
        {
            return self.fail(SimulationError::SymbolOutsideAlphabet(symbol));
        }

        self.reset(input_word);
        self.status = RunStatus::Running;
        self.visited.insert(self.config.fingerprint());
        self.record_trace();

        loop {
            if self.max_steps > 0 && self.config.step_count() >= self.max_steps {
                return self.finish(RunStatus::InfiniteByLimit);
            }

            // Acceptance wins over further transitions: a state can be
            // accepting and still have outgoing rules, none of which are
            // taken.
            if self.machine.is_accept_state(self.config.state()) {
                return self.finish(RunStatus::Accepted);
            }

            if !self.step() {
                return self.finish(RunStatus::Rejected);
            }

            let fingerprint = self.config.fingerprint();
            if !self.visited.insert(fingerprint) {
                return self.finish(RunStatus::InfiniteByCycle);
            }
            self.record_trace();
        }
    }

    /// Applies the single transition matching the current configuration.
    ///
    /// Returns false when no transition applies. This is one raw step for
    /// external drivers: none of the termination checks of
    /// [`Simulator::simulate`] happen here, and neither the trace nor the
    /// visited set is touched.
    pub fn step(&mut self) -> bool {
        let machine = self.machine;
        let symbols = self.config.tapes().read_all();
        let transition = match machine.transition(self.config.state(), &symbols) {
            Some(transition) => transition,
            None => return false,
        };

        // Write everything first, then move, then switch state: a rule must
        // not read its own writes through a moved head.
        for index in 0..machine.tape_count() {
            self.config.tapes_mut().write(index, transition.write(index));
        }
        for index in 0..machine.tape_count() {
            self.config
                .tapes_mut()
                .move_head(index, transition.movement(index));
        }
        self.config.set_state(transition.to_state().to_string());
        self.config.increment_step_count();

        true
    }

    /// Rebuilds the configuration for `input_word` and clears the trace,
    /// the visited set and any previous error.
    pub fn reset(&mut self, input_word: &str) {
        self.config.reset(
            self.machine.initial_state().unwrap_or(""),
            input_word,
        );
        self.trace.clear();
        self.visited.clear();
        self.last_error = None;
        self.status = RunStatus::Idle;
    }

    /// True when the current state is an accept state.
    pub fn is_accepting_state(&self) -> bool {
        self.machine.is_accept_state(self.config.state())
    }

    /// True when a transition applies to the current configuration.
    pub fn has_applicable_transition(&self) -> bool {
        self.machine
            .transition(self.config.state(), &self.config.tapes().read_all())
            .is_some()
    }

    /// Read-only view of the live configuration.
    pub fn current_configuration(&self) -> &Configuration {
        &self.config
    }

    /// The configurations of the last run, in order, starting with the
    /// initial one. Empty unless the last run had tracing enabled.
    pub fn trace(&self) -> &[Configuration] {
        &self.trace
    }

    /// Steps taken by the current run so far.
    pub fn step_count(&self) -> usize {
        self.config.step_count()
    }

    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// After an `Infinite` verdict: true when it came from a repeated
    /// configuration rather than the step limit.
    pub fn is_infinite_loop_detected(&self) -> bool {
        self.status == RunStatus::InfiniteByCycle
    }

    /// The cause of the last `Error` verdict, if any. Cleared by the next
    /// run or reset.
    pub fn last_error(&self) -> Option<&SimulationError> {
        self.last_error.as_ref()
    }

    pub fn set_trace_enabled(&mut self, enabled: bool) {
        self.trace_enabled = enabled;
    }

    /// Changes the step limit; 0 disables it.
    pub fn set_max_steps(&mut self, max_steps: usize) {
        self.max_steps = max_steps;
    }

    fn record_trace(&mut self) {
        if self.trace_enabled {
            self.trace.push(self.config.clone());
        }
    }

    fn finish(&mut self, status: RunStatus) -> SimulationResult {
        self.status = status;
        match status {
            RunStatus::Accepted => SimulationResult::Accepted,
            RunStatus::Rejected => SimulationResult::Rejected,
            RunStatus::InfiniteByLimit | RunStatus::InfiniteByCycle => SimulationResult::Infinite,
            _ => SimulationResult::Error,
        }
    }

    fn fail(&mut self, error: SimulationError) -> SimulationResult {
        self.last_error = Some(error);
        self.status = RunStatus::Error;
        SimulationResult::Error
    }
}
