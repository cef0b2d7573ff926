//! JSON interchange for machine definitions.
//!
//! [`encode`] renders a definition as JSON with every collection sorted, so
//! equal machines encode to equal text; [`decode`] rebuilds the machine
//! through the same validated mutators a programmatic builder uses, so the
//! interchange format cannot bypass construction checks.

use serde::{Deserialize, Serialize};

use crate::machine::MachineDefinition;
use crate::transition::MultiTransition;
use crate::types::{LoadError, Movement};

/// Serde mirror of a machine definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MachineData {
    tape_count: usize,
    blank_symbol: char,
    states: Vec<String>,
    input_alphabet: Vec<char>,
    tape_alphabet: Vec<char>,
    initial_state: Option<String>,
    accept_states: Vec<String>,
    transitions: Vec<TransitionData>,
}

/// Serde mirror of one transition rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransitionData {
    from: String,
    reads: Vec<char>,
    to: String,
    writes: Vec<char>,
    movements: Vec<Movement>,
}

/// Encodes a machine definition as pretty-printed JSON.
pub fn encode(machine: &MachineDefinition) -> Result<String, LoadError> {
    let mut states: Vec<String> = machine.states().iter().cloned().collect();
    states.sort();
    let mut input_alphabet: Vec<char> = machine.input_alphabet().iter().copied().collect();
    input_alphabet.sort_unstable();
    let mut tape_alphabet: Vec<char> = machine.tape_alphabet().iter().copied().collect();
    tape_alphabet.sort_unstable();
    let mut accept_states: Vec<String> = machine.accept_states().iter().cloned().collect();
    accept_states.sort();

    let mut transitions: Vec<TransitionData> = machine
        .transitions()
        .map(|transition| TransitionData {
            from: transition.from_state().to_string(),
            reads: transition.reads().to_vec(),
            to: transition.to_state().to_string(),
            writes: transition.writes().to_vec(),
            movements: transition.movements().to_vec(),
        })
        .collect();
    transitions.sort_by(|a, b| (&a.from, &a.reads).cmp(&(&b.from, &b.reads)));

    let data = MachineData {
        tape_count: machine.tape_count(),
        blank_symbol: machine.blank_symbol(),
        states,
        input_alphabet,
        tape_alphabet,
        initial_state: machine.initial_state().map(str::to_string),
        accept_states,
        transitions,
    };

    serde_json::to_string_pretty(&data).map_err(|error| LoadError::Interchange(error.to_string()))
}

/// Decodes a machine definition from JSON produced by [`encode`].
///
/// The machine is rebuilt mutator by mutator and must pass the aggregate
/// validity check.
pub fn decode(json: &str) -> Result<MachineDefinition, LoadError> {
    let data: MachineData =
        serde_json::from_str(json).map_err(|error| LoadError::Interchange(error.to_string()))?;

    let mut machine = MachineDefinition::new(data.tape_count, data.blank_symbol)?;
    for state in &data.states {
        machine.add_state(state)?;
    }
    for &symbol in &data.input_alphabet {
        machine.add_input_symbol(symbol)?;
    }
    for &symbol in &data.tape_alphabet {
        machine.add_tape_symbol(symbol);
    }
    if let Some(state) = &data.initial_state {
        machine.set_initial_state(state)?;
    }
    for state in &data.accept_states {
        machine.add_accept_state(state)?;
    }
    for transition in data.transitions {
        machine.add_transition(MultiTransition::new(
            transition.from,
            transition.reads,
            transition.to,
            transition.writes,
            transition.movements,
        )?)?;
    }

    if !machine.is_valid() {
        return Err(LoadError::InvalidMachine);
    }
    Ok(machine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transition::Transition;

    fn copier() -> MachineDefinition {
        let mut machine = MachineDefinition::new(2, '.').unwrap();
        machine.set_initial_state("q0").unwrap();
        machine.add_accept_state("qf").unwrap();
        machine.add_input_symbol('1').unwrap();
        machine
            .add_transition(
                MultiTransition::new(
                    "q0",
                    vec!['1', '.'],
                    "q0",
                    vec!['1', '1'],
                    vec![Movement::Right, Movement::Right],
                )
                .unwrap(),
            )
            .unwrap();
        machine
            .add_transition(
                MultiTransition::new(
                    "q0",
                    vec!['.', '.'],
                    "qf",
                    vec!['.', '.'],
                    vec![Movement::Stay, Movement::Stay],
                )
                .unwrap(),
            )
            .unwrap();
        machine
    }

    #[test]
    fn encode_decode_round_trips() {
        let machine = copier();
        let json = encode(&machine).unwrap();
        let decoded = decode(&json).unwrap();

        assert!(decoded.is_valid());
        assert_eq!(decoded.tape_count(), machine.tape_count());
        assert_eq!(decoded.states(), machine.states());
        assert_eq!(decoded.input_alphabet(), machine.input_alphabet());
        assert_eq!(decoded.tape_alphabet(), machine.tape_alphabet());
        assert_eq!(decoded.initial_state(), machine.initial_state());
        assert_eq!(decoded.accept_states(), machine.accept_states());
        assert_eq!(decoded.transition_count(), machine.transition_count());
        for rule in machine.transitions() {
            assert_eq!(
                decoded.transition(rule.from_state(), rule.reads()),
                Some(rule)
            );
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let machine = copier();
        assert_eq!(encode(&machine).unwrap(), encode(&machine).unwrap());
    }

    #[test]
    fn malformed_json_is_an_interchange_error() {
        assert!(matches!(
            decode("{ not json"),
            Err(LoadError::Interchange(_))
        ));
    }

    #[test]
    fn incomplete_machines_do_not_decode() {
        let mut machine = MachineDefinition::single_tape('.');
        machine.add_state("q0").unwrap();
        // No initial state: encodes fine, but decode insists on validity.
        let json = encode(&machine).unwrap();
        assert_eq!(decode(&json), Err(LoadError::InvalidMachine));
    }

    #[test]
    fn single_tape_round_trip_keeps_the_rules() {
        let mut machine = MachineDefinition::single_tape('.');
        machine.set_initial_state("q0").unwrap();
        machine.add_accept_state("qf").unwrap();
        machine.add_input_symbol('1').unwrap();
        machine
            .add_mono_transition(Transition::new("q0", '1', "qf", '.', Movement::Left))
            .unwrap();

        let decoded = decode(&encode(&machine).unwrap()).unwrap();
        let rule = decoded.mono_transition("q0", '1').unwrap();
        assert_eq!(rule.to_state(), "qf");
        assert_eq!(rule.write(0), '.');
        assert_eq!(rule.movement(0), Movement::Left);
    }
}
