//! Loading and saving of textual machine definitions.
//!
//! The format is line-oriented, with `#` comments and blank lines ignored.
//! Sections appear in a fixed order, one line each, except transitions which
//! run to the end of the file:
//!
//! ```text
//! # multi-tape machines start with a marker line; without it the
//! # definition describes a single-tape machine
//! MULTITAPE 2
//! q0 q1 qf            # states
//! 0 1                 # input alphabet
//! 0 1 .               # tape alphabet
//! q0                  # initial state
//! .                   # blank symbol
//! qf                  # accept states
//! q0 0,. q0 0,0 R,R   # transitions, one per line
//! q0 1,. q0 1,1 R,R
//! q0 .,. qf .,. S,S
//! ```
//!
//! A transition line is always five tokens: source state, read symbols,
//! target state, write symbols, movements, with the per-tape slots joined by
//! commas, which for one tape degenerates to `q0 1 q1 0 R`. Symbol tokens
//! are single characters; the token `space` denotes the space character;
//! movements are `L`, `R` or `S` (case-insensitive).
//!
//! The loader drives the same validated mutators a programmatic builder
//! uses, and only returns machines whose aggregate validity check holds.

use std::fs;
use std::path::Path;

use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;

use crate::machine::MachineDefinition;
use crate::transition::MultiTransition;
use crate::types::{LoadError, Movement, DEFAULT_BLANK_SYMBOL};

/// Marker token opening a multi-tape definition.
const MULTITAPE_MARKER: &str = "MULTITAPE";

/// Derives the line/token parser from `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// One content line: its 1-based line number and its tokens.
type Line = (usize, Vec<String>);

/// Loads and saves machine definitions.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a definition from a file, auto-detecting the multi-tape marker.
    pub fn load_from_path(path: &Path) -> Result<MachineDefinition, LoadError> {
        let content = fs::read_to_string(path).map_err(|error| {
            LoadError::File(format!("failed to read {}: {}", path.display(), error))
        })?;
        Self::load_from_str(&content)
    }

    /// Loads a definition from text, auto-detecting the multi-tape marker.
    pub fn load_from_str(content: &str) -> Result<MachineDefinition, LoadError> {
        let lines = tokenize(content)?;
        build_machine(&lines)
    }

    /// Writes a definition in the format [`DefinitionLoader::load_from_path`]
    /// reads.
    pub fn save_to_path(path: &Path, machine: &MachineDefinition) -> Result<(), LoadError> {
        fs::write(path, Self::to_definition_string(machine)).map_err(|error| {
            LoadError::File(format!("failed to write {}: {}", path.display(), error))
        })
    }

    /// Renders a definition as sectioned text, sets sorted for stable output.
    ///
    /// The format has no way to write an empty section line, so definitions
    /// with an empty input alphabet or no accept states do not survive a
    /// save/load round trip.
    pub fn to_definition_string(machine: &MachineDefinition) -> String {
        let sorted = |items: Vec<String>| {
            let mut items = items;
            items.sort();
            items.join(" ")
        };
        let states = sorted(machine.states().iter().cloned().collect());
        let input_alphabet = sorted(
            machine
                .input_alphabet()
                .iter()
                .map(|symbol| symbol.to_string())
                .collect(),
        );
        let tape_alphabet = sorted(
            machine
                .tape_alphabet()
                .iter()
                .map(|symbol| symbol.to_string())
                .collect(),
        );
        let accept_states = sorted(machine.accept_states().iter().cloned().collect());
        let mut transitions: Vec<String> = machine
            .transitions()
            .map(|transition| transition.to_string())
            .collect();
        transitions.sort();

        let mut out = String::from("# machine definition\n");
        if machine.tape_count() > 1 {
            out.push_str(&format!("{} {}\n", MULTITAPE_MARKER, machine.tape_count()));
        }
        out.push_str("# states\n");
        out.push_str(&format!("{states}\n"));
        out.push_str("# input alphabet\n");
        out.push_str(&format!("{input_alphabet}\n"));
        out.push_str("# tape alphabet\n");
        out.push_str(&format!("{tape_alphabet}\n"));
        out.push_str("# initial state\n");
        out.push_str(&format!("{}\n", machine.initial_state().unwrap_or("")));
        out.push_str("# blank symbol\n");
        out.push_str(&format!("{}\n", machine.blank_symbol()));
        out.push_str("# accept states\n");
        out.push_str(&format!("{accept_states}\n"));
        out.push_str("# transitions\n");
        for line in &transitions {
            out.push_str(&format!("{line}\n"));
        }
        out
    }
}

/// Runs the pest grammar and collects the content lines with their numbers.
fn tokenize(content: &str) -> Result<Vec<Line>, LoadError> {
    let file = DefinitionParser::parse(Rule::file, content)
        .map_err(|error| LoadError::Syntax(Box::new(error)))?
        .next()
        .expect("grammar always yields one file pair");

    let mut lines = Vec::new();
    for pair in file.into_inner() {
        if pair.as_rule() == Rule::line {
            let number = pair.as_span().start_pos().line_col().0;
            let tokens = pair
                .into_inner()
                .filter(|token| token.as_rule() == Rule::token)
                .map(|token| token.as_str().to_string())
                .collect();
            lines.push((number, tokens));
        }
    }
    Ok(lines)
}

/// Interprets the content lines as sections and builds the machine.
fn build_machine(lines: &[Line]) -> Result<MachineDefinition, LoadError> {
    let mut rest = lines;
    let mut tape_count = 1usize;

    if let Some((number, tokens)) = rest.first() {
        if tokens[0].eq_ignore_ascii_case(MULTITAPE_MARKER) {
            if tokens.len() != 2 {
                return Err(format_error(
                    *number,
                    format!("expected '{MULTITAPE_MARKER} <tape count>'"),
                ));
            }
            tape_count = tokens[1].parse().map_err(|_| {
                format_error(*number, format!("'{}' is not a tape count", tokens[1]))
            })?;
            rest = &rest[1..];
        }
    }

    if rest.len() < 6 {
        let line = lines.last().map(|(number, _)| *number).unwrap_or(0);
        return Err(format_error(
            line,
            "incomplete definition: expected states, input alphabet, tape alphabet, \
             initial state, blank symbol and accept states sections"
                .to_string(),
        ));
    }

    let mut machine = MachineDefinition::new(tape_count, DEFAULT_BLANK_SYMBOL)?;

    // states
    let (_, states) = &rest[0];
    for state in states {
        machine.add_state(state)?;
    }

    // input alphabet
    let (number, symbols) = &rest[1];
    for token in symbols {
        machine.add_input_symbol(token_to_symbol(token, *number)?)?;
    }

    // tape alphabet
    let (number, symbols) = &rest[2];
    for token in symbols {
        machine.add_tape_symbol(token_to_symbol(token, *number)?);
    }

    // initial state
    let (number, tokens) = &rest[3];
    if tokens.len() != 1 {
        return Err(format_error(
            *number,
            "expected exactly one initial state".to_string(),
        ));
    }
    machine.set_initial_state(&tokens[0])?;

    // blank symbol
    let (number, tokens) = &rest[4];
    if tokens.len() != 1 {
        return Err(format_error(
            *number,
            "expected exactly one blank symbol".to_string(),
        ));
    }
    machine.set_blank_symbol(token_to_symbol(&tokens[0], *number)?);

    // accept states
    let (_, accept_states) = &rest[5];
    for state in accept_states {
        machine.add_accept_state(state)?;
    }

    // transitions
    for (number, tokens) in &rest[6..] {
        machine.add_transition(parse_transition(tokens, *number)?)?;
    }

    if !machine.is_valid() {
        return Err(LoadError::InvalidMachine);
    }
    Ok(machine)
}

/// Parses one transition line: `from reads to writes movements`, the
/// per-tape slots of the last three comma-joined.
fn parse_transition(tokens: &[String], number: usize) -> Result<MultiTransition, LoadError> {
    if tokens.len() != 5 {
        return Err(format_error(
            number,
            "a transition needs five fields: source state, read symbols, \
             target state, write symbols, movements"
                .to_string(),
        ));
    }

    let reads = split_symbols(&tokens[1], number)?;
    let writes = split_symbols(&tokens[3], number)?;
    let movements = tokens[4]
        .split(',')
        .map(|part| {
            let letter = single_char(part, number)?;
            Movement::from_letter(letter)
                .ok_or_else(|| format_error(number, format!("'{part}' is not a movement")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(MultiTransition::new(
        tokens[0].clone(),
        reads,
        tokens[2].clone(),
        writes,
        movements,
    )?)
}

fn split_symbols(token: &str, number: usize) -> Result<Vec<char>, LoadError> {
    token
        .split(',')
        .map(|part| token_to_symbol(part, number))
        .collect()
}

/// A symbol token is a single character, or the word `space`.
fn token_to_symbol(token: &str, number: usize) -> Result<char, LoadError> {
    if token == "space" {
        return Ok(' ');
    }
    single_char(token, number)
}

fn single_char(token: &str, number: usize) -> Result<char, LoadError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(format_error(
            number,
            format!("'{token}' must be a single character"),
        )),
    }
}

fn format_error(line: usize, message: String) -> LoadError {
    LoadError::Format { line, message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConstructionError;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const SCANNER: &str = "\
# scans 1s and accepts at the first blank
q0 qf
1
1 .
q0
.
qf
q0 1 q0 1 R
q0 . qf . S
";

    const COPIER: &str = "\
MULTITAPE 2
q0 qf
0 1
0 1 .
q0
.
qf
q0 0,. q0 0,0 R,R
q0 1,. q0 1,1 R,R
q0 .,. qf .,. S,S
";

    #[test]
    fn loads_a_single_tape_definition() {
        let machine = DefinitionLoader::load_from_str(SCANNER).unwrap();
        assert!(machine.is_valid());
        assert_eq!(machine.tape_count(), 1);
        assert_eq!(machine.initial_state(), Some("q0"));
        assert_eq!(machine.blank_symbol(), '.');
        assert!(machine.is_accept_state("qf"));
        assert_eq!(machine.transition_count(), 2);

        let rule = machine.mono_transition("q0", '1').unwrap();
        assert_eq!(rule.to_state(), "q0");
        assert_eq!(rule.movement(0), Movement::Right);
    }

    #[test]
    fn loads_a_multi_tape_definition() {
        let machine = DefinitionLoader::load_from_str(COPIER).unwrap();
        assert!(machine.is_valid());
        assert_eq!(machine.tape_count(), 2);
        assert_eq!(machine.transition_count(), 3);

        let rule = machine.transition("q0", &['1', '.']).unwrap();
        assert_eq!(rule.writes(), &['1', '1']);
        assert_eq!(rule.movements(), &[Movement::Right, Movement::Right]);
    }

    #[test]
    fn comments_and_blank_lines_are_ignored() {
        let noisy = "\n# leading comment\n\nq0 qf   # trailing comment\n1\n1 .\nq0\n.\nqf\nq0 1 qf 1 S\n\n";
        let machine = DefinitionLoader::load_from_str(noisy).unwrap();
        assert_eq!(machine.transition_count(), 1);
    }

    #[test]
    fn space_keyword_denotes_the_space_character() {
        let definition = "\
q0 qf
1
1 space
q0
space
qf
q0 1 q0 1 R
q0 space qf space S
";
        let machine = DefinitionLoader::load_from_str(definition).unwrap();
        assert_eq!(machine.blank_symbol(), ' ');
        assert!(machine.mono_transition("q0", ' ').is_some());
    }

    #[test]
    fn missing_sections_are_reported() {
        let result = DefinitionLoader::load_from_str("q0 qf\n1\n");
        assert!(matches!(result, Err(LoadError::Format { .. })));
    }

    #[test]
    fn bad_marker_is_reported_with_its_line() {
        let result = DefinitionLoader::load_from_str("MULTITAPE two\nq0\n1\n1 .\nq0\n.\nq0\n");
        match result {
            Err(LoadError::Format { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("tape count"));
            }
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn short_transition_line_is_reported_with_its_line() {
        let definition = "\
q0 qf
1
1 .
q0
.
qf
q0 1 qf
";
        match DefinitionLoader::load_from_str(definition) {
            Err(LoadError::Format { line, .. }) => assert_eq!(line, 7),
            other => panic!("expected a format error, got {other:?}"),
        }
    }

    #[test]
    fn undeclared_transition_state_is_a_construction_error() {
        let definition = "\
q0
1
1 .
q0
.
q0
q0 1 ghost 1 R
";
        assert_eq!(
            DefinitionLoader::load_from_str(definition),
            Err(LoadError::Construction(ConstructionError::UndeclaredState(
                "ghost".to_string()
            )))
        );
    }

    #[test]
    fn duplicate_transitions_are_rejected() {
        let definition = "\
q0 qf
1
1 .
q0
.
qf
q0 1 q0 1 R
q0 1 qf 1 S
";
        assert!(matches!(
            DefinitionLoader::load_from_str(definition),
            Err(LoadError::Construction(
                ConstructionError::DuplicateTransition { .. }
            ))
        ));
    }

    #[test]
    fn arity_mismatch_against_the_marker_is_rejected() {
        let definition = "\
MULTITAPE 2
q0 qf
1
1 .
q0
.
qf
q0 1 qf 1 R
";
        assert_eq!(
            DefinitionLoader::load_from_str(definition),
            Err(LoadError::Construction(
                ConstructionError::TapeCountMismatch {
                    expected: 2,
                    found: 1
                }
            ))
        );
    }

    #[test]
    fn loads_from_a_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scanner.tm");
        let mut file = File::create(&path).unwrap();
        file.write_all(SCANNER.as_bytes()).unwrap();

        let machine = DefinitionLoader::load_from_path(&path).unwrap();
        assert!(machine.is_valid());
    }

    #[test]
    fn missing_file_is_a_file_error() {
        let result = DefinitionLoader::load_from_path(Path::new("/no/such/definition.tm"));
        assert!(matches!(result, Err(LoadError::File(_))));
    }

    #[test]
    fn save_and_reload_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("copier.tm");

        let machine = DefinitionLoader::load_from_str(COPIER).unwrap();
        DefinitionLoader::save_to_path(&path, &machine).unwrap();
        let reloaded = DefinitionLoader::load_from_path(&path).unwrap();

        assert!(reloaded.is_valid());
        assert_eq!(reloaded.tape_count(), machine.tape_count());
        assert_eq!(reloaded.states(), machine.states());
        assert_eq!(reloaded.input_alphabet(), machine.input_alphabet());
        assert_eq!(reloaded.tape_alphabet(), machine.tape_alphabet());
        assert_eq!(reloaded.initial_state(), machine.initial_state());
        assert_eq!(reloaded.accept_states(), machine.accept_states());
        assert_eq!(reloaded.transition_count(), machine.transition_count());
        for rule in machine.transitions() {
            let reloaded_rule = reloaded
                .transition(rule.from_state(), rule.reads())
                .expect("every saved transition reloads");
            assert_eq!(reloaded_rule, rule);
        }
    }
}
