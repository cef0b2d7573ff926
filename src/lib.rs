//! This crate implements a deterministic Turing machine simulator for
//! single- and multi-tape machines: unbounded sparse tapes, validated
//! machine definitions, an execution engine with step-limit and
//! repeated-configuration cutoffs, a textual definition loader, a JSON
//! interchange codec and a catalog of embedded example machines.

pub mod catalog;
pub mod codec;
pub mod configuration;
pub mod loader;
pub mod machine;
pub mod simulator;
pub mod tape;
pub mod transition;
pub mod types;

/// Re-exports the `Rule` enum from the loader module, used by the `pest` grammar.
pub use crate::loader::Rule;
/// Re-exports the embedded machine registry.
pub use catalog::MachineCatalog;
/// Re-exports the JSON interchange functions.
pub use codec::{decode, encode};
/// Re-exports the configuration snapshot types.
pub use configuration::{Configuration, Fingerprint};
/// Re-exports the definition loader.
pub use loader::DefinitionLoader;
/// Re-exports the machine definition.
pub use machine::MachineDefinition;
/// Re-exports the execution engine.
pub use simulator::{RunStatus, Simulator};
/// Re-exports the tape types.
pub use tape::{MultiTape, Tape};
/// Re-exports the transition rule types.
pub use transition::{MultiTransition, Transition};
/// Re-exports the shared primitive and error types.
pub use types::{
    ConstructionError, LoadError, Movement, SimulationError, SimulationResult,
    DEFAULT_BLANK_SYMBOL,
};
