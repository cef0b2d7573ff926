//! A registry of embedded, known-good machine definitions.
//!
//! The definition files under `machines/` are compiled into the binary and
//! parsed on first use; callers look them up by name or index without
//! touching the filesystem.

use std::sync::RwLock;

use crate::loader::DefinitionLoader;
use crate::machine::MachineDefinition;
use crate::types::LoadError;

// Embedded definition files.
const MACHINE_TEXTS: [(&str, &str); 4] = [
    ("unary-increment", include_str!("../machines/unary-increment.tm")),
    (
        "binary-complement",
        include_str!("../machines/binary-complement.tm"),
    ),
    ("even-length", include_str!("../machines/even-length.tm")),
    ("two-tape-copy", include_str!("../machines/two-tape-copy.tm")),
];

lazy_static::lazy_static! {
    static ref MACHINES: RwLock<Vec<(String, MachineDefinition)>> = RwLock::new(Vec::new());
}

pub struct MachineCatalog;

impl MachineCatalog {
    /// Parses the embedded definitions into the registry. Called implicitly
    /// by every accessor; calling it again reloads the registry.
    pub fn load() -> Result<(), LoadError> {
        let mut machines = Vec::new();
        for (name, text) in MACHINE_TEXTS {
            let machine = DefinitionLoader::load_from_str(text)?;
            machines.push((name.to_string(), machine));
        }

        let mut registry = MACHINES
            .write()
            .map_err(|_| LoadError::File("catalog lock poisoned".to_string()))?;
        *registry = machines;
        Ok(())
    }

    /// Number of machines in the catalog.
    pub fn count() -> usize {
        let _ = Self::ensure_loaded();
        MACHINES.read().map(|registry| registry.len()).unwrap_or(0)
    }

    /// Names of all catalog machines, in registry order.
    pub fn names() -> Vec<String> {
        let _ = Self::ensure_loaded();
        MACHINES
            .read()
            .map(|registry| registry.iter().map(|(name, _)| name.clone()).collect())
            .unwrap_or_default()
    }

    /// Looks a machine up by name.
    pub fn by_name(name: &str) -> Result<MachineDefinition, LoadError> {
        Self::ensure_loaded()?;
        MACHINES
            .read()
            .map_err(|_| LoadError::File("catalog lock poisoned".to_string()))?
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, machine)| machine.clone())
            .ok_or_else(|| LoadError::File(format!("no catalog machine named '{name}'")))
    }

    /// Looks a machine up by registry index.
    pub fn by_index(index: usize) -> Result<MachineDefinition, LoadError> {
        Self::ensure_loaded()?;
        MACHINES
            .read()
            .map_err(|_| LoadError::File("catalog lock poisoned".to_string()))?
            .get(index)
            .map(|(_, machine)| machine.clone())
            .ok_or_else(|| LoadError::File(format!("catalog index {index} out of range")))
    }

    fn ensure_loaded() -> Result<(), LoadError> {
        let empty = MACHINES
            .read()
            .map(|registry| registry.is_empty())
            .unwrap_or(true);
        if empty {
            Self::load()?;
        }
        Ok(())
    }
}
