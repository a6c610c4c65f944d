use crate::parser::parse;
use crate::types::{Program, UtmError};

use std::sync::RwLock;
use tracing::warn;

// Default embedded programs: (name, description, encoding)
const PROGRAM_TEXTS: [(&str, &str, &str); 4] = [
    (
        "even-length",
        "Accepts when the input has an even number of cells",
        include_str!("../machines/even-length.utm"),
    ),
    (
        "bounce",
        "Walks right to the first blank, back to the start marker, then accepts",
        include_str!("../machines/bounce.utm"),
    ),
    (
        "endless-loop",
        "Moves right forever; always stopped by the iteration cap",
        include_str!("../machines/endless-loop.utm"),
    ),
    (
        "single-step",
        "Applies one transition and halts in a non-final state",
        include_str!("../machines/single-step.utm"),
    ),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<ProgramInfo>> = RwLock::new(Vec::new());
}

/// A built-in program together with its catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramInfo {
    pub name: String,
    pub description: String,
    pub program: Program,
}

impl ProgramInfo {
    /// The encoded bit string of the program.
    pub fn encoding(&self) -> &str {
        &self.program.encoding
    }
}

pub struct ProgramManager;

impl ProgramManager {
    /// Decodes the embedded programs into the registry. Does nothing when the
    /// registry is already populated.
    pub fn load() -> Result<(), UtmError> {
        let mut write_guard = PROGRAMS
            .write()
            .map_err(|_| UtmError::File("Failed to acquire write lock".to_string()))?;

        if !write_guard.is_empty() {
            return Ok(());
        }

        for (name, description, text) in PROGRAM_TEXTS {
            match parse(text.trim()) {
                Ok(program) => {
                    write_guard.push(ProgramInfo {
                        name: name.to_string(),
                        description: description.to_string(),
                        program,
                    });
                }
                Err(e) => warn!(program = name, error = %e, "Failed to parse built-in program"),
            }
        }

        Ok(())
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<ProgramInfo, UtmError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| UtmError::File("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|info| info.name == name)
            .cloned()
            .ok_or_else(|| UtmError::UnknownProgram(name.to_string()))
    }

    /// List every program as `(name, description)` pairs, in catalog order.
    pub fn list() -> Vec<(String, String)> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| {
                programs
                    .iter()
                    .map(|info| (info.name.clone(), info.description.clone()))
                    .collect()
            })
            .unwrap_or_else(|_| Vec::new())
    }
}
