//! This module provides the `ProgramLoader` struct, responsible for loading encoded
//! programs from files and strings. Loading trims surrounding whitespace and checks
//! the alphabet before handing the bits to the parser.

use crate::parser::parse;
use crate::types::{FormatError, Program, UtmError, CLEAR_BIT, SET_BIT, WHITESPACE};
use std::fs;
use std::path::Path;

/// `ProgramLoader` is a utility struct for loading encoded programs.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads an encoded program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is read and decoded.
    /// * `Err(UtmError::File)` if the file cannot be read.
    /// * `Err(UtmError::Format)` if the content is not a valid encoding.
    pub fn load_program(path: &Path) -> Result<Program, UtmError> {
        let content = Self::read_encoding(path)?;
        Ok(parse(&content)?)
    }

    /// Loads an encoded program from string content.
    pub fn load_program_from_string(content: &str) -> Result<Program, UtmError> {
        Ok(parse(&Self::clean(content)?)?)
    }

    /// Reads a file and returns its cleaned encoding without decoding it.
    pub fn read_encoding(path: &Path) -> Result<String, UtmError> {
        let content = fs::read_to_string(path).map_err(|e| {
            UtmError::File(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(Self::clean(&content)?)
    }

    /// Strips surrounding whitespace and checks that what remains is a non-empty
    /// string of `0`s and `1`s.
    pub fn clean(content: &str) -> Result<String, FormatError> {
        let trimmed = content.trim_matches(WHITESPACE);

        if trimmed.is_empty() {
            return Err(FormatError::Empty);
        }

        if let Some((position, found)) = trimmed
            .char_indices()
            .find(|&(_, c)| c != SET_BIT && c != CLEAR_BIT)
        {
            return Err(FormatError::InvalidCharacter { position, found });
        }

        Ok(trimmed.to_string())
    }
}
