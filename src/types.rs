//! This module defines the core data structures and types used throughout the universal
//! machine, including words, tokens, directions, execution outcomes, and error types.

use serde::{ser::SerializeStruct, Deserialize, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::codec::encode_cells;
use crate::table::{FinalStates, TransitionTable};
use crate::Rule;

/// The "set" bit. Words are maximal runs of this symbol.
pub const SET_BIT: char = '1';
/// The "clear" bit. Runs of this symbol delimit words, records and sections.
pub const CLEAR_BIT: char = '0';
/// Gap depth separating two words of the same record.
pub const FIELD_DEPTH: usize = 1;
/// Gap depth separating two records, and the final states from the transitions.
pub const RECORD_DEPTH: usize = 2;
/// Gap depth separating the program from its input word.
pub const SECTION_DEPTH: usize = 3;
/// The maximum number of transitions applied before a run is rejected.
pub const DEFAULT_MAX_STEPS: usize = 1000;
/// Characters stripped from both ends of a raw encoded program.
pub const WHITESPACE: &[char] = &[' ', '\n', '\r', '\t', '\x0C', '\x0B'];

/// A unary-encoded identifier: a non-empty run of set bits.
///
/// Words are opaque. Two words are equal exactly when their runs have the
/// same length, so the length is all that is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Word(usize);

impl Word {
    /// The start state of every machine, and the left boundary marker of the work tape.
    pub const START: Word = Word(1);
    /// The blank cell appended when the head runs off the right end of the tape.
    pub const BLANK: Word = Word(2);

    /// Creates a word from its run length. Returns `None` for an empty run.
    pub fn new(len: usize) -> Option<Self> {
        (len > 0).then_some(Self(len))
    }

    /// Returns the length of the run.
    pub fn len(&self) -> usize {
        self.0
    }

    /// Always `false`; words are never empty. Provided alongside `len`.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for _ in 0..self.0 {
            write!(f, "{SET_BIT}")?;
        }
        Ok(())
    }
}

/// A decoded universal-machine program: accepting states, transitions and input.
///
/// A program is immutable once parsed and may back any number of runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The encoded string this program was decoded from.
    pub encoding: String,
    /// The accepting states.
    pub final_states: FinalStates,
    /// The transition table.
    pub transitions: TransitionTable,
    /// The input word, one symbol per cell.
    pub input: Vec<Word>,
}

impl Program {
    /// The state every run starts in.
    pub fn start_state(&self) -> Word {
        Word::START
    }

    /// The initial work tape: the start marker, the input cells, then one blank cell.
    pub fn work_tape(&self) -> Vec<Word> {
        let mut cells = Vec::with_capacity(self.input.len() + 2);
        cells.push(Word::START);
        cells.extend_from_slice(&self.input);
        cells.push(Word::BLANK);
        cells
    }

    /// The initial work tape in its bit layout.
    ///
    /// An input of `1011` yields `101011011`.
    pub fn work_tape_bits(&self) -> String {
        encode_cells(&self.work_tape())
    }
}

/// The kind of a token produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A maximal run of set bits.
    Word(Word),
    /// A maximal run of clear bits; the value is its depth.
    Gap(usize),
}

/// A single token of an encoded program, with its byte offset in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
}

impl Token {
    /// Returns the word carried by this token, if any.
    pub fn word(&self) -> Option<Word> {
        match self.kind {
            TokenKind::Word(word) => Some(word),
            TokenKind::Gap(_) => None,
        }
    }

    /// Returns the depth of this gap token, if it is one.
    pub fn gap(&self) -> Option<usize> {
        match self.kind {
            TokenKind::Gap(depth) => Some(depth),
            TokenKind::Word(_) => None,
        }
    }

    /// Number of bits covered by this token.
    pub fn len(&self) -> usize {
        match self.kind {
            TokenKind::Word(word) => word.len(),
            TokenKind::Gap(depth) => depth,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Byte offset one past the end of this token.
    pub fn end(&self) -> usize {
        self.start + self.len()
    }
}

/// Represents the possible directions the work-tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one cell to the left. Encoded as `11`.
    Left,
    /// Move the head one cell to the right. Encoded as `1`.
    Right,
}

impl Direction {
    /// Decodes a direction word.
    pub fn from_word(word: Word) -> Option<Self> {
        match word.len() {
            1 => Some(Direction::Right),
            2 => Some(Direction::Left),
            _ => None,
        }
    }

    /// Encodes the direction as a word.
    pub fn word(self) -> Word {
        match self {
            Direction::Right => Word(1),
            Direction::Left => Word(2),
        }
    }
}

/// The right-hand side of a transition entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub next_state: Word,
    pub new_symbol: Word,
    pub direction: Direction,
}

/// One decoded transition entry: `(state, symbol) -> (next_state, new_symbol, direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: Word,
    pub symbol: Word,
    pub action: Action,
}

/// Runtime configuration of the execution engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Maximum number of transitions a run may apply.
    pub max_steps: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl MachineConfig {
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// A transition was applied and the machine keeps running.
    Continue,
    /// The run is over.
    Halt(Outcome),
}

/// Status of the execution engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Running,
    Accepted,
    Rejected(Rejection),
    /// The run was aborted by a format violation discovered while stepping.
    Faulted(FormatError),
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running)
    }

    /// Maps a terminal status to its outcome. `None` while running.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Status::Running => None,
            Status::Accepted => Some(Outcome::Accepted),
            Status::Rejected(Rejection::Halted) => Some(Outcome::RejectedHalted),
            Status::Rejected(Rejection::StepLimit(_)) => Some(Outcome::RejectedCapExceeded),
            Status::Faulted(error) => Some(Outcome::Malformed(error.clone())),
        }
    }
}

/// Why a run was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// No transition applies and the current state is not final.
    Halted,
    /// The iteration cap was reached before the machine halted.
    StepLimit(ExecutionLimitError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Halted => write!(f, "halted in non-final state"),
            Rejection::StepLimit(e) => write!(f, "{e}"),
        }
    }
}

/// The decision produced for an encoded program.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted,
    RejectedHalted,
    RejectedCapExceeded,
    Malformed(FormatError),
}

impl Outcome {
    /// Short label used by front ends and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Accepted => "accepted",
            Outcome::RejectedHalted => "rejected_halted",
            Outcome::RejectedCapExceeded => "rejected_cap_exceeded",
            Outcome::Malformed(_) => "malformed",
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }

    /// Process exit code used by front ends.
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Accepted => 0,
            Outcome::RejectedHalted | Outcome::RejectedCapExceeded => 1,
            Outcome::Malformed(_) => 2,
        }
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let detail = match self {
            Outcome::Malformed(error) => Some(error.to_string()),
            _ => None,
        };

        let mut state = serializer.serialize_struct("Outcome", 2)?;
        state.serialize_field("result", self.label())?;
        state.serialize_field("detail", &detail)?;
        state.end()
    }
}

impl From<FormatError> for Outcome {
    fn from(error: FormatError) -> Self {
        Outcome::Malformed(error)
    }
}

/// Raised when a run reaches its iteration cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("exceeded iteration cap of {max_steps} steps")]
pub struct ExecutionLimitError {
    pub max_steps: usize,
}

/// Violations of the word/delimiter grammar of an encoded program.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// The encoded program is empty after trimming.
    #[error("input can't be empty")]
    Empty,
    /// A character outside `{0, 1}` was found.
    #[error("input must be composed of only 0's and 1's, found {found:?} at {position}")]
    InvalidCharacter { position: usize, found: char },
    /// The tokenizer grammar rejected the input.
    #[error("syntax error: {0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),
    /// No `000` separator between the program and its input.
    #[error("missing separator between machine and input (000)")]
    MissingInputSeparator,
    /// No `00` separator between the final states and the transitions.
    #[error("missing separator between final states and transitions (00)")]
    MissingTransitionSeparator,
    /// The input section does not begin and end with a word.
    #[error("input word must begin and end with 1")]
    InputBoundary,
    /// Two input words are separated by more than one clear bit.
    #[error("input words must be separated by a single 0 (run of {depth} at {position})")]
    InputGap { position: usize, depth: usize },
    /// A transition record holds fewer than five words.
    #[error("incomplete transition record at {position}: expected 5 words, found {found}")]
    IncompleteTransition { position: usize, found: usize },
    /// A transition record holds more than five words.
    #[error("oversized transition record at {position}: expected 5 words, found {found}")]
    OversizedTransition { position: usize, found: usize },
    /// The direction word of a transition is neither `1` nor `11`.
    #[error("invalid direction {word} at {position}")]
    InvalidDirection { position: usize, word: Word },
    /// A second transition for an already defined `(state, symbol)` pair.
    #[error("duplicate transition for state {state} and symbol {symbol} at {position}")]
    DuplicateTransition {
        position: usize,
        state: Word,
        symbol: Word,
    },
    /// A word was expected at the given position.
    #[error("head not on a word start at {position}")]
    NotOnWord { position: usize },
    /// The tape head points past the tape.
    #[error("head at cell {head} is outside the tape of {len} cells")]
    HeadOutOfTape { head: usize, len: usize },
    /// A left move was attempted from the start marker.
    #[error("attempted to move past the left boundary of the tape")]
    LeftBoundary,
}

/// Represents the errors surfaced by the library's outer layers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UtmError {
    /// The encoded program violates the format.
    #[error("Malformed program: {0}")]
    Format(#[from] FormatError),
    /// A program file could not be read.
    #[error("File error: {0}")]
    File(String),
    /// No built-in program has the requested name.
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
    /// A machine description cannot be encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_requires_non_empty_run() {
        assert_eq!(Word::new(0), None);
        assert_eq!(Word::new(3).map(|w| w.len()), Some(3));
        assert_eq!(Word::new(3).unwrap().to_string(), "111");
    }

    #[test]
    fn test_direction_words() {
        assert_eq!(Direction::from_word(Word(1)), Some(Direction::Right));
        assert_eq!(Direction::from_word(Word(2)), Some(Direction::Left));
        assert_eq!(Direction::from_word(Word(3)), None);
        assert_eq!(Direction::Left.word(), Word(2));
    }

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let right: Direction = serde_json::from_str("\"Right\"").unwrap();
        assert_eq!(right, Direction::Right);
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(MachineConfig::default().max_steps, DEFAULT_MAX_STEPS);

        let config: MachineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MachineConfig::default());

        let config: MachineConfig = serde_json::from_str(r#"{"max_steps": 5}"#).unwrap();
        assert_eq!(config.max_steps, 5);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Outcome::Accepted.exit_code(), 0);
        assert_eq!(Outcome::RejectedHalted.exit_code(), 1);
        assert_eq!(Outcome::RejectedCapExceeded.exit_code(), 1);
        assert_eq!(Outcome::Malformed(FormatError::Empty).exit_code(), 2);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&Outcome::Accepted).unwrap();
        assert_eq!(json, r#"{"result":"accepted","detail":null}"#);

        let json = serde_json::to_string(&Outcome::Malformed(FormatError::LeftBoundary)).unwrap();
        assert_eq!(
            json,
            r#"{"result":"malformed","detail":"attempted to move past the left boundary of the tape"}"#
        );
    }

    #[test]
    fn test_error_display() {
        let error = UtmError::from(FormatError::MissingInputSeparator);
        let msg = error.to_string();
        assert!(msg.contains("Malformed program"));
        assert!(msg.contains("000"));

        let limit = ExecutionLimitError { max_steps: 7 };
        assert_eq!(limit.to_string(), "exceeded iteration cap of 7 steps");
    }
}
