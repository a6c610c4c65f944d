//! This crate provides the core logic for a universal Turing machine.
//! It decodes a machine and its input from a single unary binary string, runs the
//! machine on a growable work tape under an iteration cap, and reports whether the
//! input was accepted. It also includes tools for tracing runs, encoding machine
//! descriptions, and a catalog of built-in programs.

pub mod analyzer;
pub mod codec;
pub mod encoder;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod table;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the program checks from the analyzer module.
pub use analyzer::{analyze, lint, AnalysisWarning};
/// Re-exports the encoding functions and machine descriptions from the encoder module.
pub use encoder::{decode, encode, MachineSpec, TransitionSpec};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the execution engine and the top-level decision function.
pub use machine::{decide, UniversalMachine};
/// Re-exports the tokenizer and section splitter from the parser module.
pub use parser::{parse, split_program, tokenize, Sections};
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
pub use table::{Entry, FinalStates, PartialRecord, TransitionTable};
pub use tape::Tape;
pub use trace::{trace, Frame, Trace};
/// Re-exports the types describing programs, runs and their failures.
pub use types::{
    Action, Direction, ExecutionLimitError, FormatError, MachineConfig, Outcome, Program,
    Rejection, Status, Step, Transition, UtmError, Word, DEFAULT_MAX_STEPS,
};
