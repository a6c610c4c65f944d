//! This module defines the `UniversalMachine` struct, which runs a decoded program
//! against its own input. It owns the work tape, the state register and the step
//! counter of a single run; the program itself is borrowed read-only.

use tracing::{debug, info, warn};

use crate::parser::parse;
use crate::tape::Tape;
use crate::types::{
    ExecutionLimitError, FormatError, MachineConfig, Outcome, Program, Rejection, Status, Step,
    Word,
};

/// Decodes an encoded program and runs it to a decision.
///
/// This is the pure entry point of the crate: malformed encodings yield
/// `Outcome::Malformed` before any step executes.
pub fn decide(encoded: &str, config: &MachineConfig) -> Outcome {
    match parse(encoded) {
        Ok(program) => UniversalMachine::new(&program, *config).run(),
        Err(error) => Outcome::Malformed(error),
    }
}

/// A single run of a decoded program.
///
/// The work tape starts as `[marker] input... [blank]` with the head on the first
/// cell after the marker, and the state register starts in the start state.
#[derive(Debug, Clone)]
pub struct UniversalMachine<'a> {
    program: &'a Program,
    config: MachineConfig,
    register: Tape,
    tape: Tape,
    status: Status,
    step_count: usize,
}

impl<'a> UniversalMachine<'a> {
    /// Creates a run of `program` bounded by `config`.
    pub fn new(program: &'a Program, config: MachineConfig) -> Self {
        Self {
            program,
            config,
            register: Tape::register(program.start_state()),
            tape: initial_tape(program),
            status: Status::Running,
            step_count: 0,
        }
    }

    /// Executes a single step of the run.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition was applied.
    /// * `Step::Halt(outcome)` once the run is over. Further calls keep returning the
    ///   same outcome without touching the tapes.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.status.outcome() {
            return Step::Halt(outcome);
        }

        if let Err(error) = self.advance() {
            warn!(%error, step = self.step_count, "Run aborted by malformed program");
            self.status = Status::Faulted(error);
        }

        match self.status.outcome() {
            Some(outcome) => Step::Halt(outcome),
            None => Step::Continue,
        }
    }

    /// Runs until the machine halts, faults or reaches the iteration cap.
    pub fn run(&mut self) -> Outcome {
        loop {
            if let Step::Halt(outcome) = self.step() {
                return outcome;
            }
        }
    }

    /// Restores the initial configuration.
    pub fn reset(&mut self) {
        self.register = Tape::register(self.program.start_state());
        self.tape = initial_tape(self.program);
        self.status = Status::Running;
        self.step_count = 0;
    }

    /// Reads the state register and the work tape, then either applies the matching
    /// transition or settles the status.
    fn advance(&mut self) -> Result<(), FormatError> {
        let state = self.register.read()?;
        let symbol = self.tape.read()?;

        let Some(action) = self.program.transitions.lookup(state, symbol)?.copied() else {
            let accepted = self.program.final_states.contains(&state);
            self.status = if accepted {
                Status::Accepted
            } else {
                Status::Rejected(Rejection::Halted)
            };
            info!(%state, %symbol, steps = self.step_count, accepted, "Machine halted");
            return Ok(());
        };

        if self.step_count >= self.config.max_steps {
            warn!(max_steps = self.config.max_steps, %state, "Iteration cap reached");
            self.status = Status::Rejected(Rejection::StepLimit(ExecutionLimitError {
                max_steps: self.config.max_steps,
            }));
            return Ok(());
        }

        self.register.write(action.next_state)?;
        self.tape.write(action.new_symbol)?;
        self.tape.move_head(action.direction)?;
        self.step_count += 1;

        debug!(
            step = self.step_count,
            %state,
            %symbol,
            next_state = %action.next_state,
            new_symbol = %action.new_symbol,
            direction = ?action.direction,
            "Applied transition"
        );

        Ok(())
    }

    /// Returns the current state, or `None` if the register is unreadable.
    pub fn state(&self) -> Option<Word> {
        self.register.read().ok()
    }

    /// Returns the symbol under the work-tape head, if any.
    pub fn symbol(&self) -> Option<Word> {
        self.tape.read().ok()
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_halted(&self) -> bool {
        self.status.is_terminal()
    }

    /// Returns the number of transitions applied so far.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn register(&self) -> &Tape {
        &self.register
    }

    pub fn program(&self) -> &Program {
        self.program
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}

/// `[marker] input... [blank]`, with the head on the first cell after the marker.
fn initial_tape(program: &Program) -> Tape {
    Tape::new(program.work_tape(), 1)
}
