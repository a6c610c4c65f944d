//! A printable record of a run: the initial tapes and every configuration the
//! machine passes through, in the bit layout of the encoding.

use serde::Serialize;
use std::fmt;

use crate::machine::UniversalMachine;
use crate::parser::parse;
use crate::types::{FormatError, MachineConfig, Outcome, Program, Step};

const BANNER_WIDTH: usize = 30;

/// One configuration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Frame {
    /// Transitions applied before this configuration.
    pub step: usize,
    /// The state register, as bits.
    pub state: String,
    /// The work tape, as bits.
    pub tape: String,
    /// Bit offset of the head within `tape`.
    pub head: usize,
}

impl Frame {
    fn capture(machine: &UniversalMachine<'_>) -> Self {
        Self {
            step: machine.step_count(),
            state: machine.register().bits(),
            tape: machine.tape().bits(),
            head: machine.tape().head_offset(),
        }
    }
}

/// The full trace of a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// The encoded program: final states, machine and input.
    pub encoding: String,
    /// The initial work tape, with the start marker and a blank cell added.
    pub work_tape: String,
    /// The initial state register.
    pub state_register: String,
    pub frames: Vec<Frame>,
    pub outcome: Outcome,
}

/// Runs an encoded program and records every configuration.
///
/// A malformed encoding yields a trace without frames.
pub fn trace(encoded: &str, config: &MachineConfig) -> Trace {
    match parse(encoded) {
        Ok(program) => Trace::record(&program, config),
        Err(error) => Trace::malformed(encoded, error),
    }
}

impl Trace {
    /// Runs an already decoded program and records every configuration.
    pub fn record(program: &Program, config: &MachineConfig) -> Self {
        let mut machine = UniversalMachine::new(program, *config);
        let mut frames = vec![Frame::capture(&machine)];

        let outcome = loop {
            match machine.step() {
                Step::Continue => frames.push(Frame::capture(&machine)),
                Step::Halt(outcome) => break outcome,
            }
        };

        Self {
            encoding: program.encoding.clone(),
            work_tape: program.work_tape_bits(),
            state_register: program.start_state().to_string(),
            frames,
            outcome,
        }
    }

    /// A trace for an encoding that failed to decode.
    pub fn malformed(encoded: &str, error: FormatError) -> Self {
        Self {
            encoding: encoded.to_string(),
            work_tape: String::new(),
            state_register: String::new(),
            frames: Vec::new(),
            outcome: Outcome::Malformed(error),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "-".repeat(BANNER_WIDTH))?;
        writeln!(f, "step {}, current state: {}", self.step, self.state)?;
        writeln!(f, "work tape:")?;
        writeln!(f, "\t{}", self.tape)?;
        writeln!(f, "\t{}^", " ".repeat(self.head))?;
        writeln!(f, "{}", "-".repeat(BANNER_WIDTH))
    }
}

impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", "=".repeat(BANNER_WIDTH))?;
        writeln!(f, "initial configuration:")?;
        writeln!(f, "\tencoded machine (final states + transitions + input):")?;
        writeln!(f, "\t\t{}", self.encoding)?;
        writeln!(f, "\twork tape (input between start marker and blank):")?;
        writeln!(f, "\t\t{}", self.work_tape)?;
        writeln!(f, "\tstate register:")?;
        writeln!(f, "\t\t{}", self.state_register)?;
        writeln!(f, "{}", "=".repeat(BANNER_WIDTH))?;

        for frame in &self.frames {
            writeln!(f)?;
            write!(f, "{frame}")?;
        }

        writeln!(f)?;
        match &self.outcome {
            Outcome::Malformed(error) => write!(f, "result: {} ({error})", self.outcome.label()),
            outcome => write!(f, "result: {}", outcome.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tape::Tape;

    #[test]
    fn test_trace_frames() {
        // 1 00 1 0 1 0 11 0 1 0 1 000 1
        let trace = trace("10010101101010001", &MachineConfig::default());

        assert_eq!(trace.work_tape, "101011");
        assert_eq!(trace.state_register, "1");
        assert_eq!(trace.outcome, Outcome::RejectedHalted);
        assert_eq!(
            trace.frames,
            vec![
                Frame {
                    step: 0,
                    state: "1".into(),
                    tape: "101011".into(),
                    head: 2,
                },
                Frame {
                    step: 1,
                    state: "11".into(),
                    tape: "101011".into(),
                    head: 4,
                },
            ]
        );
    }

    #[test]
    fn test_frame_heads_point_at_cells() {
        let trace = trace(
            "1110010111010111010010110110110110011011101101110110011010111010100011101110111",
            &MachineConfig::default(),
        );

        assert_eq!(trace.frames.len(), 9);
        for frame in &trace.frames {
            let tape = Tape::from_bits(&frame.tape, frame.head).unwrap();
            assert_eq!(tape.bits(), frame.tape);
            assert_eq!(tape.head_offset(), frame.head);
        }
    }

    #[test]
    fn test_record_parsed_program() {
        let program = parse("110010101101010001").unwrap();
        let trace = Trace::record(&program, &MachineConfig::default());

        assert_eq!(trace.outcome, Outcome::Accepted);
        assert_eq!(trace.frames.len(), 2);
        assert_eq!(trace.encoding, "110010101101010001");
    }

    #[test]
    fn test_trace_display_marks_head() {
        let trace = trace("10010101101010001", &MachineConfig::default());
        let text = trace.to_string();

        assert!(text.contains("\t101011\n\t    ^\n"));
        assert!(text.contains("step 1, current state: 11"));
        assert!(text.ends_with("result: rejected_halted"));
    }

    #[test]
    fn test_trace_malformed() {
        let trace = trace("1001", &MachineConfig::default());

        assert!(trace.frames.is_empty());
        assert_eq!(
            trace.outcome,
            Outcome::Malformed(FormatError::MissingInputSeparator)
        );
        assert!(trace.to_string().contains("result: malformed (missing separator"));
    }

    #[test]
    fn test_trace_json() {
        let trace = trace("1001010110101000", &MachineConfig::default());
        let json: serde_json::Value = serde_json::from_str(&trace.to_json().unwrap()).unwrap();

        assert_eq!(json["outcome"]["result"], "accepted");
        assert_eq!(json["frames"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["frames"][0]["head"], 2);
    }
}
