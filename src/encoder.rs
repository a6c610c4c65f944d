//! This module provides encoding functionality for converting a readable machine
//! description into the unary binary format run by the universal machine, and back.

use serde::{Deserialize, Serialize};

use crate::codec::encode_cells;
use crate::parser::parse;
use crate::types::{Direction, Program, UtmError, Word};

/// A machine description where every word is given by its unary length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSpec {
    /// Accepting states.
    pub final_states: Vec<usize>,
    /// Transition entries, in encoding order.
    pub transitions: Vec<TransitionSpec>,
    /// Input symbols, one per cell.
    pub input: Vec<usize>,
}

/// A single rule: `(state, symbol) -> (next_state, new_symbol, direction)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionSpec {
    pub state: usize,
    pub symbol: usize,
    pub next_state: usize,
    pub new_symbol: usize,
    pub direction: Direction,
}

impl From<&Program> for MachineSpec {
    fn from(program: &Program) -> Self {
        Self {
            final_states: program
                .final_states
                .sorted()
                .iter()
                .map(Word::len)
                .collect(),
            transitions: program
                .transitions
                .transitions()
                .map(|t| TransitionSpec {
                    state: t.state.len(),
                    symbol: t.symbol.len(),
                    next_state: t.action.next_state.len(),
                    new_symbol: t.action.new_symbol.len(),
                    direction: t.action.direction,
                })
                .collect(),
            input: program.input.iter().map(Word::len).collect(),
        }
    }
}

/// Encodes a machine description into its bit string.
///
/// Format: `finals 00 transition (00 transition)* 000 input`, where final states and
/// input symbols are separated by single `0`s and each transition is five words
/// separated by single `0`s.
///
/// # Returns
///
/// * `Ok(String)` - the encoded program.
/// * `Err(UtmError::Encoding)` if a word has length zero or there are no transitions.
pub fn encode(spec: &MachineSpec) -> Result<String, UtmError> {
    if spec.transitions.is_empty() {
        return Err(UtmError::Encoding(
            "At least one transition is required".to_string(),
        ));
    }

    let finals = encode_words(&spec.final_states, "final state")?;
    let transitions = spec
        .transitions
        .iter()
        .map(encode_transition)
        .collect::<Result<Vec<_>, _>>()?
        .join("00");
    let input = encode_words(&spec.input, "input symbol")?;

    Ok(format!("{finals}00{transitions}000{input}"))
}

/// Decodes an encoded program into a machine description.
pub fn decode(encoded: &str) -> Result<MachineSpec, UtmError> {
    let program = parse(encoded)?;
    Ok(MachineSpec::from(&program))
}

fn encode_transition(transition: &TransitionSpec) -> Result<String, UtmError> {
    encode_words(
        &[
            transition.state,
            transition.symbol,
            transition.next_state,
            transition.new_symbol,
            transition.direction.word().len(),
        ],
        "transition word",
    )
}

/// Encodes lengths as words separated by single clear bits.
fn encode_words(lengths: &[usize], what: &str) -> Result<String, UtmError> {
    let words = lengths
        .iter()
        .map(|&len| Word::new(len).ok_or_else(|| UtmError::Encoding(format!("Empty {what}"))))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(encode_cells(&words))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(
        state: usize,
        symbol: usize,
        next_state: usize,
        new_symbol: usize,
        direction: Direction,
    ) -> TransitionSpec {
        TransitionSpec {
            state,
            symbol,
            next_state,
            new_symbol,
            direction,
        }
    }

    fn create_test_spec() -> MachineSpec {
        MachineSpec {
            final_states: vec![1],
            transitions: vec![rule(1, 1, 2, 1, Direction::Right)],
            input: vec![1],
        }
    }

    #[test]
    fn test_encode_program() {
        let encoded = encode(&create_test_spec()).unwrap();
        assert_eq!(encoded, "10010101101010001");
    }

    #[test]
    fn test_encode_multiple_records() {
        let spec = MachineSpec {
            final_states: vec![1, 3],
            transitions: vec![
                rule(1, 1, 2, 2, Direction::Right),
                rule(2, 2, 1, 1, Direction::Left),
            ],
            input: vec![1, 2],
        };

        assert_eq!(
            encode(&spec).unwrap(),
            "101110010101101101001101101010110001011"
        );
    }

    #[test]
    fn test_encode_empty_input_and_finals() {
        let spec = MachineSpec {
            final_states: vec![],
            transitions: vec![rule(1, 2, 2, 2, Direction::Right)],
            input: vec![],
        };

        assert_eq!(encode(&spec).unwrap(), "00101101101101000");
    }

    #[test]
    fn test_encode_rejects_empty_words() {
        let mut spec = create_test_spec();
        spec.input = vec![1, 0];
        assert!(matches!(encode(&spec), Err(UtmError::Encoding(_))));

        let mut spec = create_test_spec();
        spec.transitions.clear();
        assert!(matches!(encode(&spec), Err(UtmError::Encoding(_))));
    }

    #[test]
    fn test_decode() {
        let spec = decode("1011100101011011010011011010101100010111").unwrap();

        assert_eq!(spec.final_states, vec![1, 3]);
        assert_eq!(spec.input, vec![1, 3]);
        assert_eq!(spec.transitions.len(), 2);
        assert_eq!(spec.transitions[1], rule(2, 2, 1, 1, Direction::Left));
    }

    #[test]
    fn test_decode_invalid() {
        let result = decode("1011");
        assert!(matches!(result, Err(UtmError::Format(_))));
    }
}
