//! This module provides functions for analyzing decoded programs before execution.
//!
//! `analyze` rejects programs whose transition table is ambiguous. `lint` reports
//! suspicious but well-formed programs: states and final states that can never
//! be reached, and input symbols no transition reads.

use crate::types::{FormatError, Program, Word};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Non-fatal findings about a well-formed program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisWarning {
    /// States with outgoing transitions that the start state never reaches.
    #[error("Unreachable states detected: {}", format_words(.0))]
    UnreachableStates(Vec<Word>),
    /// Accepting states that the start state never reaches.
    #[error("Final states can never be reached: {}", format_words(.0))]
    UnreachableFinalStates(Vec<Word>),
    /// Input symbols that no transition reads.
    #[error("Input contains symbols not handled by any transition: {}", format_words(.0))]
    UnhandledInputSymbols(Vec<Word>),
}

/// Analyzes a program for format violations that parsing alone does not catch.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(FormatError::DuplicateTransition)` if two records share a `(state, symbol)` pair.
pub fn analyze(program: &Program) -> Result<(), FormatError> {
    check_duplicate_transitions(program)
}

/// Runs every lint over a program and collects the findings, in a fixed order.
pub fn lint(program: &Program) -> Vec<AnalysisWarning> {
    [
        check_unreachable_states,
        check_unreachable_final_states,
        check_input_symbols,
    ]
    .iter()
    .filter_map(|f| f(program).err())
    .collect()
}

/// Checks that at most one record exists for each `(state, symbol)` pair.
///
/// The first duplicate in encoding order is reported.
fn check_duplicate_transitions(program: &Program) -> Result<(), FormatError> {
    let mut seen = HashMap::new();

    for entry in program.transitions.entries() {
        let key = (entry.transition.state, entry.transition.symbol);
        if seen.insert(key, entry.position).is_some() {
            return Err(FormatError::DuplicateTransition {
                position: entry.position,
                state: key.0,
                symbol: key.1,
            });
        }
    }

    Ok(())
}

/// Collects every state reachable from the start state by following transitions,
/// using a depth-first traversal. The start state itself is always reachable.
fn reachable_states(program: &Program) -> HashSet<Word> {
    let mut visited = HashSet::new();
    let mut queue = vec![program.start_state()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for transition in program.transitions.transitions() {
            if transition.state == state && !visited.contains(&transition.action.next_state) {
                queue.push(transition.action.next_state);
            }
        }
    }

    visited
}

/// Checks for states with outgoing transitions that cannot be reached from the start state.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisWarning> {
    let reachable = reachable_states(program);

    let mut unreachable: Vec<Word> = program
        .transitions
        .transitions()
        .map(|t| t.state)
        .filter(|state| !reachable.contains(state))
        .collect();

    if !unreachable.is_empty() {
        unreachable.sort();
        unreachable.dedup();
        return Err(AnalysisWarning::UnreachableStates(unreachable));
    }

    Ok(())
}

/// Checks for accepting states that cannot be reached from the start state.
fn check_unreachable_final_states(program: &Program) -> Result<(), AnalysisWarning> {
    let reachable = reachable_states(program);

    let unreachable: Vec<Word> = program
        .final_states
        .sorted()
        .into_iter()
        .filter(|state| !reachable.contains(state))
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisWarning::UnreachableFinalStates(unreachable));
    }

    Ok(())
}

/// Checks that every input symbol is read by at least one transition.
fn check_input_symbols(program: &Program) -> Result<(), AnalysisWarning> {
    let handled: HashSet<Word> = program.transitions.transitions().map(|t| t.symbol).collect();

    let mut unhandled: Vec<Word> = program
        .input
        .iter()
        .filter(|symbol| !handled.contains(symbol))
        .copied()
        .collect();

    if !unhandled.is_empty() {
        unhandled.sort();
        unhandled.dedup();
        return Err(AnalysisWarning::UnhandledInputSymbols(unhandled));
    }

    Ok(())
}

fn format_words(words: &[Word]) -> String {
    words
        .iter()
        .map(Word::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
