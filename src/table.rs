//! The decoded machine: its accepting states and its transition table.
//!
//! Both are built once from the token sections of an encoded program and are
//! read-only afterwards, so a single `Program` can back any number of runs.

use std::collections::HashSet;

use crate::types::{
    Action, Direction, FormatError, Token, Transition, Word, RECORD_DEPTH,
};

/// Number of words in a transition record.
const RECORD_WORDS: usize = 5;

/// The set of accepting states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FinalStates(HashSet<Word>);

impl FinalStates {
    /// Collects every word of the final-state section.
    ///
    /// Words may be separated by any gap; the section itself ends at the first `00`.
    /// An empty section yields a machine that never accepts.
    pub fn collect(section: &[Token]) -> Self {
        Self(section.iter().filter_map(Token::word).collect())
    }

    pub fn contains(&self, state: &Word) -> bool {
        self.0.contains(state)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the accepting states in ascending order.
    pub fn sorted(&self) -> Vec<Word> {
        let mut states: Vec<Word> = self.0.iter().copied().collect();
        states.sort();
        states
    }
}

impl FromIterator<Word> for FinalStates {
    fn from_iter<I: IntoIterator<Item = Word>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A transition together with the offset of its record in the encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub position: usize,
    pub transition: Transition,
}

/// A record of the transition section holding fewer than five words.
///
/// Short records are kept rather than rejected: they only fault a run when a
/// lookup lands on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    pub position: usize,
    pub words: Vec<Word>,
}

impl PartialRecord {
    fn matches(&self, state: Word, symbol: Word) -> bool {
        self.words.first() == Some(&state) && self.words.get(1) == Some(&symbol)
    }

    fn error(&self) -> FormatError {
        FormatError::IncompleteTransition {
            position: self.position,
            found: self.words.len(),
        }
    }
}

/// The transition table, in encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    entries: Vec<Entry>,
    partial: Vec<PartialRecord>,
}

impl TransitionTable {
    /// Decodes the transition section.
    ///
    /// Records are separated by `00`. A five-word record must end in a valid
    /// direction; a longer one is rejected. Shorter records are kept aside and
    /// reported by `lookup` if a run ever reads them.
    pub fn parse(section: &[Token]) -> Result<Self, FormatError> {
        let mut table = Self::default();

        for record in section
            .split(|t| t.gap() == Some(RECORD_DEPTH))
            .filter(|record| !record.is_empty())
        {
            let position = record.first().map_or(0, |t| t.start);
            let words: Vec<Word> = record.iter().filter_map(Token::word).collect();

            if words.len() < RECORD_WORDS {
                table.partial.push(PartialRecord { position, words });
            } else {
                table.entries.push(parse_entry(record, position, &words)?);
            }
        }

        Ok(table)
    }

    /// Finds the action for `(state, symbol)`.
    ///
    /// `Ok(None)` is the normal halting path, not an error. The first record in
    /// encoding order whose leading words match wins; if that record is short,
    /// `FormatError::IncompleteTransition` is returned.
    pub fn lookup(&self, state: Word, symbol: Word) -> Result<Option<&Action>, FormatError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.transition.state == state && e.transition.symbol == symbol);
        let partial = self.partial.iter().find(|r| r.matches(state, symbol));

        match (entry, partial) {
            (Some(entry), Some(record)) if entry.position < record.position => {
                Ok(Some(&entry.transition.action))
            }
            (_, Some(record)) => Err(record.error()),
            (entry, None) => Ok(entry.map(|e| &e.transition.action)),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.entries.iter().map(|e| &e.transition)
    }

    /// Short records, in encoding order.
    pub fn partial_records(&self) -> &[PartialRecord] {
        &self.partial
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decodes a record of at least five words.
fn parse_entry(record: &[Token], position: usize, words: &[Word]) -> Result<Entry, FormatError> {
    let &[state, symbol, next_state, new_symbol, direction] = words else {
        return Err(FormatError::OversizedTransition {
            position,
            found: words.len(),
        });
    };

    let direction = Direction::from_word(direction).ok_or(FormatError::InvalidDirection {
        position: record
            .iter()
            .rev()
            .find(|t| t.word().is_some())
            .map_or(position, |t| t.start),
        word: direction,
    })?;

    Ok(Entry {
        position,
        transition: Transition {
            state,
            symbol,
            action: Action {
                next_state,
                new_symbol,
                direction,
            },
        },
    })
}
