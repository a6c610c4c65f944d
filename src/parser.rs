//! This module provides the parser for encoded programs, utilizing the `pest` crate.
//! The grammar in `grammar.pest` splits the raw bit string into word and gap tokens once;
//! the section splitter and the table builders then work on the tokens by index.

use crate::{
    analyzer::analyze,
    table::{FinalStates, TransitionTable},
    types::{
        FormatError, Program, Token, TokenKind, Word, FIELD_DEPTH, RECORD_DEPTH, SECTION_DEPTH,
    },
};
use pest::Parser as PestParser;
use pest_derive::Parser as PestParser;
use tracing::debug;

/// Derives a `PestParser` for the encoding grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct EncodingParser;

/// The three sections of an encoded program, as token slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections<'a> {
    /// Tokens before the first `00`.
    pub final_states: &'a [Token],
    /// Tokens between the first `00` and the `000`.
    pub transitions: &'a [Token],
    /// Tokens after the `000`.
    pub input: &'a [Token],
}

/// Parses an encoded program into a `Program`.
///
/// The input must already be stripped of surrounding whitespace. The parsed
/// program is analyzed for format violations before being returned.
///
/// # Returns
///
/// * `Ok(Program)` if the encoding is well formed.
/// * `Err(FormatError)` describing the first violation found otherwise.
pub fn parse(input: &str) -> Result<Program, FormatError> {
    let tokens = tokenize(input)?;
    let sections = split_program(&tokens)?;

    let program = Program {
        encoding: input.to_string(),
        final_states: FinalStates::collect(sections.final_states),
        transitions: TransitionTable::parse(sections.transitions)?,
        input: sections.input.iter().filter_map(Token::word).collect(),
    };

    analyze(&program)?;

    debug!(
        final_states = program.final_states.len(),
        transitions = program.transitions.len(),
        input = program.input.len(),
        "Parsed encoded program"
    );

    Ok(program)
}

/// Splits an encoded string into word and gap tokens.
///
/// Fails with `FormatError::Syntax` if the string contains anything other than `0` and `1`.
pub fn tokenize(input: &str) -> Result<Vec<Token>, FormatError> {
    let pairs = EncodingParser::parse(Rule::encoding, input).map_err(Box::new)?;

    let mut tokens = Vec::new();
    for pair in pairs.flatten() {
        let span = pair.as_span();
        let len = span.end() - span.start();

        let kind = match pair.as_rule() {
            Rule::word => match Word::new(len) {
                Some(word) => TokenKind::Word(word),
                None => continue,
            },
            Rule::gap => TokenKind::Gap(len),
            _ => continue,
        };

        tokens.push(Token {
            kind,
            start: span.start(),
        });
    }

    Ok(tokens)
}

/// Splits a token stream into its final-state, transition and input sections.
///
/// The first gap of depth three or more ends the program. Within the program the
/// first gap of depth two separates the final states from the transitions. A gap
/// longer than three leaves the input starting with a clear bit, which is a
/// boundary violation.
pub fn split_program(tokens: &[Token]) -> Result<Sections<'_>, FormatError> {
    let separator = tokens
        .iter()
        .position(|t| t.gap().is_some_and(|depth| depth >= SECTION_DEPTH))
        .ok_or(FormatError::MissingInputSeparator)?;

    let program = &tokens[..separator];
    let input = &tokens[separator + 1..];

    let boundary = program
        .iter()
        .position(|t| t.gap() == Some(RECORD_DEPTH))
        .ok_or(FormatError::MissingTransitionSeparator)?;

    if tokens[separator].len() > SECTION_DEPTH {
        return Err(FormatError::InputBoundary);
    }
    check_input(input)?;

    Ok(Sections {
        final_states: &program[..boundary],
        transitions: &program[boundary + 1..],
        input,
    })
}

/// Checks that a non-empty input begins and ends with a word and that its words
/// are separated by single clear bits.
fn check_input(input: &[Token]) -> Result<(), FormatError> {
    let (Some(first), Some(last)) = (input.first(), input.last()) else {
        return Ok(());
    };

    if first.word().is_none() || last.word().is_none() {
        return Err(FormatError::InputBoundary);
    }

    match input
        .iter()
        .find(|t| t.gap().is_some_and(|depth| depth != FIELD_DEPTH))
    {
        Some(gap) => Err(FormatError::InputGap {
            position: gap.start,
            depth: gap.len(),
        }),
        None => Ok(()),
    }
}
