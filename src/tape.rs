//! A growable tape of symbol words with a single read/write head.
//!
//! The work tape is laid out as `[marker] input... [blank]`. It grows by one
//! blank cell whenever the head moves right off its last cell, and it refuses
//! to move left of its first cell.

use crate::codec::{decode_cells, encode_cells};
use crate::types::{Direction, FormatError, Word};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: Vec<Word>,
    head: usize,
}

impl Tape {
    /// Creates a tape holding `cells` with the head on cell `head`.
    pub fn new(cells: Vec<Word>, head: usize) -> Self {
        Self { cells, head }
    }

    /// A single-cell tape, used as the state register.
    pub fn register(state: Word) -> Self {
        Self::new(vec![state], 0)
    }

    /// Decodes a tape from its bit layout.
    ///
    /// `head_offset` is a bit offset and must point at the first bit of a cell.
    pub fn from_bits(bits: &str, head_offset: usize) -> Result<Self, FormatError> {
        let cells = decode_cells(bits)?;

        let mut offset = 0;
        for (index, cell) in cells.iter().enumerate() {
            if offset == head_offset {
                return Ok(Self::new(cells, index));
            }
            offset += cell.len() + 1;
        }

        Err(FormatError::NotOnWord {
            position: head_offset,
        })
    }

    /// Returns the word under the head.
    pub fn read(&self) -> Result<Word, FormatError> {
        self.cells
            .get(self.head)
            .copied()
            .ok_or(FormatError::HeadOutOfTape {
                head: self.head,
                len: self.cells.len(),
            })
    }

    /// Replaces the word under the head. Other cells are untouched.
    pub fn write(&mut self, word: Word) -> Result<(), FormatError> {
        let len = self.cells.len();
        let cell = self
            .cells
            .get_mut(self.head)
            .ok_or(FormatError::HeadOutOfTape {
                head: self.head,
                len,
            })?;
        *cell = word;
        Ok(())
    }

    /// Moves the head one cell.
    ///
    /// Moving right from the last cell appends exactly one blank cell first.
    /// Moving left from the first cell fails with `FormatError::LeftBoundary`.
    pub fn move_head(&mut self, direction: Direction) -> Result<(), FormatError> {
        match direction {
            Direction::Right => {
                if self.head + 1 >= self.cells.len() {
                    self.cells.push(Word::BLANK);
                }
                self.head += 1;
            }
            Direction::Left => {
                if self.head == 0 {
                    return Err(FormatError::LeftBoundary);
                }
                self.head -= 1;
            }
        }
        Ok(())
    }

    pub fn cells(&self) -> &[Word] {
        &self.cells
    }

    /// Index of the cell under the head.
    pub fn head(&self) -> usize {
        self.head
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The tape in its bit layout.
    pub fn bits(&self) -> String {
        encode_cells(&self.cells)
    }

    /// Bit offset of the head within `bits()`.
    pub fn head_offset(&self) -> usize {
        self.cells[..self.head.min(self.cells.len())]
            .iter()
            .map(|cell| cell.len() + 1)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(len: usize) -> Word {
        Word::new(len).unwrap()
    }

    #[test]
    fn test_from_bits() {
        let tape = Tape::from_bits("101011011", 2).unwrap();
        assert_eq!(tape.cells(), &[w(1), w(1), w(2), w(2)]);
        assert_eq!(tape.head(), 1);
        assert_eq!(tape.read(), Ok(w(1)));
    }

    #[test]
    fn test_from_bits_requires_head_on_word_start() {
        assert_eq!(
            Tape::from_bits("101011011", 5),
            Err(FormatError::NotOnWord { position: 5 })
        );
        assert_eq!(
            Tape::from_bits("1011", 1),
            Err(FormatError::NotOnWord { position: 1 })
        );
    }

    #[test]
    fn test_write_preserves_neighbours() {
        let mut tape = Tape::new(vec![w(1), w(3), w(2)], 1);
        tape.write(w(5)).unwrap();

        assert_eq!(tape.cells(), &[w(1), w(5), w(2)]);
        assert_eq!(tape.bits(), "1011111011");
    }

    #[test]
    fn test_move_right_within_tape() {
        let mut tape = Tape::new(vec![w(1), w(3), w(2)], 0);
        tape.move_head(Direction::Right).unwrap();

        assert_eq!(tape.head(), 1);
        assert_eq!(tape.len(), 3);
    }

    #[test]
    fn test_move_right_grows_by_one_blank() {
        let mut tape = Tape::new(vec![w(1), w(3), w(4)], 2);
        tape.move_head(Direction::Right).unwrap();

        assert_eq!(tape.len(), 4);
        assert_eq!(tape.head(), 3);
        assert_eq!(tape.read(), Ok(Word::BLANK));
        assert_eq!(&tape.cells()[..3], &[w(1), w(3), w(4)]);

        tape.move_head(Direction::Right).unwrap();
        assert_eq!(tape.len(), 5);
        assert_eq!(tape.bits(), "1011101111011011");
    }

    #[test]
    fn test_move_left() {
        let mut tape = Tape::new(vec![w(1), w(3), w(2)], 2);
        tape.move_head(Direction::Left).unwrap();
        assert_eq!(tape.read(), Ok(w(3)));

        tape.move_head(Direction::Left).unwrap();
        assert_eq!(tape.read(), Ok(w(1)));
        assert_eq!(tape.head_offset(), 0);
    }

    #[test]
    fn test_move_left_at_boundary_fails() {
        let mut tape = Tape::new(vec![w(1), w(2)], 0);
        assert_eq!(
            tape.move_head(Direction::Left),
            Err(FormatError::LeftBoundary)
        );
        // the head does not clamp or wrap
        assert_eq!(tape.head(), 0);
        assert_eq!(tape.len(), 2);
    }

    #[test]
    fn test_head_offset() {
        let tape = Tape::new(vec![w(1), w(3), w(2)], 2);
        assert_eq!(tape.head_offset(), 6);
        assert_eq!(&tape.bits()[tape.head_offset()..], "11");
    }

    #[test]
    fn test_register() {
        let mut register = Tape::register(Word::START);
        assert_eq!(register.read(), Ok(w(1)));

        register.write(w(4)).unwrap();
        assert_eq!(register.read(), Ok(w(4)));
        assert_eq!(register.len(), 1);
    }

    #[test]
    fn test_read_out_of_tape() {
        let tape = Tape::new(vec![], 0);
        assert_eq!(tape.read(), Err(FormatError::HeadOutOfTape { head: 0, len: 0 }));
    }
}
