//! Conversions between unary words and their bit-string layout.
//!
//! A bit string of cells is a sequence of words separated by single clear
//! bits, e.g. `10110111` holds the words `1`, `11` and `111`.

use crate::types::{FormatError, Word, CLEAR_BIT};

const SET: u8 = b'1';
const CLEAR: u8 = b'0';

/// Extracts the word starting at `pos`.
///
/// Fails with `FormatError::NotOnWord` unless `bits[pos]` is a set bit.
/// The returned word covers the maximal run of set bits from `pos` onward.
pub fn word_at(bits: &str, pos: usize) -> Result<Word, FormatError> {
    let bytes = bits.as_bytes();
    if bytes.get(pos) != Some(&SET) {
        return Err(FormatError::NotOnWord { position: pos });
    }

    let len = bytes[pos..].iter().take_while(|&&b| b == SET).count();
    Word::new(len).ok_or(FormatError::NotOnWord { position: pos })
}

/// Decodes a cell layout into its words.
///
/// Every cell must be a word, and consecutive cells must be separated by
/// exactly one clear bit.
pub fn decode_cells(bits: &str) -> Result<Vec<Word>, FormatError> {
    let bytes = bits.as_bytes();
    let mut cells = Vec::new();
    let mut pos = 0;

    loop {
        let word = word_at(bits, pos)?;
        cells.push(word);
        pos += word.len();

        match bytes.get(pos) {
            None => return Ok(cells),
            Some(&CLEAR) => pos += 1,
            Some(_) => return Err(FormatError::NotOnWord { position: pos }),
        }
    }
}

/// Encodes words as cells separated by single clear bits.
pub fn encode_cells(cells: &[Word]) -> String {
    let mut bits = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            bits.push(CLEAR_BIT);
        }
        bits.push_str(&cell.to_string());
    }
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(len: usize) -> Word {
        Word::new(len).unwrap()
    }

    #[test]
    fn test_word_at_takes_maximal_run() {
        assert_eq!(word_at("1101110", 0), Ok(w(2)));
        assert_eq!(word_at("1101110", 3), Ok(w(3)));
        assert_eq!(word_at("111", 0), Ok(w(3)));
        // starting mid-run yields the rest of the run
        assert_eq!(word_at("111", 1), Ok(w(2)));
    }

    #[test]
    fn test_word_at_requires_set_bit() {
        assert_eq!(
            word_at("1101", 2),
            Err(FormatError::NotOnWord { position: 2 })
        );
        assert_eq!(
            word_at("11", 5),
            Err(FormatError::NotOnWord { position: 5 })
        );
        assert_eq!(word_at("", 0), Err(FormatError::NotOnWord { position: 0 }));
    }

    #[test]
    fn test_decode_cells() {
        assert_eq!(decode_cells("1011"), Ok(vec![w(1), w(2)]));
        assert_eq!(decode_cells("10101111011"), Ok(vec![w(1), w(1), w(4), w(2)]));
    }

    #[test]
    fn test_decode_cells_rejects_wide_gaps() {
        assert_eq!(
            decode_cells("1001"),
            Err(FormatError::NotOnWord { position: 2 })
        );
        assert_eq!(
            decode_cells("10"),
            Err(FormatError::NotOnWord { position: 2 })
        );
        assert!(decode_cells("").is_err());
    }

    #[test]
    fn test_encode_cells() {
        assert_eq!(encode_cells(&[w(1), w(3), w(2)]), "10111011");
        assert_eq!(encode_cells(&[]), "");
    }
}
