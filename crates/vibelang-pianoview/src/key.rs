//! Key classification
//!
//! Keys are identified by a zero-based index with white and black keys
//! interleaved. The colour of a key only depends on its position in the
//! octave, so everything here is derived from the index.

/// Number of keys in one octave
pub const NOTES_PER_OCTAVE: usize = 12;

/// Smallest supported number of keys
pub const MIN_NUMBER_OF_KEYS: usize = 1;

/// Largest supported number of keys (a full piano)
pub const MAX_NUMBER_OF_KEYS: usize = 88;

const WHITE_KEY_IXS: [usize; 7] = [0, 2, 4, 5, 7, 9, 11];
const BLACK_KEY_IXS: [usize; 5] = [1, 3, 6, 8, 10];

const IS_WHITE_KEY: [bool; NOTES_PER_OCTAVE] = [
    true, false, true, false, true, true, false, true, false, true, false, true,
];

/// Colour class of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyColor {
    White,
    Black,
}

impl KeyColor {
    /// Colour class of the key at `index`
    pub fn of(index: usize) -> Self {
        if is_white_key(index) {
            Self::White
        } else {
            Self::Black
        }
    }
}

/// Check if the key at `index` is white
pub fn is_white_key(index: usize) -> bool {
    IS_WHITE_KEY[index % NOTES_PER_OCTAVE]
}

/// Check if the key at `index` is black
pub fn is_black_key(index: usize) -> bool {
    !is_white_key(index)
}

/// Key index of the `n`th white key (counting from zero)
pub fn white_key_index(n: usize) -> usize {
    WHITE_KEY_IXS[n % WHITE_KEY_IXS.len()] + (n / WHITE_KEY_IXS.len()) * NOTES_PER_OCTAVE
}

/// Key index of the `n`th black key (counting from zero)
pub fn black_key_index(n: usize) -> usize {
    BLACK_KEY_IXS[n % BLACK_KEY_IXS.len()] + (n / BLACK_KEY_IXS.len()) * NOTES_PER_OCTAVE
}

/// Count the white and black keys among the first `number_of_keys` keys
///
/// Returns `(white, black)`.
pub fn count_keys(number_of_keys: usize) -> (usize, usize) {
    let white = (0..number_of_keys).filter(|&ix| is_white_key(ix)).count();
    (white, number_of_keys - white)
}
