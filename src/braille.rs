//! Letter → six-dot Braille pattern decoding.
//!
//! ```text
//!   dot 1 ● ● dot 4        bit 0 ↔ dot 1     bit 3 ↔ dot 4
//!   dot 2 ● ● dot 5        bit 1 ↔ dot 2     bit 4 ↔ dot 5
//!   dot 3 ● ● dot 6        bit 2 ↔ dot 3     bit 5 ↔ dot 6
//! ```
//!
//! The bit order matches the Unicode Braille Patterns block, so a pattern
//! renders directly as `U+2800 + bits`.

use core::fmt;

pub use crate::error::DecodeError;

/// Number of dots in one Braille cell.
pub const DOT_COUNT: usize = 6;

/// Physical state of one dot actuator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DotState {
    Raised,
    #[default]
    Lowered,
}

impl DotState {
    pub fn is_raised(self) -> bool {
        self == Self::Raised
    }
}

/// A 6-bit dot pattern: bit `i` set ⇔ dot `i + 1` raised.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BraillePattern(u8);

impl BraillePattern {
    const MASK: u8 = 0b0011_1111;

    pub const ALL_LOWERED: Self = Self(0);
    pub const ALL_RAISED: Self = Self(Self::MASK);

    /// Build a pattern from raw bits; bits 6 and 7 are discarded.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & Self::MASK)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the dot at zero-based `index` is raised.
    /// Indices outside `0..6` are never raised.
    pub const fn is_raised(self, index: usize) -> bool {
        index < DOT_COUNT && self.0 & (1 << index) != 0
    }

    /// The six-element Raised/Lowered vector, dot 1 first.
    pub fn dots(self) -> [DotState; DOT_COUNT] {
        core::array::from_fn(|i| {
            if self.is_raised(i) {
                DotState::Raised
            } else {
                DotState::Lowered
            }
        })
    }

    /// Render as a character from the Unicode Braille Patterns block.
    pub fn to_unicode(self) -> char {
        char::from_u32(0x2800 + u32::from(self.0)).unwrap_or('\u{2800}')
    }

    /// Reverse lookup: the uppercase letter this pattern encodes, if any.
    pub fn letter(self) -> Option<char> {
        LETTER_TABLE
            .iter()
            .position(|p| *p == self)
            .map(|i| (b'A' + i as u8) as char)
    }
}

impl fmt::Debug for BraillePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Dot-1-first string, the same notation as the letter table.
        write!(f, "BraillePattern(")?;
        for i in 0..DOT_COUNT {
            f.write_str(if self.is_raised(i) { "1" } else { "0" })?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for BraillePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_unicode())
    }
}

/// Build a pattern from a dot-1-first string such as `b"101011"`.
const fn cell(dots: &[u8; DOT_COUNT]) -> BraillePattern {
    let mut bits = 0u8;
    let mut i = 0;
    while i < DOT_COUNT {
        if dots[i] == b'1' {
            bits |= 1 << i;
        }
        i += 1;
    }
    BraillePattern(bits)
}

/// Grade-1 Braille for `A..=Z`, indexed by `letter - b'A'`.
pub const LETTER_TABLE: [BraillePattern; 26] = [
    cell(b"100000"), // A
    cell(b"110000"), // B
    cell(b"100100"), // C
    cell(b"100110"), // D
    cell(b"100010"), // E
    cell(b"110100"), // F
    cell(b"110110"), // G
    cell(b"110010"), // H
    cell(b"010100"), // I
    cell(b"010110"), // J
    cell(b"101000"), // K
    cell(b"111000"), // L
    cell(b"101100"), // M
    cell(b"101110"), // N
    cell(b"101010"), // O
    cell(b"111100"), // P
    cell(b"111110"), // Q
    cell(b"111010"), // R
    cell(b"011100"), // S
    cell(b"011110"), // T
    cell(b"101001"), // U
    cell(b"111001"), // V
    cell(b"010111"), // W
    cell(b"101101"), // X
    cell(b"101111"), // Y
    cell(b"101011"), // Z
];

/// Offset between ASCII lowercase and uppercase letters.
const CASE_OFFSET: u8 = b'a' - b'A';

/// Decode an inbound payload. Only the first byte is examined.
pub fn decode(payload: &[u8]) -> Result<BraillePattern, DecodeError> {
    let &first = payload.first().ok_or(DecodeError::Empty)?;
    let letter = if first.is_ascii_lowercase() {
        first - CASE_OFFSET
    } else {
        first
    };
    if !letter.is_ascii_uppercase() {
        return Err(DecodeError::InvalidLetter(first));
    }
    Ok(LETTER_TABLE[usize::from(letter - b'A')])
}
