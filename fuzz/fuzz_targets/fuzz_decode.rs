//! Fuzz target: `braille::decode`
//!
//! Drives arbitrary payloads into the decoder and asserts that it never
//! panics, only looks at the first byte, and always yields a pattern that
//! fits in six bits.
//!
//! cargo fuzz run fuzz_decode

#![no_main]

use braillecell::braille::{decode, DecodeError};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let result = decode(data);

    match data.first() {
        None => assert_eq!(result, Err(DecodeError::Empty)),
        Some(&b) => {
            // Trailing bytes must not change the outcome.
            assert_eq!(result, decode(&[b]));
            if b.is_ascii_alphabetic() {
                let p = result.expect("letters always decode");
                assert!(p.bits() <= 0b11_1111);
                assert_eq!(p.letter(), Some(b.to_ascii_uppercase() as char));
            } else {
                assert!(matches!(result, Err(DecodeError::InvalidLetter(_))));
            }
        }
    }
});
