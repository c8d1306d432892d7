//! Room code generation.

use parlor_model::RoomCode;
use rand::Rng;

/// Uppercase alphabet with the glyphs people misread removed: no `0`/`O`,
/// no `1`/`I`. Codes get read over the phone.
pub(crate) const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Draws a fresh random code. Uniqueness is the caller's problem — it
/// checks the store and retries on collision.
pub(crate) fn random_code(rng: &mut impl Rng, length: usize) -> RoomCode {
    let code: String = (0..length)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    RoomCode::new(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_code_has_requested_length() {
        let mut rng = rand::rng();
        for length in [4, 6, 8] {
            assert_eq!(random_code(&mut rng, length).as_str().len(), length);
        }
    }

    #[test]
    fn test_random_code_stays_in_alphabet() {
        let mut rng = rand::rng();
        for _ in 0..100 {
            let code = random_code(&mut rng, 4);
            assert!(
                code.as_str().bytes().all(|b| CODE_ALPHABET.contains(&b)),
                "unexpected glyph in {code}"
            );
        }
    }

    #[test]
    fn test_alphabet_excludes_ambiguous_glyphs() {
        for ambiguous in [b'0', b'O', b'1', b'I'] {
            assert!(!CODE_ALPHABET.contains(&ambiguous));
        }
    }
}
