//! Room code allocation.

use draftforge_protocol::RoomCode;
use rand::Rng;

use crate::RoomError;

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Characters in a room code.
pub const CODE_LEN: usize = 4;

/// Draws before giving up. With 36^4 codes this only trips when the
/// registry is nearly full.
const MAX_ATTEMPTS: usize = 64;

/// Draws random codes until one isn't `taken`.
pub fn allocate(
    rng: &mut impl Rng,
    taken: impl Fn(&RoomCode) -> bool,
) -> Result<RoomCode, RoomError> {
    for _ in 0..MAX_ATTEMPTS {
        let code = random_code(rng);
        if !taken(&code) {
            return Ok(code);
        }
        tracing::debug!(%code, "room code collision");
    }
    Err(RoomError::CodeSpaceExhausted)
}

fn random_code(rng: &mut impl Rng) -> RoomCode {
    let code: String = (0..CODE_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    RoomCode::new(code)
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    #[test]
    fn test_allocate_produces_four_base36_chars() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let code = allocate(&mut rng, |_| false).unwrap();
            assert_eq!(code.as_str().len(), CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }

    #[test]
    fn test_allocate_skips_taken_codes() {
        let mut probe = StdRng::seed_from_u64(1);
        let first = random_code(&mut probe);

        let mut rng = StdRng::seed_from_u64(1);
        let code = allocate(&mut rng, |c| *c == first).unwrap();

        assert_ne!(code, first);
    }

    #[test]
    fn test_allocate_everything_taken_fails() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = allocate(&mut rng, |_| true).unwrap_err();
        assert!(matches!(err, RoomError::CodeSpaceExhausted));
    }
}
