//! Secret code generation.

use rand::Rng;

/// Characters a code is drawn from. Look-alikes `O`/`0` and `I`/`1` are excluded.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// A random code of `len` characters from [`CODE_ALPHABET`].
///
/// Not checked for uniqueness against other players. When two alive
/// players share a code, lookups resolve to the lower player id.
pub fn generate_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}
