//! License key generation.
//!
//! Keys look like `PREFIX-XXXX-XXXX-XXXX-XXXX`: a caller-supplied prefix
//! followed by the random payload grouped into hyphenated blocks of four.
//! The alphabet omits ambiguous characters (I, O, 0, 1) so keys survive
//! being read over the phone.
//!
//! Uniqueness is not this module's concern. The insertion site holds the
//! UNIQUE index and the regenerate-on-collision loop.

use rand::Rng;

pub const KEY_ALPHABET: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Characters per hyphenated block.
const BLOCK_LEN: usize = 4;

/// Supported payload lengths (random characters, hyphens excluded).
pub const MIN_PAYLOAD_LEN: usize = 8;
pub const MAX_PAYLOAD_LEN: usize = 32;
pub const DEFAULT_PAYLOAD_LEN: usize = 16;

/// Generate a license key with the given prefix and payload length.
///
/// `payload_len` is clamped to 8..=32. No fixed seed; every call draws from
/// the thread RNG.
pub fn generate_license_key(prefix: &str, payload_len: usize) -> String {
    generate_from_alphabet(KEY_ALPHABET, prefix, payload_len)
}

/// Generate a key from an explicit alphabet. Exposed for callers that need
/// a different character set; `generate_license_key` is the common path.
pub fn generate_from_alphabet(alphabet: &str, prefix: &str, payload_len: usize) -> String {
    let chars: Vec<char> = alphabet.chars().collect();
    let payload_len = payload_len.clamp(MIN_PAYLOAD_LEN, MAX_PAYLOAD_LEN);
    let mut rng = rand::thread_rng();

    let mut out = String::with_capacity(prefix.len() + payload_len + payload_len / BLOCK_LEN + 1);
    out.push_str(prefix);

    let mut emitted = 0;
    while emitted < payload_len {
        out.push('-');
        let block = BLOCK_LEN.min(payload_len - emitted);
        for _ in 0..block {
            out.push(chars[rng.gen_range(0..chars.len())]);
        }
        emitted += block;
    }

    out
}
