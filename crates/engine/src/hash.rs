//! Stable hashing for Jenkins `H` tokens.
//!
//! Jenkins spreads load by hashing the job name; here the seed is the
//! schedule expression itself, mixed with the field position so that
//! `H H * * *` picks unrelated minute and hour values.

use sha2::{Digest, Sha256};

use ck_domain::FieldKind;

/// First eight bytes of `SHA-256(expression ‖ 0x00 ‖ field index)`.
pub fn field_hash(expression: &str, field: FieldKind) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(expression.as_bytes());
    hasher.update([0u8, field as u8]);
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(head)
}

/// Map a hash onto `0..span`. `span` must be non-zero.
pub fn spread(hash: u64, span: u32) -> u32 {
    // The remainder is below `span`, so it always fits.
    (hash % u64::from(span.max(1))) as u32
}
