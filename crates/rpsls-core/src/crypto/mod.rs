//! Cryptographic primitives for the commit-reveal scheme.

mod commitment;

pub use commitment::{Commitment, Salt, COMMITMENT_LAYOUT, SALT_LEN};

use crate::rules::Move;

/// Generate a fresh secret salt for a new commitment.
pub fn generate_secret() -> Salt {
    Salt::random()
}

/// Compute the commitment for `mv` under `salt`.
pub fn commit(mv: Move, salt: &Salt) -> Commitment {
    Commitment::new(mv, salt)
}

/// Check `(mv, salt)` against a stored commitment.
pub fn verify(mv: Move, salt: &Salt, commitment: &Commitment) -> bool {
    commitment.verify(mv, salt)
}
