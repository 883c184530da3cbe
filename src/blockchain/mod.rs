pub mod block;
pub mod model;
pub mod validation;

pub use block::Block;
pub use model::{Blockchain, NextBlockInfo};
pub use validation::Validation;

/// Blocks per unit of proof-of-work difficulty: required difficulty is
/// `ceil(chain_length / DIFFICULTY_FACTOR)`.
pub const DIFFICULTY_FACTOR: usize = 5;

/// Upper bound on required difficulty (hex digits are 64, so 62 keeps
/// the search bounded even on long chains).
pub const MAX_DIFFICULTY: u32 = 62;

/// Flat fee advertised in the next-block job descriptor.
pub const FEE_PER_TX: u64 = 1;

/// Fixed payload of the index-0 block.
pub const GENESIS_DATA: &str = "Genesis Block";

/// Required proof-of-work difficulty for a chain of the given length.
/// Pure; recomputed on every admission, validation and job request.
pub fn get_difficulty(chain_length: usize) -> u32 {
    // Cap before narrowing so huge lengths pin at the maximum instead
    // of wrapping.
    chain_length
        .div_ceil(DIFFICULTY_FACTOR)
        .min(MAX_DIFFICULTY as usize) as u32
}
