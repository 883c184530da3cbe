use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{GENESIS_DATA, Validation};

/// A single record in the ledger, linked to its predecessor by hash.
///
/// A block starts out unmined (empty `hash`); `mine()` runs the
/// proof-of-work search and fills in `nonce`, `miner` and `hash`. Once
/// admitted to the chain the block is logically immutable — any later
/// mutation is caught by re-running validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: i64, // Unix timestamp (UTC), must be >= 1
    pub data: String,
    pub previous_hash: String,
    pub nonce: u64,
    pub miner: String,
    pub hash: String,
}

impl Block {
    /// Create the genesis block (first block in the chain).
    /// Its hash is computed immediately; no proof-of-work is required at
    /// chain length zero.
    pub fn genesis() -> Self {
        let mut block = Self {
            index: 0,
            timestamp: Utc::now().timestamp(),
            data: GENESIS_DATA.to_string(),
            previous_hash: String::new(),
            nonce: 0,
            miner: String::new(),
            hash: String::new(),
        };
        block.hash = block.compute_hash();
        block
    }

    /// Create a new unmined block. The `hash` stays an empty placeholder
    /// until `mine()` is called.
    pub fn new(index: u64, previous_hash: String, data: String) -> Self {
        Self {
            index,
            timestamp: Utc::now().timestamp(),
            data,
            previous_hash,
            nonce: 0,
            miner: String::new(),
            hash: String::new(),
        }
    }

    /// Compute the SHA-256 hash of this block. The preimage is the
    /// `:`-joined string `index:data:timestamp:previous_hash:nonce:miner`,
    /// so the mining metadata is covered by tamper detection as well.
    pub fn compute_hash(&self) -> String {
        let preimage = format!(
            "{}:{}:{}:{}:{}:{}",
            self.index, self.data, self.timestamp, self.previous_hash, self.nonce, self.miner
        );
        let mut hasher = Sha256::new();
        hasher.update(preimage.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Perform proof-of-work by finding a nonce that yields a hash
    /// starting with `difficulty` leading zeros (in hex). Difficulty 0
    /// succeeds on the first attempt.
    pub fn mine(&mut self, difficulty: u32, miner: &str) {
        let never = AtomicBool::new(false);
        self.mine_cancellable(difficulty, miner, &never);
    }

    /// Cancellable proof-of-work search. Checks `cancel` between nonce
    /// attempts; on cancellation restores the block to its pre-search
    /// state and returns `false`. Returns `true` once a qualifying hash
    /// has been found and stored.
    pub fn mine_cancellable(&mut self, difficulty: u32, miner: &str, cancel: &AtomicBool) -> bool {
        let target_prefix = "0".repeat(difficulty as usize);
        let saved_nonce = self.nonce;
        let saved_miner = std::mem::replace(&mut self.miner, miner.to_string());
        let saved_hash = std::mem::take(&mut self.hash);

        loop {
            if cancel.load(Ordering::Relaxed) {
                self.nonce = saved_nonce;
                self.miner = saved_miner;
                self.hash = saved_hash;
                return false;
            }
            self.hash = self.compute_hash();
            if self.hash.starts_with(&target_prefix) {
                return true;
            }
            self.nonce = self.nonce.wrapping_add(1);
        }
    }

    /// Validate this block against its predecessor's hash and index and
    /// the active difficulty. Checks run in a fixed order and the first
    /// violation wins; nothing here panics. An empty `hash` is reported
    /// as "modified information" rather than "nulled hash" because the
    /// recomputation check precedes the emptiness check.
    pub fn is_valid(&self, previous_hash: &str, previous_index: u64, difficulty: u32) -> Validation {
        if previous_index.wrapping_add(1) != self.index {
            return Validation::fail("Invalid index (invalid sequence)");
        }
        if self.hash != self.compute_hash() {
            return Validation::fail("Invalid hash (modified information)");
        }
        if !self
            .hash
            .chars()
            .take(difficulty as usize)
            .all(|c| c == '0')
        {
            return Validation::fail("Invalid hash (insufficient difficulty)");
        }
        if self.hash.is_empty() {
            return Validation::fail("Invalid hash (nulled hash)");
        }
        if self.data.is_empty() {
            return Validation::fail("Invalid data (empty)");
        }
        if self.timestamp < 1 {
            return Validation::fail("Invalid timestamp");
        }
        if self.previous_hash != previous_hash {
            return Validation::fail("Invalid previous hash");
        }
        Validation::ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::Block;

    const EXAMPLE_DIFFICULTY: u32 = 0;
    const EXAMPLE_MINER: &str = "miner-1";

    #[test]
    fn mined_block_is_valid() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), "block 2".into());
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(valid.success, "{}", valid.message);
        assert_eq!(block.miner, EXAMPLE_MINER);
    }

    #[test]
    fn unmined_block_is_not_valid() {
        let genesis = Block::genesis();
        let block = Block::new(1, genesis.hash.clone(), "block 2".into());

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(!valid.success);
    }

    #[test]
    fn wrong_previous_hash_is_not_valid() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, "abc".into(), "block 2".into());
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(!valid.success);
        assert_eq!(valid.message, "Invalid previous hash");
    }

    #[test]
    fn bad_timestamp_is_not_valid() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), "block 2".into());
        block.timestamp = -1;
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(!valid.success);
        assert_eq!(valid.message, "Invalid timestamp");
    }

    #[test]
    fn emptied_hash_is_not_valid() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), "block 2".into());
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);
        block.hash = String::new();

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(!valid.success);
        assert_eq!(valid.message, "Invalid hash (modified information)");
    }

    #[test]
    fn empty_data_is_not_valid() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), String::new());
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(!valid.success);
        assert_eq!(valid.message, "Invalid data (empty)");
    }

    #[test]
    fn wrong_index_is_not_valid() {
        let genesis = Block::genesis();
        let mut block = Block::new(3, genesis.hash.clone(), "block 2".into());
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);

        let valid = block.is_valid(&genesis.hash, genesis.index, EXAMPLE_DIFFICULTY);
        assert!(!valid.success);
        assert_eq!(valid.message, "Invalid index (invalid sequence)");
    }

    #[test]
    fn hashing_is_deterministic() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), "block 2".into());
        block.mine(EXAMPLE_DIFFICULTY, EXAMPLE_MINER);
        assert_eq!(block.compute_hash(), block.compute_hash());
    }

    #[test]
    fn difficulty_zero_succeeds_on_first_attempt() {
        let mut block = Block::new(1, "prev".into(), "payload".into());
        block.mine(0, EXAMPLE_MINER);
        assert_eq!(block.nonce, 0);
        assert_eq!(block.hash, block.compute_hash());
    }

    #[test]
    fn mining_produces_leading_zeros() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), "block 2".into());
        block.mine(2, EXAMPLE_MINER);
        assert!(block.hash.starts_with("00"));

        let valid = block.is_valid(&genesis.hash, genesis.index, 2);
        assert!(valid.success, "{}", valid.message);
    }

    #[test]
    fn insufficient_difficulty_is_rejected() {
        let genesis = Block::genesis();
        let mut block = Block::new(1, genesis.hash.clone(), "block 2".into());
        // Re-mine at difficulty 0 until the winning hash does NOT start
        // with a zero nibble, so the difficulty-2 check must fire.
        block.mine(0, EXAMPLE_MINER);
        while block.hash.starts_with('0') {
            block.nonce = block.nonce.wrapping_add(1);
            block.hash = block.compute_hash();
        }

        let valid = block.is_valid(&genesis.hash, genesis.index, 2);
        assert!(!valid.success);
        assert_eq!(valid.message, "Invalid hash (insufficient difficulty)");
    }

    #[test]
    fn cancelled_mining_leaves_block_unchanged() {
        let mut block = Block::new(1, "prev".into(), "payload".into());
        let cancel = AtomicBool::new(false);
        cancel.store(true, Ordering::Relaxed);

        let found = block.mine_cancellable(4, EXAMPLE_MINER, &cancel);
        assert!(!found);
        assert!(block.hash.is_empty());
        assert!(block.miner.is_empty());
        assert_eq!(block.nonce, 0);
    }
}
