use chrono::Utc;
use serde::Serialize;

use super::{Block, FEE_PER_TX, MAX_DIFFICULTY, Validation, get_difficulty};

/// Job descriptor for an external miner: everything needed to build and
/// mine the next candidate block out-of-band, then resubmit it via
/// `add_block`.
#[derive(Debug, Clone, Serialize)]
pub struct NextBlockInfo {
    pub index: u64,
    pub previous_hash: String,
    pub difficulty: u32,
    pub max_difficulty: u32,
    pub data: String,
    pub fee_per_tx: u64,
}

/// In-memory append-only ledger. Created once with a genesis block and
/// grown only through `add_block`; never truncated or rebased.
#[derive(Debug)]
pub struct Blockchain {
    pub blocks: Vec<Block>,
    pub next_index: u64,
}

impl Blockchain {
    /// Initialize a new chain with a genesis block.
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
            next_index: 1,
        }
    }

    /// Return the last block in the chain.
    pub fn last_block(&self) -> &Block {
        self.blocks
            .last()
            .expect("Blockchain should always have at least the genesis block")
    }

    /// Validate a candidate against the current tail and difficulty, and
    /// append it on success. A rejected candidate leaves the chain
    /// untouched; there are no retries.
    pub fn add_block(&mut self, block: Block) -> Validation {
        let difficulty = get_difficulty(self.blocks.len());
        let last = self.last_block();

        let validation = block.is_valid(&last.hash, last.index, difficulty);
        if !validation.success {
            return Validation::fail(format!(
                "Invalid block #{}: {}",
                block.index, validation.message
            ));
        }

        self.blocks.push(block);
        self.next_index += 1;
        Validation::ok()
    }

    /// Find a block by its hash. Linear scan; `None` on a miss.
    pub fn get_block(&self, hash: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.hash == hash)
    }

    /// Find a block by its position in the chain.
    pub fn get_block_by_index(&self, index: u64) -> Option<&Block> {
        self.blocks.get(index as usize)
    }

    /// Assemble the job descriptor for the next block. The payload slot
    /// carries the current epoch time as a string; the miner replaces it
    /// with real content before mining.
    pub fn next_block_info(&self) -> NextBlockInfo {
        let last = self.last_block();
        NextBlockInfo {
            index: self.blocks.len() as u64,
            previous_hash: last.hash.clone(),
            difficulty: get_difficulty(self.blocks.len()),
            max_difficulty: MAX_DIFFICULTY,
            data: Utc::now().timestamp().to_string(),
            fee_per_tx: FEE_PER_TX,
        }
    }

    /// Re-verify the whole chain, tail to head. The genesis block gets
    /// its own self-consistency check since the pairwise walk never
    /// covers it. Each pair is checked at the difficulty that was active
    /// when the newer block was admitted (chain length == its index), so
    /// honest old blocks are not rejected after the difficulty has grown.
    pub fn is_valid(&self) -> Validation {
        let genesis = &self.blocks[0];
        if genesis.index != 0
            || !genesis.previous_hash.is_empty()
            || genesis.hash != genesis.compute_hash()
        {
            return Validation::fail("Invalid block #0: corrupted genesis block");
        }

        for i in (1..self.blocks.len()).rev() {
            let current = &self.blocks[i];
            let previous = &self.blocks[i - 1];
            let difficulty = get_difficulty(i);

            let validation = current.is_valid(&previous.hash, previous.index, difficulty);
            if !validation.success {
                return Validation::fail(format!(
                    "Invalid block #{}: {}",
                    current.index, validation.message
                ));
            }
        }
        Validation::ok()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}
