use crate::blockchain::{Blockchain, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Shared application state: one in-memory ledger per process, guarded
/// by a mutex so appends stay atomic with respect to readers.
pub struct AppState {
    pub blockchain: Mutex<Blockchain>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            blockchain: Mutex::new(Blockchain::new()),
        }
    }
}

/* ---------- Chain API Models ---------- */

#[derive(Serialize)]
pub struct StatusResponse {
    pub height: usize,
    pub next_index: u64,
    pub is_valid: Validation,
    pub last_block_hash: String,
}

/// Candidate block submission. Required fields are optional here so a
/// structurally incomplete body can be answered with 422 instead of a
/// framework-level deserialization error.
#[derive(Deserialize)]
pub struct SubmitBlockRequest {
    pub index: Option<u64>,
    pub timestamp: Option<i64>,
    pub data: Option<String>,
    pub previous_hash: Option<String>,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub miner: String,
    pub hash: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
