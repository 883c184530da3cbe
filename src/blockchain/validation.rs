use serde::{Deserialize, Serialize};

/// Outcome of a structural check: a success flag plus a human-readable
/// reason on failure. Every check in the ledger returns one of these
/// instead of panicking or propagating errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub success: bool,
    pub message: String,
}

impl Validation {
    /// A passing validation with no message.
    pub fn ok() -> Self {
        Self {
            success: true,
            message: String::new(),
        }
    }

    /// A failing validation carrying the violated invariant.
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
