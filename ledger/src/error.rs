//! Error types for the ledger.
//!
//! [`LedgerError`] is what an append returns when a payload or candidate
//! block is refused. [`ChainViolation`] is what a full-chain verification
//! returns when a committed block no longer satisfies the chain invariants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons an append can be refused. The chain is unchanged in every case.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The payload cannot be serialized deterministically, or carries a
    /// reserved marker. Raised before any candidate block exists.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// The candidate's `prev_hash` does not equal the tail's `hash`.
    #[error("linkage mismatch at position {position}: expected prev_hash {expected}, got {actual}")]
    LinkageMismatch {
        /// Position claimed by the candidate.
        position: u64,
        /// Hash of the current tail.
        expected: String,
        /// `prev_hash` carried by the candidate.
        actual: String,
    },

    /// The candidate's stored hash does not match its recomputed hash.
    #[error("hash mismatch at position {position}: stored {stored}, computed {computed}")]
    HashMismatch {
        /// Position claimed by the candidate.
        position: u64,
        /// Hash stored on the candidate.
        stored: String,
        /// Hash recomputed from the candidate's fields.
        computed: String,
    },

    /// The candidate's position is not exactly one past the tail.
    #[error("position gap: expected {expected}, got {actual}")]
    PositionGap {
        /// Tail position + 1.
        expected: u64,
        /// Position claimed by the candidate.
        actual: u64,
    },
}

impl LedgerError {
    /// Stable snake_case tag for this rejection, used in API bodies and
    /// metric labels.
    pub fn reason(&self) -> &'static str {
        match self {
            LedgerError::MalformedPayload(_) => "malformed_payload",
            LedgerError::LinkageMismatch { .. } => "linkage_mismatch",
            LedgerError::HashMismatch { .. } => "hash_mismatch",
            LedgerError::PositionGap { .. } => "position_gap",
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(e: serde_json::Error) -> Self {
        LedgerError::MalformedPayload(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Which invariant a committed block broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// `prev_hash` does not equal the predecessor's `hash`.
    Linkage,
    /// Recomputing the hash does not reproduce the stored `hash`.
    Hash,
    /// Position is not the predecessor's position + 1.
    Position,
    /// Block 0 is not a well-formed genesis block.
    Genesis,
}

/// First invariant violation found while walking the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("chain violation at index {index} (position {position}): {kind:?}")]
pub struct ChainViolation {
    /// Index into the block sequence.
    pub index: usize,
    /// Position stored on the offending block.
    pub position: u64,
    /// Which check failed.
    pub kind: ViolationKind,
}
