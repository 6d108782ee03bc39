//! # Block Structure
//!
//! A block is one entry in the ledger: a checkout event, the moment it was
//! recorded, and the hash that binds it to everything before it.
//!
//! ## Block Layout
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Block                                      │
//! │  ├── position: u64        (genesis = 0)     │
//! │  ├── payload: CheckoutEvent                 │
//! │  ├── created_at: String   (RFC 3339, UTC)   │
//! │  ├── hash: String         (SHA-256, hex)    │
//! │  └── prev_hash: String    ("" for genesis)  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Hash Computation
//!
//! The preimage is the plain concatenation, with no separators, of:
//!
//! ```text
//! decimal(position) || created_at || canonical_json(payload) || prev_hash
//! ```
//!
//! hashed with SHA-256 and encoded as lowercase hex. This layout is frozen;
//! see [`crate::config::LEDGER_FORMAT_VERSION`].
//!
//! Checking a block never touches its fields. [`Block::validate_hash`]
//! recomputes into a temporary and compares.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::checkout::CheckoutEvent;
use crate::config::{GENESIS_POSITION, GENESIS_PREV_HASH};
use crate::crypto::hash::sha256_concat_hex;
use crate::error::{LedgerError, LedgerResult};

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A single ledger entry.
///
/// Fields are public so candidates can be inspected (and, in tests, forged)
/// before they are submitted. Once a block is committed to a
/// [`Chain`](super::chain::Chain) there is no way to get a mutable
/// reference to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Position in the chain (0-indexed, genesis = 0).
    pub position: u64,
    /// The checkout event bound into this block's hash.
    pub payload: CheckoutEvent,
    /// When the block was built.
    pub created_at: String,
    /// SHA-256 of this block's fields, lowercase hex.
    pub hash: String,
    /// `hash` of the preceding block. Empty for genesis.
    pub prev_hash: String,
}

impl Block {
    /// Construct the genesis block, timestamped now.
    pub fn genesis() -> Self {
        Self::genesis_at(now_timestamp())
    }

    /// Construct the genesis block with a fixed timestamp.
    ///
    /// Two genesis blocks built with the same timestamp have the same hash.
    pub fn genesis_at(created_at: impl Into<String>) -> Self {
        Self::assemble(
            GENESIS_POSITION,
            CheckoutEvent::genesis(),
            created_at.into(),
            GENESIS_PREV_HASH.to_string(),
        )
    }

    /// Construct a new block linked to `prev`, timestamped now.
    ///
    /// Construction never fails. Whether the result may join the chain is
    /// decided later, by the chain.
    pub fn new(prev: &Block, payload: CheckoutEvent) -> Self {
        Self::new_at(prev, payload, now_timestamp())
    }

    /// Construct a new block linked to `prev` with a caller-supplied
    /// timestamp.
    ///
    /// A `prev` at `u64::MAX` yields a candidate at the same position, which
    /// the chain refuses as a position gap.
    pub fn new_at(prev: &Block, payload: CheckoutEvent, created_at: impl Into<String>) -> Self {
        Self::assemble(
            prev.position.saturating_add(1),
            payload,
            created_at.into(),
            prev.hash.clone(),
        )
    }

    fn assemble(position: u64, payload: CheckoutEvent, created_at: String, prev_hash: String) -> Self {
        // CheckoutEvent is three strings and a bool; serde_json cannot fail on it.
        let payload_bytes = payload
            .canonical_bytes()
            .expect("checkout event serializes to JSON");
        let hash = compute_block_hash(position, &created_at, &payload_bytes, &prev_hash);
        Block {
            position,
            payload,
            created_at,
            hash,
            prev_hash,
        }
    }

    /// Recompute the hash from the block's current fields.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MalformedPayload`] if the payload cannot be
    /// serialized.
    pub fn compute_hash(&self) -> LedgerResult<String> {
        let payload_bytes = self.payload.canonical_bytes()?;
        Ok(compute_block_hash(
            self.position,
            &self.created_at,
            &payload_bytes,
            &self.prev_hash,
        ))
    }

    /// Recompute the hash and compare it to `expected`.
    ///
    /// Pure: the block is not modified. A payload that cannot be serialized
    /// never validates.
    pub fn validate_hash(&self, expected: &str) -> bool {
        match self.compute_hash() {
            Ok(computed) => computed == expected,
            Err(_) => false,
        }
    }

    /// Self-consistency check: does the stored hash match the fields?
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::HashMismatch`] with both hashes on mismatch.
    pub fn verify(&self) -> LedgerResult<()> {
        let computed = self.compute_hash()?;
        if computed != self.hash {
            return Err(LedgerError::HashMismatch {
                position: self.position,
                stored: self.hash.clone(),
                computed,
            });
        }
        Ok(())
    }

    /// Whether this block carries the genesis sentinel.
    pub fn is_genesis(&self) -> bool {
        self.payload.is_genesis
    }
}

// ---------------------------------------------------------------------------
// Hash Computation
// ---------------------------------------------------------------------------

/// Compute a block hash from its constituent fields.
///
/// `payload` must already be in canonical form.
pub fn compute_block_hash(position: u64, created_at: &str, payload: &[u8], prev_hash: &str) -> String {
    let position = position.to_string();
    sha256_concat_hex(&[
        position.as_bytes(),
        created_at.as_bytes(),
        payload,
        prev_hash.as_bytes(),
    ])
}

/// Current wall-clock time in the block timestamp format.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
