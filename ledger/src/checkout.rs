//! # Checkout Events
//!
//! The payload carried by every block. A checkout event records that a user
//! took a book out on a given date. The ledger treats the fields as opaque
//! strings; the only thing it cares about is that the event serializes to
//! the same bytes every time it is hashed.
//!
//! ## Canonical form
//!
//! Compact JSON with keys in declaration order:
//!
//! ```text
//! {"book_id":"B1","user":"alice","checkout_date":"2024-01-01","is_genesis":false}
//! ```
//!
//! Reordering the struct fields changes every block hash. Don't.

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, LedgerResult};

/// One book checkout, as recorded on the chain. Missing fields deserialize
/// as empty strings, and `is_genesis` as `false`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutEvent {
    /// Identifier of the book being checked out.
    pub book_id: String,
    /// Who checked it out.
    pub user: String,
    /// Date of the checkout, as supplied by the caller.
    pub checkout_date: String,
    /// Genesis sentinel. Only the bootstrap block sets this.
    pub is_genesis: bool,
}

impl CheckoutEvent {
    /// Build a regular (non-genesis) checkout event.
    pub fn new(
        book_id: impl Into<String>,
        user: impl Into<String>,
        checkout_date: impl Into<String>,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            user: user.into(),
            checkout_date: checkout_date.into(),
            is_genesis: false,
        }
    }

    /// The sentinel payload stored in the genesis block.
    pub fn genesis() -> Self {
        Self {
            is_genesis: true,
            ..Self::default()
        }
    }

    /// Serialize to the canonical byte form that goes into the block hash.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MalformedPayload`] if serialization fails.
    pub fn canonical_bytes(&self) -> LedgerResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Check that a caller-supplied event may be appended.
    ///
    /// The genesis marker is reserved for the bootstrap block; accepting it
    /// from callers would let anyone mint a second "genesis" mid-chain.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::MalformedPayload`] if the event is refused.
    pub fn check_appendable(&self) -> LedgerResult<()> {
        if self.is_genesis {
            return Err(LedgerError::MalformedPayload(
                "is_genesis is reserved for the genesis block".to_string(),
            ));
        }
        self.canonical_bytes().map(|_| ())
    }
}
