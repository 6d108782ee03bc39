//! # Ledger Handle
//!
//! A cloneable handle to one [`Chain`] shared by every request handler and
//! background task in a process. There is no global: whoever builds the
//! `Ledger` decides its lifetime and hands clones to its consumers.
//!
//! ## Locking
//!
//! Appends take the write lock for the entire read-tail → build → validate
//! → push sequence, so two writers can never both extend the same tail.
//! Reads take the read lock and see either the chain before an append or
//! after it, never in between. The lock is never held across an `.await`;
//! nothing in here is async.

use std::sync::Arc;

use parking_lot::RwLock;

use super::block::Block;
use super::chain::Chain;
use crate::checkout::CheckoutEvent;
use crate::error::{ChainViolation, LedgerResult};

/// Shared, lock-guarded owner of a [`Chain`].
///
/// Cheap to clone; every clone refers to the same chain.
#[derive(Debug, Clone)]
pub struct Ledger {
    inner: Arc<RwLock<Chain>>,
}

impl Ledger {
    /// Bootstrap a fresh chain and wrap it.
    pub fn new() -> Self {
        Self::from_chain(Chain::bootstrap())
    }

    /// Wrap an existing chain.
    pub fn from_chain(chain: Chain) -> Self {
        Self {
            inner: Arc::new(RwLock::new(chain)),
        }
    }

    /// Append a checkout event under the write lock.
    ///
    /// # Errors
    ///
    /// See [`Chain::append`].
    pub fn append(&self, payload: CheckoutEvent) -> LedgerResult<Block> {
        let mut chain = self.inner.write();
        log_outcome(chain.append(payload))
    }

    /// Append with a caller-supplied timestamp, under the write lock.
    ///
    /// # Errors
    ///
    /// See [`Chain::append_at`].
    pub fn append_at(
        &self,
        payload: CheckoutEvent,
        created_at: impl Into<String>,
    ) -> LedgerResult<Block> {
        let mut chain = self.inner.write();
        log_outcome(chain.append_at(payload, created_at))
    }

    /// Submit an externally built candidate under the write lock. A
    /// candidate carrying the genesis sentinel is refused like any other
    /// malformed payload.
    ///
    /// # Errors
    ///
    /// See [`Chain::submit`].
    pub fn submit(&self, candidate: Block) -> LedgerResult<Block> {
        let mut chain = self.inner.write();
        log_outcome(chain.submit(candidate))
    }

    /// Verify the whole chain under the read lock.
    ///
    /// # Errors
    ///
    /// See [`Chain::verify`].
    pub fn verify(&self) -> Result<(), ChainViolation> {
        self.inner.read().verify()
    }

    /// Copy of every committed block, genesis first.
    pub fn snapshot(&self) -> Vec<Block> {
        self.inner.read().blocks().to_vec()
    }

    /// Copy of the tail block.
    pub fn tip(&self) -> Block {
        self.inner.read().tip().clone()
    }

    /// Copy of the block at `position`, if committed.
    pub fn get(&self, position: u64) -> Option<Block> {
        self.inner.read().get(position).cloned()
    }

    /// Number of committed blocks, genesis included.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Always `false`; a ledger holds at least its genesis block.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Run `f` against the chain under the read lock.
    ///
    /// Keep `f` short; writers wait until it returns.
    pub fn with_chain<R>(&self, f: impl FnOnce(&Chain) -> R) -> R {
        f(&self.inner.read())
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn log_outcome(result: LedgerResult<Block>) -> LedgerResult<Block> {
    match &result {
        Ok(block) => {
            tracing::debug!(position = block.position, hash = %block.hash, "block committed");
        }
        Err(e) => {
            tracing::warn!(reason = e.reason(), error = %e, "candidate block rejected");
        }
    }
    result
}
