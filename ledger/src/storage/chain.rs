//! # Chain
//!
//! The ordered, append-only sequence of committed blocks. A `Chain` always
//! holds at least the genesis block and only grows through [`Chain::append`]
//! or [`Chain::submit`], both of which validate the candidate against the
//! tail before committing it.
//!
//! ## Validation
//!
//! A candidate extends the tail only if its payload is not the genesis
//! sentinel (else `MalformedPayload`) and, in this order:
//!
//! 1. `candidate.prev_hash == tail.hash`          → else `LinkageMismatch`
//! 2. `candidate` recomputes to its own `hash`    → else `HashMismatch`
//! 3. `candidate.position == tail.position + 1`   → else `PositionGap`
//!
//! A rejected candidate is dropped and the chain is left exactly as it was.
//!
//! `Chain` itself is not synchronized. Share it through
//! [`Ledger`](super::ledger::Ledger), which holds the write lock across the
//! whole read-tail/validate/push sequence.

use super::block::Block;
use crate::checkout::CheckoutEvent;
use crate::config::{GENESIS_POSITION, GENESIS_PREV_HASH};
use crate::error::{ChainViolation, LedgerError, LedgerResult, ViolationKind};

/// Ordered chain of validated blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Chain {
    /// Create a chain holding a fresh genesis block.
    pub fn bootstrap() -> Self {
        Self::with_genesis(Block::genesis())
    }

    /// Create a chain whose genesis block carries a fixed timestamp.
    pub fn bootstrap_at(created_at: impl Into<String>) -> Self {
        Self::with_genesis(Block::genesis_at(created_at))
    }

    fn with_genesis(genesis: Block) -> Self {
        tracing::debug!(hash = %genesis.hash, "genesis block created");
        Self {
            blocks: vec![genesis],
        }
    }

    /// Wrap an existing block sequence without validating it.
    ///
    /// Use this for blocks that came from somewhere you don't control, then
    /// call [`Chain::verify`] before trusting them. Returns `None` for an
    /// empty sequence, since a chain always has a genesis block.
    pub fn from_blocks(blocks: Vec<Block>) -> Option<Self> {
        if blocks.is_empty() {
            return None;
        }
        Some(Self { blocks })
    }

    /// Append a checkout event, timestamped now.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason if the payload or the resulting
    /// candidate is refused. The chain is unchanged on error.
    pub fn append(&mut self, payload: CheckoutEvent) -> LedgerResult<Block> {
        let candidate = Block::new(self.tip(), payload);
        self.submit(candidate)
    }

    /// Append a checkout event with a caller-supplied timestamp.
    ///
    /// # Errors
    ///
    /// Same as [`Chain::append`].
    pub fn append_at(
        &mut self,
        payload: CheckoutEvent,
        created_at: impl Into<String>,
    ) -> LedgerResult<Block> {
        let candidate = Block::new_at(self.tip(), payload, created_at);
        self.submit(candidate)
    }

    /// Validate an externally built candidate against the tail and commit
    /// it on success. Returns a copy of the committed block.
    ///
    /// # Errors
    ///
    /// [`LedgerError::MalformedPayload`] if the candidate carries the genesis
    /// sentinel, then [`LedgerError::LinkageMismatch`],
    /// [`LedgerError::HashMismatch`] or [`LedgerError::PositionGap`],
    /// checked in that order.
    pub fn submit(&mut self, candidate: Block) -> LedgerResult<Block> {
        candidate.payload.check_appendable()?;
        validate_successor(self.tip(), &candidate)?;
        self.blocks.push(candidate.clone());
        Ok(candidate)
    }

    /// Walk the whole chain and return the first invariant violation.
    ///
    /// Block 0 must be a genesis block (position 0, empty `prev_hash`,
    /// sentinel payload, consistent hash). Every later block must not carry
    /// the sentinel, must link to and sit one position after its
    /// predecessor, and must recompute to its own hash.
    ///
    /// # Errors
    ///
    /// Returns the [`ChainViolation`] at the lowest offending index.
    pub fn verify(&self) -> Result<(), ChainViolation> {
        let genesis = &self.blocks[0];
        let genesis_ok = genesis.position == GENESIS_POSITION
            && genesis.prev_hash == GENESIS_PREV_HASH
            && genesis.is_genesis();
        if !genesis_ok {
            return Err(violation(0, genesis, ViolationKind::Genesis));
        }
        if !genesis.validate_hash(&genesis.hash) {
            return Err(violation(0, genesis, ViolationKind::Hash));
        }

        for (index, pair) in self.blocks.windows(2).enumerate() {
            let index = index + 1;
            if pair[1].is_genesis() {
                return Err(violation(index, &pair[1], ViolationKind::Genesis));
            }
            if let Err(e) = validate_successor(&pair[0], &pair[1]) {
                let kind = match e {
                    LedgerError::LinkageMismatch { .. } => ViolationKind::Linkage,
                    LedgerError::PositionGap { .. } => ViolationKind::Position,
                    LedgerError::HashMismatch { .. } | LedgerError::MalformedPayload(_) => {
                        ViolationKind::Hash
                    }
                };
                return Err(violation(index, &pair[1], kind));
            }
        }
        Ok(())
    }

    /// Returns the tail block.
    pub fn tip(&self) -> &Block {
        // A chain is never empty: every constructor installs a genesis block
        // and nothing removes blocks.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Returns the block at `position`, if any.
    pub fn get(&self, position: u64) -> Option<&Block> {
        usize::try_from(position)
            .ok()
            .and_then(|i| self.blocks.get(i))
    }

    /// Number of committed blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Position of the tail block.
    pub fn height(&self) -> u64 {
        self.tip().position
    }

    /// All committed blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Iterate over committed blocks, genesis first.
    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}

impl Default for Chain {
    fn default() -> Self {
        Self::bootstrap()
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

/// Check the three successor invariants for `(prev, curr)`.
fn validate_successor(prev: &Block, curr: &Block) -> LedgerResult<()> {
    if curr.prev_hash != prev.hash {
        return Err(LedgerError::LinkageMismatch {
            position: curr.position,
            expected: prev.hash.clone(),
            actual: curr.prev_hash.clone(),
        });
    }

    curr.verify()?;

    let expected = prev.position.checked_add(1);
    if expected != Some(curr.position) {
        return Err(LedgerError::PositionGap {
            expected: expected.unwrap_or(u64::MAX),
            actual: curr.position,
        });
    }
    Ok(())
}

fn violation(index: usize, block: &Block, kind: ViolationKind) -> ChainViolation {
    ChainViolation {
        index,
        position: block.position,
        kind,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::block::compute_block_hash;

    const T0: &str = "2024-01-01T00:00:00.000000000Z";
    const T1: &str = "2024-01-01T00:00:01.000000000Z";
    const T2: &str = "2024-01-01T00:00:02.000000000Z";

    fn checkout(book: &str, user: &str) -> CheckoutEvent {
        CheckoutEvent::new(book, user, "2024-01-01")
    }

    fn chain_of(n: usize) -> Chain {
        let mut chain = Chain::bootstrap();
        for i in 0..n {
            chain
                .append(checkout(&format!("B{i}"), "alice"))
                .expect("append");
        }
        chain
    }

    #[test]
    fn bootstrap_holds_only_genesis() {
        let chain = Chain::bootstrap();
        assert_eq!(chain.len(), 1);
        assert!(!chain.is_empty());
        assert_eq!(chain.height(), 0);
        assert_eq!(chain.tip().prev_hash, "");
        assert!(chain.tip().is_genesis());
        assert!(chain.tip().validate_hash(&chain.tip().hash));
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn append_commits_linked_block() {
        let mut chain = Chain::bootstrap_at(T0);
        let committed = chain.append_at(checkout("B1", "alice"), T1).unwrap();

        assert_eq!(chain.len(), 2);
        assert_eq!(committed.position, 1);
        assert_eq!(committed.prev_hash, chain.blocks()[0].hash);
        assert_eq!(chain.tip(), &committed);
    }

    #[test]
    fn append_is_deterministic_for_fixed_timestamps() {
        let mut a = Chain::bootstrap_at(T0);
        let mut b = Chain::bootstrap_at(T0);

        let ba = a.append_at(checkout("B1", "alice"), T1).unwrap();
        let bb = b.append_at(checkout("B1", "alice"), T1).unwrap();
        assert_eq!(ba.hash, bb.hash);
        assert_eq!(a, b);
    }

    #[test]
    fn positions_and_links_hold_after_many_appends() {
        let chain = chain_of(20);
        assert_eq!(chain.len(), 21);
        for pair in chain.blocks().windows(2) {
            assert_eq!(pair[1].prev_hash, pair[0].hash);
            assert_eq!(pair[1].position, pair[0].position + 1);
        }
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn forged_prev_hash_is_linkage_mismatch() {
        let mut chain = Chain::bootstrap_at(T0);
        chain.append_at(checkout("B1", "alice"), T1).unwrap();

        let mut candidate = Block::new_at(chain.tip(), checkout("B2", "bob"), T2);
        candidate.prev_hash = "deadbeef".to_string();

        let err = chain.submit(candidate).unwrap_err();
        assert!(matches!(err, LedgerError::LinkageMismatch { position: 2, .. }));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn inconsistent_candidate_is_hash_mismatch() {
        let mut chain = Chain::bootstrap_at(T0);
        let mut candidate = Block::new_at(chain.tip(), checkout("B1", "alice"), T1);
        candidate.payload.user = "mallory".to_string();

        let err = chain.submit(candidate).unwrap_err();
        assert_eq!(err.reason(), "hash_mismatch");
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn skipped_position_is_position_gap() {
        let mut chain = Chain::bootstrap_at(T0);
        let tip = chain.tip().clone();

        // Correctly linked and self-consistent, but two positions ahead.
        let payload = checkout("B1", "alice");
        let bytes = payload.canonical_bytes().unwrap();
        let candidate = Block {
            position: 2,
            hash: compute_block_hash(2, T1, &bytes, &tip.hash),
            payload,
            created_at: T1.to_string(),
            prev_hash: tip.hash.clone(),
        };

        let err = chain.submit(candidate).unwrap_err();
        assert_eq!(
            err,
            LedgerError::PositionGap {
                expected: 1,
                actual: 2
            }
        );
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn stale_candidate_is_rejected() {
        // Two writers read the same tail; only the first commit may land.
        let mut chain = Chain::bootstrap_at(T0);
        let first = Block::new_at(chain.tip(), checkout("B1", "alice"), T1);
        let second = Block::new_at(chain.tip(), checkout("B2", "bob"), T1);

        chain.submit(first).unwrap();
        let err = chain.submit(second).unwrap_err();
        assert_eq!(err.reason(), "linkage_mismatch");
        assert_eq!(chain.len(), 2);
        assert!(chain.verify().is_ok());
    }

    #[test]
    fn genesis_marker_in_payload_is_rejected() {
        let mut chain = Chain::bootstrap();
        let err = chain.append(CheckoutEvent::genesis()).unwrap_err();
        assert_eq!(err.reason(), "malformed_payload");
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn submitted_genesis_marker_is_rejected() {
        let mut chain = Chain::bootstrap_at(T0);
        let candidate = Block::new_at(chain.tip(), CheckoutEvent::genesis(), T1);
        assert!(candidate.validate_hash(&candidate.hash));

        let err = chain.submit(candidate).unwrap_err();
        assert_eq!(err.reason(), "malformed_payload");
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn verify_flags_genesis_marker_after_block_zero() {
        let mut chain = chain_of(2);
        let sentinel = Block::new_at(chain.tip(), CheckoutEvent::genesis(), T2);
        chain.blocks.push(sentinel);

        let v = chain.verify().unwrap_err();
        assert_eq!(v.index, 3);
        assert_eq!(v.position, 3);
        assert_eq!(v.kind, ViolationKind::Genesis);
    }

    #[test]
    fn append_after_max_position_is_position_gap() {
        let payload = checkout("B1", "alice");
        let bytes = payload.canonical_bytes().unwrap();
        let last = Block {
            position: u64::MAX,
            hash: compute_block_hash(u64::MAX, T1, &bytes, "prev"),
            payload,
            created_at: T1.to_string(),
            prev_hash: "prev".to_string(),
        };
        let mut chain = Chain::from_blocks(vec![Block::genesis_at(T0), last]).unwrap();

        let err = chain.append_at(checkout("B2", "bob"), T2).unwrap_err();
        assert_eq!(
            err,
            LedgerError::PositionGap {
                expected: u64::MAX,
                actual: u64::MAX
            }
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn verify_reports_first_tampered_block() {
        let mut chain = chain_of(5);
        chain.blocks[3].payload.book_id = "STOLEN".to_string();

        let v = chain.verify().unwrap_err();
        assert_eq!(v.index, 3);
        assert_eq!(v.position, 3);
        assert_eq!(v.kind, ViolationKind::Hash);
    }

    #[test]
    fn verify_reports_relinked_block_as_linkage() {
        let mut chain = chain_of(4);
        // Rewrite block 2 consistently; block 3 now points at a stale hash.
        let b = &mut chain.blocks[2];
        b.payload.user = "mallory".to_string();
        b.hash = b.compute_hash().unwrap();

        let v = chain.verify().unwrap_err();
        assert_eq!(v.index, 3);
        assert_eq!(v.kind, ViolationKind::Linkage);
    }

    #[test]
    fn verify_rejects_non_genesis_first_block() {
        let chain = chain_of(2);
        let tail_only = Chain::from_blocks(chain.blocks()[1..].to_vec()).unwrap();
        let v = tail_only.verify().unwrap_err();
        assert_eq!(v.index, 0);
        assert_eq!(v.kind, ViolationKind::Genesis);
    }

    #[test]
    fn verify_rejects_tampered_genesis_hash() {
        let mut chain = Chain::bootstrap();
        chain.blocks[0].created_at = T2.to_string();
        let v = chain.verify().unwrap_err();
        assert_eq!(v.index, 0);
        assert_eq!(v.kind, ViolationKind::Hash);
    }

    #[test]
    fn from_blocks_rejects_empty() {
        assert!(Chain::from_blocks(Vec::new()).is_none());
    }

    #[test]
    fn get_by_position() {
        let chain = chain_of(3);
        assert_eq!(chain.get(2).unwrap().position, 2);
        assert!(chain.get(4).is_none());
        assert_eq!(chain.iter().count(), 4);
        assert_eq!((&chain).into_iter().count(), 4);
    }
}
