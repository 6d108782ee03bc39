//! # Storage Module
//!
//! In-memory storage for the checkout ledger. Nothing here touches disk;
//! the chain lives for as long as the process that owns it.
//!
//! ## Architecture
//!
//! ```text
//! block.rs   - Block structure, genesis block, hash derivation and checks
//! chain.rs   - Ordered block sequence; append, submit, full verification
//! ledger.rs  - Cloneable lock-guarded handle for sharing one chain
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! CheckoutEvent → Ledger (write lock) → Chain::append → Block::new
//!                                            ↓
//!                                   validate vs. tail → commit | reject
//! ```

pub mod block;
pub mod chain;
pub mod ledger;

pub use block::{compute_block_hash, now_timestamp, Block};
pub use chain::Chain;
pub use ledger::Ledger;
