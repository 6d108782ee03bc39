// Copyright (c) 2026 Bookchain Contributors. MIT License.
// See LICENSE for details.

//! # Bookchain Ledger - Core Library
//!
//! An append-only, tamper-evident log of book checkouts. Each block carries
//! one checkout event and the SHA-256 hash of its predecessor, so editing any
//! committed block breaks every link after it.
//!
//! This is a single-writer, single-process ledger. No consensus, no mining,
//! no peers, no disk. The only promise is that the sequence you hold is
//! internally consistent, and that you can check it.
//!
//! ## Modules
//!
//! - **checkout** - The payload recorded in each block.
//! - **storage** - Blocks, the chain, and the shared ledger handle.
//! - **catalog** - Book records with deterministic ids. Not on the chain.
//! - **crypto** - SHA-256 helpers.
//! - **error** - Rejection and violation types.
//! - **config** - Format constants and node defaults.
//!
//! ## Example
//!
//! ```
//! use bookchain_ledger::{CheckoutEvent, Ledger};
//!
//! let ledger = Ledger::new();
//! let block = ledger
//!     .append(CheckoutEvent::new("B1", "alice", "2024-01-01"))
//!     .expect("valid checkout");
//! assert_eq!(block.position, 1);
//! assert!(ledger.verify().is_ok());
//! ```

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod crypto;
pub mod error;
pub mod storage;

pub use catalog::Book;
pub use checkout::CheckoutEvent;
pub use error::{ChainViolation, LedgerError, LedgerResult, ViolationKind};
pub use storage::{Block, Chain, Ledger};
