//! # Cryptographic Primitives
//!
//! The ledger needs exactly one primitive: a collision-resistant hash.
//! Everything here is a thin wrapper around the audited `sha2` crate.

pub mod hash;

pub use hash::{is_hash_hex, sha256, sha256_concat_hex, sha256_hex};
