//! # Ledger Configuration & Constants
//!
//! Every fixed value the ledger and the node agree on lives here. Changing
//! anything in the "Hash Derivation" section changes every block hash ever
//! produced, so treat those as frozen.

// ---------------------------------------------------------------------------
// Format Version
// ---------------------------------------------------------------------------

/// Version of the block layout and hash derivation. Bump when the hash
/// preimage changes.
pub const LEDGER_FORMAT_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Hash Derivation
// ---------------------------------------------------------------------------

/// Hash function applied to the block preimage.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Digest length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of a hex-encoded block hash.
pub const HASH_HEX_LENGTH: usize = HASH_OUTPUT_LENGTH * 2;

/// Predecessor hash stored in the genesis block. There is no real
/// predecessor, so the field is empty rather than a zero digest.
pub const GENESIS_PREV_HASH: &str = "";

/// Position of the genesis block.
pub const GENESIS_POSITION: u64 = 0;

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// Human-readable description of the `created_at` format. Block timestamps
/// are RFC 3339 in UTC with nanosecond precision and a `Z` suffix, so the
/// string is fixed-width and sorts lexically.
pub const TIMESTAMP_FORMAT: &str = "RFC3339 UTC, nanosecond precision";

// ---------------------------------------------------------------------------
// Node Defaults
// ---------------------------------------------------------------------------

/// Default bind address for the HTTP API.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port for the HTTP API.
pub const DEFAULT_API_PORT: u16 = 8080;

/// Default port for the Prometheus metrics endpoint.
pub const DEFAULT_METRICS_PORT: u16 = 9090;

/// Default interval between background chain audits, in seconds.
/// Zero disables the audit task.
pub const DEFAULT_AUDIT_INTERVAL_SECS: u64 = 30;
