//! Canonical transaction encoding and hashing for emberchain.
//!
//! This crate defines the byte layout and hash commitments every other
//! component of the node agrees on:
//! - SHA-256 digests and helpers
//! - Binary wire primitives (big-endian ints, varints, length-prefixed blobs)
//! - Transaction types with their canonical encode/decode
//! - The transaction id and per-input signing digest
//! - Merkle root reduction over transaction ids
//!
//! Everything here is pure value data: no I/O beyond caller-supplied
//! streams, no caching, no shared state. Networking, validation, the
//! mempool, and script execution live in sibling crates.

pub mod codec;
pub mod hash;
pub mod merkle;
pub mod transaction;

// Re-export commonly used types at the crate root
pub use codec::{CodecError, MAX_VARBLOB_LEN};
pub use hash::{sha256, sha256d, Hash, HashError, H256};
pub use merkle::{merkle_root, MerkleProof, MerkleTree};
pub use transaction::{Outpoint, Transaction, TxIn, TxOut};
