//! # Shared Crypto — cryptographic primitives for the Proof-of-Devotion engine
//!
//! | Module | Algorithm | Use case |
//! |--------|-----------|----------|
//! | `hashing` | BLAKE3 | Block/transaction content hashing |
//! | `ecdsa` | secp256k1 | Block and transaction signing (local signing backend) |
//!
//! Symmetric encryption, Ed25519 signatures, and BLS aggregation have no
//! counterpart in this engine (see DESIGN.md) and were dropped.
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic, low-S normalization (EIP-2)
//! - **BLAKE3**: SIMD-accelerated, 5-10x faster than SHA-256

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod hashing;

// Re-exports
pub use ecdsa::{Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature};
pub use errors::CryptoError;
pub use hashing::{blake3_hash, Blake3Hasher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
