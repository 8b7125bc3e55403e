//! # Shared Types Crate
//!
//! Cross-crate primitives shared between `pod-consensus` and `pod-node`.
//!
//! A broader multi-subsystem type catalogue (IPC envelopes, an
//! authenticated-message wrapper, per-subsystem error enums, rate
//! limiting, subsystem registration) has no counterpart in a single
//! consensus-engine crate; only the content-addressing primitive both
//! `pod-consensus` and `pod-node` build on survives here.

/// A 32-byte content hash (block hash, transaction hash, VRF seed).
pub type Hash = [u8; 32];
