//! Top-level error types: one `thiserror` enum per concern, unified by
//! [`EngineError`].

use crate::domain::{DynastyError, MiningGateError, TimingError};
use thiserror::Error;

/// Errors raised while assembling, sealing, signing or broadcasting a block.
#[derive(Debug, Error)]
pub enum ProducerError {
    #[error("mining is disabled")]
    CannotMintWhenDisable,
    #[error("a mint is already pending")]
    CannotMintWhenPending,
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error("failed to compute next consensus state: {0}")]
    GenerateNextConsensusState(String),
    #[error("local miner is not the scheduled proposer")]
    InvalidBlockProposer,
    #[error(transparent)]
    Dynasty(#[from] DynastyError),
    #[error("remote signing request failed: {0}")]
    RemoteSignFailed(String),
    #[error("remote VRF seed request failed: {0}")]
    RemoteVrfFailed(String),
    #[error("failed to append the minted block to the chain")]
    AppendNewBlockFailed,
}

/// Errors raised by the governance driver.
#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("heartbeat attempted while mining is disabled")]
    NoHeartbeatWhenDisable,
    #[error("local miner is not signed up as a dynasty participant")]
    MinerNotSignUp,
    #[error(transparent)]
    Dynasty(#[from] DynastyError),
    #[error("failed to submit governance transaction: {0}")]
    SubmissionFailed(String),
    #[error("failed to encode governance payload: {0}")]
    Encode(#[from] bincode::Error),
}

/// Errors raised by [`crate::verify::verify_block`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("block timestamp does not match its consensus_root timestamp")]
    InvalidBlockTimestamp,
    #[error("block timestamp is not aligned to the block interval")]
    InvalidBlockInterval,
    #[error("block signer does not match the scheduled proposer")]
    InvalidBlockProposer,
    #[error("block is missing the required VRF random seed")]
    InvalidBlockRandom,
    #[error(transparent)]
    Dynasty(#[from] DynastyError),
}

/// Top-level error unifying every concern the engine's control loop surfaces.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error(transparent)]
    Dynasty(#[from] DynastyError),
    #[error(transparent)]
    Producer(#[from] ProducerError),
    #[error(transparent)]
    Governance(#[from] GovernanceError),
    #[error(transparent)]
    Verify(#[from] VerifyError),
    #[error(transparent)]
    MiningGate(#[from] MiningGateError),
}
