//! Local mining gate: `Disabled -> Pending -> Active` state
//! machine guarding whether this node may mint.
//!
//! An atomic snapshot gives lock-free reads; a mutex guards the transition
//! method. No retry-counting semantics — this gate has no failure threshold.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use thiserror::Error;

const DISABLED: u8 = 0;
const PENDING: u8 = 1;
const ACTIVE: u8 = 2;

/// Local mining gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Disabled,
    Pending,
    Active,
}

impl GateState {
    fn from_u8(v: u8) -> Self {
        match v {
            DISABLED => GateState::Disabled,
            PENDING => GateState::Pending,
            _ => GateState::Active,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            GateState::Disabled => DISABLED,
            GateState::Pending => PENDING,
            GateState::Active => ACTIVE,
        }
    }
}

/// Errors raised attempting an invalid mining-gate transition.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MiningGateError {
    #[error("mining is already enabled")]
    AlreadyEnabled,
    #[error("resume_mining requires the gate to be pending or active")]
    NotUnlocked,
}

/// `enabled`/`pending` flags: atomic snapshot reads for the hot
/// path, `parking_lot::Mutex`-serialized transitions for external commands.
pub struct MiningGate {
    state: AtomicU8,
    transition_lock: Mutex<()>,
}

impl MiningGate {
    /// Initial state is `Pending` with `enabled=false`.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PENDING),
            transition_lock: Mutex::new(()),
        }
    }

    /// Lock-free snapshot of the current state.
    pub fn state(&self) -> GateState {
        GateState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// `enabled && !pending`.
    pub fn can_mint(&self) -> bool {
        self.state() == GateState::Active
    }

    /// `Disabled -> Pending`: unlocks the signing key (or no-ops in
    /// remote-sign mode) and moves the gate to `Pending`.
    pub fn enable_mining(&self) -> Result<(), MiningGateError> {
        let _guard = self.transition_lock.lock();
        if self.state() != GateState::Disabled {
            return Err(MiningGateError::AlreadyEnabled);
        }
        self.state.store(PENDING, Ordering::Release);
        Ok(())
    }

    /// `Pending -> Active`.
    pub fn resume_mining(&self) -> Result<(), MiningGateError> {
        let _guard = self.transition_lock.lock();
        match self.state() {
            GateState::Pending | GateState::Active => {
                self.state.store(ACTIVE, Ordering::Release);
                Ok(())
            }
            GateState::Disabled => Err(MiningGateError::NotUnlocked),
        }
    }

    /// `Active -> Pending`.
    pub fn suspend_mining(&self) -> Result<(), MiningGateError> {
        let _guard = self.transition_lock.lock();
        match self.state() {
            GateState::Active | GateState::Pending => {
                self.state.store(PENDING, Ordering::Release);
                Ok(())
            }
            GateState::Disabled => Err(MiningGateError::NotUnlocked),
        }
    }

    /// `Active|Pending -> Disabled`: locks the key.
    pub fn disable_mining(&self) {
        let _guard = self.transition_lock.lock();
        self.state.store(DISABLED, Ordering::Release);
    }
}

impl Default for MiningGate {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_pending_and_cannot_mint() {
        let gate = MiningGate::new();
        assert_eq!(gate.state(), GateState::Pending);
        assert!(!gate.can_mint());
    }

    #[test]
    fn full_lifecycle_disabled_pending_active() {
        let gate = MiningGate::new();
        gate.disable_mining();
        assert_eq!(gate.state(), GateState::Disabled);

        gate.enable_mining().unwrap();
        assert_eq!(gate.state(), GateState::Pending);
        assert!(!gate.can_mint());

        gate.resume_mining().unwrap();
        assert_eq!(gate.state(), GateState::Active);
        assert!(gate.can_mint());

        gate.suspend_mining().unwrap();
        assert_eq!(gate.state(), GateState::Pending);

        gate.disable_mining();
        assert_eq!(gate.state(), GateState::Disabled);
    }

    #[test]
    fn enable_mining_rejects_already_enabled() {
        let gate = MiningGate::new();
        assert_eq!(gate.state(), GateState::Pending);
        assert_eq!(gate.enable_mining(), Err(MiningGateError::AlreadyEnabled));
    }

    #[test]
    fn resume_mining_rejects_disabled() {
        let gate = MiningGate::new();
        gate.disable_mining();
        assert_eq!(gate.resume_mining(), Err(MiningGateError::NotUnlocked));
    }
}
