//! Registry-wide reentrancy guard.
//!
//! The guard is held from the moment a payout plan starts executing until every
//! external transfer in it has returned. Any ledger entry point that observes a
//! held guard fails with [`StakingError::Reentrant`] instead of queuing.

use anchor_lang::prelude::borsh;
use anchor_lang::prelude::*;

use crate::error::StakingError;

/// Guard status stored on the registry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum ReentrancyStatus {
    /// No payout in flight.
    #[default]
    Unlocked,
    /// External payouts are executing.
    Locked,
}

/// Acquire/release helpers over a [`ReentrancyStatus`].
pub struct ReentrancyGuard;

impl ReentrancyGuard {
    /// Acquire the guard, failing if it is already held.
    pub fn acquire(status: &mut ReentrancyStatus) -> Result<()> {
        Self::ensure_unlocked(status)?;
        *status = ReentrancyStatus::Locked;
        Ok(())
    }

    /// Release the guard.
    pub fn release(status: &mut ReentrancyStatus) {
        if *status == ReentrancyStatus::Unlocked {
            msg!("Warning: releasing an unlocked reentrancy guard");
        }
        *status = ReentrancyStatus::Unlocked;
    }

    /// Check if the guard is currently held
    pub fn is_locked(status: &ReentrancyStatus) -> bool {
        *status != ReentrancyStatus::Unlocked
    }

    /// Fail with `Reentrant` if the guard is held.
    pub fn ensure_unlocked(status: &ReentrancyStatus) -> Result<()> {
        require!(!Self::is_locked(status), StakingError::Reentrant);
        Ok(())
    }
}
