use anchor_lang::prelude::borsh;
use anchor_lang::prelude::*;

use crate::error::StakingError;
use crate::math;
use crate::state::RewardPool;

/// A single staked principal owned by one address at a time.
///
/// Positions are keyed by a registry-wide id that is never reused, so an id
/// held by a marketplace stays valid no matter which other positions close.
#[account]
#[derive(Debug)]
pub struct Position {
    pub registry: Pubkey,
    pub owner: Pubkey,

    pub pool_id: u16,
    pub position_id: u64,

    pub amount: u64,
    pub shares: u64,
    pub reward_debt: u128,
    /// Reward earned at an earlier share basis and not yet paid out.
    pub accrued_rewards: u64,

    pub committed_duration: i64,
    pub start_time: i64,
    pub lock_end_time: i64,

    pub total_claimed: u64,

    pub bump: u8,
}

impl Position {
    pub const LEN: usize = 8
        + (32 * 2)
        + 2
        + 8
        + (8 * 2)
        + 16
        + 8
        + (8 * 3)
        + 8
        + 1;

    pub fn is_lock_expired(&self, now: i64) -> bool {
        now >= self.lock_end_time
    }

    pub fn remaining_lock_seconds(&self, now: i64) -> i64 {
        self.lock_end_time.saturating_sub(now).max(0)
    }

    /// Fails with `NotPositionOwner` unless `caller` holds the position.
    pub fn ensure_owner(&self, caller: &Pubkey) -> Result<()> {
        require_keys_eq!(self.owner, *caller, StakingError::NotPositionOwner);
        Ok(())
    }

    /// Reward claimable against an already settled pool.
    pub fn pending_reward(&self, pool: &RewardPool) -> Result<u64> {
        let earned = math::pending_reward(self.shares, self.reward_debt, pool.acc_reward_per_share)?;
        earned
            .checked_add(self.accrued_rewards)
            .ok_or_else(|| StakingError::MathOverflow.into())
    }

    /// Prices the current accumulator into the position.
    pub fn rebase_debt(&mut self, pool: &RewardPool) -> Result<()> {
        self.reward_debt = math::reward_debt(self.shares, pool.acc_reward_per_share)?;
        Ok(())
    }
}

/// Read-only snapshot handed to marketplaces and clients.
#[derive(Clone, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct PositionView {
    pub position_id: u64,
    pub pool_id: u16,
    pub owner: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub lock_end_time: i64,
    pub lock_expired: bool,
    pub pending_reward: u64,
}
