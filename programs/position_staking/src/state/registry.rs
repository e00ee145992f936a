use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::StakingError;
use crate::state::ReentrancyStatus;

/// Root account of a staking deployment: admin, mints, custody and the
/// program-wide totals across every pool.
#[account]
#[derive(Debug)]
pub struct StakeRegistry {
    pub authority: Pubkey,
    pub staking_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub stake_vault: Pubkey,

    pub pool_count: u16,
    pub next_position_id: u64,
    pub total_weight: u64,

    pub total_staked: u64,
    pub total_shares: u64,

    pub paused: bool,
    pub reentrancy: ReentrancyStatus,

    pub created_at: i64,
    pub last_updated: i64,

    pub bump: u8,
    pub vault_bump: u8,
}

impl StakeRegistry {
    pub const LEN: usize = 8
        + (32 * 4)
        + 2
        + (8 * 2)
        + (8 * 2)
        + 1
        + 1
        + (8 * 2)
        + 2;

    /// Fails with `PoolNotFound` for ids that were never registered.
    pub fn ensure_pool_exists(&self, pool_id: u16) -> Result<()> {
        require!(pool_id < self.pool_count, StakingError::PoolNotFound);
        Ok(())
    }

    /// Appends a pool slot and returns its id.
    pub fn register_pool(&mut self, weight: u64) -> Result<u16> {
        require!(self.pool_count < MAX_POOLS, StakingError::TooManyPools);

        let pool_id = self.pool_count;
        let total_weight = self
            .total_weight
            .checked_add(weight)
            .ok_or(StakingError::MathOverflow)?;
        self.pool_count = pool_id + 1;
        self.total_weight = total_weight;

        Ok(pool_id)
    }

    /// Replaces one pool's contribution to `total_weight`.
    pub fn reweight(&mut self, old_weight: u64, new_weight: u64) -> Result<()> {
        self.total_weight = self
            .total_weight
            .checked_sub(old_weight)
            .ok_or(StakingError::MathUnderflow)?
            .checked_add(new_weight)
            .ok_or(StakingError::MathOverflow)?;
        Ok(())
    }

    /// Hands out the next position id. Ids are never reused.
    pub fn allocate_position_id(&mut self) -> Result<u64> {
        let id = self.next_position_id;
        self.next_position_id = self
            .next_position_id
            .checked_add(1)
            .ok_or(StakingError::MathOverflow)?;
        Ok(id)
    }

    pub fn add_stake(&mut self, amount: u64, shares: u64) -> Result<()> {
        let total_staked = self
            .total_staked
            .checked_add(amount)
            .ok_or(StakingError::MathOverflow)?;
        let total_shares = self
            .total_shares
            .checked_add(shares)
            .ok_or(StakingError::MathOverflow)?;
        self.total_staked = total_staked;
        self.total_shares = total_shares;
        Ok(())
    }

    pub fn remove_stake(&mut self, amount: u64, shares: u64) -> Result<()> {
        let total_staked = self
            .total_staked
            .checked_sub(amount)
            .ok_or(StakingError::MathUnderflow)?;
        let total_shares = self
            .total_shares
            .checked_sub(shares)
            .ok_or(StakingError::MathUnderflow)?;
        self.total_staked = total_staked;
        self.total_shares = total_shares;
        Ok(())
    }

    pub fn compounding_supported(&self) -> bool {
        self.reward_mint == self.staking_mint
    }
}
