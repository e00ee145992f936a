use anchor_lang::prelude::borsh;
use anchor_lang::prelude::*;

use crate::constants::*;
use crate::error::StakingError;
use crate::math;

/// How a pool converts principal into reward shares.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum ShareWeighting {
    /// One share per unit of principal.
    Flat,
    /// `amount * committed_duration / reference_duration` shares, so longer
    /// commitments earn proportionally more.
    DurationWeighted { reference_duration: i64 },
}

/// Outcome of a single [`RewardPool::settle`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    /// No new reward in the vault.
    Idle,
    /// New reward credited to the accumulator.
    Distributed { amount: u64, delta: u128 },
    /// New reward arrived while the pool had no shares and was escrowed.
    Escrowed { amount: u64 },
}

/// A reward-bearing pool with its own lock tier and accumulator.
#[account]
#[derive(Debug)]
pub struct RewardPool {
    pub registry: Pubkey,
    pub reward_vault: Pubkey,

    pub pool_id: u16,
    pub lock_duration: i64,
    pub weight: u64,
    pub share_weighting: ShareWeighting,

    /// Cumulative reward per share since genesis, scaled by `ACC_PRECISION`.
    pub acc_reward_per_share: u128,
    pub total_shares: u64,
    pub total_staked: u64,

    /// Reward vault balance already accounted for (assigned or escrowed, not paid).
    pub tracked_reward_balance: u64,
    pub unassigned_rewards: u64,
    pub total_rewards_distributed: u64,
    pub total_rewards_paid: u64,

    pub last_settle_time: i64,
    pub created_at: i64,

    pub bump: u8,
    pub vault_bump: u8,
}

impl RewardPool {
    pub const LEN: usize = 8
        + (32 * 2)
        + 2
        + 8
        + 8
        + (1 + 8)
        + 16
        + (8 * 2)
        + (8 * 4)
        + (8 * 2)
        + 2;

    /// Bounds checks for admin-supplied pool parameters.
    pub fn validate_config(
        lock_duration: i64,
        weight: u64,
        share_weighting: &ShareWeighting,
    ) -> Result<()> {
        require!(
            (0..=MAX_LOCK_DURATION).contains(&lock_duration),
            StakingError::InvalidPoolConfig
        );
        require!(weight <= MAX_POOL_WEIGHT, StakingError::InvalidPoolConfig);

        if let ShareWeighting::DurationWeighted { reference_duration } = share_weighting {
            require!(
                (1..=MAX_LOCK_DURATION).contains(reference_duration),
                StakingError::InvalidPoolConfig
            );
            // A zero-length lock would earn zero shares forever.
            require!(lock_duration > 0, StakingError::InvalidPoolConfig);
        }

        Ok(())
    }

    /// Shares earned by `amount` committed for `committed_duration` seconds.
    pub fn shares_for(&self, amount: u64, committed_duration: i64) -> Result<u64> {
        match self.share_weighting {
            ShareWeighting::Flat => Ok(amount),
            ShareWeighting::DurationWeighted { reference_duration } => {
                math::duration_shares(amount, committed_duration, reference_duration)
            }
        }
    }

    /// Advances the accumulator to cover any reward that reached the vault
    /// since the last settlement.
    ///
    /// New reward is discovered by diffing `observed_reward_balance` against
    /// `tracked_reward_balance`. A repeated call with an unchanged balance
    /// leaves the accumulator untouched.
    pub fn settle(&mut self, observed_reward_balance: u64, now: i64) -> Result<Settlement> {
        let incoming = observed_reward_balance.saturating_sub(self.tracked_reward_balance);

        let settlement = if incoming == 0 {
            Settlement::Idle
        } else if self.total_shares == 0 {
            Settlement::Escrowed { amount: incoming }
        } else {
            Settlement::Distributed {
                amount: incoming,
                delta: math::per_share_delta(incoming, self.total_shares)?,
            }
        };

        match settlement {
            Settlement::Idle => {}
            Settlement::Escrowed { amount } => {
                let unassigned = self
                    .unassigned_rewards
                    .checked_add(amount)
                    .ok_or(StakingError::MathOverflow)?;
                self.tracked_reward_balance = observed_reward_balance;
                self.unassigned_rewards = unassigned;
            }
            Settlement::Distributed { amount, delta } => {
                let acc = self
                    .acc_reward_per_share
                    .checked_add(delta)
                    .ok_or(StakingError::MathOverflow)?;
                let distributed = self
                    .total_rewards_distributed
                    .checked_add(amount)
                    .ok_or(StakingError::MathOverflow)?;
                self.tracked_reward_balance = observed_reward_balance;
                self.acc_reward_per_share = acc;
                self.total_rewards_distributed = distributed;
            }
        }

        self.last_settle_time = self.last_settle_time.max(now);
        Ok(settlement)
    }

    /// Credits escrowed rewards to the current stakers.
    pub fn release_unassigned(&mut self) -> Result<u64> {
        require!(
            self.unassigned_rewards > 0 && self.total_shares > 0,
            StakingError::NothingToRelease
        );

        let released = self.unassigned_rewards;
        let delta = math::per_share_delta(released, self.total_shares)?;
        let acc = self
            .acc_reward_per_share
            .checked_add(delta)
            .ok_or(StakingError::MathOverflow)?;
        let distributed = self
            .total_rewards_distributed
            .checked_add(released)
            .ok_or(StakingError::MathOverflow)?;

        self.acc_reward_per_share = acc;
        self.total_rewards_distributed = distributed;
        self.unassigned_rewards = 0;

        Ok(released)
    }

    /// Reward in the vault that belongs to stakers and has not been paid out.
    pub fn assigned_balance(&self) -> u64 {
        self.tracked_reward_balance
            .saturating_sub(self.unassigned_rewards)
    }

    /// Books `requested` reward leaving the vault and returns the amount that
    /// may actually leave. Never exceeds the assigned balance, so rounding can
    /// not pay out more than was injected.
    pub fn record_reward_outflow(&mut self, requested: u64) -> Result<u64> {
        let amount = requested.min(self.assigned_balance());
        let paid = self
            .total_rewards_paid
            .checked_add(amount)
            .ok_or(StakingError::MathOverflow)?;

        self.tracked_reward_balance = self
            .tracked_reward_balance
            .checked_sub(amount)
            .ok_or(StakingError::MathUnderflow)?;
        self.total_rewards_paid = paid;

        Ok(amount)
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
}
