//! Account builders shared by the ledger unit tests.

use anchor_lang::prelude::*;

use crate::ledger::{self, Observation};
use crate::state::*;

pub(crate) fn registry() -> StakeRegistry {
    StakeRegistry {
        authority: Pubkey::new_unique(),
        staking_mint: Pubkey::new_unique(),
        reward_mint: Pubkey::new_unique(),
        stake_vault: Pubkey::new_unique(),
        pool_count: 0,
        next_position_id: 0,
        total_weight: 0,
        total_staked: 0,
        total_shares: 0,
        paused: false,
        reentrancy: ReentrancyStatus::Unlocked,
        created_at: 0,
        last_updated: 0,
        bump: 255,
        vault_bump: 254,
    }
}

pub(crate) fn pool(
    registry: &mut StakeRegistry,
    lock_duration: i64,
    share_weighting: ShareWeighting,
) -> RewardPool {
    let pool_id = registry.register_pool(1).unwrap();
    RewardPool {
        registry: Pubkey::new_unique(),
        reward_vault: Pubkey::new_unique(),
        pool_id,
        lock_duration,
        weight: 1,
        share_weighting,
        acc_reward_per_share: 0,
        total_shares: 0,
        total_staked: 0,
        tracked_reward_balance: 0,
        unassigned_rewards: 0,
        total_rewards_distributed: 0,
        total_rewards_paid: 0,
        last_settle_time: 0,
        created_at: 0,
        bump: 255,
        vault_bump: 254,
    }
}

pub(crate) fn owner_account(owner: Pubkey) -> OwnerAccount {
    OwnerAccount {
        owner,
        registry: Pubkey::new_unique(),
        open_positions: 0,
        approval: None,
        bump: 255,
    }
}

/// One registry with a single pool and a simulated reward vault balance.
pub(crate) struct Fixture {
    pub registry: StakeRegistry,
    pub pool: RewardPool,
    pub owner_account: OwnerAccount,
    pub reward_vault: u64,
}

impl Fixture {
    pub fn new(lock_duration: i64, share_weighting: ShareWeighting) -> Self {
        let mut registry = registry();
        let pool = pool(&mut registry, lock_duration, share_weighting);
        Self {
            registry,
            pool,
            owner_account: owner_account(Pubkey::new_unique()),
            reward_vault: 0,
        }
    }

    pub fn flat(lock_duration: i64) -> Self {
        Self::new(lock_duration, ShareWeighting::Flat)
    }

    pub fn observe(&self, now: i64) -> Observation {
        Observation::new(now, self.reward_vault)
    }

    /// Reward source paying straight into the vault.
    pub fn inject(&mut self, amount: u64) {
        self.reward_vault += amount;
    }

    pub fn open(
        &mut self,
        owner: Pubkey,
        amount: u64,
        lock_duration_override: Option<i64>,
        now: i64,
    ) -> Result<Position> {
        let observed = self.observe(now);
        ledger::open_position(
            &mut self.registry,
            &mut self.pool,
            &mut self.owner_account,
            owner,
            amount,
            lock_duration_override,
            observed,
        )
    }

    pub fn pending(&self, position: &Position, now: i64) -> u64 {
        ledger::preview_pending(&self.pool, position, &position.owner, self.observe(now)).unwrap()
    }
}
