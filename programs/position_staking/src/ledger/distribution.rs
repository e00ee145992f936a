//! Reward crediting: explicit deposits (single pool or weighted split),
//! permissionless settlement, and release of escrowed rewards.

use anchor_lang::prelude::borsh;
use anchor_lang::prelude::*;

use crate::constants::MAX_POOL_WEIGHT;
use crate::error::StakingError;
use crate::ledger::Observation;
use crate::math;
use crate::state::{ReentrancyGuard, RewardPool, Settlement, StakeRegistry};

/// Where an explicit reward deposit goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub enum RewardTarget {
    /// Entire amount to one pool.
    Pool(u16),
    /// Split across every pool by weight.
    Weighted,
}

/// Per-pool amounts for a deposit, indexed by pool id.
///
/// `weights` holds every registered pool's weight in pool-id order.
pub fn plan_deposit(amount: u64, target: RewardTarget, weights: &[u64]) -> Result<Vec<u64>> {
    require!(amount > 0, StakingError::ZeroAmount);

    match target {
        RewardTarget::Pool(pool_id) => {
            let index = pool_id as usize;
            require!(index < weights.len(), StakingError::PoolNotFound);
            let mut amounts = vec![0; weights.len()];
            amounts[index] = amount;
            Ok(amounts)
        }
        RewardTarget::Weighted => math::weighted_split(amount, weights),
    }
}

/// Changes a pool's share of future weighted deposits and returns the old
/// weight. Rewards already credited are untouched, so no settlement is needed.
pub fn set_pool_weight(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    weight: u64,
) -> Result<u64> {
    require!(weight <= MAX_POOL_WEIGHT, StakingError::InvalidPoolConfig);
    registry.ensure_pool_exists(pool.pool_id)?;

    let old_weight = pool.weight;
    registry.reweight(old_weight, weight)?;
    pool.weight = weight;
    Ok(old_weight)
}

/// Brings a pool's accumulator up to date with its reward vault.
pub fn settle_pool(
    registry: &StakeRegistry,
    pool: &mut RewardPool,
    observed: Observation,
) -> Result<Settlement> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    registry.ensure_pool_exists(pool.pool_id)?;
    pool.settle(observed.reward_balance, observed.now)
}

/// Credits rewards escrowed while the pool was empty to its current stakers.
pub fn release_unassigned(
    registry: &StakeRegistry,
    pool: &mut RewardPool,
    observed: Observation,
) -> Result<u64> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require!(
        pool.unassigned_rewards > 0 && pool.total_shares > 0,
        StakingError::NothingToRelease
    );

    pool.settle(observed.reward_balance, observed.now)?;
    pool.release_unassigned()
}
