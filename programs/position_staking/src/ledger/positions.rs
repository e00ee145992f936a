//! Position lifecycle: open, claim, compound, extend, close, plus the read
//! accessors marketplaces use before acting.
//!
//! Every operation that touches shares, debt or principal settles the pool
//! first. Validation happens before the first mutation so a rejected call
//! leaves every account untouched.

use anchor_lang::prelude::*;

use crate::constants::MAX_LOCK_DURATION;
use crate::error::StakingError;
use crate::ledger::{Observation, PayoutPlan};
use crate::math;
use crate::state::{
    OwnerAccount, Position, PositionView, ReentrancyGuard, RewardPool, StakeRegistry,
};

/// Binds a position to the pool account it was opened in.
pub(crate) fn ensure_same_pool(pool: &RewardPool, position: &Position) -> Result<()> {
    require!(pool.pool_id == position.pool_id, StakingError::PoolNotFound);
    Ok(())
}

/// Opens a new position holding `received_amount` of principal.
///
/// `received_amount` is what actually reached the stake vault; the custody
/// debit happens before this call.
pub fn open_position(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    owner_account: &mut OwnerAccount,
    owner: Pubkey,
    received_amount: u64,
    lock_duration_override: Option<i64>,
    observed: Observation,
) -> Result<Position> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require!(!registry.paused, StakingError::StakingPaused);
    require!(received_amount > 0, StakingError::ZeroAmount);
    registry.ensure_pool_exists(pool.pool_id)?;

    let committed_duration = lock_duration_override.unwrap_or(pool.lock_duration);
    require!(
        committed_duration >= pool.lock_duration,
        StakingError::LockDurationTooShort
    );
    require!(
        committed_duration <= MAX_LOCK_DURATION,
        StakingError::LockDurationTooLong
    );

    let shares = pool.shares_for(received_amount, committed_duration)?;
    require!(shares > 0, StakingError::ZeroShares);

    let lock_end_time = observed
        .now
        .checked_add(committed_duration)
        .ok_or(StakingError::MathOverflow)?;

    pool.settle(observed.reward_balance, observed.now)?;

    let position_id = registry.allocate_position_id()?;
    let mut position = Position {
        registry: pool.registry,
        owner,
        pool_id: pool.pool_id,
        position_id,
        amount: received_amount,
        shares,
        reward_debt: 0,
        accrued_rewards: 0,
        committed_duration,
        start_time: observed.now,
        lock_end_time,
        total_claimed: 0,
        bump: 0,
    };
    // Priced at the settled accumulator: nothing distributed before this
    // point is owed to the new position.
    position.rebase_debt(pool)?;

    pool.add_stake(received_amount, shares)?;
    registry.add_stake(received_amount, shares)?;
    owner_account.add_position()?;

    Ok(position)
}

/// Pays out everything the position has earned so far.
pub fn claim(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    position: &mut Position,
    caller: &Pubkey,
    observed: Observation,
) -> Result<PayoutPlan> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    position.ensure_owner(caller)?;
    ensure_same_pool(pool, position)?;

    pool.settle(observed.reward_balance, observed.now)?;

    let pending = position.pending_reward(pool)?;
    let paid = pool.record_reward_outflow(pending)?;

    position.accrued_rewards = 0;
    position.rebase_debt(pool)?;
    position.total_claimed = position
        .total_claimed
        .checked_add(paid)
        .ok_or(StakingError::MathOverflow)?;

    let mut plan = PayoutPlan::default();
    plan.reward(position.owner, paid);
    Ok(plan)
}

/// Folds the pending reward back into the position's principal.
pub fn compound(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    position: &mut Position,
    caller: &Pubkey,
    observed: Observation,
) -> Result<PayoutPlan> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require!(
        registry.compounding_supported(),
        StakingError::CompoundUnsupported
    );
    position.ensure_owner(caller)?;
    ensure_same_pool(pool, position)?;

    pool.settle(observed.reward_balance, observed.now)?;

    let pending = position.pending_reward(pool)?;
    let moved = pool.record_reward_outflow(pending)?;
    let added_shares = pool.shares_for(moved, position.committed_duration)?;

    position.amount = position
        .amount
        .checked_add(moved)
        .ok_or(StakingError::MathOverflow)?;
    position.shares = position
        .shares
        .checked_add(added_shares)
        .ok_or(StakingError::MathOverflow)?;
    position.total_claimed = position
        .total_claimed
        .checked_add(moved)
        .ok_or(StakingError::MathOverflow)?;
    pool.add_stake(moved, added_shares)?;
    registry.add_stake(moved, added_shares)?;

    position.accrued_rewards = 0;
    position.rebase_debt(pool)?;

    let mut plan = PayoutPlan::default();
    plan.restake(moved);
    Ok(plan)
}

/// Lengthens the lock by `additional_duration` seconds.
///
/// Reward earned at the old share count is stashed in `accrued_rewards` and
/// stays claimable; the new share count only affects future accrual.
pub fn extend_lock(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    position: &mut Position,
    caller: &Pubkey,
    additional_duration: i64,
    observed: Observation,
) -> Result<()> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require!(!registry.paused, StakingError::StakingPaused);
    position.ensure_owner(caller)?;
    ensure_same_pool(pool, position)?;
    require!(additional_duration > 0, StakingError::ZeroAmount);

    let committed_duration = position
        .committed_duration
        .checked_add(additional_duration)
        .ok_or(StakingError::MathOverflow)?;
    require!(
        committed_duration <= MAX_LOCK_DURATION,
        StakingError::LockDurationTooLong
    );
    let lock_end_time = position
        .start_time
        .checked_add(committed_duration)
        .ok_or(StakingError::MathOverflow)?;

    pool.settle(observed.reward_balance, observed.now)?;

    let earned = math::pending_reward(
        position.shares,
        position.reward_debt,
        pool.acc_reward_per_share,
    )?;
    let accrued_rewards = position
        .accrued_rewards
        .checked_add(earned)
        .ok_or(StakingError::MathOverflow)?;
    let new_shares = pool.shares_for(position.amount, committed_duration)?;

    pool.remove_stake(0, position.shares)?;
    pool.add_stake(0, new_shares)?;
    registry.remove_stake(0, position.shares)?;
    registry.add_stake(0, new_shares)?;

    position.accrued_rewards = accrued_rewards;
    position.shares = new_shares;
    position.committed_duration = committed_duration;
    position.lock_end_time = lock_end_time;
    position.rebase_debt(pool)?;

    Ok(())
}

/// Closes an unlocked position, releasing principal and residual reward.
///
/// The position is zeroed and must be removed from storage by the caller.
pub fn close_position(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    owner_account: &mut OwnerAccount,
    position: &mut Position,
    caller: &Pubkey,
    observed: Observation,
) -> Result<PayoutPlan> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    position.ensure_owner(caller)?;
    ensure_same_pool(pool, position)?;
    if !position.is_lock_expired(observed.now) {
        msg!(
            "Position {} is locked for another {}s",
            position.position_id,
            position.remaining_lock_seconds(observed.now)
        );
        return err!(StakingError::LockNotExpired);
    }

    pool.settle(observed.reward_balance, observed.now)?;

    let pending = position.pending_reward(pool)?;
    let paid = pool.record_reward_outflow(pending)?;
    let principal = position.amount;

    pool.remove_stake(principal, position.shares)?;
    registry.remove_stake(principal, position.shares)?;
    owner_account.remove_position(position.position_id)?;

    position.amount = 0;
    position.shares = 0;
    position.reward_debt = 0;
    position.accrued_rewards = 0;
    position.total_claimed = position.total_claimed.saturating_add(paid);

    let mut plan = PayoutPlan::default();
    plan.principal(position.owner, principal);
    plan.reward(position.owner, paid);
    Ok(plan)
}

/// Reward `owner` could claim right now, without mutating anything.
pub fn preview_pending(
    pool: &RewardPool,
    position: &Position,
    owner: &Pubkey,
    observed: Observation,
) -> Result<u64> {
    require_keys_eq!(position.owner, *owner, StakingError::PositionNotFound);
    ensure_same_pool(pool, position)?;

    let mut simulated = pool.clone();
    simulated.settle(observed.reward_balance, observed.now)?;
    let pending = position.pending_reward(&simulated)?;

    Ok(pending.min(simulated.assigned_balance()))
}

/// Snapshot of `owner`'s position for marketplaces.
pub fn position_view(
    pool: &RewardPool,
    position: &Position,
    owner: &Pubkey,
    observed: Observation,
) -> Result<PositionView> {
    let pending_reward = preview_pending(pool, position, owner, observed)?;

    Ok(PositionView {
        position_id: position.position_id,
        pool_id: position.pool_id,
        owner: position.owner,
        amount: position.amount,
        shares: position.shares,
        lock_end_time: position.lock_end_time,
        lock_expired: position.is_lock_expired(observed.now),
        pending_reward,
    })
}
