//! Extend lock instruction handler.

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::StakingError;
use crate::events::LockExtended;
use crate::ledger::{self, Observation};
use crate::state::{Position, RewardPool, StakeRegistry};

#[derive(Accounts)]
pub struct ExtendLock<'info> {
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        mut,
        seeds = [REWARD_POOL_SEED, registry.key().as_ref(), &reward_pool.pool_id.to_le_bytes()],
        bump = reward_pool.bump,
        has_one = registry @ StakingError::RegistryMismatch,
        has_one = reward_vault @ StakingError::VaultMismatch
    )]
    pub reward_pool: Account<'info, RewardPool>,

    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,
}

/// Lengthen a position's lock by `additional_duration` seconds.
///
/// Reward earned so far stays claimable at the old share basis; only future
/// accrual uses the new share count.
pub fn handler(ctx: Context<ExtendLock>, additional_duration: i64) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);
    let old_shares = ctx.accounts.position.shares;

    ledger::extend_lock(
        &mut ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        &mut ctx.accounts.position,
        &owner,
        additional_duration,
        observed,
    )?;

    let position = &ctx.accounts.position;
    msg!(
        "Extended position {} by {}s: locked until {}, shares {} -> {}",
        position.position_id,
        additional_duration,
        position.lock_end_time,
        old_shares,
        position.shares
    );
    msg!("Reward held at previous basis: {}", position.accrued_rewards);

    emit!(LockExtended {
        owner,
        position_id: position.position_id,
        lock_end_time: position.lock_end_time,
        new_shares: position.shares,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
