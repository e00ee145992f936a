//! Read-only accessors for marketplaces and clients.
//!
//! Both simulate settlement against the current vault balance and return the
//! result through Anchor return data. Nothing is written.

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::StakingError;
use crate::ledger::{self, Observation};
use crate::state::{Position, PositionView, RewardPool, StakeRegistry};

#[derive(Accounts)]
pub struct ViewPosition<'info> {
    #[account(
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        seeds = [REWARD_POOL_SEED, registry.key().as_ref(), &reward_pool.pool_id.to_le_bytes()],
        bump = reward_pool.bump,
        has_one = registry @ StakingError::RegistryMismatch,
        has_one = reward_vault @ StakingError::VaultMismatch
    )]
    pub reward_pool: Account<'info, RewardPool>,

    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,
}

impl<'info> ViewPosition<'info> {
    fn observe(&self) -> Result<Observation> {
        let clock = Clock::get()?;
        Ok(Observation::new(clock.unix_timestamp, self.reward_vault.amount))
    }
}

/// Snapshot of the position, if `owner` holds it.
pub fn position_of_handler(ctx: Context<ViewPosition>, owner: Pubkey) -> Result<PositionView> {
    let observed = ctx.accounts.observe()?;
    ledger::position_view(
        &ctx.accounts.reward_pool,
        &ctx.accounts.position,
        &owner,
        observed,
    )
}

/// Reward `owner` could claim from the position right now.
pub fn pending_reward_handler(ctx: Context<ViewPosition>, owner: Pubkey) -> Result<u64> {
    let observed = ctx.accounts.observe()?;
    ledger::preview_pending(
        &ctx.accounts.reward_pool,
        &ctx.accounts.position,
        &owner,
        observed,
    )
}
