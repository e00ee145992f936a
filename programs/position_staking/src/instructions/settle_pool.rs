//! Permissionless settlement of a pool against its reward vault.

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::StakingError;
use crate::instructions::deposit_rewards::log_settlement;
use crate::ledger::{self, Observation};
use crate::state::{RewardPool, StakeRegistry};

#[derive(Accounts)]
pub struct SettlePool<'info> {
    #[account(
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
}

/// Pick up rewards sent straight to the vault. Calling it twice in a row is
/// harmless.
pub fn handler(ctx: Context<SettlePool>) -> Result<()> {
    let clock = Clock::get()?;
    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);

    let settlement = ledger::settle_pool(
        &ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        observed,
    )?;
    log_settlement(&ctx.accounts.reward_pool, settlement, clock.unix_timestamp);

    Ok(())
}
