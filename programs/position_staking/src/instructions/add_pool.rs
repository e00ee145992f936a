//! Add pool instruction handler.
//!
//! Appends a reward pool with its own lock tier, weight and reward vault.

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::StakingError;
use crate::events::PoolAdded;
use crate::state::{RewardPool, ShareWeighting, StakeRegistry};

/// Accounts required for adding a pool.
#[derive(Accounts)]
pub struct AddPool<'info> {
    /// SECURITY: Must be signer AND match registry.authority.
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump,
        has_one = authority @ StakingError::Unauthorized,
        has_one = reward_mint @ StakingError::MintMismatch
    )]
    pub registry: Account<'info, StakeRegistry>,

    /// The pool account, keyed by the next pool id.
    #[account(
        init,
        payer = authority,
        space = RewardPool::LEN,
        seeds = [REWARD_POOL_SEED, registry.key().as_ref(), &registry.pool_count.to_le_bytes()],
        bump
    )]
    pub reward_pool: Account<'info, RewardPool>,

    pub reward_mint: Account<'info, Mint>,

    /// The pool's reward vault.
    /// SECURITY: PDA derived from REWARD_VAULT_SEED + pool, authority set to the registry PDA.
    #[account(
        init,
        payer = authority,
        seeds = [REWARD_VAULT_SEED, reward_pool.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = registry
    )]
    pub reward_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

/// Register a new pool.
///
/// # Arguments
/// * `lock_duration` - Minimum lock, in seconds, for positions in this pool
/// * `weight` - Share of weighted reward deposits
/// * `share_weighting` - How principal converts into reward shares
pub fn handler(
    ctx: Context<AddPool>,
    lock_duration: i64,
    weight: u64,
    share_weighting: ShareWeighting,
) -> Result<()> {
    RewardPool::validate_config(lock_duration, weight, &share_weighting)?;
    require_keys_eq!(
        ctx.accounts.reward_vault.owner,
        ctx.accounts.registry.key(),
        StakingError::InvalidVaultOwner
    );

    let clock = Clock::get()?;
    let registry_key = ctx.accounts.registry.key();

    let registry = &mut ctx.accounts.registry;
    let pool_id = registry.register_pool(weight)?;
    registry.last_updated = clock.unix_timestamp;

    let pool = &mut ctx.accounts.reward_pool;
    pool.registry = registry_key;
    pool.reward_vault = ctx.accounts.reward_vault.key();
    pool.pool_id = pool_id;
    pool.lock_duration = lock_duration;
    pool.weight = weight;
    pool.share_weighting = share_weighting;
    pool.acc_reward_per_share = 0;
    pool.total_shares = 0;
    pool.total_staked = 0;
    pool.tracked_reward_balance = 0;
    pool.unassigned_rewards = 0;
    pool.total_rewards_distributed = 0;
    pool.total_rewards_paid = 0;
    pool.last_settle_time = clock.unix_timestamp;
    pool.created_at = clock.unix_timestamp;
    pool.bump = ctx.bumps.reward_pool;
    pool.vault_bump = ctx.bumps.reward_vault;

    msg!(
        "Pool {} added: lock {}s, weight {}, {:?}",
        pool_id,
        lock_duration,
        weight,
        share_weighting
    );
    msg!("Pools: {}, total weight: {}", registry.pool_count, registry.total_weight);

    emit!(PoolAdded {
        registry: registry_key,
        pool_id,
        lock_duration,
        weight,
        duration_weighted: matches!(share_weighting, ShareWeighting::DurationWeighted { .. }),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
