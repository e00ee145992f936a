/// Admin instruction handlers.
///
/// Handles admin-only operations on the registry and its pools.
///
/// ## Security Guarantees
/// - All admin functions require signer == registry.authority
/// - PDA validation ensures correct registry and pool
/// - Parameter bounds checking

use anchor_lang::prelude::*;
use anchor_spl::token::TokenAccount;

use crate::constants::*;
use crate::error::StakingError;
use crate::events::{
    AuthorityTransferred, PausedStateChanged, PoolWeightUpdated, TransferAgentUpdated,
    UnassignedReleased,
};
use crate::ledger::{self, Observation};
use crate::state::{RewardPool, StakeRegistry, TransferAgents};

/// Accounts required for registry-level admin operations.
///
/// ## Security Notes
/// - Authority must be signer
/// - Authority must match registry.authority (has_one constraint)
/// - Registry PDA validated via seeds
#[derive(Accounts)]
pub struct AdminControl<'info> {
    /// The admin authority.
    /// SECURITY: Must be signer AND match registry.authority.
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The registry to modify.
    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub registry: Account<'info, StakeRegistry>,
}

/// Accounts required to change a pool's weight.
#[derive(Accounts)]
pub struct PoolWeightAdmin<'info> {
    /// SECURITY: Must be signer AND match registry.authority.
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        mut,
        seeds = [REWARD_POOL_SEED, registry.key().as_ref(), &reward_pool.pool_id.to_le_bytes()],
        bump = reward_pool.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub reward_pool: Account<'info, RewardPool>,
}

/// Accounts required to release a pool's escrowed rewards.
#[derive(Accounts)]
pub struct PoolAdmin<'info> {
    /// SECURITY: Must be signer AND match registry.authority.
    pub authority: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub registry: Account<'info, StakeRegistry>,

    /// SECURITY: Must belong to `registry`; its vault is pinned by has_one.
    #[account(
        mut,
        seeds = [REWARD_POOL_SEED, registry.key().as_ref(), &reward_pool.pool_id.to_le_bytes()],
        bump = reward_pool.bump,
        has_one = registry @ StakingError::RegistryMismatch,
        has_one = reward_vault @ StakingError::VaultMismatch
    )]
    pub reward_pool: Account<'info, RewardPool>,

    /// The pool's reward vault, read to settle before the release.
    pub reward_vault: Account<'info, TokenAccount>,
}

/// Accounts required to edit the transfer agent table.
#[derive(Accounts)]
pub struct TransferAgentAdmin<'info> {
    /// SECURITY: Must be signer AND match registry.authority.
    pub authority: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump,
        has_one = authority @ StakingError::Unauthorized
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        mut,
        seeds = [TRANSFER_AGENTS_SEED, registry.key().as_ref()],
        bump = transfer_agents.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub transfer_agents: Account<'info, TransferAgents>,
}

/// Set the paused state of the registry.
///
/// # Security
/// - Only registry.authority can call this
/// - When paused, opening and extending positions is blocked
/// - Claim, compound, close and transfer remain available (user funds not locked)
pub fn set_paused_handler(ctx: Context<AdminControl>, paused: bool) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    let clock = Clock::get()?;

    let previous_state = registry.paused;
    registry.paused = paused;
    registry.last_updated = clock.unix_timestamp;

    msg!(
        "Staking {} (was {})",
        if paused { "PAUSED" } else { "RESUMED" },
        if previous_state { "paused" } else { "active" }
    );
    msg!("Admin: {}", ctx.accounts.authority.key());

    emit!(PausedStateChanged {
        paused,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Transfer admin authority to a new address.
///
/// # Security
/// - Only current authority can call this
/// - New authority must be a valid pubkey (non-zero)
pub fn transfer_authority_handler(
    ctx: Context<AdminControl>,
    new_authority: Pubkey,
) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    let clock = Clock::get()?;

    require!(
        new_authority != Pubkey::default(),
        StakingError::Unauthorized
    );

    let old_authority = registry.authority;
    registry.authority = new_authority;
    registry.last_updated = clock.unix_timestamp;

    msg!("Authority transferred: {} -> {}", old_authority, new_authority);

    emit!(AuthorityTransferred {
        old_authority,
        new_authority,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Change a pool's share of future weighted reward deposits.
///
/// Only affects how `deposit_rewards` splits a `Weighted` deposit; rewards
/// already credited are untouched.
pub fn set_pool_weight_handler(ctx: Context<PoolWeightAdmin>, weight: u64) -> Result<()> {
    let registry = &mut ctx.accounts.registry;
    let pool = &mut ctx.accounts.reward_pool;
    let clock = Clock::get()?;

    let old_weight = ledger::set_pool_weight(registry, pool, weight)?;
    registry.last_updated = clock.unix_timestamp;

    msg!(
        "Pool {} weight: {} -> {} (total weight {})",
        pool.pool_id,
        old_weight,
        weight,
        registry.total_weight
    );

    emit!(PoolWeightUpdated {
        pool_id: pool.pool_id,
        old_weight,
        new_weight: weight,
        total_weight: registry.total_weight,
    });

    Ok(())
}

/// Credit rewards escrowed while the pool had no stakers to its current
/// stakers.
pub fn release_unassigned_handler(ctx: Context<PoolAdmin>) -> Result<()> {
    let clock = Clock::get()?;
    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);

    let released = ledger::release_unassigned(
        &ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        observed,
    )?;

    let pool = &ctx.accounts.reward_pool;
    msg!(
        "Released {} escrowed reward to {} shares in pool {}",
        released,
        pool.total_shares,
        pool.pool_id
    );

    emit!(UnassignedReleased {
        pool_id: pool.pool_id,
        amount: released,
        acc_reward_per_share: pool.acc_reward_per_share,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// Add or remove a marketplace/escrow identity on the transfer agent table.
pub fn set_transfer_agent_handler(
    ctx: Context<TransferAgentAdmin>,
    agent: Pubkey,
    authorized: bool,
) -> Result<()> {
    require!(agent != Pubkey::default(), StakingError::Unauthorized);

    let changed = ctx.accounts.transfer_agents.set(agent, authorized)?;
    if !changed {
        msg!("Transfer agent {} already {}", agent, if authorized { "authorized" } else { "absent" });
        return Ok(());
    }

    msg!(
        "Transfer agent {} {}",
        agent,
        if authorized { "authorized" } else { "removed" }
    );
    msg!("Agents on table: {}", ctx.accounts.transfer_agents.agents.len());

    emit!(TransferAgentUpdated { agent, authorized });

    Ok(())
}
