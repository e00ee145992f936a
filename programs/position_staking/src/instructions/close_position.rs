//! Close position instruction handler.
//!
//! Returns principal and residual reward of an unlocked position and closes
//! the position account.
//!
//! ## Security Guarantees
//! - Lock end time is enforced before any state change
//! - All bookkeeping is final before tokens leave the vaults
//! - Position rent goes back to the owner

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::custody::SplCustody;
use crate::error::StakingError;
use crate::events::PositionClosed;
use crate::ledger::{self, Observation};
use crate::safety;
use crate::state::{OwnerAccount, Position, RewardPool, StakeRegistry};

/// Accounts required for closing a position.
#[derive(Accounts)]
pub struct ClosePosition<'info> {
    /// The position owner. Receives principal, reward and the position rent.
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump,
        has_one = stake_vault @ StakingError::VaultMismatch
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

    #[account(mut)]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(mut)]
    pub stake_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [OWNER_SEED, registry.key().as_ref(), owner.key().as_ref()],
        bump = owner_account.bump
    )]
    pub owner_account: Account<'info, OwnerAccount>,

    /// SECURITY: ownership is checked by the ledger; `close` runs only on success.
    #[account(
        mut,
        close = owner,
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,

    /// Owner's token account for returned principal.
    #[account(
        mut,
        constraint = owner_token_account.mint == registry.staking_mint @ StakingError::MintMismatch,
        constraint = owner_token_account.owner == owner.key() @ StakingError::Unauthorized
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    /// Owner's token account for residual reward.
    #[account(
        mut,
        constraint = owner_reward_account.mint == registry.reward_mint @ StakingError::MintMismatch,
        constraint = owner_reward_account.owner == owner.key() @ StakingError::Unauthorized
    )]
    pub owner_reward_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Close an unlocked position.
///
/// # Errors
/// - `LockNotExpired` before the lock end time
/// - `NotPositionOwner` for anyone but the owner
pub fn handler(ctx: Context<ClosePosition>) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);
    let position_id = ctx.accounts.position.position_id;

    let plan = ledger::close_position(
        &mut ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        &mut ctx.accounts.owner_account,
        &mut ctx.accounts.position,
        &owner,
        observed,
    )?;

    let mut custody = SplCustody::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.registry.to_account_info(),
        &ctx.accounts.registry,
    )
    .with_stake_vault(ctx.accounts.stake_vault.to_account_info())
    .with_reward_vault(ctx.accounts.reward_vault.to_account_info())
    .with_principal_recipient(owner, ctx.accounts.owner_token_account.to_account_info())
    .with_reward_recipient(owner, ctx.accounts.owner_reward_account.to_account_info());
    safety::disburse(&mut ctx.accounts.registry, &mut custody, &plan)?;

    let principal = plan.principal_total();
    let reward = plan.reward_total();
    msg!(
        "Closed position {}: returned {} principal and {} reward",
        position_id,
        principal,
        reward
    );
    msg!(
        "Registry totals: {} staked, {} shares",
        ctx.accounts.registry.total_staked,
        ctx.accounts.registry.total_shares
    );

    emit!(PositionClosed {
        owner,
        position_id,
        principal,
        reward,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
