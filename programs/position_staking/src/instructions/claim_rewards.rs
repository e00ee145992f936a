//! Claim rewards instruction handler.
//!
//! Pays out a position's accrued reward without touching principal.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::custody::SplCustody;
use crate::error::StakingError;
use crate::events::RewardsClaimed;
use crate::ledger::{self, Observation};
use crate::safety;
use crate::state::{Position, RewardPool, StakeRegistry};

/// Accounts required for claiming rewards.
#[derive(Accounts)]
pub struct ClaimRewards<'info> {
    /// The position owner.
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

    /// Pool's reward vault.
    #[account(mut)]
    pub reward_vault: Account<'info, TokenAccount>,

    /// SECURITY: ownership is checked by the ledger against `owner`.
    #[account(
        mut,
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,

    /// Owner's token account for receiving rewards.
    #[account(
        mut,
        constraint = owner_reward_account.mint == registry.reward_mint @ StakingError::MintMismatch,
        constraint = owner_reward_account.owner == owner.key() @ StakingError::Unauthorized
    )]
    pub owner_reward_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

/// Claim accumulated rewards.
///
/// A position with nothing pending succeeds without moving tokens.
pub fn handler(ctx: Context<ClaimRewards>) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);

    let plan = ledger::claim(
        &mut ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        &mut ctx.accounts.position,
        &owner,
        observed,
    )?;

    let mut custody = SplCustody::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.registry.to_account_info(),
        &ctx.accounts.registry,
    )
    .with_reward_vault(ctx.accounts.reward_vault.to_account_info())
    .with_reward_recipient(owner, ctx.accounts.owner_reward_account.to_account_info());
    safety::disburse(&mut ctx.accounts.registry, &mut custody, &plan)?;

    let claimed = plan.reward_total();
    msg!(
        "Claimed {} reward from position {}",
        claimed,
        ctx.accounts.position.position_id
    );
    msg!("Total claimed by position: {}", ctx.accounts.position.total_claimed);

    emit!(RewardsClaimed {
        owner,
        position_id: ctx.accounts.position.position_id,
        amount: claimed,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
