//! Compound instruction handler.
//!
//! Restakes pending reward into the position. Only available when rewards
//! are paid in the staking token.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::custody::SplCustody;
use crate::error::StakingError;
use crate::events::RewardsCompounded;
use crate::ledger::{self, Observation};
use crate::safety;
use crate::state::{Position, RewardPool, StakeRegistry};

#[derive(Accounts)]
pub struct Compound<'info> {
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
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,

    pub token_program: Program<'info, Token>,
}

pub fn handler(ctx: Context<Compound>) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);

    let plan = ledger::compound(
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
    .with_stake_vault(ctx.accounts.stake_vault.to_account_info());
    safety::disburse(&mut ctx.accounts.registry, &mut custody, &plan)?;

    let position = &ctx.accounts.position;
    let restaked = plan.reward_total();
    msg!(
        "Compounded {} into position {}: {} staked, {} shares",
        restaked,
        position.position_id,
        position.amount,
        position.shares
    );

    emit!(RewardsCompounded {
        owner,
        position_id: position.position_id,
        amount: restaked,
        new_amount: position.amount,
        new_shares: position.shares,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
