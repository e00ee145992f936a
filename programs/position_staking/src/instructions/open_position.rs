//! Open position instruction handler.
//!
//! Moves principal into the stake vault and records it as a new position in
//! the chosen pool.

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::custody::SplCustody;
use crate::error::StakingError;
use crate::events::PositionOpened;
use crate::ledger::{self, Observation};
use crate::safety;
use crate::state::{OwnerAccount, Position, RewardPool, StakeRegistry};

/// Accounts required for opening a position.
#[derive(Accounts)]
pub struct OpenPosition<'info> {
    /// The staker. Becomes the position owner.
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

    /// Read only: the pool is settled against its balance before pricing in.
    pub reward_vault: Account<'info, TokenAccount>,

    /// Owner bookkeeping (created on first position).
    #[account(
        init_if_needed,
        payer = owner,
        space = OwnerAccount::LEN,
        seeds = [OWNER_SEED, registry.key().as_ref(), owner.key().as_ref()],
        bump
    )]
    pub owner_account: Account<'info, OwnerAccount>,

    /// The new position, keyed by the next registry-wide position id.
    #[account(
        init,
        payer = owner,
        space = Position::LEN,
        seeds = [POSITION_SEED, registry.key().as_ref(), &registry.next_position_id.to_le_bytes()],
        bump
    )]
    pub position: Account<'info, Position>,

    /// Owner's token account for the staking token.
    #[account(
        mut,
        constraint = owner_token_account.mint == registry.staking_mint @ StakingError::MintMismatch,
        constraint = owner_token_account.owner == owner.key() @ StakingError::Unauthorized
    )]
    pub owner_token_account: Account<'info, TokenAccount>,

    #[account(mut)]
    pub stake_vault: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
    pub rent: Sysvar<'info, Rent>,
}

/// Open a position.
///
/// # Arguments
/// * `amount` - Principal to move into the stake vault
/// * `lock_duration_override` - Optional lock longer than the pool minimum
///
/// The position records what the stake vault actually received, which can be
/// less than `amount` for mints that deduct on transfer.
pub fn handler(
    ctx: Context<OpenPosition>,
    amount: u64,
    lock_duration_override: Option<i64>,
) -> Result<()> {
    require!(!ctx.accounts.registry.paused, StakingError::StakingPaused);
    require!(amount > 0, StakingError::ZeroAmount);

    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let registry_key = ctx.accounts.registry.key();

    ctx.accounts
        .owner_account
        .init_if_blank(owner, registry_key, ctx.bumps.owner_account);

    let mut custody = SplCustody::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.registry.to_account_info(),
        &ctx.accounts.registry,
    )
    .with_stake_vault(ctx.accounts.stake_vault.to_account_info())
    .with_depositor(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.owner_token_account.to_account_info(),
    );
    let received = safety::collect(&mut ctx.accounts.registry, &mut custody, &owner, amount)?;
    if received != amount {
        msg!("Requested {} but stake vault received {}", amount, received);
    }

    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);
    let mut position = ledger::open_position(
        &mut ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        &mut ctx.accounts.owner_account,
        owner,
        received,
        lock_duration_override,
        observed,
    )?;
    position.bump = ctx.bumps.position;

    msg!(
        "Opened position {} in pool {}: {} staked, {} shares, locked until {}",
        position.position_id,
        position.pool_id,
        position.amount,
        position.shares,
        position.lock_end_time
    );
    msg!(
        "Pool totals: {} staked, {} shares",
        ctx.accounts.reward_pool.total_staked,
        ctx.accounts.reward_pool.total_shares
    );

    emit!(PositionOpened {
        owner,
        position_id: position.position_id,
        pool_id: position.pool_id,
        amount: position.amount,
        shares: position.shares,
        lock_end_time: position.lock_end_time,
        timestamp: clock.unix_timestamp,
    });

    ctx.accounts.position.set_inner(position);

    Ok(())
}
