/// Initialize instruction handler.
///
/// Creates the stake registry, its principal vault and the transfer agent
/// table.
///
/// ## Security Guarantees
/// - The stake vault is a PDA owned by the registry
/// - Staking and reward mints are locked to registry state permanently
/// - The registry starts unpaused with the reentrancy guard released

use anchor_lang::prelude::*;
use anchor_spl::token::{Mint, Token, TokenAccount};

use crate::constants::*;
use crate::error::StakingError;
use crate::events::RegistryInitialized;
use crate::state::{ReentrancyStatus, StakeRegistry, TransferAgents};

/// Accounts required for registry initialization.
///
/// ## Security Notes
/// - `stake_vault` is a PDA with `registry` as authority
/// - Seeds ensure the vault and agent table cannot be swapped or replaced
#[derive(Accounts)]
pub struct Initialize<'info> {
    /// The admin authority that will control the registry.
    /// SECURITY: This becomes the admin stored in registry state.
    #[account(mut)]
    pub authority: Signer<'info>,

    /// The registry account to be created.
    /// SECURITY: PDA derived from REGISTRY_SEED + staking mint ensures one registry per token.
    #[account(
        init,
        payer = authority,
        space = StakeRegistry::LEN,
        seeds = [REGISTRY_SEED, staking_mint.key().as_ref()],
        bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    /// The mint of the staked principal.
    pub staking_mint: Account<'info, Mint>,

    /// The mint rewards are paid in. May equal `staking_mint`, which enables compounding.
    pub reward_mint: Account<'info, Mint>,

    /// The vault that will hold all staked principal.
    /// SECURITY:
    /// - PDA derived from STAKE_VAULT_SEED + registry
    /// - Authority set to the registry PDA
    #[account(
        init,
        payer = authority,
        seeds = [STAKE_VAULT_SEED, registry.key().as_ref()],
        bump,
        token::mint = staking_mint,
        token::authority = registry
    )]
    pub stake_vault: Account<'info, TokenAccount>,

    /// Marketplace/escrow identities allowed to move positions.
    #[account(
        init,
        payer = authority,
        space = TransferAgents::LEN,
        seeds = [TRANSFER_AGENTS_SEED, registry.key().as_ref()],
        bump
    )]
    pub transfer_agents: Account<'info, TransferAgents>,

    /// System program for account creation.
    pub system_program: Program<'info, System>,

    /// Token program for token account operations.
    pub token_program: Program<'info, Token>,

    /// Rent sysvar for rent-exempt calculations.
    pub rent: Sysvar<'info, Rent>,
}

/// Initialize a new stake registry.
///
/// Pools are added afterwards with `add_pool`.
pub fn handler(ctx: Context<Initialize>) -> Result<()> {
    // Anchor enforces this through token::authority; checked again before the
    // address is stored.
    require_keys_eq!(
        ctx.accounts.stake_vault.owner,
        ctx.accounts.registry.key(),
        StakingError::InvalidVaultOwner
    );
    require_keys_eq!(
        ctx.accounts.stake_vault.mint,
        ctx.accounts.staking_mint.key(),
        StakingError::MintMismatch
    );

    let clock = Clock::get()?;
    let registry_key = ctx.accounts.registry.key();

    let registry = &mut ctx.accounts.registry;
    registry.authority = ctx.accounts.authority.key();
    registry.staking_mint = ctx.accounts.staking_mint.key();
    registry.reward_mint = ctx.accounts.reward_mint.key();
    registry.stake_vault = ctx.accounts.stake_vault.key();
    registry.pool_count = 0;
    registry.next_position_id = 0;
    registry.total_weight = 0;
    registry.total_staked = 0;
    registry.total_shares = 0;
    registry.paused = false;
    registry.reentrancy = ReentrancyStatus::Unlocked;
    registry.created_at = clock.unix_timestamp;
    registry.last_updated = clock.unix_timestamp;
    registry.bump = ctx.bumps.registry;
    registry.vault_bump = ctx.bumps.stake_vault;

    let transfer_agents = &mut ctx.accounts.transfer_agents;
    transfer_agents.registry = registry_key;
    transfer_agents.agents = Vec::new();
    transfer_agents.bump = ctx.bumps.transfer_agents;

    msg!("Stake registry initialized");
    msg!("Admin: {}", ctx.accounts.authority.key());
    msg!(
        "Staking mint: {}, reward mint: {}",
        ctx.accounts.staking_mint.key(),
        ctx.accounts.reward_mint.key()
    );
    if ctx.accounts.registry.compounding_supported() {
        msg!("Reward mint equals staking mint: compounding enabled");
    }

    emit!(RegistryInitialized {
        registry: registry_key,
        authority: ctx.accounts.authority.key(),
        staking_mint: ctx.accounts.staking_mint.key(),
        reward_mint: ctx.accounts.reward_mint.key(),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
