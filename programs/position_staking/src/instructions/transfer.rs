/// Position transfer instruction handlers.
///
/// Handles self-service approvals and both transfer paths: the approved
/// counterparty taking a position, and an authorized transfer agent moving
/// one between owners.
///
/// ## Security Guarantees
/// - Reward accrued before the move is paid to the previous owner
/// - The new owner starts with nothing pending
/// - Payment between the parties never passes through this program

use anchor_lang::prelude::*;
use anchor_spl::token::{Token, TokenAccount};

use crate::constants::*;
use crate::custody::SplCustody;
use crate::error::StakingError;
use crate::events::{ApprovalRevoked, PositionTransferred, TransferApproved};
use crate::ledger::{self, Observation};
use crate::safety;
use crate::state::{OwnerAccount, Position, RewardPool, StakeRegistry, TransferAgents};

#[derive(Accounts)]
pub struct ApproveTransfer<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,

    #[account(
        mut,
        seeds = [OWNER_SEED, registry.key().as_ref(), owner.key().as_ref()],
        bump = owner_account.bump
    )]
    pub owner_account: Account<'info, OwnerAccount>,
}

#[derive(Accounts)]
pub struct RevokeApproval<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        mut,
        seeds = [OWNER_SEED, registry.key().as_ref(), owner.key().as_ref()],
        bump = owner_account.bump
    )]
    pub owner_account: Account<'info, OwnerAccount>,
}

/// Accounts for the approved counterparty taking a position.
#[derive(Accounts)]
pub struct TransferPosition<'info> {
    /// The approved counterparty. Becomes the new owner.
    #[account(mut)]
    pub recipient: Signer<'info>,

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

    #[account(mut)]
    pub reward_vault: Account<'info, TokenAccount>,

    #[account(
        mut,
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,

    #[account(
        mut,
        seeds = [OWNER_SEED, registry.key().as_ref(), position.owner.as_ref()],
        bump = from_owner_account.bump
    )]
    pub from_owner_account: Account<'info, OwnerAccount>,

    #[account(
        init_if_needed,
        payer = recipient,
        space = OwnerAccount::LEN,
        seeds = [OWNER_SEED, registry.key().as_ref(), recipient.key().as_ref()],
        bump
    )]
    pub to_owner_account: Account<'info, OwnerAccount>,

    /// Previous owner's reward token account.
    #[account(
        mut,
        constraint = previous_owner_reward_account.mint == registry.reward_mint @ StakingError::MintMismatch,
        constraint = previous_owner_reward_account.owner == position.owner @ StakingError::Unauthorized
    )]
    pub previous_owner_reward_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Accounts for an authorized agent moving a position between owners.
#[derive(Accounts)]
#[instruction(from: Pubkey, to: Pubkey)]
pub struct AgentTransfer<'info> {
    /// SECURITY: must be on the transfer agent table (checked by the ledger).
    #[account(mut)]
    pub agent: Signer<'info>,

    #[account(
        mut,
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        seeds = [TRANSFER_AGENTS_SEED, registry.key().as_ref()],
        bump = transfer_agents.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub transfer_agents: Account<'info, TransferAgents>,

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

    #[account(
        mut,
        seeds = [POSITION_SEED, registry.key().as_ref(), &position.position_id.to_le_bytes()],
        bump = position.bump,
        has_one = registry @ StakingError::RegistryMismatch
    )]
    pub position: Account<'info, Position>,

    #[account(
        mut,
        seeds = [OWNER_SEED, registry.key().as_ref(), from.as_ref()],
        bump = from_owner_account.bump
    )]
    pub from_owner_account: Account<'info, OwnerAccount>,

    #[account(
        init_if_needed,
        payer = agent,
        space = OwnerAccount::LEN,
        seeds = [OWNER_SEED, registry.key().as_ref(), to.as_ref()],
        bump
    )]
    pub to_owner_account: Account<'info, OwnerAccount>,

    /// `from`'s reward token account.
    #[account(
        mut,
        constraint = from_reward_account.mint == registry.reward_mint @ StakingError::MintMismatch,
        constraint = from_reward_account.owner == from @ StakingError::Unauthorized
    )]
    pub from_reward_account: Account<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
    pub token_program: Program<'info, Token>,
}

/// Name `counterparty` as the only address allowed to take the position.
/// Replaces any earlier approval of the owner.
pub fn approve_handler(ctx: Context<ApproveTransfer>, counterparty: Pubkey) -> Result<()> {
    let owner = ctx.accounts.owner.key();
    let position_id = ctx.accounts.position.position_id;

    ledger::approve_transfer(
        &ctx.accounts.registry,
        &ctx.accounts.position,
        &mut ctx.accounts.owner_account,
        &owner,
        counterparty,
    )?;

    msg!(
        "Position {} approved for transfer to {}",
        position_id,
        counterparty
    );

    emit!(TransferApproved {
        owner,
        counterparty,
        position_id,
    });

    Ok(())
}

pub fn revoke_handler(ctx: Context<RevokeApproval>) -> Result<()> {
    let owner = ctx.accounts.owner.key();

    ledger::revoke_approval(
        &ctx.accounts.registry,
        &mut ctx.accounts.owner_account,
        &owner,
    )?;

    msg!("Transfer approval revoked by {}", owner);
    emit!(ApprovalRevoked { owner });

    Ok(())
}

/// The approved counterparty takes the position.
pub fn transfer_position_handler(ctx: Context<TransferPosition>) -> Result<()> {
    let clock = Clock::get()?;
    let recipient = ctx.accounts.recipient.key();
    let registry_key = ctx.accounts.registry.key();
    let from = ctx.accounts.position.owner;

    ctx.accounts
        .to_owner_account
        .init_if_blank(recipient, registry_key, ctx.bumps.to_owner_account);

    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);
    let plan = ledger::transfer_by_approval(
        &mut ctx.accounts.registry,
        &mut ctx.accounts.reward_pool,
        &mut ctx.accounts.position,
        &mut ctx.accounts.from_owner_account,
        &mut ctx.accounts.to_owner_account,
        &recipient,
        observed,
    )?;

    let mut custody = SplCustody::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.registry.to_account_info(),
        &ctx.accounts.registry,
    )
    .with_reward_vault(ctx.accounts.reward_vault.to_account_info())
    .with_reward_recipient(from, ctx.accounts.previous_owner_reward_account.to_account_info());
    safety::disburse(&mut ctx.accounts.registry, &mut custody, &plan)?;

    let position_id = ctx.accounts.position.position_id;
    let reward = plan.reward_total();
    msg!(
        "Position {} transferred {} -> {} (reward {} paid to previous owner)",
        position_id,
        from,
        recipient,
        reward
    );

    emit!(PositionTransferred {
        from,
        to: recipient,
        position_id,
        reward_to_previous_owner: reward,
        agent: None,
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}

/// An authorized transfer agent moves `from`'s position to `to`.
pub fn agent_transfer_handler(ctx: Context<AgentTransfer>, from: Pubkey, to: Pubkey) -> Result<()> {
    let clock = Clock::get()?;
    let agent = ctx.accounts.agent.key();
    let registry_key = ctx.accounts.registry.key();
    require_keys_neq!(to, Pubkey::default(), StakingError::Unauthorized);

    ctx.accounts
        .to_owner_account
        .init_if_blank(to, registry_key, ctx.bumps.to_owner_account);

    let observed = Observation::new(clock.unix_timestamp, ctx.accounts.reward_vault.amount);
    let plan = ledger::transfer_by_agent(
        &mut ctx.accounts.registry,
        &ctx.accounts.transfer_agents,
        &mut ctx.accounts.reward_pool,
        &mut ctx.accounts.position,
        &mut ctx.accounts.from_owner_account,
        &mut ctx.accounts.to_owner_account,
        &agent,
        &from,
        observed,
    )?;

    let mut custody = SplCustody::new(
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.registry.to_account_info(),
        &ctx.accounts.registry,
    )
    .with_reward_vault(ctx.accounts.reward_vault.to_account_info())
    .with_reward_recipient(from, ctx.accounts.from_reward_account.to_account_info());
    safety::disburse(&mut ctx.accounts.registry, &mut custody, &plan)?;

    let position_id = ctx.accounts.position.position_id;
    let reward = plan.reward_total();
    msg!(
        "Agent {} moved position {} {} -> {} (reward {} paid to previous owner)",
        agent,
        position_id,
        from,
        to,
        reward
    );

    emit!(PositionTransferred {
        from,
        to,
        position_id,
        reward_to_previous_owner: reward,
        agent: Some(agent),
        timestamp: clock.unix_timestamp,
    });

    Ok(())
}
