//! Deposit rewards instruction handler.
//!
//! Moves reward tokens from a depositor into one pool's reward vault, or
//! splits them across every pool by weight, then settles each pool touched.
//!
//! Pools travel in `remaining_accounts` as `(reward_pool, reward_vault)`
//! pairs in ascending pool-id order. A `Pool` deposit passes only the target
//! pair; a `Weighted` deposit passes every registered pool.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, Token, TokenAccount, Transfer};

use crate::constants::*;
use crate::error::StakingError;
use crate::events::{PoolSettled, RewardsDeposited};
use crate::ledger::{self, Observation, RewardTarget};
use crate::state::{RewardPool, Settlement, StakeRegistry};

#[derive(Accounts)]
pub struct DepositRewards<'info> {
    pub depositor: Signer<'info>,

    #[account(
        seeds = [REGISTRY_SEED, registry.staking_mint.as_ref()],
        bump = registry.bump
    )]
    pub registry: Account<'info, StakeRegistry>,

    #[account(
        mut,
        constraint = depositor_token_account.mint == registry.reward_mint @ StakingError::MintMismatch,
        constraint = depositor_token_account.owner == depositor.key() @ StakingError::Unauthorized
    )]
    pub depositor_token_account: Account<'info, TokenAccount>,

    pub token_program: Program<'info, Token>,
}

type PoolPair<'info> = (Account<'info, RewardPool>, Account<'info, TokenAccount>);

/// Deserializes and validates the `(pool, vault)` pairs.
fn load_pools<'info>(
    remaining: &'info [AccountInfo<'info>],
    registry: &Pubkey,
) -> Result<Vec<PoolPair<'info>>> {
    require!(
        !remaining.is_empty() && remaining.len() % 2 == 0,
        StakingError::PoolNotFound
    );

    let pools = remaining
        .chunks(2)
        .map(|pair| {
            let pool = Account::<RewardPool>::try_from(&pair[0])?;
            require_keys_eq!(pool.registry, *registry, StakingError::RegistryMismatch);
            require_keys_eq!(pool.reward_vault, pair[1].key(), StakingError::VaultMismatch);
            let vault = Account::<TokenAccount>::try_from(&pair[1])?;
            Ok((pool, vault))
        })
        .collect::<Result<Vec<_>>>()?;

    require!(
        pools.windows(2).all(|w| w[0].0.pool_id < w[1].0.pool_id),
        StakingError::PoolNotFound
    );
    Ok(pools)
}

/// Deposit `amount` reward tokens.
pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, DepositRewards<'info>>,
    amount: u64,
    target: RewardTarget,
) -> Result<()> {
    let clock = Clock::get()?;
    let registry = &ctx.accounts.registry;
    let mut pools = load_pools(ctx.remaining_accounts, &registry.key())?;

    match target {
        RewardTarget::Pool(pool_id) => require!(
            pools.len() == 1 && pools[0].0.pool_id == pool_id,
            StakingError::PoolNotFound
        ),
        RewardTarget::Weighted => require!(
            pools.len() == registry.pool_count as usize,
            StakingError::PoolNotFound
        ),
    }

    // Indexed by pool id; pools not passed keep a zero weight.
    let mut weights = vec![0u64; registry.pool_count as usize];
    for (pool, _) in &pools {
        registry.ensure_pool_exists(pool.pool_id)?;
        weights[pool.pool_id as usize] = pool.weight;
    }
    let amounts = ledger::plan_deposit(amount, target, &weights)?;
    require!(
        ctx.accounts.depositor_token_account.amount >= amount,
        StakingError::InsufficientFunds
    );

    for (pool, vault) in pools.iter_mut() {
        let share = amounts[pool.pool_id as usize];
        if share > 0 {
            let cpi_accounts = Transfer {
                from: ctx.accounts.depositor_token_account.to_account_info(),
                to: vault.to_account_info(),
                authority: ctx.accounts.depositor.to_account_info(),
            };
            let cpi_ctx = CpiContext::new(ctx.accounts.token_program.to_account_info(), cpi_accounts);
            token::transfer(cpi_ctx, share)?;
            vault.reload()?;

            msg!("Deposited {} reward into pool {}", share, pool.pool_id);
            emit!(RewardsDeposited {
                depositor: ctx.accounts.depositor.key(),
                pool_id: pool.pool_id,
                amount: share,
                timestamp: clock.unix_timestamp,
            });
        }

        let observed = Observation::new(clock.unix_timestamp, vault.amount);
        let settlement = ledger::settle_pool(registry, pool, observed)?;
        log_settlement(pool, settlement, clock.unix_timestamp);
        pool.exit(&crate::ID)?;
    }

    Ok(())
}

pub(crate) fn log_settlement(pool: &RewardPool, settlement: Settlement, now: i64) {
    let (amount, escrowed) = match settlement {
        Settlement::Idle => return,
        Settlement::Distributed { amount, .. } => (amount, false),
        Settlement::Escrowed { amount } => (amount, true),
    };

    if escrowed {
        msg!(
            "Pool {} has no shares: escrowed {} (unassigned {})",
            pool.pool_id,
            amount,
            pool.unassigned_rewards
        );
    } else {
        msg!(
            "Pool {} distributed {} over {} shares",
            pool.pool_id,
            amount,
            pool.total_shares
        );
    }

    emit!(PoolSettled {
        pool_id: pool.pool_id,
        amount,
        escrowed,
        acc_reward_per_share: pool.acc_reward_per_share,
        timestamp: now,
    });
}
