//! # Position Staking Program
//!
//! A multi-pool, time-locked staking ledger. Each deposit becomes its own
//! position with a stable id, so positions can be claimed, compounded,
//! extended, closed and handed to a new owner individually.
//!
//! ## Features
//! - Pools with their own minimum lock, reward vault and weight
//! - Flat or duration-weighted reward shares
//! - Lazy reward-per-share accounting: any reward that lands in a pool's
//!   vault is picked up on the next settlement
//! - Weighted reward deposits split across every pool
//! - Self-service transfer approvals plus an admin-managed table of
//!   marketplace/escrow agents
//! - Registry-wide reentrancy guard; all bookkeeping is final before tokens
//!   leave the vaults
//!
//! ## Layout
//! - `ledger`: pure accounting, runs on the host in tests
//! - `safety`: executes payout plans under the reentrancy guard
//! - `custody`: SPL token transfers signed by the registry PDA
//! - `instructions`: account validation and handlers

use anchor_lang::prelude::*;

declare_id!("Fg6PaFpoGXkYsidMpWTK6W2BeZ7FEfcYkg476zPFsLnS");

pub mod constants;
pub mod custody;
pub mod error;
pub mod events;
pub mod instructions;
pub mod ledger;
pub mod math;
pub mod safety;
pub mod state;

use instructions::*;
use ledger::RewardTarget;
use state::{PositionView, ShareWeighting};

#[program]
pub mod position_staking {
    use super::*;

    /// Creates the registry, its stake vault and the transfer agent table.
    ///
    /// The caller becomes the admin. Setting the reward mint equal to the
    /// staking mint enables `compound`.
    pub fn initialize(ctx: Context<Initialize>) -> Result<()> {
        instructions::initialize::handler(ctx)
    }

    /// Appends a reward pool.
    ///
    /// # Arguments
    /// * `lock_duration` - Minimum lock in seconds (0 = no lock)
    /// * `weight` - Share of weighted reward deposits
    /// * `share_weighting` - Flat or duration-weighted shares
    ///
    /// # Errors
    /// - `Unauthorized` if the caller is not the admin
    /// - `InvalidPoolConfig` for out-of-range parameters
    /// - `TooManyPools` once the registry is full
    pub fn add_pool(
        ctx: Context<AddPool>,
        lock_duration: i64,
        weight: u64,
        share_weighting: ShareWeighting,
    ) -> Result<()> {
        instructions::add_pool::handler(ctx, lock_duration, weight, share_weighting)
    }

    /// Admin function to change a pool's weight.
    pub fn set_pool_weight(ctx: Context<PoolWeightAdmin>, weight: u64) -> Result<()> {
        instructions::admin::set_pool_weight_handler(ctx, weight)
    }

    /// Admin function to pause or unpause opening and extending positions.
    pub fn set_paused(ctx: Context<AdminControl>, paused: bool) -> Result<()> {
        instructions::admin::set_paused_handler(ctx, paused)
    }

    /// Admin function to transfer authority to a new address.
    ///
    /// # Errors
    /// - `Unauthorized` if the caller is not the admin or `new_authority` is zero
    pub fn transfer_authority(ctx: Context<AdminControl>, new_authority: Pubkey) -> Result<()> {
        instructions::admin::transfer_authority_handler(ctx, new_authority)
    }

    /// Admin function to add or remove a marketplace/escrow transfer agent.
    pub fn set_transfer_agent(
        ctx: Context<TransferAgentAdmin>,
        agent: Pubkey,
        authorized: bool,
    ) -> Result<()> {
        instructions::admin::set_transfer_agent_handler(ctx, agent, authorized)
    }

    /// Admin function to credit rewards escrowed while a pool was empty.
    ///
    /// # Errors
    /// - `NothingToRelease` if nothing is escrowed or the pool has no stakers
    pub fn release_unassigned(ctx: Context<PoolAdmin>) -> Result<()> {
        instructions::admin::release_unassigned_handler(ctx)
    }

    /// Opens a new position in the pool passed in `ctx`.
    ///
    /// # Arguments
    /// * `amount` - Principal to stake
    /// * `lock_duration_override` - Optional lock longer than the pool minimum
    ///
    /// # Errors
    /// - `StakingPaused`, `ZeroAmount`, `ZeroShares`
    /// - `LockDurationTooShort` / `LockDurationTooLong`
    pub fn open_position(
        ctx: Context<OpenPosition>,
        amount: u64,
        lock_duration_override: Option<i64>,
    ) -> Result<()> {
        instructions::open_position::handler(ctx, amount, lock_duration_override)
    }

    /// Pays out a position's pending reward.
    pub fn claim_rewards(ctx: Context<ClaimRewards>) -> Result<()> {
        instructions::claim_rewards::handler(ctx)
    }

    /// Restakes a position's pending reward.
    ///
    /// # Errors
    /// - `CompoundUnsupported` when reward and staking mints differ
    pub fn compound(ctx: Context<Compound>) -> Result<()> {
        instructions::compound::handler(ctx)
    }

    /// Returns principal and reward of an unlocked position and closes it.
    ///
    /// # Errors
    /// - `LockNotExpired` before the position's lock end time
    pub fn close_position(ctx: Context<ClosePosition>) -> Result<()> {
        instructions::close_position::handler(ctx)
    }

    /// Lengthens a position's lock.
    pub fn extend_lock(ctx: Context<ExtendLock>, additional_duration: i64) -> Result<()> {
        instructions::extend_lock::handler(ctx, additional_duration)
    }

    /// Deposits reward tokens into one pool or across all pools by weight.
    ///
    /// Pools are passed as `(reward_pool, reward_vault)` pairs in
    /// `remaining_accounts`, in pool-id order.
    pub fn deposit_rewards<'info>(
        ctx: Context<'_, '_, 'info, 'info, DepositRewards<'info>>,
        amount: u64,
        target: RewardTarget,
    ) -> Result<()> {
        instructions::deposit_rewards::handler(ctx, amount, target)
    }

    /// Credits reward sent straight to a pool's vault. Anyone may call it.
    pub fn settle_pool(ctx: Context<SettlePool>) -> Result<()> {
        instructions::settle_pool::handler(ctx)
    }

    /// Names the only counterparty allowed to take a position.
    pub fn approve_transfer(ctx: Context<ApproveTransfer>, counterparty: Pubkey) -> Result<()> {
        instructions::transfer::approve_handler(ctx, counterparty)
    }

    /// Clears the owner's outstanding transfer approval.
    pub fn revoke_approval(ctx: Context<RevokeApproval>) -> Result<()> {
        instructions::transfer::revoke_handler(ctx)
    }

    /// The approved counterparty takes the position.
    ///
    /// # Errors
    /// - `TransferNotApproved` unless the signer holds the approval for this position
    pub fn transfer_position(ctx: Context<TransferPosition>) -> Result<()> {
        instructions::transfer::transfer_position_handler(ctx)
    }

    /// A transfer agent moves `from`'s position to `to`.
    ///
    /// # Errors
    /// - `TransferAgentNotAuthorized` if the signer is not on the table
    /// - `PositionNotFound` if `from` does not own the position
    /// - `SelfTransfer` if `from == to`
    pub fn agent_transfer(ctx: Context<AgentTransfer>, from: Pubkey, to: Pubkey) -> Result<()> {
        instructions::transfer::agent_transfer_handler(ctx, from, to)
    }

    /// Returns a snapshot of the position if `owner` holds it.
    pub fn position_of(ctx: Context<ViewPosition>, owner: Pubkey) -> Result<PositionView> {
        instructions::views::position_of_handler(ctx, owner)
    }

    /// Returns the reward `owner` could claim from the position right now.
    pub fn pending_reward(ctx: Context<ViewPosition>, owner: Pubkey) -> Result<u64> {
        instructions::views::pending_reward_handler(ctx, owner)
    }
}
