//! Event definitions

use anchor_lang::prelude::*;

#[event]
pub struct RegistryInitialized {
    pub registry: Pubkey,
    pub authority: Pubkey,
    pub staking_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub timestamp: i64,
}

#[event]
pub struct PoolAdded {
    pub registry: Pubkey,
    pub pool_id: u16,
    pub lock_duration: i64,
    pub weight: u64,
    pub duration_weighted: bool,
    pub timestamp: i64,
}

#[event]
pub struct PoolWeightUpdated {
    pub pool_id: u16,
    pub old_weight: u64,
    pub new_weight: u64,
    pub total_weight: u64,
}

/// Event emitted when a new position is opened
#[event]
pub struct PositionOpened {
    pub owner: Pubkey,
    pub position_id: u64,
    pub pool_id: u16,
    /// Principal as received by the stake vault
    pub amount: u64,
    pub shares: u64,
    pub lock_end_time: i64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsClaimed {
    pub owner: Pubkey,
    pub position_id: u64,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct RewardsCompounded {
    pub owner: Pubkey,
    pub position_id: u64,
    pub amount: u64,
    pub new_amount: u64,
    pub new_shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct LockExtended {
    pub owner: Pubkey,
    pub position_id: u64,
    pub lock_end_time: i64,
    pub new_shares: u64,
    pub timestamp: i64,
}

#[event]
pub struct PositionClosed {
    pub owner: Pubkey,
    pub position_id: u64,
    pub principal: u64,
    pub reward: u64,
    pub timestamp: i64,
}

/// Event emitted for every pool credited by a reward deposit
#[event]
pub struct RewardsDeposited {
    pub depositor: Pubkey,
    pub pool_id: u16,
    pub amount: u64,
    pub timestamp: i64,
}

#[event]
pub struct PoolSettled {
    pub pool_id: u16,
    /// Newly discovered reward, distributed or escrowed
    pub amount: u64,
    pub escrowed: bool,
    pub acc_reward_per_share: u128,
    pub timestamp: i64,
}

#[event]
pub struct UnassignedReleased {
    pub pool_id: u16,
    pub amount: u64,
    pub acc_reward_per_share: u128,
    pub timestamp: i64,
}

#[event]
pub struct TransferApproved {
    pub owner: Pubkey,
    pub counterparty: Pubkey,
    pub position_id: u64,
}

#[event]
pub struct ApprovalRevoked {
    pub owner: Pubkey,
}

#[event]
pub struct PositionTransferred {
    pub from: Pubkey,
    pub to: Pubkey,
    pub position_id: u64,
    /// Reward paid to `from` at transfer time
    pub reward_to_previous_owner: u64,
    /// Authorized agent that moved the position, if any
    pub agent: Option<Pubkey>,
    pub timestamp: i64,
}

#[event]
pub struct TransferAgentUpdated {
    pub agent: Pubkey,
    pub authorized: bool,
}

#[event]
pub struct PausedStateChanged {
    pub paused: bool,
    pub timestamp: i64,
}

#[event]
pub struct AuthorityTransferred {
    pub old_authority: Pubkey,
    pub new_authority: Pubkey,
    pub timestamp: i64,
}
