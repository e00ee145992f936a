//! Program constants for the Position Staking program.
//!
//! This module defines PDA seeds, precision values and the bounds applied to
//! admin-supplied pool parameters.

/// Seed for deriving the stake registry PDA
pub const REGISTRY_SEED: &[u8] = b"registry";

/// Seed for deriving reward pool PDAs
pub const REWARD_POOL_SEED: &[u8] = b"reward_pool";

/// Seed for deriving position PDAs
pub const POSITION_SEED: &[u8] = b"position";

/// Seed for deriving per-owner account PDAs
pub const OWNER_SEED: &[u8] = b"owner";

/// Seed for deriving the transfer agent table PDA
pub const TRANSFER_AGENTS_SEED: &[u8] = b"transfer_agents";

/// Seed for deriving the principal (stake) vault PDA
pub const STAKE_VAULT_SEED: &[u8] = b"stake_vault";

/// Seed for deriving a pool's reward vault PDA
pub const REWARD_VAULT_SEED: &[u8] = b"reward_vault";

/// Number of seconds in a day
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Longest lock a position may commit to (4 years)
pub const MAX_LOCK_DURATION: i64 = 4 * 365 * SECONDS_PER_DAY;

/// Fixed-point scale of the reward accumulator (10^18)
pub const ACC_PRECISION: u128 = 1_000_000_000_000_000_000;

/// Maximum number of reward pools a registry can hold
pub const MAX_POOLS: u16 = 16;

/// Maximum weight of a single pool in the weighted reward split
pub const MAX_POOL_WEIGHT: u64 = 1_000_000;

/// Maximum number of marketplace/escrow identities on the transfer agent table
pub const MAX_TRANSFER_AGENTS: usize = 8;
