//! Error types for the Position Staking program.
//!
//! This module defines all custom error codes that can be returned by the program.
//! Each error has a unique code and descriptive message.
//!
//! ## Error Code Ranges
//! - 6000-6010: Input validation errors
//! - 6011-6015: State/custody errors
//! - 6016-6019: Math/overflow errors
//! - 6020-6024: Authorization errors
//! - 6025-6028: Account validation errors

use anchor_lang::prelude::*;

/// Custom error codes for the Position Staking program.
///
/// Error codes start at 6000 (Anchor's custom error offset).
#[error_code]
pub enum StakingError {
    // ========== Input Validation Errors ==========

    /// [6000] Cannot stake, deposit or extend with a zero amount.
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    /// [6001] Requested lock is shorter than the pool minimum.
    #[msg("Lock duration is below the pool minimum")]
    LockDurationTooShort,

    /// [6002] Requested lock exceeds the program-wide maximum.
    #[msg("Lock duration exceeds the maximum allowed lock")]
    LockDurationTooLong,

    /// [6003] Pool parameters are out of bounds.
    #[msg("Invalid pool configuration")]
    InvalidPoolConfig,

    /// [6004] Pool id is not registered.
    #[msg("Pool not found")]
    PoolNotFound,

    /// [6005] Position id does not exist for this owner.
    #[msg("Position not found for this owner")]
    PositionNotFound,

    /// [6006] Share weighting rounded the stake down to nothing.
    #[msg("Stake is too small to earn any shares")]
    ZeroShares,

    /// [6007] Source and destination owners are the same.
    #[msg("Cannot transfer a position to its current owner")]
    SelfTransfer,

    /// [6008] Compounding needs the reward mint to equal the staking mint.
    #[msg("Compounding is not supported when reward and staking mints differ")]
    CompoundUnsupported,

    /// [6009] There are no escrowed rewards to release, or no stakers to receive them.
    #[msg("Nothing to release")]
    NothingToRelease,

    /// [6010] Registry already holds the maximum number of pools.
    #[msg("Maximum number of pools reached")]
    TooManyPools,

    // ========== State/Custody Errors ==========

    /// [6011] Opening and extending positions is paused by admin.
    #[msg("Staking is currently paused")]
    StakingPaused,

    /// [6012] Principal withdrawal attempted before the lock end time.
    #[msg("Lock period has not ended - cannot close position yet")]
    LockNotExpired,

    /// [6013] A ledger-mutating call arrived while a payout was in flight.
    #[msg("Reentrant call rejected")]
    Reentrant,

    /// [6014] The depositor cannot cover the requested amount.
    #[msg("Insufficient funds for this operation")]
    InsufficientFunds,

    /// [6015] An external value transfer did not complete.
    #[msg("Value transfer failed")]
    TransferFailed,

    // ========== Math/Overflow Errors ==========

    /// [6016] Arithmetic overflow occurred during calculation.
    #[msg("Arithmetic overflow occurred during calculation")]
    MathOverflow,

    /// [6017] Arithmetic underflow occurred during calculation.
    #[msg("Arithmetic underflow occurred during calculation")]
    MathUnderflow,

    /// [6018] Division by zero attempted.
    #[msg("Division by zero attempted")]
    DivisionByZero,

    /// [6019] Integer conversion failed (value out of range).
    #[msg("Integer conversion failed - value out of range")]
    ConversionOverflow,

    // ========== Authorization Errors ==========

    /// [6020] Caller is not the registry admin.
    #[msg("Unauthorized: caller is not the registry admin")]
    Unauthorized,

    /// [6021] Caller does not own the position.
    #[msg("Unauthorized: caller does not own this position")]
    NotPositionOwner,

    /// [6022] Caller is not the approved counterparty for this position.
    #[msg("Unauthorized: transfer not approved for caller")]
    TransferNotApproved,

    /// [6023] Caller is not on the transfer agent table.
    #[msg("Unauthorized: caller is not an authorized transfer agent")]
    TransferAgentNotAuthorized,

    /// [6024] Transfer agent table has no free slot.
    #[msg("Transfer agent table is full")]
    TransferAgentTableFull,

    // ========== Account Validation Errors ==========

    /// [6025] Token account or mint does not match the registry mints.
    #[msg("Token mint mismatch")]
    MintMismatch,

    /// [6026] Vault does not match the one stored in state.
    #[msg("Vault address mismatch")]
    VaultMismatch,

    /// [6027] Vault authority is not the registry PDA.
    #[msg("Vault owner must be the registry PDA")]
    InvalidVaultOwner,

    /// [6028] Account belongs to a different registry.
    #[msg("Account does not belong to this registry")]
    RegistryMismatch,
}
