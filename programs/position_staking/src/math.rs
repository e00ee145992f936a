//! Fixed-point helpers for the per-share reward accumulator.
//!
//! All values are scaled by [`ACC_PRECISION`]. Divisions truncate toward zero,
//! so every settlement under-distributes by at most `total_shares - 1` scaled
//! units. That dust stays in the reward vault.

use anchor_lang::prelude::*;

use crate::constants::ACC_PRECISION;
use crate::error::StakingError;

/// Accumulator increase for `reward` spread over `total_shares`.
pub fn per_share_delta(reward: u64, total_shares: u64) -> Result<u128> {
    require!(total_shares > 0, StakingError::DivisionByZero);

    (reward as u128)
        .checked_mul(ACC_PRECISION)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(total_shares as u128)
        .ok_or_else(|| StakingError::DivisionByZero.into())
}

/// Reward already priced into `shares` at accumulator value `acc`.
pub fn reward_debt(shares: u64, acc_reward_per_share: u128) -> Result<u128> {
    (shares as u128)
        .checked_mul(acc_reward_per_share)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(ACC_PRECISION)
        .ok_or_else(|| StakingError::DivisionByZero.into())
}

/// Reward earned by `shares` since `debt` was priced in.
///
/// Clamps to zero instead of underflowing when the debt exceeds the freshly
/// computed reward.
pub fn pending_reward(shares: u64, debt: u128, acc_reward_per_share: u128) -> Result<u64> {
    let accumulated = reward_debt(shares, acc_reward_per_share)?;
    let pending = accumulated.saturating_sub(debt);
    u64::try_from(pending).map_err(|_| StakingError::ConversionOverflow.into())
}

/// Shares for a duration-weighted stake: `amount * committed / reference`.
pub fn duration_shares(amount: u64, committed: i64, reference: i64) -> Result<u64> {
    require!(reference > 0, StakingError::DivisionByZero);
    require!(committed >= 0, StakingError::MathUnderflow);

    let shares = (amount as u128)
        .checked_mul(committed as u128)
        .ok_or(StakingError::MathOverflow)?
        .checked_div(reference as u128)
        .ok_or(StakingError::DivisionByZero)?;

    u64::try_from(shares).map_err(|_| StakingError::ConversionOverflow.into())
}

/// Splits `amount` proportionally to `weights`.
///
/// The last entry with a non-zero weight absorbs the integer-division
/// remainder so the split always sums to `amount`.
pub fn weighted_split(amount: u64, weights: &[u64]) -> Result<Vec<u64>> {
    let total_weight = weights
        .iter()
        .try_fold(0u64, |acc, w| acc.checked_add(*w))
        .ok_or(StakingError::MathOverflow)?;
    require!(total_weight > 0, StakingError::DivisionByZero);

    let last_weighted = weights
        .iter()
        .rposition(|w| *w > 0)
        .ok_or(StakingError::DivisionByZero)?;

    let mut shares = Vec::with_capacity(weights.len());
    let mut assigned: u64 = 0;
    for (index, weight) in weights.iter().enumerate() {
        let share = if index == last_weighted {
            amount
                .checked_sub(assigned)
                .ok_or(StakingError::MathUnderflow)?
        } else {
            let share = (amount as u128)
                .checked_mul(*weight as u128)
                .ok_or(StakingError::MathOverflow)?
                / total_weight as u128;
            u64::try_from(share).map_err(|_| StakingError::ConversionOverflow)?
        };
        assigned = assigned
            .checked_add(share)
            .ok_or(StakingError::MathOverflow)?;
        shares.push(share);
    }

    Ok(shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_truncates_toward_zero() {
        // 10 / 3 shares leaves a remainder in the last scaled digit
        let delta = per_share_delta(10, 3).unwrap();
        assert_eq!(delta, 10 * ACC_PRECISION / 3);
        assert!(delta * 3 < 10 * ACC_PRECISION);
    }

    #[test]
    fn delta_rejects_empty_pool() {
        assert!(per_share_delta(10, 0).is_err());
    }

    #[test]
    fn pending_reflects_accumulator_growth() {
        let acc = per_share_delta(1_000, 100).unwrap();
        let debt = reward_debt(100, 0).unwrap();
        assert_eq!(pending_reward(100, debt, acc).unwrap(), 1_000);
    }

    #[test]
    fn pending_clamps_stale_debt_to_zero() {
        let acc = 5 * ACC_PRECISION;
        let debt = reward_debt(100, acc).unwrap() + 1;
        assert_eq!(pending_reward(100, debt, acc).unwrap(), 0);
    }

    #[test]
    fn duration_shares_scale_with_commitment() {
        let day = crate::constants::SECONDS_PER_DAY;
        assert_eq!(duration_shares(1_000, 30 * day, 30 * day).unwrap(), 1_000);
        assert_eq!(duration_shares(1_000, 90 * day, 30 * day).unwrap(), 3_000);
        assert_eq!(duration_shares(1_000, 15 * day, 30 * day).unwrap(), 500);
        assert!(duration_shares(1_000, day, 0).is_err());
    }

    #[test]
    fn weighted_split_is_exhaustive() {
        let split = weighted_split(1_000, &[1, 1, 1]).unwrap();
        assert_eq!(split, vec![333, 333, 334]);
        assert_eq!(split.iter().sum::<u64>(), 1_000);
    }

    #[test]
    fn weighted_split_skips_zero_weight_tail() {
        let split = weighted_split(101, &[3, 1, 0]).unwrap();
        assert_eq!(split, vec![75, 26, 0]);
    }

    #[test]
    fn weighted_split_needs_weight() {
        assert!(weighted_split(100, &[0, 0]).is_err());
        assert!(weighted_split(100, &[]).is_err());
    }
}
