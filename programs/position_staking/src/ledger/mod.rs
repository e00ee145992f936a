//! Accounting core of the program.
//!
//! Every function in this module works on plain account structs and never
//! performs a CPI, so the whole ledger runs on the host in tests. Operations
//! that release value finalize all state first and return a [`PayoutPlan`];
//! the plan is executed afterwards by [`crate::safety::disburse`].

use anchor_lang::prelude::*;

use crate::state::StakeRegistry;

pub mod distribution;
pub mod positions;
pub mod transfer;

#[cfg(test)]
pub(crate) mod fixtures;

pub use distribution::*;
pub use positions::*;
pub use transfer::*;

/// What the ledger can see of the outside world at call time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Observation {
    pub now: i64,
    /// Current token balance of the pool's reward vault.
    pub reward_balance: u64,
}

impl Observation {
    pub fn new(now: i64, reward_balance: u64) -> Self {
        Self {
            now,
            reward_balance,
        }
    }
}

/// A single external value movement owed by a finished ledger operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Payout {
    /// Principal returned from the stake vault.
    Principal { to: Pubkey, amount: u64 },
    /// Reward paid from the pool's reward vault.
    Reward { to: Pubkey, amount: u64 },
    /// Reward moved from the reward vault into principal custody.
    Restake { amount: u64 },
}

impl Payout {
    pub fn amount(&self) -> u64 {
        match self {
            Payout::Principal { amount, .. }
            | Payout::Reward { amount, .. }
            | Payout::Restake { amount } => *amount,
        }
    }
}

/// Ordered payouts of one operation. Zero-amount payouts are never recorded.
#[must_use = "a payout plan must be handed to safety::disburse"]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PayoutPlan {
    payouts: Vec<Payout>,
}

impl PayoutPlan {
    pub fn principal(&mut self, to: Pubkey, amount: u64) {
        self.push(Payout::Principal { to, amount });
    }

    pub fn reward(&mut self, to: Pubkey, amount: u64) {
        self.push(Payout::Reward { to, amount });
    }

    pub fn restake(&mut self, amount: u64) {
        self.push(Payout::Restake { amount });
    }

    fn push(&mut self, payout: Payout) {
        if payout.amount() > 0 {
            self.payouts.push(payout);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Payout> {
        self.payouts.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.payouts.is_empty()
    }

    pub fn reward_total(&self) -> u64 {
        self.payouts
            .iter()
            .filter_map(|p| match p {
                Payout::Reward { amount, .. } | Payout::Restake { amount } => Some(*amount),
                Payout::Principal { .. } => None,
            })
            .sum()
    }

    pub fn principal_total(&self) -> u64 {
        self.payouts
            .iter()
            .filter_map(|p| match p {
                Payout::Principal { amount, .. } => Some(*amount),
                _ => None,
            })
            .sum()
    }
}

/// The value custody collaborator.
///
/// On-chain this is [`crate::custody::SplCustody`]; tests use an in-memory
/// ledger. Implementations may apply transfer-time deductions, which is why
/// `debit` reports the amount actually received.
pub trait ValueCustody {
    /// Moves principal from `from` into the stake vault.
    fn debit(&mut self, from: &Pubkey, amount: u64) -> Result<u64>;

    /// Returns principal from the stake vault to `to`.
    fn credit(&mut self, to: &Pubkey, amount: u64) -> Result<()>;

    /// Pays reward from the pool's reward vault to `to`.
    fn pay_reward(&mut self, to: &Pubkey, amount: u64) -> Result<()>;

    /// Moves reward from the reward vault into the stake vault.
    fn restake_reward(&mut self, amount: u64) -> Result<()>;

    /// Publishes registry state before control leaves the program, so a
    /// reentrant invocation observes the held guard.
    fn seal(&mut self, _registry: &StakeRegistry) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plan_drops_zero_payouts_and_sums_by_kind() {
        let owner = Pubkey::new_unique();
        let mut plan = PayoutPlan::default();
        plan.principal(owner, 100);
        plan.reward(owner, 0);
        plan.reward(owner, 7);
        plan.restake(3);

        assert_eq!(plan.iter().count(), 3);
        assert_eq!(plan.principal_total(), 100);
        assert_eq!(plan.reward_total(), 10);
        assert!(PayoutPlan::default().is_empty());
    }
}
