//! Value transfer safety layer.
//!
//! Executes the payouts of a finished ledger operation. The registry guard is
//! held, and published through [`ValueCustody::seal`], for as long as control
//! may leave the program. A failed payout fails the whole operation; nothing
//! is reported as paid unless the transfer went through.

use anchor_lang::prelude::*;

use crate::ledger::{Payout, PayoutPlan, ValueCustody};
use crate::state::{ReentrancyGuard, StakeRegistry};

pub fn disburse<C: ValueCustody>(
    registry: &mut StakeRegistry,
    custody: &mut C,
    plan: &PayoutPlan,
) -> Result<()> {
    if plan.is_empty() {
        return Ok(());
    }

    ReentrancyGuard::acquire(&mut registry.reentrancy)?;
    let outcome = custody
        .seal(registry)
        .and_then(|_| plan.iter().try_for_each(|payout| execute(custody, payout)));
    ReentrancyGuard::release(&mut registry.reentrancy);

    if let Err(err) = &outcome {
        msg!("Payout failed, aborting operation: {}", err);
    }
    outcome
}

/// Pulls principal from `from` into custody under the guard and returns what
/// actually arrived.
pub fn collect<C: ValueCustody>(
    registry: &mut StakeRegistry,
    custody: &mut C,
    from: &Pubkey,
    amount: u64,
) -> Result<u64> {
    ReentrancyGuard::acquire(&mut registry.reentrancy)?;
    let outcome = custody
        .seal(registry)
        .and_then(|_| custody.debit(from, amount));
    ReentrancyGuard::release(&mut registry.reentrancy);

    if let Err(err) = &outcome {
        msg!("Principal transfer failed: {}", err);
    }
    outcome
}

fn execute<C: ValueCustody>(custody: &mut C, payout: &Payout) -> Result<()> {
    match *payout {
        Payout::Principal { to, amount } => custody.credit(&to, amount),
        Payout::Reward { to, amount } => custody.pay_reward(&to, amount),
        Payout::Restake { amount } => custody.restake_reward(amount),
    }
}
