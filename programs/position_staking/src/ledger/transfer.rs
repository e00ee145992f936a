//! Ownership transfer of positions.
//!
//! Two paths lead to the same move: the approved counterparty of a
//! self-service approval, or a caller on the transfer agent table (the
//! marketplace/escrow integration point). Either way the pool is settled
//! first, reward accrued so far goes to the original owner, and the new owner
//! starts from a freshly priced debt.

use anchor_lang::prelude::*;

use crate::error::StakingError;
use crate::ledger::positions::ensure_same_pool;
use crate::ledger::{Observation, PayoutPlan};
use crate::state::{
    OwnerAccount, Position, ReentrancyGuard, RewardPool, StakeRegistry, TransferAgents,
};

/// Records `counterparty` as the one address allowed to take `position`.
/// Replaces the owner's previous approval, if any.
pub fn approve_transfer(
    registry: &StakeRegistry,
    position: &Position,
    owner_account: &mut OwnerAccount,
    caller: &Pubkey,
    counterparty: Pubkey,
) -> Result<()> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    position.ensure_owner(caller)?;
    require_keys_eq!(owner_account.owner, *caller, StakingError::NotPositionOwner);

    owner_account.approve(counterparty, position.position_id)
}

pub fn revoke_approval(
    registry: &StakeRegistry,
    owner_account: &mut OwnerAccount,
    caller: &Pubkey,
) -> Result<()> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require_keys_eq!(owner_account.owner, *caller, StakingError::NotPositionOwner);

    owner_account.revoke();
    Ok(())
}

/// Self-service path: the approved counterparty takes the position.
pub fn transfer_by_approval(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    position: &mut Position,
    from_account: &mut OwnerAccount,
    to_account: &mut OwnerAccount,
    caller: &Pubkey,
    observed: Observation,
) -> Result<PayoutPlan> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require_keys_eq!(
        from_account.owner,
        position.owner,
        StakingError::PositionNotFound
    );
    require!(
        from_account.is_approved(caller, position.position_id),
        StakingError::TransferNotApproved
    );
    require_keys_eq!(to_account.owner, *caller, StakingError::TransferNotApproved);

    move_position(registry, pool, position, from_account, to_account, observed)
}

/// Marketplace path: an authorized agent moves `from`'s position to `to`.
/// Payment is settled by the agent; the ledger only checks authorization.
#[allow(clippy::too_many_arguments)]
pub fn transfer_by_agent(
    registry: &mut StakeRegistry,
    agents: &TransferAgents,
    pool: &mut RewardPool,
    position: &mut Position,
    from_account: &mut OwnerAccount,
    to_account: &mut OwnerAccount,
    caller: &Pubkey,
    from: &Pubkey,
    observed: Observation,
) -> Result<PayoutPlan> {
    ReentrancyGuard::ensure_unlocked(&registry.reentrancy)?;
    require!(
        agents.is_authorized(caller),
        StakingError::TransferAgentNotAuthorized
    );
    require_keys_eq!(position.owner, *from, StakingError::PositionNotFound);
    require_keys_eq!(from_account.owner, *from, StakingError::PositionNotFound);

    move_position(registry, pool, position, from_account, to_account, observed)
}

fn move_position(
    registry: &mut StakeRegistry,
    pool: &mut RewardPool,
    position: &mut Position,
    from_account: &mut OwnerAccount,
    to_account: &mut OwnerAccount,
    observed: Observation,
) -> Result<PayoutPlan> {
    let from = position.owner;
    let to = to_account.owner;
    require_keys_neq!(to, Pubkey::default(), StakingError::Unauthorized);
    require_keys_neq!(from, to, StakingError::SelfTransfer);
    ensure_same_pool(pool, position)?;
    registry.ensure_pool_exists(pool.pool_id)?;

    pool.settle(observed.reward_balance, observed.now)?;

    let pending = position.pending_reward(pool)?;
    let paid = pool.record_reward_outflow(pending)?;

    from_account.remove_position(position.position_id)?;
    to_account.add_position()?;

    position.owner = to;
    position.accrued_rewards = 0;
    position.rebase_debt(pool)?;
    position.total_claimed = position.total_claimed.saturating_add(paid);

    let mut plan = PayoutPlan::default();
    plan.reward(from, paid);
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::fixtures::*;
    use crate::ledger::Payout;

    struct Parties {
        seller: Pubkey,
        buyer: Pubkey,
        seller_account: OwnerAccount,
        buyer_account: OwnerAccount,
    }

    fn parties() -> Parties {
        let seller = Pubkey::new_unique();
        let buyer = Pubkey::new_unique();
        let mut seller_account = owner_account(seller);
        seller_account.open_positions = 1;
        Parties {
            seller,
            buyer,
            seller_account,
            buyer_account: owner_account(buyer),
        }
    }

    #[test]
    fn approved_counterparty_takes_position() {
        let mut fx = Fixture::flat(0);
        let mut p = parties();
        let mut position = fx.open(p.seller, 100, None, 0).unwrap();
        fx.inject(250);

        approve_transfer(
            &fx.registry,
            &position,
            &mut p.seller_account,
            &p.seller,
            p.buyer,
        )
        .unwrap();

        let observed = fx.observe(5);
        let plan = transfer_by_approval(
            &mut fx.registry,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut p.buyer_account,
            &p.buyer,
            observed,
        )
        .unwrap();

        assert_eq!(
            plan.iter().copied().collect::<Vec<_>>(),
            vec![Payout::Reward {
                to: p.seller,
                amount: 250
            }]
        );
        fx.reward_vault -= 250;
        assert_eq!(position.owner, p.buyer);
        assert_eq!(fx.pending(&position, 5), 0);
        assert_eq!(p.seller_account.open_positions, 0);
        assert_eq!(p.buyer_account.open_positions, 1);
        assert!(p.seller_account.approval.is_none());
    }

    #[test]
    fn unapproved_caller_is_rejected() {
        let mut fx = Fixture::flat(0);
        let mut p = parties();
        let mut position = fx.open(p.seller, 100, None, 0).unwrap();

        let observed = fx.observe(1);
        let err = transfer_by_approval(
            &mut fx.registry,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut p.buyer_account,
            &p.buyer,
            observed,
        )
        .unwrap_err();
        assert_eq!(err, StakingError::TransferNotApproved.into());
        assert_eq!(position.owner, p.seller);
    }

    #[test]
    fn approval_covers_only_the_named_position() {
        let mut fx = Fixture::flat(0);
        let mut p = parties();
        let approved = fx.open(p.seller, 100, None, 0).unwrap();
        let mut other = fx.open(p.seller, 100, None, 0).unwrap();

        approve_transfer(
            &fx.registry,
            &approved,
            &mut p.seller_account,
            &p.seller,
            p.buyer,
        )
        .unwrap();

        let observed = fx.observe(1);
        let err = transfer_by_approval(
            &mut fx.registry,
            &mut fx.pool,
            &mut other,
            &mut p.seller_account,
            &mut p.buyer_account,
            &p.buyer,
            observed,
        )
        .unwrap_err();
        assert_eq!(err, StakingError::TransferNotApproved.into());
    }

    #[test]
    fn agent_path_checks_table_and_source() {
        let mut fx = Fixture::flat(0);
        let mut p = parties();
        let mut position = fx.open(p.seller, 100, None, 0).unwrap();
        let marketplace = Pubkey::new_unique();
        let mut agents = TransferAgents {
            registry: Pubkey::new_unique(),
            agents: Vec::new(),
            bump: 0,
        };

        let observed = fx.observe(1);
        let err = transfer_by_agent(
            &mut fx.registry,
            &agents,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut p.buyer_account,
            &marketplace,
            &p.seller,
            observed,
        )
        .unwrap_err();
        assert_eq!(err, StakingError::TransferAgentNotAuthorized.into());

        agents.set(marketplace, true).unwrap();
        let observed = fx.observe(1);
        let err = transfer_by_agent(
            &mut fx.registry,
            &agents,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut p.buyer_account,
            &marketplace,
            &p.buyer,
            observed,
        )
        .unwrap_err();
        assert_eq!(err, StakingError::PositionNotFound.into());

        let observed = fx.observe(1);
        let plan = transfer_by_agent(
            &mut fx.registry,
            &agents,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut p.buyer_account,
            &marketplace,
            &p.seller,
            observed,
        )
        .unwrap();
        assert!(plan.is_empty());
        assert_eq!(position.owner, p.buyer);
    }

    #[test]
    fn agent_cannot_hand_position_to_the_zero_key() {
        let mut fx = Fixture::flat(0);
        let mut p = parties();
        let mut position = fx.open(p.seller, 100, None, 0).unwrap();
        let marketplace = Pubkey::new_unique();
        let agents = TransferAgents {
            registry: Pubkey::new_unique(),
            agents: vec![marketplace],
            bump: 0,
        };
        let mut nobody = owner_account(Pubkey::default());

        let observed = fx.observe(1);
        let err = transfer_by_agent(
            &mut fx.registry,
            &agents,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut nobody,
            &marketplace,
            &p.seller,
            observed,
        )
        .unwrap_err();
        assert_eq!(err, StakingError::Unauthorized.into());
        assert_eq!(position.owner, p.seller);
        assert_eq!(p.seller_account.open_positions, 1);
        assert_eq!(nobody.open_positions, 0);
    }

    #[test]
    fn self_transfer_is_rejected() {
        let mut fx = Fixture::flat(0);
        let mut p = parties();
        let mut position = fx.open(p.seller, 100, None, 0).unwrap();
        let marketplace = Pubkey::new_unique();
        let agents = TransferAgents {
            registry: Pubkey::new_unique(),
            agents: vec![marketplace],
            bump: 0,
        };
        let mut same = p.seller_account.clone();

        let observed = fx.observe(1);
        let err = transfer_by_agent(
            &mut fx.registry,
            &agents,
            &mut fx.pool,
            &mut position,
            &mut p.seller_account,
            &mut same,
            &marketplace,
            &p.seller,
            observed,
        )
        .unwrap_err();
        assert_eq!(err, StakingError::SelfTransfer.into());
    }
}
