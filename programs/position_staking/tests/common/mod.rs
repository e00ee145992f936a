//! In-memory harness driving the ledger and safety layer the way the
//! instruction handlers do.
//!
//! Every operation runs against a snapshot: if it fails, the harness rolls
//! back to the snapshot, mirroring transaction revert on-chain.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};

use anchor_lang::prelude::*;
use position_staking::ledger::{self, Observation, RewardTarget, ValueCustody};
use position_staking::safety;
use position_staking::state::*;
use position_staking::error::StakingError;

pub const DAY: i64 = 86_400;

/// Token balances outside and inside the program.
#[derive(Clone, Debug, Default)]
pub struct Bank {
    /// Staking token wallets.
    pub wallets: HashMap<Pubkey, u64>,
    /// Reward token wallets.
    pub reward_wallets: HashMap<Pubkey, u64>,
    pub stake_vault: u64,
    pub reward_vaults: Vec<u64>,
    /// Deducted from inbound principal, in basis points.
    pub transfer_fee_bps: u64,
    pub fail_payouts: bool,
    /// Registry state as published by the last `seal`.
    pub last_sealed: Option<StakeRegistry>,
    active_pool: usize,
}

impl Bank {
    fn for_pool(&mut self, pool_id: u16) -> &mut Self {
        self.active_pool = pool_id as usize;
        self
    }

    fn take(balance: &mut u64, amount: u64) -> Result<()> {
        *balance = balance
            .checked_sub(amount)
            .ok_or(StakingError::InsufficientFunds)?;
        Ok(())
    }
}

impl ValueCustody for Bank {
    fn debit(&mut self, from: &Pubkey, amount: u64) -> Result<u64> {
        Self::take(self.wallets.entry(*from).or_default(), amount)?;
        let received = amount - amount * self.transfer_fee_bps / 10_000;
        self.stake_vault += received;
        Ok(received)
    }

    fn credit(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        require!(!self.fail_payouts, StakingError::TransferFailed);
        Self::take(&mut self.stake_vault, amount)?;
        *self.wallets.entry(*to).or_default() += amount;
        Ok(())
    }

    fn pay_reward(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        require!(!self.fail_payouts, StakingError::TransferFailed);
        let pool = self.active_pool;
        Self::take(&mut self.reward_vaults[pool], amount)?;
        *self.reward_wallets.entry(*to).or_default() += amount;
        Ok(())
    }

    fn restake_reward(&mut self, amount: u64) -> Result<()> {
        require!(!self.fail_payouts, StakingError::TransferFailed);
        let pool = self.active_pool;
        Self::take(&mut self.reward_vaults[pool], amount)?;
        self.stake_vault += amount;
        Ok(())
    }

    fn seal(&mut self, registry: &StakeRegistry) -> Result<()> {
        self.last_sealed = Some(registry.clone());
        Ok(())
    }
}

#[derive(Clone)]
pub struct Harness {
    pub admin: Pubkey,
    pub registry: StakeRegistry,
    pub pools: Vec<RewardPool>,
    pub positions: BTreeMap<u64, Position>,
    pub owners: HashMap<Pubkey, OwnerAccount>,
    pub agents: TransferAgents,
    pub bank: Bank,
    pub now: i64,
    /// Total reward ever sent to reward vaults.
    pub injected: u64,
}

impl Harness {
    /// A registry whose rewards are paid in a separate mint.
    pub fn new() -> Self {
        Self::build(false)
    }

    /// A registry paying rewards in the staking token.
    pub fn single_token() -> Self {
        Self::build(true)
    }

    fn build(single_token: bool) -> Self {
        let admin = Pubkey::new_unique();
        let staking_mint = Pubkey::new_unique();
        let registry_key = Pubkey::new_unique();
        let registry = StakeRegistry {
            authority: admin,
            staking_mint,
            reward_mint: if single_token {
                staking_mint
            } else {
                Pubkey::new_unique()
            },
            stake_vault: Pubkey::new_unique(),
            pool_count: 0,
            next_position_id: 0,
            total_weight: 0,
            total_staked: 0,
            total_shares: 0,
            paused: false,
            reentrancy: ReentrancyStatus::Unlocked,
            created_at: 0,
            last_updated: 0,
            bump: 255,
            vault_bump: 254,
        };

        Self {
            admin,
            registry,
            pools: Vec::new(),
            positions: BTreeMap::new(),
            owners: HashMap::new(),
            agents: TransferAgents {
                registry: registry_key,
                agents: Vec::new(),
                bump: 253,
            },
            bank: Bank::default(),
            now: 0,
            injected: 0,
        }
    }

    /// Runs `op` and restores the previous state if it fails.
    pub fn atomic<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.clone();
        let outcome = op(self);
        if outcome.is_err() {
            *self = snapshot;
        }
        outcome
    }

    pub fn advance(&mut self, seconds: i64) {
        self.now += seconds;
    }

    fn observe(&self, pool_id: u16) -> Observation {
        Observation::new(self.now, self.bank.reward_vaults[pool_id as usize])
    }

    pub fn add_pool(&mut self, lock_duration: i64, weight: u64, weighting: ShareWeighting) -> Result<u16> {
        self.atomic(|h| {
            RewardPool::validate_config(lock_duration, weight, &weighting)?;
            let pool_id = h.registry.register_pool(weight)?;
            h.pools.push(RewardPool {
                registry: h.agents.registry,
                reward_vault: Pubkey::new_unique(),
                pool_id,
                lock_duration,
                weight,
                share_weighting: weighting,
                acc_reward_per_share: 0,
                total_shares: 0,
                total_staked: 0,
                tracked_reward_balance: 0,
                unassigned_rewards: 0,
                total_rewards_distributed: 0,
                total_rewards_paid: 0,
                last_settle_time: h.now,
                created_at: h.now,
                bump: 255,
                vault_bump: 254,
            });
            h.bank.reward_vaults.push(0);
            Ok(pool_id)
        })
    }

    pub fn flat_pool(&mut self, lock_duration: i64) -> u16 {
        self.add_pool(lock_duration, 1, ShareWeighting::Flat).unwrap()
    }

    pub fn fund(&mut self, owner: Pubkey, amount: u64) {
        *self.bank.wallets.entry(owner).or_default() += amount;
    }

    pub fn fund_rewards(&mut self, depositor: Pubkey, amount: u64) {
        *self.bank.reward_wallets.entry(depositor).or_default() += amount;
    }

    /// Reward source paying straight into a pool's vault.
    pub fn inject(&mut self, pool_id: u16, amount: u64) {
        self.bank.reward_vaults[pool_id as usize] += amount;
        self.injected += amount;
    }

    pub fn wallet(&self, owner: &Pubkey) -> u64 {
        self.bank.wallets.get(owner).copied().unwrap_or_default()
    }

    pub fn reward_wallet(&self, owner: &Pubkey) -> u64 {
        self.bank.reward_wallets.get(owner).copied().unwrap_or_default()
    }

    fn owner_account(&mut self, owner: Pubkey) -> &mut OwnerAccount {
        let registry = self.agents.registry;
        let account = self.owners.entry(owner).or_insert_with(|| OwnerAccount {
            owner: Pubkey::default(),
            registry: Pubkey::default(),
            open_positions: 0,
            approval: None,
            bump: 0,
        });
        account.init_if_blank(owner, registry, 250);
        account
    }

    pub fn open(
        &mut self,
        owner: Pubkey,
        pool_id: u16,
        amount: u64,
        lock_duration_override: Option<i64>,
    ) -> Result<u64> {
        self.atomic(|h| {
            require!(
                (pool_id as usize) < h.pools.len(),
                StakingError::PoolNotFound
            );
            let received = safety::collect(
                &mut h.registry,
                h.bank.for_pool(pool_id),
                &owner,
                amount,
            )?;
            let observed = h.observe(pool_id);
            h.owner_account(owner);
            let owner_account = h.owners.get_mut(&owner).ok_or(StakingError::PositionNotFound)?;
            let position = ledger::open_position(
                &mut h.registry,
                &mut h.pools[pool_id as usize],
                owner_account,
                owner,
                received,
                lock_duration_override,
                observed,
            )?;
            let id = position.position_id;
            h.positions.insert(id, position);
            Ok(id)
        })
    }

    pub fn claim(&mut self, caller: Pubkey, id: u64) -> Result<u64> {
        self.atomic(|h| {
            let position = h.positions.get_mut(&id).ok_or(StakingError::PositionNotFound)?;
            let pool_id = position.pool_id;
            let observed = Observation::new(h.now, h.bank.reward_vaults[pool_id as usize]);
            let plan = ledger::claim(
                &mut h.registry,
                &mut h.pools[pool_id as usize],
                position,
                &caller,
                observed,
            )?;
            safety::disburse(&mut h.registry, h.bank.for_pool(pool_id), &plan)?;
            Ok(plan.reward_total())
        })
    }

    pub fn compound(&mut self, caller: Pubkey, id: u64) -> Result<u64> {
        self.atomic(|h| {
            let position = h.positions.get_mut(&id).ok_or(StakingError::PositionNotFound)?;
            let pool_id = position.pool_id;
            let observed = Observation::new(h.now, h.bank.reward_vaults[pool_id as usize]);
            let plan = ledger::compound(
                &mut h.registry,
                &mut h.pools[pool_id as usize],
                position,
                &caller,
                observed,
            )?;
            safety::disburse(&mut h.registry, h.bank.for_pool(pool_id), &plan)?;
            Ok(plan.reward_total())
        })
    }

    /// Returns `(principal, reward)` delivered.
    pub fn close(&mut self, caller: Pubkey, id: u64) -> Result<(u64, u64)> {
        self.atomic(|h| {
            let position = h.positions.get_mut(&id).ok_or(StakingError::PositionNotFound)?;
            let pool_id = position.pool_id;
            let owner = position.owner;
            let observed = Observation::new(h.now, h.bank.reward_vaults[pool_id as usize]);
            let owner_account = h.owners.get_mut(&owner).ok_or(StakingError::PositionNotFound)?;
            let plan = ledger::close_position(
                &mut h.registry,
                &mut h.pools[pool_id as usize],
                owner_account,
                position,
                &caller,
                observed,
            )?;
            safety::disburse(&mut h.registry, h.bank.for_pool(pool_id), &plan)?;
            h.positions.remove(&id);
            Ok((plan.principal_total(), plan.reward_total()))
        })
    }

    pub fn extend(&mut self, caller: Pubkey, id: u64, additional: i64) -> Result<()> {
        self.atomic(|h| {
            let position = h.positions.get_mut(&id).ok_or(StakingError::PositionNotFound)?;
            let pool_id = position.pool_id;
            let observed = Observation::new(h.now, h.bank.reward_vaults[pool_id as usize]);
            ledger::extend_lock(
                &mut h.registry,
                &mut h.pools[pool_id as usize],
                position,
                &caller,
                additional,
                observed,
            )
        })
    }

    pub fn approve(&mut self, caller: Pubkey, id: u64, counterparty: Pubkey) -> Result<()> {
        self.atomic(|h| {
            let position = h.positions.get(&id).ok_or(StakingError::PositionNotFound)?;
            let owner_account = h.owners.get_mut(&caller).ok_or(StakingError::NotPositionOwner)?;
            ledger::approve_transfer(&h.registry, position, owner_account, &caller, counterparty)
        })
    }

    pub fn revoke(&mut self, caller: Pubkey) -> Result<()> {
        self.atomic(|h| {
            let owner_account = h.owners.get_mut(&caller).ok_or(StakingError::NotPositionOwner)?;
            ledger::revoke_approval(&h.registry, owner_account, &caller)
        })
    }

    /// The approved counterparty takes position `id`. Returns the reward paid
    /// to the previous owner.
    pub fn take_approved(&mut self, caller: Pubkey, id: u64) -> Result<u64> {
        self.atomic(|h| {
            h.owner_account(caller);
            let from = h.positions.get(&id).ok_or(StakingError::PositionNotFound)?.owner;
            let mut from_account = h.owners.get(&from).cloned().ok_or(StakingError::PositionNotFound)?;
            let mut to_account = h.owners.get(&caller).cloned().ok_or(StakingError::PositionNotFound)?;

            let position = h.positions.get_mut(&id).ok_or(StakingError::PositionNotFound)?;
            let pool_id = position.pool_id;
            let observed = Observation::new(h.now, h.bank.reward_vaults[pool_id as usize]);
            let plan = ledger::transfer_by_approval(
                &mut h.registry,
                &mut h.pools[pool_id as usize],
                position,
                &mut from_account,
                &mut to_account,
                &caller,
                observed,
            )?;
            h.owners.insert(from, from_account);
            h.owners.insert(caller, to_account);
            safety::disburse(&mut h.registry, h.bank.for_pool(pool_id), &plan)?;
            Ok(plan.reward_total())
        })
    }

    pub fn set_agent(&mut self, caller: Pubkey, agent: Pubkey, authorized: bool) -> Result<bool> {
        self.atomic(|h| {
            require_keys_eq!(caller, h.registry.authority, StakingError::Unauthorized);
            h.agents.set(agent, authorized)
        })
    }

    /// An agent moves `from`'s position `id` to `to`. Returns the reward paid
    /// to `from`.
    pub fn agent_transfer(&mut self, agent: Pubkey, from: Pubkey, to: Pubkey, id: u64) -> Result<u64> {
        self.atomic(|h| {
            h.owner_account(to);
            let mut from_account = h.owners.get(&from).cloned().ok_or(StakingError::PositionNotFound)?;
            let mut to_account = h.owners.get(&to).cloned().ok_or(StakingError::PositionNotFound)?;

            let position = h.positions.get_mut(&id).ok_or(StakingError::PositionNotFound)?;
            let pool_id = position.pool_id;
            let observed = Observation::new(h.now, h.bank.reward_vaults[pool_id as usize]);
            let plan = ledger::transfer_by_agent(
                &mut h.registry,
                &h.agents,
                &mut h.pools[pool_id as usize],
                position,
                &mut from_account,
                &mut to_account,
                &agent,
                &from,
                observed,
            )?;
            h.owners.insert(from, from_account);
            h.owners.insert(to, to_account);
            safety::disburse(&mut h.registry, h.bank.for_pool(pool_id), &plan)?;
            Ok(plan.reward_total())
        })
    }

    /// Mirrors the deposit instruction: tokens move first, then every pool
    /// touched is settled.
    pub fn deposit(&mut self, depositor: Pubkey, amount: u64, target: RewardTarget) -> Result<Vec<u64>> {
        self.atomic(|h| {
            let weights: Vec<u64> = h.pools.iter().map(|p| p.weight).collect();
            let amounts = ledger::plan_deposit(amount, target, &weights)?;
            Bank::take(h.bank.reward_wallets.entry(depositor).or_default(), amount)?;

            for (index, share) in amounts.iter().enumerate() {
                h.bank.reward_vaults[index] += share;
                h.injected += share;
            }
            let touched: Vec<usize> = match target {
                RewardTarget::Pool(pool_id) => vec![pool_id as usize],
                RewardTarget::Weighted => (0..h.pools.len()).collect(),
            };
            for index in touched {
                let observed = Observation::new(h.now, h.bank.reward_vaults[index]);
                ledger::settle_pool(&h.registry, &mut h.pools[index], observed)?;
            }
            Ok(amounts)
        })
    }

    pub fn settle(&mut self, pool_id: u16) -> Result<Settlement> {
        self.atomic(|h| {
            let observed = h.observe(pool_id);
            ledger::settle_pool(&h.registry, &mut h.pools[pool_id as usize], observed)
        })
    }

    pub fn release_unassigned(&mut self, caller: Pubkey, pool_id: u16) -> Result<u64> {
        self.atomic(|h| {
            require_keys_eq!(caller, h.registry.authority, StakingError::Unauthorized);
            let observed = h.observe(pool_id);
            ledger::release_unassigned(&h.registry, &mut h.pools[pool_id as usize], observed)
        })
    }

    pub fn pending(&self, owner: Pubkey, id: u64) -> Result<u64> {
        let position = self.positions.get(&id).ok_or(StakingError::PositionNotFound)?;
        let pool = &self.pools[position.pool_id as usize];
        ledger::preview_pending(pool, position, &owner, self.observe(position.pool_id))
    }

    pub fn view(&self, owner: Pubkey, id: u64) -> Result<PositionView> {
        let position = self.positions.get(&id).ok_or(StakingError::PositionNotFound)?;
        let pool = &self.pools[position.pool_id as usize];
        ledger::position_view(pool, position, &owner, self.observe(position.pool_id))
    }

    /// Reward paid out of all reward vaults so far.
    pub fn rewards_out(&self) -> u64 {
        self.injected - self.bank.reward_vaults.iter().sum::<u64>()
    }

    /// Reward owed to open positions right now.
    pub fn rewards_pending(&self) -> u64 {
        self.positions
            .values()
            .map(|p| self.pending(p.owner, p.position_id).unwrap())
            .sum()
    }

    /// Global bookkeeping invariants that must hold after every operation.
    pub fn assert_invariants(&self) {
        let staked: u64 = self.positions.values().map(|p| p.amount).sum();
        let shares: u64 = self.positions.values().map(|p| p.shares).sum();
        assert_eq!(self.registry.total_staked, staked);
        assert_eq!(self.registry.total_shares, shares);
        assert_eq!(self.bank.stake_vault, staked);
        assert_eq!(
            self.pools.iter().map(|p| p.total_staked).sum::<u64>(),
            staked
        );
        assert_eq!(self.registry.reentrancy, ReentrancyStatus::Unlocked);

        for (pool, vault) in self.pools.iter().zip(&self.bank.reward_vaults) {
            assert!(pool.tracked_reward_balance <= *vault);
            let members: Vec<&Position> = self
                .positions
                .values()
                .filter(|p| p.pool_id == pool.pool_id)
                .collect();
            let owed: u64 = members
                .iter()
                .map(|p| self.pending(p.owner, p.position_id).unwrap())
                .sum();
            // Truncated debts can overstate each position by one unit; the
            // payout cap absorbs it.
            let slack = members.len() as u64;
            assert!(
                owed <= *vault + slack,
                "pool {} owes {} with {} in vault",
                pool.pool_id,
                owed,
                vault
            );
        }

        let open: u64 = self.owners.values().map(|o| o.open_positions).sum();
        assert_eq!(open, self.positions.len() as u64);
    }
}
