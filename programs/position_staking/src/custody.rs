//! SPL token implementation of the value custody collaborator.
//!
//! Vaults are owned by the registry PDA, so every outbound transfer is signed
//! with the registry seeds. Inbound principal is measured by the stake vault
//! balance delta, so tokens with transfer-time deductions credit only what
//! actually arrived.

use anchor_lang::prelude::*;
use anchor_spl::token::{self, TokenAccount, Transfer};

use crate::constants::REGISTRY_SEED;
use crate::error::StakingError;
use crate::ledger::ValueCustody;
use crate::state::StakeRegistry;

/// Wallet that signs an inbound principal transfer, with its token account.
struct Depositor<'info> {
    wallet: AccountInfo<'info>,
    token_account: AccountInfo<'info>,
}

pub struct SplCustody<'info> {
    token_program: AccountInfo<'info>,
    registry: AccountInfo<'info>,
    staking_mint: Pubkey,
    registry_bump: u8,
    stake_vault: Option<AccountInfo<'info>>,
    reward_vault: Option<AccountInfo<'info>>,
    depositor: Option<Depositor<'info>>,
    principal_recipients: Vec<(Pubkey, AccountInfo<'info>)>,
    reward_recipients: Vec<(Pubkey, AccountInfo<'info>)>,
}

impl<'info> SplCustody<'info> {
    pub fn new(
        token_program: AccountInfo<'info>,
        registry_info: AccountInfo<'info>,
        registry: &StakeRegistry,
    ) -> Self {
        Self {
            token_program,
            registry: registry_info,
            staking_mint: registry.staking_mint,
            registry_bump: registry.bump,
            stake_vault: None,
            reward_vault: None,
            depositor: None,
            principal_recipients: Vec::new(),
            reward_recipients: Vec::new(),
        }
    }

    pub fn with_stake_vault(mut self, stake_vault: AccountInfo<'info>) -> Self {
        self.stake_vault = Some(stake_vault);
        self
    }

    pub fn with_reward_vault(mut self, reward_vault: AccountInfo<'info>) -> Self {
        self.reward_vault = Some(reward_vault);
        self
    }

    pub fn with_depositor(
        mut self,
        wallet: AccountInfo<'info>,
        token_account: AccountInfo<'info>,
    ) -> Self {
        self.depositor = Some(Depositor {
            wallet,
            token_account,
        });
        self
    }

    /// Token account that receives principal for `owner`.
    pub fn with_principal_recipient(mut self, owner: Pubkey, token_account: AccountInfo<'info>) -> Self {
        self.principal_recipients.push((owner, token_account));
        self
    }

    /// Token account that receives reward for `owner`.
    pub fn with_reward_recipient(mut self, owner: Pubkey, token_account: AccountInfo<'info>) -> Self {
        self.reward_recipients.push((owner, token_account));
        self
    }

    fn recipient(
        recipients: &[(Pubkey, AccountInfo<'info>)],
        owner: &Pubkey,
    ) -> Result<AccountInfo<'info>> {
        recipients
            .iter()
            .find(|(key, _)| key == owner)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| {
                msg!("No token account supplied for recipient {}", owner);
                StakingError::TransferFailed.into()
            })
    }

    fn vault(vault: &Option<AccountInfo<'info>>) -> Result<AccountInfo<'info>> {
        vault
            .clone()
            .ok_or_else(|| StakingError::VaultMismatch.into())
    }

    /// Transfer out of a registry-owned vault.
    fn transfer_signed(
        &self,
        from: AccountInfo<'info>,
        to: AccountInfo<'info>,
        amount: u64,
    ) -> Result<()> {
        let bump = [self.registry_bump];
        let seeds: &[&[u8]] = &[REGISTRY_SEED, self.staking_mint.as_ref(), &bump];
        let signer_seeds = &[seeds];

        let cpi_accounts = Transfer {
            from,
            to,
            authority: self.registry.clone(),
        };
        let cpi_ctx =
            CpiContext::new_with_signer(self.token_program.clone(), cpi_accounts, signer_seeds);
        token::transfer(cpi_ctx, amount)
    }
}

fn token_balance(info: &AccountInfo) -> Result<u64> {
    let data = info.try_borrow_data()?;
    let account = TokenAccount::try_deserialize(&mut &data[..])?;
    Ok(account.amount)
}

impl<'info> ValueCustody for SplCustody<'info> {
    fn debit(&mut self, from: &Pubkey, amount: u64) -> Result<u64> {
        let stake_vault = Self::vault(&self.stake_vault)?;
        let depositor = self
            .depositor
            .as_ref()
            .ok_or(StakingError::TransferFailed)?;
        require_keys_eq!(depositor.wallet.key(), *from, StakingError::Unauthorized);
        require!(
            token_balance(&depositor.token_account)? >= amount,
            StakingError::InsufficientFunds
        );

        let before = token_balance(&stake_vault)?;
        let cpi_accounts = Transfer {
            from: depositor.token_account.clone(),
            to: stake_vault.clone(),
            authority: depositor.wallet.clone(),
        };
        token::transfer(
            CpiContext::new(self.token_program.clone(), cpi_accounts),
            amount,
        )?;
        let after = token_balance(&stake_vault)?;

        after
            .checked_sub(before)
            .ok_or_else(|| StakingError::MathUnderflow.into())
    }

    fn credit(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        let stake_vault = Self::vault(&self.stake_vault)?;
        let recipient = Self::recipient(&self.principal_recipients, to)?;
        self.transfer_signed(stake_vault, recipient, amount)
    }

    fn pay_reward(&mut self, to: &Pubkey, amount: u64) -> Result<()> {
        let reward_vault = Self::vault(&self.reward_vault)?;
        let recipient = Self::recipient(&self.reward_recipients, to)?;
        self.transfer_signed(reward_vault, recipient, amount)
    }

    fn restake_reward(&mut self, amount: u64) -> Result<()> {
        let reward_vault = Self::vault(&self.reward_vault)?;
        let stake_vault = Self::vault(&self.stake_vault)?;
        self.transfer_signed(reward_vault, stake_vault, amount)
    }

    fn seal(&mut self, registry: &StakeRegistry) -> Result<()> {
        let mut data = self.registry.try_borrow_mut_data()?;
        let mut writer: &mut [u8] = &mut data;
        registry.try_serialize(&mut writer)
    }
}
