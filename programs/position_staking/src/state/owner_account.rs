use anchor_lang::prelude::borsh;
use anchor_lang::prelude::*;

use crate::error::StakingError;

/// The single outstanding self-service transfer approval of an owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, AnchorSerialize, AnchorDeserialize)]
pub struct TransferApproval {
    pub counterparty: Pubkey,
    pub position_id: u64,
}

/// Per-owner bookkeeping: open position count and transfer approval.
#[account]
#[derive(Debug)]
pub struct OwnerAccount {
    pub owner: Pubkey,
    pub registry: Pubkey,
    pub open_positions: u64,
    pub approval: Option<TransferApproval>,
    pub bump: u8,
}

impl OwnerAccount {
    pub const LEN: usize = 8 + (32 * 2) + 8 + (1 + 32 + 8) + 1;

    /// Fills in a freshly created account; no-op for existing ones.
    pub fn init_if_blank(&mut self, owner: Pubkey, registry: Pubkey, bump: u8) {
        if self.owner == Pubkey::default() {
            self.owner = owner;
            self.registry = registry;
            self.bump = bump;
        }
    }

    pub fn add_position(&mut self) -> Result<()> {
        self.open_positions = self
            .open_positions
            .checked_add(1)
            .ok_or(StakingError::MathOverflow)?;
        Ok(())
    }

    /// Drops a position from the owner, together with any approval for it.
    pub fn remove_position(&mut self, position_id: u64) -> Result<()> {
        self.open_positions = self
            .open_positions
            .checked_sub(1)
            .ok_or(StakingError::MathUnderflow)?;
        if self.approval.map(|a| a.position_id) == Some(position_id) {
            self.approval = None;
        }
        Ok(())
    }

    /// Replaces any previous approval.
    pub fn approve(&mut self, counterparty: Pubkey, position_id: u64) -> Result<()> {
        require_keys_neq!(counterparty, self.owner, StakingError::SelfTransfer);
        self.approval = Some(TransferApproval {
            counterparty,
            position_id,
        });
        Ok(())
    }

    pub fn revoke(&mut self) {
        self.approval = None;
    }

    pub fn is_approved(&self, counterparty: &Pubkey, position_id: u64) -> bool {
        self.approval
            == Some(TransferApproval {
                counterparty: *counterparty,
                position_id,
            })
    }
}
