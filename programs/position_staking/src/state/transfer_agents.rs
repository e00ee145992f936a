use anchor_lang::prelude::*;

use crate::constants::MAX_TRANSFER_AGENTS;
use crate::error::StakingError;

/// Access-control table of marketplace/escrow identities that may move
/// positions between owners without a per-owner approval.
#[account]
#[derive(Debug)]
pub struct TransferAgents {
    pub registry: Pubkey,
    pub agents: Vec<Pubkey>,
    pub bump: u8,
}

impl TransferAgents {
    pub const LEN: usize = 8 + 32 + (4 + 32 * MAX_TRANSFER_AGENTS) + 1;

    pub fn is_authorized(&self, caller: &Pubkey) -> bool {
        self.agents.contains(caller)
    }

    /// Adds or removes `agent`. Returns whether the table changed.
    pub fn set(&mut self, agent: Pubkey, authorized: bool) -> Result<bool> {
        let position = self.agents.iter().position(|a| *a == agent);
        match (authorized, position) {
            (true, None) => {
                require!(
                    self.agents.len() < MAX_TRANSFER_AGENTS,
                    StakingError::TransferAgentTableFull
                );
                self.agents.push(agent);
                Ok(true)
            }
            (false, Some(index)) => {
                self.agents.swap_remove(index);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
