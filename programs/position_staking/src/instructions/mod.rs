//! Instruction handlers for the Position Staking program.
//!
//! This module contains all instruction implementations. Each handler loads
//! accounts, hands them to the ledger, and executes the resulting payouts
//! through the safety layer.

pub mod add_pool;
pub mod admin;
pub mod claim_rewards;
pub mod close_position;
pub mod compound;
pub mod deposit_rewards;
pub mod extend_lock;
pub mod initialize;
pub mod open_position;
pub mod settle_pool;
pub mod transfer;
pub mod views;

pub use add_pool::*;
pub use admin::*;
pub use claim_rewards::*;
pub use close_position::*;
pub use compound::*;
pub use deposit_rewards::*;
pub use extend_lock::*;
pub use initialize::*;
pub use open_position::*;
pub use settle_pool::*;
pub use transfer::*;
pub use views::*;
