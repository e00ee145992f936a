//! State structures for the Position Staking program.
//!
//! This module defines all account structures used to store program state.

pub mod owner_account;
pub mod position;
pub mod reentrancy;
pub mod registry;
pub mod reward_pool;
pub mod transfer_agents;

pub use owner_account::*;
pub use position::*;
pub use reentrancy::*;
pub use registry::*;
pub use reward_pool::*;
pub use transfer_agents::*;
