//! Core types shared by the emissions reward engine.
//!
//! - **amount / address**: token amounts in base units and account identities
//! - **topic**: topics, fee revenue and loss bundles
//! - **rewards**: scores, task reward kinds and per-participant rewards
//! - **params**: governance-tunable module parameters
//! - **wire**: nonce messages and their protobuf-compatible codec

pub mod address;
pub mod amount;
pub mod error;
pub mod params;
pub mod rewards;
pub mod topic;
pub mod wire;

pub use address::{AccountAddress, ModuleAccount};
pub use amount::{TokenAmount, BOND_DENOM};
pub use error::{ParamsError, WireError};
pub use params::ModuleParams;
pub use rewards::{ParticipantScore, TaskReward, TaskRewardKind};
pub use topic::{LossBundle, Topic, TopicFeeRevenue};
pub use wire::{Nonce, Nonces, ReputerRequestNonce, ReputerRequestNonces, WireMessage};

pub use rust_decimal::Decimal;

/// Identifier of a topic.
pub type TopicId = u64;

/// Block height; also the value carried by a nonce.
pub type BlockHeight = i64;
