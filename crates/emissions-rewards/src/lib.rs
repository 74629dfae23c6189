//! Per-block reward emission for topics and their participants.
//!
//! Each block the engine:
//! - **weights**: scores reward-ready topics by stake and fee revenue and
//!   inactivates the ones below the minimum weight
//! - **selection / settlement**: funds the heaviest topics and sweeps their
//!   fee revenue to the ecosystem account
//! - **allocation**: splits the block emission across funded topics
//! - **participants**: splits each topic reward between reputers, inferers and
//!   forecasters using cohort entropy and forecast utility
//! - **payout / pruning**: pays participants and drops records no open
//!   request still needs
//!
//! State is reached through the [`emissions_storage::Store`] and
//! [`emissions_storage::Ledger`] traits.

pub mod allocation;
pub mod config;
pub mod engine;
pub mod entropy;
pub mod error;
pub mod fractions;
pub mod logging;
pub mod math;
pub mod participants;
pub mod payout;
pub mod pruning;
pub mod selection;
pub mod settlement;
pub mod task_shares;
pub mod weights;

pub use allocation::{allocate_topic_rewards, TopicAllocation};
pub use config::{EngineConfig, LoggingConfig};
pub use engine::{EmissionsEngine, EpochReport, SkipStage, TopicOutcome, TopicReport};
pub use entropy::{cohort_entropies, cohort_entropy, CohortEntropies};
pub use error::{MathError, Result, RewardsError};
pub use fractions::{reward_fractions_from_scores, smooth_fractions, RewardFractions};
pub use logging::init_logging;
pub use participants::{distribute_topic_reward, TopicDistribution};
pub use payout::{pay_rewards, PayoutSummary};
pub use pruning::{prune_floor, prune_settled_records, PruneOutcome};
pub use selection::{skim_top_topics_by_weight_desc, tiebreak_key};
pub use settlement::{settle_revenue, RevenueSettlement};
pub use task_shares::{
    forecast_utility, split_topic_reward, task_shares, CohortSizes, TaskRewards, TaskShares,
};
pub use weights::{
    compute_topic_weights, inactivate_topics_and_update_sums, reward_ready_topics,
    StakeFeeWeight, TopicWeightFn, TopicWeights,
};
