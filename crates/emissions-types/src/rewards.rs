use crate::{AccountAddress, TokenAmount, TopicId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three cohorts a topic reward is split between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TaskRewardKind {
    Reputer,
    InferenceWorker,
    ForecastWorker,
}

impl TaskRewardKind {
    pub const ALL: [TaskRewardKind; 3] = [
        TaskRewardKind::Reputer,
        TaskRewardKind::InferenceWorker,
        TaskRewardKind::ForecastWorker,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskRewardKind::Reputer => "reputer",
            TaskRewardKind::InferenceWorker => "inference",
            TaskRewardKind::ForecastWorker => "forecast",
        }
    }
}

impl fmt::Display for TaskRewardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw performance score of one participant, as produced by the scoring subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantScore {
    pub address: AccountAddress,
    pub score: Decimal,
}

impl ParticipantScore {
    pub fn new(address: AccountAddress, score: Decimal) -> Self {
        Self { address, score }
    }
}

/// A single payout owed to a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskReward {
    pub address: AccountAddress,
    pub topic_id: TopicId,
    pub reward: TokenAmount,
    pub kind: TaskRewardKind,
}
