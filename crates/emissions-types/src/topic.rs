use crate::{BlockHeight, TokenAmount, TopicId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub id: TopicId,
    /// Epoch length in blocks.
    pub epoch_length: BlockHeight,
    /// Height at which the last epoch of this topic closed.
    pub epoch_last_ended: BlockHeight,
    /// Weight computed at the last reward round.
    pub weight: Decimal,
    pub active: bool,
}

impl Topic {
    pub fn new(id: TopicId, epoch_length: BlockHeight) -> Self {
        Self {
            id,
            epoch_length,
            epoch_last_ended: 0,
            weight: Decimal::ZERO,
            active: true,
        }
    }

    /// A topic is reward-ready once a full epoch has elapsed since it last ended.
    pub fn is_reward_ready(&self, block_height: BlockHeight) -> bool {
        self.active && self.epoch_last_ended.saturating_add(self.epoch_length) <= block_height
    }
}

/// Fee revenue accumulated by a topic since `epoch`, the height of its last reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicFeeRevenue {
    pub epoch: BlockHeight,
    pub revenue: TokenAmount,
}

/// Network losses for one topic at one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LossBundle {
    /// Loss of the naive network, which excludes forecast-implied inferences.
    pub naive_value: Decimal,
    /// Loss of the combined network inference.
    pub combined_value: Decimal,
}
