use crate::error::Result;
use crate::math;
use emissions_types::{Decimal, TokenAmount, TopicId};
use std::collections::BTreeMap;
use tracing::debug;

/// Split of the block's emission across funded topics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicAllocation {
    pub rewards: BTreeMap<TopicId, TokenAmount>,
    /// Flooring residue; stays in the rewards account for a later block
    pub remainder: TokenAmount,
}

impl TopicAllocation {
    pub fn total_allocated(&self) -> TokenAmount {
        self.rewards.values().sum()
    }
}

/// Give each funded topic `floor(weight / total_weight * total_reward)`.
pub fn allocate_topic_rewards(
    funded: &BTreeMap<TopicId, Decimal>,
    total_reward: TokenAmount,
) -> Result<TopicAllocation> {
    let total_weight = math::sum(funded.values().copied())?;
    if total_weight <= Decimal::ZERO {
        debug!(
            topics = funded.len(),
            total_reward = total_reward.to_base_units(),
            "No funded weight, nothing allocated"
        );
        return Ok(TopicAllocation {
            rewards: BTreeMap::new(),
            remainder: total_reward,
        });
    }

    // Fraction first: weight * total overflows for large stakes
    let total = total_reward.to_decimal();
    let mut left = total_reward;
    let mut rewards = BTreeMap::new();
    for (&topic_id, &weight) in funded {
        let fraction = math::ratio(weight, total_weight)?;
        let reward = math::to_token_amount(math::mul(fraction, total)?)?.min(left);
        left = left.saturating_sub(reward);
        rewards.insert(topic_id, reward);
    }

    Ok(TopicAllocation {
        rewards,
        remainder: left,
    })
}
