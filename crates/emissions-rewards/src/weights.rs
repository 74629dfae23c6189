use crate::error::{MathError, Result};
use crate::math;
use emissions_storage::Store;
use emissions_types::{BlockHeight, Decimal, ModuleParams, TokenAmount, Topic, TopicId};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Weight of a topic from its stake and fee revenue.
///
/// Implementations must be pure: the same inputs always produce the same
/// weight, on every node.
pub trait TopicWeightFn {
    fn topic_weight(
        &self,
        params: &ModuleParams,
        stake: TokenAmount,
        revenue: TokenAmount,
    ) -> std::result::Result<Decimal, MathError>;
}

/// `stake^stake_importance * revenue^fee_revenue_importance`
#[derive(Debug, Clone, Copy, Default)]
pub struct StakeFeeWeight;

impl TopicWeightFn for StakeFeeWeight {
    fn topic_weight(
        &self,
        params: &ModuleParams,
        stake: TokenAmount,
        revenue: TokenAmount,
    ) -> std::result::Result<Decimal, MathError> {
        let stake_term = math::pow(stake.to_decimal(), params.topic_reward_stake_importance)?;
        let revenue_term = math::pow(
            revenue.to_decimal(),
            params.topic_reward_fee_revenue_importance,
        )?;
        math::mul(stake_term, revenue_term)
    }
}

/// Per-topic weights and revenues for one block, with their running sums.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicWeights {
    pub weights: BTreeMap<TopicId, Decimal>,
    pub revenues: BTreeMap<TopicId, TokenAmount>,
    pub sum_weight: Decimal,
    pub sum_revenue: TokenAmount,
}

impl TopicWeights {
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn topic_ids(&self) -> impl Iterator<Item = TopicId> + '_ {
        self.weights.keys().copied()
    }
}

/// Active topics whose current epoch has ended, in ascending id order.
pub fn reward_ready_topics<S: Store + ?Sized>(
    store: &S,
    block_height: BlockHeight,
) -> Result<Vec<Topic>> {
    let mut ready = Vec::new();
    for topic_id in store.active_topic_ids()? {
        let topic = store.get_topic(topic_id)?;
        if topic.is_reward_ready(block_height) {
            ready.push(topic);
        }
    }
    Ok(ready)
}

/// Compute and store the weight of every reward-ready topic.
pub fn compute_topic_weights<S, W>(
    store: &mut S,
    weight_fn: &W,
    params: &ModuleParams,
    block_height: BlockHeight,
) -> Result<TopicWeights>
where
    S: Store + ?Sized,
    W: TopicWeightFn + ?Sized,
{
    let mut result = TopicWeights::default();

    for mut topic in reward_ready_topics(store, block_height)? {
        let stake = store.topic_stake(topic.id)?;
        let revenue = store.topic_fee_revenue(topic.id)?.revenue;
        let weight = weight_fn.topic_weight(params, stake, revenue)?;

        // Persisted so the next churn can rank topics
        topic.weight = weight;
        store.set_topic(&topic)?;

        debug!(
            topic_id = topic.id,
            stake = stake.to_base_units(),
            revenue = revenue.to_base_units(),
            weight = %weight,
            "⚖️ Topic weight computed"
        );

        result.sum_weight = math::add(result.sum_weight, weight)?;
        result.sum_revenue = result
            .sum_revenue
            .checked_add(revenue)
            .ok_or(MathError::Overflow("revenue sum"))?;
        result.weights.insert(topic.id, weight);
        result.revenues.insert(topic.id, revenue);
    }

    Ok(result)
}

/// Inactivate every topic weighted below `min_weight` and take it out of the
/// sums. Its fee revenue is read for the sums, then reset.
pub fn inactivate_topics_and_update_sums<S: Store + ?Sized>(
    store: &mut S,
    weights: TopicWeights,
    min_weight: Decimal,
    block_height: BlockHeight,
) -> Result<TopicWeights> {
    let TopicWeights {
        weights,
        mut revenues,
        mut sum_weight,
        mut sum_revenue,
    } = weights;

    let mut kept = BTreeMap::new();
    for (topic_id, weight) in weights {
        if weight >= min_weight {
            kept.insert(topic_id, weight);
            continue;
        }

        let mut topic = store.get_topic(topic_id)?;
        topic.active = false;
        store.set_topic(&topic)?;

        // Drop it from the sums before its revenue is reset
        let revenue = store.topic_fee_revenue(topic_id)?.revenue;
        sum_weight = math::sub(sum_weight, weight)?;
        sum_revenue = sum_revenue.saturating_sub(revenue);
        store.reset_topic_fee_revenue(topic_id, block_height)?;
        revenues.remove(&topic_id);

        info!(
            topic_id,
            weight = %weight,
            min_weight = %min_weight,
            revenue = revenue.to_base_units(),
            "💤 Topic inactivated below minimum weight"
        );
    }

    Ok(TopicWeights {
        weights: kept,
        revenues,
        sum_weight,
        sum_revenue,
    })
}
