use crate::entropy::{cohort_entropies, CohortEntropies};
use crate::error::{Result, RewardsError};
use crate::fractions::{
    load_previous_fractions, reward_fractions_from_scores, smooth_fractions,
    store_smoothed_fractions, RewardFractions,
};
use crate::math;
use crate::task_shares::{
    forecast_utility, split_topic_reward, task_shares, CohortSizes, TaskRewards, TaskShares,
};
use emissions_storage::Store;
use emissions_types::{
    BlockHeight, Decimal, ModuleParams, TaskReward, TaskRewardKind, TokenAmount, TopicId,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Everything decided about one topic's reward at a settled nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicDistribution {
    pub topic_id: TopicId,
    pub nonce: BlockHeight,
    pub forecast_utility: Decimal,
    pub entropies: CohortEntropies,
    pub shares: TaskShares,
    pub task_rewards: TaskRewards,
    /// Individual payouts, reputers first, each cohort ordered by address
    pub rewards: Vec<TaskReward>,
    /// Flooring residue of the per-participant split plus any unassigned
    /// task reward; stays in the rewards account
    pub dust: TokenAmount,
}

impl TopicDistribution {
    pub fn total_distributed(&self) -> TokenAmount {
        self.rewards.iter().map(|r| r.reward).sum()
    }
}

/// Split one topic's reward between its participants.
///
/// Reads the loss bundle and cohort scores recorded at `nonce`, updates the
/// smoothed reward fractions, and returns the payouts owed. Nothing is
/// written unless every step succeeds.
pub fn distribute_topic_reward<S: Store + ?Sized>(
    store: &mut S,
    params: &ModuleParams,
    topic_id: TopicId,
    nonce: BlockHeight,
    topic_reward: TokenAmount,
) -> Result<TopicDistribution> {
    // 1. Forecast utility from the nonce's loss bundle
    let bundle = store
        .network_loss_bundle(topic_id, nonce)?
        .ok_or(RewardsError::MissingLossBundle {
            topic_id,
            block_height: nonce,
        })?;
    let chi = forecast_utility(&bundle, params)?;

    // 2. Fresh fractions from this nonce's scores, smoothed against the stored ones
    let mut current: BTreeMap<TaskRewardKind, RewardFractions> = BTreeMap::new();
    let mut smoothed: BTreeMap<TaskRewardKind, RewardFractions> = BTreeMap::new();
    for kind in TaskRewardKind::ALL {
        let scores = store.scores(topic_id, nonce, kind)?;
        let fractions = reward_fractions_from_scores(&scores, params.p_reward_spread)?;
        let previous = load_previous_fractions(store, topic_id, kind, &fractions)?;
        smoothed.insert(
            kind,
            smooth_fractions(&fractions, &previous, params.task_reward_alpha)?,
        );
        current.insert(kind, fractions);
    }

    // 3. Cohort shares from entropy and forecast utility
    let cohort = |map: &BTreeMap<TaskRewardKind, RewardFractions>, kind: TaskRewardKind| {
        map.get(&kind).cloned().unwrap_or_default()
    };
    let entropies = cohort_entropies(
        &cohort(&smoothed, TaskRewardKind::InferenceWorker),
        &cohort(&smoothed, TaskRewardKind::ForecastWorker),
        &cohort(&smoothed, TaskRewardKind::Reputer),
        params.beta_entropy,
    )?;
    let sizes = CohortSizes {
        inference: cohort(&current, TaskRewardKind::InferenceWorker).len(),
        forecast: cohort(&current, TaskRewardKind::ForecastWorker).len(),
        reputer: cohort(&current, TaskRewardKind::Reputer).len(),
    };
    let shares = task_shares(topic_id, &entropies, &sizes, chi)?;
    let task_rewards = split_topic_reward(&shares, topic_reward)?;

    // 4. Per-participant payouts, floored within each cohort's pool
    let mut rewards = Vec::new();
    let mut dust = task_rewards.unassigned;
    for kind in TaskRewardKind::ALL {
        let pool = task_rewards.get(kind);
        let fractions = cohort(&current, kind);
        let mut left = pool;
        for (address, fraction) in &fractions {
            let amount =
                math::to_token_amount(math::mul(*fraction, pool.to_decimal())?)?.min(left);
            left = left.saturating_sub(amount);
            rewards.push(TaskReward {
                address: *address,
                topic_id,
                reward: amount,
                kind,
            });
        }
        dust = dust.saturating_add(left);
    }

    // 5. Persist smoothed fractions only once everything above succeeded
    for (kind, values) in &smoothed {
        store_smoothed_fractions(store, topic_id, *kind, values)?;
    }

    debug!(
        topic_id,
        nonce,
        chi = %chi,
        inference_entropy = %entropies.inference,
        forecast_entropy = %entropies.forecast,
        reputer_entropy = %entropies.reputer,
        "📊 Task shares computed"
    );
    info!(
        topic_id,
        nonce,
        topic_reward = topic_reward.to_base_units(),
        reputer_reward = task_rewards.reputer.to_base_units(),
        inference_reward = task_rewards.inference.to_base_units(),
        forecast_reward = task_rewards.forecast.to_base_units(),
        participants = rewards.len(),
        dust = dust.to_base_units(),
        "🎯 Topic reward distributed"
    );

    Ok(TopicDistribution {
        topic_id,
        nonce,
        forecast_utility: chi,
        entropies,
        shares,
        task_rewards,
        rewards,
        dust,
    })
}
