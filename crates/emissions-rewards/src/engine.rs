use crate::allocation::{allocate_topic_rewards, TopicAllocation};
use crate::error::{Result, RewardsError};
use crate::participants::{distribute_topic_reward, TopicDistribution};
use crate::payout::{pay_rewards, PayoutSummary};
use crate::pruning::{prune_settled_records, PruneOutcome};
use crate::selection::skim_top_topics_by_weight_desc;
use crate::settlement::{settle_revenue, RevenueSettlement};
use crate::weights::{
    compute_topic_weights, inactivate_topics_and_update_sums, StakeFeeWeight, TopicWeightFn,
};
use emissions_storage::{Ledger, Store};
use emissions_types::{BlockHeight, Decimal, ModuleParams, TokenAmount, TopicId};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::{info, warn};

/// Step of a topic's reward pipeline at which it was abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkipStage {
    ChurnReady,
    RewardNonce,
    Distribution,
    Payout,
    Pruning,
}

impl fmt::Display for SkipStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkipStage::ChurnReady => "churn-ready",
            SkipStage::RewardNonce => "reward-nonce",
            SkipStage::Distribution => "distribution",
            SkipStage::Payout => "payout",
            SkipStage::Pruning => "pruning",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicOutcome {
    Rewarded {
        distribution: TopicDistribution,
        payout: PayoutSummary,
        prune: PruneOutcome,
    },
    /// Funded, but no nonce was waiting for settlement
    NoRewardNonce,
    Failed {
        stage: SkipStage,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicReport {
    pub topic_id: TopicId,
    pub reward: TokenAmount,
    pub outcome: TopicOutcome,
}

/// What one block's reward round did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EpochReport {
    pub block_height: BlockHeight,
    pub total_reward: TokenAmount,
    /// Reward-ready topics that were weighted
    pub weighted: Vec<TopicId>,
    pub inactivated: Vec<TopicId>,
    /// Funded topics, heaviest first
    pub selected: Vec<TopicId>,
    pub settlement: RevenueSettlement,
    pub allocation: TopicAllocation,
    /// Per-topic results in ascending topic id order
    pub topics: Vec<TopicReport>,
}

impl EpochReport {
    pub fn rewarded(&self) -> impl Iterator<Item = &TopicReport> {
        self.topics
            .iter()
            .filter(|t| matches!(t.outcome, TopicOutcome::Rewarded { .. }))
    }

    pub fn failed(&self) -> impl Iterator<Item = &TopicReport> {
        self.topics
            .iter()
            .filter(|t| matches!(t.outcome, TopicOutcome::Failed { .. }))
    }

    pub fn total_paid(&self) -> TokenAmount {
        self.topics
            .iter()
            .filter_map(|t| match &t.outcome {
                TopicOutcome::Rewarded { payout, .. } => Some(payout.total_paid),
                _ => None,
            })
            .sum()
    }

    pub fn total_dust(&self) -> TokenAmount {
        self.topics
            .iter()
            .filter_map(|t| match &t.outcome {
                TopicOutcome::Rewarded { distribution, .. } => Some(distribution.dust),
                _ => None,
            })
            .sum()
    }
}

/// Per-block emissions reward engine.
pub struct EmissionsEngine<W: TopicWeightFn = StakeFeeWeight> {
    weight_fn: W,
}

impl EmissionsEngine<StakeFeeWeight> {
    pub fn new() -> Self {
        Self {
            weight_fn: StakeFeeWeight,
        }
    }
}

impl Default for EmissionsEngine<StakeFeeWeight> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: TopicWeightFn> EmissionsEngine<W> {
    pub fn with_weight_fn(weight_fn: W) -> Self {
        Self { weight_fn }
    }

    /// Run the reward round for `block_height`.
    ///
    /// Failures before allocation abort the whole round. After allocation
    /// each topic is processed on its own: a failing topic is recorded in the
    /// report and the remaining topics still get paid.
    pub fn emit_rewards<S, L>(
        &self,
        store: &mut S,
        ledger: &mut L,
        block_height: BlockHeight,
    ) -> Result<EpochReport>
    where
        S: Store + ?Sized,
        L: Ledger + ?Sized,
    {
        // 1. Load the block's emission and validated params
        let total_reward = store.total_reward_to_distribute()?;
        let params = store.params()?;
        params.validate()?;

        // 2. Weigh reward-ready topics, then inactivate the light ones
        let weights = compute_topic_weights(store, &self.weight_fn, &params, block_height)?;
        let weighted: Vec<TopicId> = weights.topic_ids().collect();
        let weights = inactivate_topics_and_update_sums(
            store,
            weights,
            params.min_topic_weight,
            block_height,
        )?;
        let inactivated: Vec<TopicId> = weighted
            .iter()
            .copied()
            .filter(|id| !weights.weights.contains_key(id))
            .collect();

        let mut report = EpochReport {
            block_height,
            total_reward,
            weighted,
            inactivated,
            allocation: TopicAllocation {
                rewards: BTreeMap::new(),
                remainder: total_reward,
            },
            ..EpochReport::default()
        };

        if weights.sum_weight <= Decimal::ZERO {
            info!(
                block_height,
                weighted = report.weighted.len(),
                inactivated = report.inactivated.len(),
                "No topic weight to reward this block"
            );
            return Ok(report);
        }

        // 3. Fund the heaviest topics and settle everyone's fee revenue
        let cap = usize::try_from(params.max_topics_per_block).unwrap_or(usize::MAX);
        let selected = skim_top_topics_by_weight_desc(&weights.weights, cap, block_height);
        let selected_set: BTreeSet<TopicId> = selected.iter().copied().collect();

        report.settlement =
            settle_revenue(store, ledger, &weights, &selected_set, block_height)?;

        // 4. Split the emission across funded topics by weight
        let funded: BTreeMap<TopicId, Decimal> = weights
            .weights
            .iter()
            .filter(|(id, _)| selected_set.contains(id))
            .map(|(id, w)| (*id, *w))
            .collect();
        report.allocation = allocate_topic_rewards(&funded, total_reward)?;
        report.selected = selected;

        // 5. Reward each topic on its own; a failure only skips that topic
        let topic_rewards = report.allocation.rewards.clone();
        for (topic_id, reward) in topic_rewards {
            let outcome = match self.reward_topic(store, ledger, &params, topic_id, reward) {
                Ok(outcome) => outcome,
                Err((stage, err)) => {
                    warn!(
                        topic_id,
                        reward = reward.to_base_units(),
                        stage = %stage,
                        error = %err,
                        "⚠️ Topic reward skipped"
                    );
                    TopicOutcome::Failed {
                        stage,
                        reason: err.to_string(),
                    }
                }
            };
            report.topics.push(TopicReport {
                topic_id,
                reward,
                outcome,
            });
        }

        info!(
            block_height,
            total_reward = total_reward.to_base_units(),
            weighted = report.weighted.len(),
            inactivated = report.inactivated.len(),
            funded = report.selected.len(),
            rewarded = report.rewarded().count(),
            failed = report.failed().count(),
            total_paid = report.total_paid().to_base_units(),
            remainder = report.allocation.remainder.to_base_units(),
            "🏁 Block rewards emitted"
        );
        Ok(report)
    }

    fn reward_topic<S, L>(
        &self,
        store: &mut S,
        ledger: &mut L,
        params: &ModuleParams,
        topic_id: TopicId,
        reward: TokenAmount,
    ) -> std::result::Result<TopicOutcome, (SkipStage, RewardsError)>
    where
        S: Store + ?Sized,
        L: Ledger + ?Sized,
    {
        // 1. Funded topics may churn next block
        store
            .add_churn_ready_topic(topic_id)
            .map_err(|e| (SkipStage::ChurnReady, RewardsError::from(e)))?;

        // 2. Find the nonce waiting for settlement
        let nonce = match store
            .topic_reward_nonce(topic_id)
            .map_err(|e| (SkipStage::RewardNonce, RewardsError::from(e)))?
        {
            Some(nonce) => nonce,
            None => {
                info!(
                    topic_id,
                    reward = reward.to_base_units(),
                    "No reward nonce to settle"
                );
                return Ok(TopicOutcome::NoRewardNonce);
            }
        };

        // 3. Distribute, pay, then prune what the nonce settled
        let distribution = distribute_topic_reward(store, params, topic_id, nonce, reward)
            .map_err(|e| (SkipStage::Distribution, e))?;
        let payout =
            pay_rewards(ledger, &distribution.rewards).map_err(|e| (SkipStage::Payout, e))?;
        let prune = prune_settled_records(
            store,
            topic_id,
            nonce,
            params.min_epoch_length_record_limit,
        )
        .map_err(|e| (SkipStage::Pruning, e))?;

        Ok(TopicOutcome::Rewarded {
            distribution,
            payout,
            prune,
        })
    }
}
