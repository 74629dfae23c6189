use crate::backend::{PruneStats, Result, StorageError, Store};
use emissions_types::{
    AccountAddress, BlockHeight, Decimal, LossBundle, ModuleParams, Nonces, ParticipantScore,
    ReputerRequestNonce, ReputerRequestNonces, TaskRewardKind, TokenAmount, Topic,
    TopicFeeRevenue, TopicId, WireMessage,
};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

type FractionKey = (TopicId, TaskRewardKind, AccountAddress);
type ScoreKey = (TopicId, BlockHeight, TaskRewardKind);

/// In-memory store for testing and development.
///
/// Outstanding nonce sets are kept in their encoded wire form, the same
/// representation a persistent backend writes to disk.
#[derive(Default)]
pub struct MemoryStore {
    total_reward: Option<TokenAmount>,
    params: Option<ModuleParams>,
    topics: BTreeMap<TopicId, Topic>,
    stakes: BTreeMap<TopicId, TokenAmount>,
    fee_revenue: BTreeMap<TopicId, TopicFeeRevenue>,
    churn_ready: BTreeSet<TopicId>,
    reward_nonces: BTreeMap<TopicId, BlockHeight>,
    reputer_nonces: BTreeMap<TopicId, Vec<u8>>,
    worker_nonces: BTreeMap<TopicId, Vec<u8>>,
    loss_bundles: BTreeMap<(TopicId, BlockHeight), LossBundle>,
    scores: BTreeMap<ScoreKey, Vec<ParticipantScore>>,
    previous_fractions: BTreeMap<FractionKey, Decimal>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_total_reward(&mut self, amount: TokenAmount) {
        self.total_reward = Some(amount);
    }

    pub fn set_params(&mut self, params: ModuleParams) {
        self.params = Some(params);
    }

    pub fn insert_topic(&mut self, topic: Topic) {
        self.topics.insert(topic.id, topic);
    }

    pub fn set_topic_stake(&mut self, topic_id: TopicId, stake: TokenAmount) {
        self.stakes.insert(topic_id, stake);
    }

    /// Accrue request fees paid into a topic
    pub fn add_topic_fee_revenue(&mut self, topic_id: TopicId, amount: TokenAmount) {
        let entry = self.fee_revenue.entry(topic_id).or_default();
        entry.revenue = entry.revenue.saturating_add(amount);
    }

    pub fn set_topic_reward_nonce(&mut self, topic_id: TopicId, block_height: BlockHeight) {
        self.reward_nonces.insert(topic_id, block_height);
    }

    pub fn add_unfulfilled_reputer_nonce(
        &mut self,
        topic_id: TopicId,
        nonce: ReputerRequestNonce,
    ) -> Result<()> {
        let mut nonces = self.unfulfilled_reputer_nonces(topic_id)?;
        nonces.nonces.push(nonce);
        self.reputer_nonces
            .insert(topic_id, nonces.to_wire_bytes());
        Ok(())
    }

    pub fn set_unfulfilled_worker_nonces(&mut self, topic_id: TopicId, nonces: &Nonces) {
        self.worker_nonces.insert(topic_id, nonces.to_wire_bytes());
    }

    pub fn unfulfilled_worker_nonces(&self, topic_id: TopicId) -> Result<Nonces> {
        match self.worker_nonces.get(&topic_id) {
            Some(bytes) => Ok(Nonces::from_wire_bytes(bytes)?),
            None => Ok(Nonces::default()),
        }
    }

    /// Overwrite the raw encoded reputer nonce set; used to simulate corrupt state
    pub fn set_raw_reputer_nonces(&mut self, topic_id: TopicId, bytes: Vec<u8>) {
        self.reputer_nonces.insert(topic_id, bytes);
    }

    pub fn set_loss_bundle(
        &mut self,
        topic_id: TopicId,
        block_height: BlockHeight,
        bundle: LossBundle,
    ) {
        self.loss_bundles.insert((topic_id, block_height), bundle);
    }

    pub fn set_scores(
        &mut self,
        topic_id: TopicId,
        block_height: BlockHeight,
        kind: TaskRewardKind,
        scores: Vec<ParticipantScore>,
    ) {
        self.scores.insert((topic_id, block_height, kind), scores);
    }

    pub fn is_churn_ready(&self, topic_id: TopicId) -> bool {
        self.churn_ready.contains(&topic_id)
    }

    /// Heights that still hold a loss bundle for the topic
    pub fn loss_bundle_heights(&self, topic_id: TopicId) -> Vec<BlockHeight> {
        self.loss_bundles
            .range((topic_id, BlockHeight::MIN)..=(topic_id, BlockHeight::MAX))
            .map(|((_, height), _)| *height)
            .collect()
    }

    /// Heights that still hold at least one score set for the topic
    pub fn score_heights(&self, topic_id: TopicId) -> Vec<BlockHeight> {
        let heights: BTreeSet<BlockHeight> = self
            .scores
            .keys()
            .filter(|(id, _, _)| *id == topic_id)
            .map(|(_, height, _)| *height)
            .collect();
        heights.into_iter().collect()
    }
}

impl Store for MemoryStore {
    fn total_reward_to_distribute(&self) -> Result<TokenAmount> {
        self.total_reward
            .ok_or_else(|| StorageError::NotFound("total reward to distribute".to_string()))
    }

    fn params(&self) -> Result<ModuleParams> {
        self.params
            .clone()
            .ok_or_else(|| StorageError::NotFound("module params".to_string()))
    }

    fn active_topic_ids(&self) -> Result<Vec<TopicId>> {
        Ok(self
            .topics
            .values()
            .filter(|topic| topic.active)
            .map(|topic| topic.id)
            .collect())
    }

    fn get_topic(&self, topic_id: TopicId) -> Result<Topic> {
        self.topics
            .get(&topic_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("topic {}", topic_id)))
    }

    fn set_topic(&mut self, topic: &Topic) -> Result<()> {
        if let Some(old) = self.topics.get(&topic.id) {
            if old.active != topic.active {
                info!(
                    topic_id = topic.id,
                    active_before = old.active,
                    active_after = topic.active,
                    storage_type = "memory",
                    "🔄 Topic activation changed"
                );
            }
        }
        self.topics.insert(topic.id, topic.clone());
        Ok(())
    }

    fn topic_stake(&self, topic_id: TopicId) -> Result<TokenAmount> {
        Ok(self.stakes.get(&topic_id).copied().unwrap_or_default())
    }

    fn topic_fee_revenue(&self, topic_id: TopicId) -> Result<TopicFeeRevenue> {
        Ok(self.fee_revenue.get(&topic_id).copied().unwrap_or_default())
    }

    fn reset_topic_fee_revenue(
        &mut self,
        topic_id: TopicId,
        block_height: BlockHeight,
    ) -> Result<()> {
        let previous = self.fee_revenue.insert(
            topic_id,
            TopicFeeRevenue {
                epoch: block_height,
                revenue: TokenAmount::ZERO,
            },
        );
        debug!(
            topic_id,
            block_height,
            revenue_before = previous.map(|r| r.revenue.to_base_units()).unwrap_or(0),
            storage_type = "memory",
            "Topic fee revenue reset"
        );
        Ok(())
    }

    fn add_churn_ready_topic(&mut self, topic_id: TopicId) -> Result<()> {
        self.churn_ready.insert(topic_id);
        Ok(())
    }

    fn topic_reward_nonce(&self, topic_id: TopicId) -> Result<Option<BlockHeight>> {
        Ok(self
            .reward_nonces
            .get(&topic_id)
            .copied()
            .filter(|height| *height != 0))
    }

    fn delete_topic_reward_nonce(&mut self, topic_id: TopicId) -> Result<()> {
        self.reward_nonces.remove(&topic_id);
        Ok(())
    }

    fn unfulfilled_reputer_nonces(&self, topic_id: TopicId) -> Result<ReputerRequestNonces> {
        match self.reputer_nonces.get(&topic_id) {
            Some(bytes) => Ok(ReputerRequestNonces::from_wire_bytes(bytes)?),
            None => Ok(ReputerRequestNonces::default()),
        }
    }

    fn network_loss_bundle(
        &self,
        topic_id: TopicId,
        block_height: BlockHeight,
    ) -> Result<Option<LossBundle>> {
        Ok(self.loss_bundles.get(&(topic_id, block_height)).copied())
    }

    fn scores(
        &self,
        topic_id: TopicId,
        block_height: BlockHeight,
        kind: TaskRewardKind,
    ) -> Result<Vec<ParticipantScore>> {
        Ok(self
            .scores
            .get(&(topic_id, block_height, kind))
            .cloned()
            .unwrap_or_default())
    }

    fn previous_reward_fraction(
        &self,
        topic_id: TopicId,
        kind: TaskRewardKind,
        address: &AccountAddress,
    ) -> Result<Option<Decimal>> {
        Ok(self
            .previous_fractions
            .get(&(topic_id, kind, *address))
            .copied())
    }

    fn set_previous_reward_fraction(
        &mut self,
        topic_id: TopicId,
        kind: TaskRewardKind,
        address: &AccountAddress,
        fraction: Decimal,
    ) -> Result<()> {
        self.previous_fractions
            .insert((topic_id, kind, *address), fraction);
        Ok(())
    }

    fn prune_records_before(
        &mut self,
        topic_id: TopicId,
        floor: BlockHeight,
    ) -> Result<PruneStats> {
        let before_bundles = self.loss_bundles.len();
        self.loss_bundles
            .retain(|(id, height), _| *id != topic_id || *height >= floor);

        let before_scores = self.scores.len();
        self.scores
            .retain(|(id, height, _), _| *id != topic_id || *height >= floor);

        let stats = PruneStats {
            loss_bundles: before_bundles - self.loss_bundles.len(),
            score_sets: before_scores - self.scores.len(),
        };

        info!(
            topic_id,
            floor,
            loss_bundles_removed = stats.loss_bundles,
            score_sets_removed = stats.score_sets,
            storage_type = "memory",
            "🧹 Records pruned"
        );
        Ok(stats)
    }
}
