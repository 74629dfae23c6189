use emissions_types::{
    AccountAddress, BlockHeight, Decimal, LossBundle, ModuleParams, ParticipantScore,
    ReputerRequestNonces, TaskRewardKind, TokenAmount, Topic, TopicFeeRevenue, TopicId,
    WireError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("Wire decoding error: {0}")]
    Wire(#[from] WireError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Counts of records removed by a prune.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub loss_bundles: usize,
    pub score_sets: usize,
}

impl PruneStats {
    pub fn total(&self) -> usize {
        self.loss_bundles + self.score_sets
    }
}

/// Typed access to the module state the reward engine reads and writes.
///
/// Calls are synchronous and run inside a single block transition; an error
/// is either not-found or a backend failure.
pub trait Store {
    /// Total emission available to distribute this block
    fn total_reward_to_distribute(&self) -> Result<TokenAmount>;

    fn params(&self) -> Result<ModuleParams>;

    /// Ids of active topics in ascending order
    fn active_topic_ids(&self) -> Result<Vec<TopicId>>;

    fn get_topic(&self, topic_id: TopicId) -> Result<Topic>;

    fn set_topic(&mut self, topic: &Topic) -> Result<()>;

    /// Stake currently bonded to the topic
    fn topic_stake(&self, topic_id: TopicId) -> Result<TokenAmount>;

    fn topic_fee_revenue(&self, topic_id: TopicId) -> Result<TopicFeeRevenue>;

    /// Zero the topic's fee revenue, recording the height of the reset
    fn reset_topic_fee_revenue(&mut self, topic_id: TopicId, block_height: BlockHeight)
        -> Result<()>;

    /// Flag the topic so requests go out to its workers and reputers this epoch
    fn add_churn_ready_topic(&mut self, topic_id: TopicId) -> Result<()>;

    /// Nonce awaiting reward settlement; `None` when there is nothing to settle
    fn topic_reward_nonce(&self, topic_id: TopicId) -> Result<Option<BlockHeight>>;

    fn delete_topic_reward_nonce(&mut self, topic_id: TopicId) -> Result<()>;

    fn unfulfilled_reputer_nonces(&self, topic_id: TopicId) -> Result<ReputerRequestNonces>;

    fn network_loss_bundle(
        &self,
        topic_id: TopicId,
        block_height: BlockHeight,
    ) -> Result<Option<LossBundle>>;

    /// Scores of one cohort at the given nonce
    fn scores(
        &self,
        topic_id: TopicId,
        block_height: BlockHeight,
        kind: TaskRewardKind,
    ) -> Result<Vec<ParticipantScore>>;

    /// Smoothed reward fraction carried over from the last settled epoch
    fn previous_reward_fraction(
        &self,
        topic_id: TopicId,
        kind: TaskRewardKind,
        address: &AccountAddress,
    ) -> Result<Option<Decimal>>;

    fn set_previous_reward_fraction(
        &mut self,
        topic_id: TopicId,
        kind: TaskRewardKind,
        address: &AccountAddress,
        fraction: Decimal,
    ) -> Result<()>;

    /// Delete every per-nonce record of the topic strictly older than `floor`
    fn prune_records_before(&mut self, topic_id: TopicId, floor: BlockHeight)
        -> Result<PruneStats>;
}
