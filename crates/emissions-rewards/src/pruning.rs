use crate::error::Result;
use emissions_storage::{PruneStats, Store};
use emissions_types::{BlockHeight, TopicId};
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Records below this height were deleted
    pub floor: BlockHeight,
    pub stats: PruneStats,
}

/// Height below which records are no longer needed: `record_limit` epochs
/// behind the oldest reputer request still open, or behind the settled
/// nonce when no request is open.
pub fn prune_floor(
    oldest_open: Option<BlockHeight>,
    settled_nonce: BlockHeight,
    record_limit: i64,
    epoch_length: BlockHeight,
) -> BlockHeight {
    let oldest = oldest_open.unwrap_or(settled_nonce);
    oldest.saturating_sub(record_limit.saturating_mul(epoch_length))
}

/// Clear the settled reward nonce and delete per-nonce records that no open
/// request can still reference.
pub fn prune_settled_records<S: Store + ?Sized>(
    store: &mut S,
    topic_id: TopicId,
    settled_nonce: BlockHeight,
    record_limit: i64,
) -> Result<PruneOutcome> {
    store.delete_topic_reward_nonce(topic_id)?;

    let topic = store.get_topic(topic_id)?;
    let oldest_open = store
        .unfulfilled_reputer_nonces(topic_id)?
        .oldest_reputer_height();
    let floor = prune_floor(oldest_open, settled_nonce, record_limit, topic.epoch_length);
    let stats = store.prune_records_before(topic_id, floor)?;

    info!(
        topic_id,
        settled_nonce,
        oldest_open = ?oldest_open,
        floor,
        removed = stats.total(),
        "🧹 Settled records pruned"
    );
    Ok(PruneOutcome { floor, stats })
}
