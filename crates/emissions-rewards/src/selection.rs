use emissions_types::{BlockHeight, Decimal, TopicId};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

const TIEBREAK_DOMAIN: &[u8] = b"topic-tiebreak";

/// Per-block ordering key for topics of equal weight.
///
/// Depends only on the block height and topic id, so every node ranks ties
/// the same way while the order still rotates from block to block.
pub fn tiebreak_key(block_height: BlockHeight, topic_id: TopicId) -> [u8; 32] {
    let mut hasher = blake3::Hasher::new();
    hasher.update(TIEBREAK_DOMAIN);
    hasher.update(&block_height.to_le_bytes());
    hasher.update(&topic_id.to_le_bytes());
    *hasher.finalize().as_bytes()
}

/// Rank topics by weight, heaviest first, and keep the top `cap`.
pub fn skim_top_topics_by_weight_desc(
    weights: &BTreeMap<TopicId, Decimal>,
    cap: usize,
    block_height: BlockHeight,
) -> Vec<TopicId> {
    let mut ranked: Vec<(TopicId, Decimal, [u8; 32])> = weights
        .iter()
        .map(|(&id, &weight)| (id, weight, tiebreak_key(block_height, id)))
        .collect();

    ranked.sort_by(|a, b| match b.1.cmp(&a.1) {
        Ordering::Equal => a.2.cmp(&b.2).then(a.0.cmp(&b.0)),
        other => other,
    });
    ranked.truncate(cap);

    let selected: Vec<TopicId> = ranked.into_iter().map(|(id, _, _)| id).collect();
    debug!(
        candidates = weights.len(),
        cap,
        selected = selected.len(),
        block_height,
        "🎯 Top topics selected"
    );
    selected
}
