use crate::error::{Result, RewardsError};
use crate::weights::TopicWeights;
use emissions_storage::{Ledger, Store};
use emissions_types::{BlockHeight, ModuleAccount, TokenAmount, TopicId};
use std::collections::BTreeSet;
use tracing::info;

/// Where this block's collected fee revenue went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RevenueSettlement {
    /// Revenue of active topics that were not funded; left in the requests account
    pub returned: TokenAmount,
    /// Revenue of funded topics, moved to the ecosystem account
    pub swept: TokenAmount,
}

/// Reset the fee revenue of every weighted topic and sweep the revenue of the
/// funded ones to the ecosystem account.
pub fn settle_revenue<S, L>(
    store: &mut S,
    ledger: &mut L,
    weights: &TopicWeights,
    selected: &BTreeSet<TopicId>,
    block_height: BlockHeight,
) -> Result<RevenueSettlement>
where
    S: Store + ?Sized,
    L: Ledger + ?Sized,
{
    let mut returned = TokenAmount::ZERO;
    for topic_id in weights.topic_ids() {
        if !selected.contains(&topic_id) {
            let revenue = store.topic_fee_revenue(topic_id)?.revenue;
            returned = returned.saturating_add(revenue);
        }
        store.reset_topic_fee_revenue(topic_id, block_height)?;
    }

    let swept = weights
        .sum_revenue
        .checked_sub(returned)
        .ok_or(RewardsError::RevenueMismatch {
            returned: returned.to_base_units(),
            collected: weights.sum_revenue.to_base_units(),
        })?;

    if !swept.is_zero() {
        ledger.send_module_to_module(ModuleAccount::Requests, ModuleAccount::Ecosystem, swept)?;
    }

    info!(
        block_height,
        collected = weights.sum_revenue.to_base_units(),
        returned = returned.to_base_units(),
        swept = swept.to_base_units(),
        "💸 Fee revenue settled"
    );

    Ok(RevenueSettlement { returned, swept })
}
