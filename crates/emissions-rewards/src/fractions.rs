use crate::error::Result;
use crate::math;
use emissions_storage::Store;
use emissions_types::{AccountAddress, Decimal, ParticipantScore, TaskRewardKind, TopicId};
use std::collections::BTreeMap;
use tracing::debug;

/// Share of a cohort's task reward per participant, keyed by address.
pub type RewardFractions = BTreeMap<AccountAddress, Decimal>;

/// Map raw scores to reward fractions.
///
/// Scores are standardized against the cohort, passed through softplus and
/// raised to `spread`, then normalized so the fractions sum to one. A cohort
/// whose scores all map to zero is paid uniformly.
pub fn reward_fractions_from_scores(
    scores: &[ParticipantScore],
    spread: Decimal,
) -> Result<RewardFractions> {
    let by_address: BTreeMap<AccountAddress, Decimal> = scores
        .iter()
        .map(|entry| (entry.address, entry.score))
        .collect();

    let n = by_address.len();
    if n == 0 {
        return Ok(RewardFractions::new());
    }
    if n == 1 {
        return Ok(by_address.into_keys().map(|a| (a, Decimal::ONE)).collect());
    }

    let count = Decimal::from(n as u64);
    let mean = math::div(math::sum(by_address.values().copied())?, count)?;
    let mut squared = Vec::with_capacity(n);
    for score in by_address.values() {
        let deviation = math::sub(*score, mean)?;
        squared.push(math::mul(deviation, deviation)?);
    }
    let std_dev = math::sqrt(math::div(math::sum(squared)?, count)?)?;

    let mut mapped = BTreeMap::new();
    for (address, score) in &by_address {
        let standardized = if std_dev.is_zero() {
            Decimal::ZERO
        } else {
            math::div(math::sub(*score, mean)?, std_dev)?
        };
        let weight = math::pow(math::softplus(standardized)?, spread)?;
        mapped.insert(*address, weight);
    }

    let total = math::sum(mapped.values().copied())?;
    if total.is_zero() {
        let uniform = math::div(Decimal::ONE, count)?;
        return Ok(mapped.into_keys().map(|a| (a, uniform)).collect());
    }

    let mut fractions = RewardFractions::new();
    for (address, weight) in mapped {
        fractions.insert(address, math::div(weight, total)?);
    }
    Ok(fractions)
}

/// `alpha * current + (1 - alpha) * previous`, participant by participant.
/// A participant with no history starts from its current fraction.
pub fn smooth_fractions(
    current: &RewardFractions,
    previous: &BTreeMap<AccountAddress, Decimal>,
    alpha: Decimal,
) -> Result<RewardFractions> {
    let keep = math::sub(Decimal::ONE, alpha)?;
    let mut smoothed = RewardFractions::new();
    for (address, fraction) in current {
        let value = match previous.get(address) {
            Some(prev) => math::add(math::mul(alpha, *fraction)?, math::mul(keep, *prev)?)?,
            None => *fraction,
        };
        smoothed.insert(*address, value);
    }
    Ok(smoothed)
}

/// Smoothed fractions stored at the last settlement for the given participants.
pub fn load_previous_fractions<S: Store + ?Sized>(
    store: &S,
    topic_id: TopicId,
    kind: TaskRewardKind,
    participants: &RewardFractions,
) -> Result<BTreeMap<AccountAddress, Decimal>> {
    let mut previous = BTreeMap::new();
    for address in participants.keys() {
        if let Some(value) = store.previous_reward_fraction(topic_id, kind, address)? {
            previous.insert(*address, value);
        }
    }
    Ok(previous)
}

pub fn store_smoothed_fractions<S: Store + ?Sized>(
    store: &mut S,
    topic_id: TopicId,
    kind: TaskRewardKind,
    smoothed: &RewardFractions,
) -> Result<()> {
    for (address, value) in smoothed {
        store.set_previous_reward_fraction(topic_id, kind, address, *value)?;
    }
    debug!(
        topic_id,
        kind = %kind,
        participants = smoothed.len(),
        "Smoothed reward fractions stored"
    );
    Ok(())
}
