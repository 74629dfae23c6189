use crate::error::Result;
use emissions_storage::Ledger;
use emissions_types::{ModuleAccount, TaskReward, TaskRewardKind, TokenAmount};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayoutSummary {
    pub paid: usize,
    pub skipped_zero: usize,
    pub total_paid: TokenAmount,
}

/// Move each reward out of the rewards account.
///
/// Reputer rewards are restaked in the topic; worker rewards go to the
/// worker's account. Payouts stop at the first ledger failure and payouts
/// already made stay in place.
pub fn pay_rewards<L: Ledger + ?Sized>(ledger: &mut L, rewards: &[TaskReward]) -> Result<PayoutSummary> {
    let mut summary = PayoutSummary::default();

    for reward in rewards {
        if reward.reward.is_zero() {
            summary.skipped_zero += 1;
            continue;
        }

        match reward.kind {
            TaskRewardKind::Reputer => {
                ledger.send_module_to_module(
                    ModuleAccount::Rewards,
                    ModuleAccount::Staking,
                    reward.reward,
                )?;
                ledger.add_stake(reward.topic_id, &reward.address, reward.reward)?;
            }
            TaskRewardKind::InferenceWorker | TaskRewardKind::ForecastWorker => {
                ledger.send_module_to_account(
                    ModuleAccount::Rewards,
                    &reward.address,
                    reward.reward,
                )?;
            }
        }

        debug!(
            topic_id = reward.topic_id,
            address = %reward.address,
            kind = %reward.kind,
            amount = reward.reward.to_base_units(),
            "💰 Reward paid"
        );
        summary.paid += 1;
        summary.total_paid = summary.total_paid.saturating_add(reward.reward);
    }

    info!(
        paid = summary.paid,
        skipped_zero = summary.skipped_zero,
        total_paid = summary.total_paid.to_base_units(),
        "✅ Payouts complete"
    );
    Ok(summary)
}
