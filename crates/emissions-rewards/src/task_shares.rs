//! Split of a topic's reward between reputers, inferers and forecasters.
//!
//! Each cohort's share follows its entropy: a cohort whose rewards are spread
//! over many comparably-performing participants earns a larger slice. The
//! worker slice is further divided by the forecast utility, which measures how
//! much forecast-implied inferences improved the network loss.

use crate::entropy::CohortEntropies;
use crate::error::{Result, RewardsError};
use crate::math;
use emissions_types::{Decimal, LossBundle, ModuleParams, TaskRewardKind, TokenAmount, TopicId};

/// Forecast utility `chi` in `[0, max_forecast_utility]` from the topic's loss bundle.
pub fn forecast_utility(bundle: &LossBundle, params: &ModuleParams) -> Result<Decimal> {
    if bundle.naive_value <= Decimal::ZERO {
        return Err(RewardsError::InvalidLossBundle {
            reason: format!("naive loss {} is not positive", bundle.naive_value),
        });
    }
    if bundle.combined_value.is_sign_negative() && !bundle.combined_value.is_zero() {
        return Err(RewardsError::InvalidLossBundle {
            reason: format!("combined loss {} is negative", bundle.combined_value),
        });
    }

    let improvement = math::div(
        math::sub(bundle.naive_value, bundle.combined_value)?,
        bundle.naive_value,
    )?;
    if improvement <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let a = params.sigmoid_a;
    let b = params.sigmoid_b;
    let ceiling = params.max_forecast_utility;

    let at_zero = math::sigmoid(-math::mul(a, b)?)?;
    let at_t = math::sigmoid(math::mul(a, math::sub(improvement, b)?)?)?;
    let span = math::sub(Decimal::ONE, at_zero)?;
    if span <= Decimal::ZERO {
        return Ok(ceiling);
    }

    let scaled = math::div(math::mul(ceiling, math::sub(at_t, at_zero)?)?, span)?;
    Ok(math::clamp(scaled, Decimal::ZERO, ceiling))
}

/// Number of scored participants per cohort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CohortSizes {
    pub inference: usize,
    pub forecast: usize,
    pub reputer: usize,
}

/// Fractions of the topic reward per cohort. Together with `unassigned`
/// they sum to one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskShares {
    pub inference: Decimal,
    pub forecast: Decimal,
    pub reputer: Decimal,
    /// Worker share with no eligible cohort; stays in the rewards account
    pub unassigned: Decimal,
}

impl TaskShares {
    pub fn get(&self, kind: TaskRewardKind) -> Decimal {
        match kind {
            TaskRewardKind::Reputer => self.reputer,
            TaskRewardKind::InferenceWorker => self.inference,
            TaskRewardKind::ForecastWorker => self.forecast,
        }
    }
}

pub fn task_shares(
    topic_id: TopicId,
    entropies: &CohortEntropies,
    sizes: &CohortSizes,
    chi: Decimal,
) -> Result<TaskShares> {
    let mut entropies = *entropies;
    if entropies.sum()?.is_zero() {
        if sizes.inference == 0 && sizes.forecast == 0 && sizes.reputer == 0 {
            return Err(RewardsError::NoParticipants(topic_id));
        }
        let presence = |n: usize| if n > 0 { Decimal::ONE } else { Decimal::ZERO };
        entropies = CohortEntropies {
            inference: presence(sizes.inference),
            forecast: presence(sizes.forecast),
            reputer: presence(sizes.reputer),
        };
    }

    let total = entropies.sum()?;
    let reputer = math::div(entropies.reputer, total)?;
    let worker = math::div(math::add(entropies.inference, entropies.forecast)?, total)?;

    let weighted_inference = math::mul(math::sub(Decimal::ONE, chi)?, entropies.inference)?;
    let weighted_forecast = math::mul(chi, entropies.forecast)?;
    let denominator = math::add(weighted_inference, weighted_forecast)?;

    let (inference, forecast, unassigned) = if denominator.is_zero() {
        if sizes.inference > 0 {
            (worker, Decimal::ZERO, Decimal::ZERO)
        } else if chi > Decimal::ZERO && sizes.forecast > 0 {
            (Decimal::ZERO, worker, Decimal::ZERO)
        } else {
            // Forecasters earn nothing without a forecast utility
            (Decimal::ZERO, Decimal::ZERO, worker)
        }
    } else {
        let forecast = math::div(math::mul(worker, weighted_forecast)?, denominator)?;
        (math::sub(worker, forecast)?, forecast, Decimal::ZERO)
    };

    Ok(TaskShares {
        inference,
        forecast,
        reputer,
        unassigned,
    })
}

/// Whole-token reward per cohort for one topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskRewards {
    pub inference: TokenAmount,
    pub forecast: TokenAmount,
    pub reputer: TokenAmount,
    /// Withheld for the unassigned share
    pub unassigned: TokenAmount,
}

impl TaskRewards {
    pub fn get(&self, kind: TaskRewardKind) -> TokenAmount {
        match kind {
            TaskRewardKind::Reputer => self.reputer,
            TaskRewardKind::InferenceWorker => self.inference,
            TaskRewardKind::ForecastWorker => self.forecast,
        }
    }

    fn slot(&mut self, kind: TaskRewardKind) -> &mut TokenAmount {
        match kind {
            TaskRewardKind::Reputer => &mut self.reputer,
            TaskRewardKind::InferenceWorker => &mut self.inference,
            TaskRewardKind::ForecastWorker => &mut self.forecast,
        }
    }

    /// Cohort rewards plus the withheld amount; equals the topic reward
    pub fn total(&self) -> TokenAmount {
        [self.inference, self.forecast, self.reputer, self.unassigned]
            .iter()
            .sum()
    }
}

/// Floor each cohort's share of `topic_reward`; the flooring residue goes to
/// the cohort with the largest share so the parts add up exactly. The
/// unassigned share is withheld first and never tops up a cohort.
pub fn split_topic_reward(shares: &TaskShares, topic_reward: TokenAmount) -> Result<TaskRewards> {
    let total = topic_reward.to_decimal();
    let mut rewards = TaskRewards {
        unassigned: math::to_token_amount(math::mul(shares.unassigned, total)?)?.min(topic_reward),
        ..TaskRewards::default()
    };
    let distributable = topic_reward.saturating_sub(rewards.unassigned);

    let mut assigned = TokenAmount::ZERO;
    for kind in TaskRewardKind::ALL {
        let amount = math::to_token_amount(math::mul(shares.get(kind), total)?)?
            .min(distributable.saturating_sub(assigned));
        *rewards.slot(kind) = amount;
        assigned = assigned.saturating_add(amount);
    }

    let residue = distributable.saturating_sub(assigned);
    if !residue.is_zero() {
        let largest = TaskRewardKind::ALL
            .into_iter()
            .filter(|kind| shares.get(*kind) > Decimal::ZERO)
            .fold(None, |best: Option<TaskRewardKind>, kind| match best {
                Some(b) if shares.get(b) >= shares.get(kind) => Some(b),
                _ => Some(kind),
            });
        if let Some(kind) = largest {
            let slot = rewards.slot(kind);
            *slot = slot.saturating_add(residue);
        }
    }

    Ok(rewards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn bundle(naive: i64, combined: i64) -> LossBundle {
        LossBundle {
            naive_value: Decimal::from(naive),
            combined_value: Decimal::from(combined),
        }
    }

    fn entropies(inference: i64, forecast: i64, reputer: i64) -> CohortEntropies {
        CohortEntropies {
            inference: Decimal::new(inference, 2),
            forecast: Decimal::new(forecast, 2),
            reputer: Decimal::new(reputer, 2),
        }
    }

    fn sizes(inference: usize, forecast: usize, reputer: usize) -> CohortSizes {
        CohortSizes {
            inference,
            forecast,
            reputer,
        }
    }

    #[test]
    fn test_no_improvement_gives_zero_utility() {
        let params = ModuleParams::default();
        assert_eq!(forecast_utility(&bundle(5, 5), &params).unwrap(), Decimal::ZERO);
        assert_eq!(forecast_utility(&bundle(5, 9), &params).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_utility_grows_with_improvement_and_is_capped() {
        let params = ModuleParams::default();
        let small = forecast_utility(&bundle(100, 90), &params).unwrap();
        let large = forecast_utility(&bundle(100, 10), &params).unwrap();
        assert!(small > Decimal::ZERO);
        assert!(large > small);
        assert!(large <= params.max_forecast_utility);

        let perfect = forecast_utility(&bundle(100, 0), &params).unwrap();
        assert!(perfect <= params.max_forecast_utility);
        assert!(perfect >= large);
    }

    #[test]
    fn test_malformed_loss_bundle() {
        let params = ModuleParams::default();
        assert!(matches!(
            forecast_utility(&bundle(0, 1), &params),
            Err(RewardsError::InvalidLossBundle { .. })
        ));
        assert!(matches!(
            forecast_utility(&bundle(3, -1), &params),
            Err(RewardsError::InvalidLossBundle { .. })
        ));
    }

    #[test]
    fn test_zero_utility_gives_forecasters_nothing() {
        let shares = task_shares(1, &entropies(50, 50, 50), &sizes(3, 3, 3), Decimal::ZERO).unwrap();
        assert_eq!(shares.forecast, Decimal::ZERO);
        assert!(shares.inference > Decimal::ZERO);
    }

    #[test]
    fn test_shares_follow_entropy() {
        let shares =
            task_shares(1, &entropies(40, 0, 20), &sizes(3, 0, 3), Decimal::new(3, 1)).unwrap();
        assert_eq!(shares.forecast, Decimal::ZERO);
        let diff = (shares.inference - Decimal::from(2) * shares.reputer).abs();
        assert!(diff < Decimal::new(1, 15));
    }

    #[test]
    fn test_zero_entropy_falls_back_to_presence() {
        let shares = task_shares(1, &entropies(0, 0, 0), &sizes(1, 0, 1), Decimal::ZERO).unwrap();
        assert_eq!(shares.reputer, Decimal::new(5, 1));
        assert_eq!(shares.inference, Decimal::new(5, 1));
        assert_eq!(shares.forecast, Decimal::ZERO);

        let only_forecasters =
            task_shares(1, &entropies(0, 0, 0), &sizes(0, 2, 0), Decimal::new(2, 1)).unwrap();
        assert_eq!(only_forecasters.forecast, Decimal::ONE);
        assert_eq!(only_forecasters.unassigned, Decimal::ZERO);
    }

    #[test]
    fn test_zero_utility_withholds_forecast_share_without_inferers() {
        let shares = task_shares(1, &entropies(0, 0, 0), &sizes(0, 2, 0), Decimal::ZERO).unwrap();
        assert_eq!(shares.forecast, Decimal::ZERO);
        assert_eq!(shares.inference, Decimal::ZERO);
        assert_eq!(shares.unassigned, Decimal::ONE);

        // With reputers present the withheld part does not flow to them
        let shares =
            task_shares(1, &entropies(0, 50, 50), &sizes(0, 2, 2), Decimal::ZERO).unwrap();
        assert_eq!(shares.forecast, Decimal::ZERO);
        assert_eq!(shares.reputer, Decimal::new(5, 1));
        assert_eq!(shares.unassigned, Decimal::new(5, 1));

        let rewards = split_topic_reward(&shares, TokenAmount::from_base_units(1001)).unwrap();
        assert_eq!(rewards.forecast, TokenAmount::ZERO);
        assert_eq!(rewards.unassigned, TokenAmount::from_base_units(500));
        assert_eq!(rewards.reputer, TokenAmount::from_base_units(501));
        assert_eq!(rewards.total(), TokenAmount::from_base_units(1001));
    }

    #[test]
    fn test_empty_topic_is_an_error() {
        assert!(matches!(
            task_shares(9, &entropies(0, 0, 0), &sizes(0, 0, 0), Decimal::ZERO),
            Err(RewardsError::NoParticipants(9))
        ));
    }

    #[test]
    fn test_split_assigns_residue_to_largest_share() {
        let shares = TaskShares {
            inference: Decimal::new(5, 1),
            forecast: Decimal::ZERO,
            reputer: Decimal::new(5, 1),
            unassigned: Decimal::ZERO,
        };
        let rewards = split_topic_reward(&shares, TokenAmount::from_base_units(101)).unwrap();
        assert_eq!(rewards.total(), TokenAmount::from_base_units(101));
        assert_eq!(rewards.forecast, TokenAmount::ZERO);
        // Reputers come first among equal shares
        assert_eq!(rewards.reputer, TokenAmount::from_base_units(51));
        assert_eq!(rewards.inference, TokenAmount::from_base_units(50));
    }

    proptest! {
        /// Property: cohort rewards add up to the topic reward exactly
        #[test]
        fn prop_task_rewards_are_additive(
            f in 0i64..100, g in 0i64..100, h in 0i64..100,
            chi in 0i64..50,
            reward in 0u64..1_000_000_000_000,
        ) {
            let shares = task_shares(
                1,
                &entropies(f, g, h),
                &sizes(2, 2, 2),
                Decimal::new(chi, 2),
            ).unwrap();
            let sum = shares.inference + shares.forecast + shares.reputer + shares.unassigned;
            prop_assert!((sum - Decimal::ONE).abs() < Decimal::new(1, 15));

            let rewards =
                split_topic_reward(&shares, TokenAmount::from_base_units(reward)).unwrap();
            prop_assert_eq!(rewards.total(), TokenAmount::from_base_units(reward));
        }
    }
}
