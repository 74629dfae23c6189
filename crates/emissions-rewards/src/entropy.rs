use crate::error::Result;
use crate::fractions::RewardFractions;
use crate::math;
use emissions_types::Decimal;

/// Modified entropy of one cohort, in `[0, 1]`.
///
/// Normalized Shannon entropy of the smoothed fractions, damped by the
/// ratio of effective to actual participants raised to `beta`. Cohorts with
/// fewer than two members have zero entropy.
pub fn cohort_entropy(smoothed: &RewardFractions, beta: Decimal) -> Result<Decimal> {
    let n = smoothed.len();
    if n < 2 {
        return Ok(Decimal::ZERO);
    }

    let total = math::sum(smoothed.values().copied())?;
    if total <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }

    let mut shannon = Decimal::ZERO;
    let mut concentration = Decimal::ZERO;
    for fraction in smoothed.values() {
        let g = math::div(*fraction, total)?;
        if g <= Decimal::ZERO {
            continue;
        }
        shannon = math::sub(shannon, math::mul(g, math::ln(g)?)?)?;
        concentration = math::add(concentration, math::mul(g, g)?)?;
    }
    if concentration.is_zero() {
        return Ok(Decimal::ZERO);
    }

    let count = Decimal::from(n as u64);
    let normalized = math::div(shannon, math::ln(count)?)?;
    let effective = math::div(Decimal::ONE, concentration)?;
    let ratio = math::div(effective, count)?.min(Decimal::ONE);
    let damped = math::mul(normalized, math::pow(ratio, beta)?)?;

    Ok(math::clamp(damped, Decimal::ZERO, Decimal::ONE))
}

/// Entropies of the three cohorts of a topic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CohortEntropies {
    pub inference: Decimal,
    pub forecast: Decimal,
    pub reputer: Decimal,
}

impl CohortEntropies {
    pub fn sum(&self) -> Result<Decimal> {
        Ok(math::sum([self.inference, self.forecast, self.reputer])?)
    }
}

/// Forecasts only add value over an ensemble of inferences, so forecasting
/// entropy is zero while fewer than two inferers took part.
pub fn cohort_entropies(
    inference: &RewardFractions,
    forecast: &RewardFractions,
    reputer: &RewardFractions,
    beta: Decimal,
) -> Result<CohortEntropies> {
    let forecast_entropy = if inference.len() < 2 {
        Decimal::ZERO
    } else {
        cohort_entropy(forecast, beta)?
    };

    Ok(CohortEntropies {
        inference: cohort_entropy(inference, beta)?,
        forecast: forecast_entropy,
        reputer: cohort_entropy(reputer, beta)?,
    })
}
