use crate::error::ParamsError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable pointing at a genesis params file.
pub const PARAMS_PATH_ENV: &str = "EMISSIONS_PARAMS_PATH";

/// Module parameters for the emissions reward engine.
/// These can be updated via governance; decimals serialize as strings so that
/// every node parses the exact same value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleParams {
    /// Upper bound on topics funded in a single block
    pub max_topics_per_block: u64,

    /// Topics weighted below this are inactivated
    pub min_topic_weight: Decimal,

    /// Smoothing factor applied to reward fractions across epochs
    pub task_reward_alpha: Decimal,

    /// Exponent on the effective-participant ratio in task entropy
    pub beta_entropy: Decimal,

    /// Steepness of the forecast utility sigmoid
    pub sigmoid_a: Decimal,

    /// Midpoint of the forecast utility sigmoid, in relative loss reduction
    pub sigmoid_b: Decimal,

    /// Records are kept this many epoch lengths behind the oldest open request
    pub min_epoch_length_record_limit: i64,

    /// Spread exponent used when mapping scores to reward fractions
    pub p_reward_spread: Decimal,

    /// Exponent on topic stake in the topic weight
    pub topic_reward_stake_importance: Decimal,

    /// Exponent on topic fee revenue in the topic weight
    pub topic_reward_fee_revenue_importance: Decimal,

    /// Ceiling of the forecast utility; keeps inference rewards from being displaced
    pub max_forecast_utility: Decimal,
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self {
            max_topics_per_block: 128,
            min_topic_weight: Decimal::from(100),
            task_reward_alpha: Decimal::new(1, 1),
            beta_entropy: Decimal::new(25, 2),
            sigmoid_a: Decimal::from(8),
            sigmoid_b: Decimal::new(5, 1),
            min_epoch_length_record_limit: 3,
            p_reward_spread: Decimal::ONE,
            topic_reward_stake_importance: Decimal::new(5, 1),
            topic_reward_fee_revenue_importance: Decimal::new(5, 1),
            max_forecast_utility: Decimal::new(5, 1),
        }
    }
}

impl ModuleParams {
    /// Load parameters from the given path, `EMISSIONS_PARAMS_PATH`, or
    /// `emissions_params.json`, falling back to defaults when the file is
    /// absent or invalid.
    pub fn load_from_path_or_default(path: Option<PathBuf>) -> Self {
        let param_path = path.unwrap_or_else(|| {
            std::env::var(PARAMS_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("emissions_params.json"))
        });

        if param_path.exists() {
            match Self::load_from_file(&param_path) {
                Ok(params) => {
                    info!(path = ?param_path, "✅ Loaded emissions params");
                    return params;
                }
                Err(e) => {
                    warn!(
                        path = ?param_path,
                        error = %e,
                        "⚠️ Failed to load emissions params, using defaults"
                    );
                }
            }
        }

        Self::default()
    }

    pub fn load_from_file(path: &Path) -> Result<Self, ParamsError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ParamsError> {
        let params: ModuleParams = serde_json::from_str(json)?;
        params.validate()?;
        Ok(params)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ParamsError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!(path = ?path, "💾 Emissions params saved");
        Ok(())
    }

    /// Validate parameter ranges
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.max_topics_per_block == 0 {
            return Err(invalid("max_topics_per_block", "must be > 0"));
        }
        if self.min_topic_weight.is_sign_negative() {
            return Err(invalid("min_topic_weight", "must be >= 0"));
        }
        if self.task_reward_alpha <= Decimal::ZERO || self.task_reward_alpha > Decimal::ONE {
            return Err(invalid("task_reward_alpha", "must be in (0, 1]"));
        }
        if self.beta_entropy.is_sign_negative() {
            return Err(invalid("beta_entropy", "must be >= 0"));
        }
        if self.sigmoid_a <= Decimal::ZERO {
            return Err(invalid("sigmoid_a", "must be > 0"));
        }
        if self.sigmoid_b.is_sign_negative() {
            return Err(invalid("sigmoid_b", "must be >= 0"));
        }
        if self.min_epoch_length_record_limit < 0 {
            return Err(invalid("min_epoch_length_record_limit", "must be >= 0"));
        }
        if self.p_reward_spread <= Decimal::ZERO {
            return Err(invalid("p_reward_spread", "must be > 0"));
        }
        if self.topic_reward_stake_importance.is_sign_negative() {
            return Err(invalid("topic_reward_stake_importance", "must be >= 0"));
        }
        if self.topic_reward_fee_revenue_importance.is_sign_negative() {
            return Err(invalid("topic_reward_fee_revenue_importance", "must be >= 0"));
        }
        // Keeps a topic's weight within the larger of its stake and revenue
        if self.topic_reward_stake_importance + self.topic_reward_fee_revenue_importance
            > Decimal::ONE
        {
            return Err(invalid(
                "topic_reward_fee_revenue_importance",
                "stake and fee revenue importance must sum to <= 1",
            ));
        }
        if self.max_forecast_utility.is_sign_negative() || self.max_forecast_utility >= Decimal::ONE
        {
            return Err(invalid("max_forecast_utility", "must be in [0, 1)"));
        }
        Ok(())
    }
}

fn invalid(param: &'static str, reason: &str) -> ParamsError {
    ParamsError::Invalid {
        param,
        reason: reason.to_string(),
    }
}
