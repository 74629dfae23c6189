use emissions_storage::{LedgerError, StorageError};
use emissions_types::{BlockHeight, ParamsError, TopicId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RewardsError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("Decimal overflow in {0}")]
    Overflow(&'static str),

    #[error("Division by zero in {0}")]
    DivisionByZero(&'static str),

    #[error("Logarithm of non-positive value in {0}")]
    NonPositiveLogarithm(&'static str),

    #[error("Negative base raised to a fractional power in {0}")]
    NegativeBase(&'static str),
}

#[derive(Debug, Error)]
pub enum RewardsError {
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("Invalid module params: {0}")]
    Params(#[from] ParamsError),

    #[error("Loss bundle missing for topic {topic_id} at block {block_height}")]
    MissingLossBundle {
        topic_id: TopicId,
        block_height: BlockHeight,
    },

    #[error("Invalid loss bundle: {reason}")]
    InvalidLossBundle { reason: String },

    #[error("Topic {0} has no participants in any cohort")]
    NoParticipants(TopicId),

    #[error("Revenue accounting mismatch: returned {returned} exceeds collected {collected}")]
    RevenueMismatch { returned: u64, collected: u64 },
}
