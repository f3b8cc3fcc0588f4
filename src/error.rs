// src/error.rs
use thiserror::Error;

/// Errors raised on the backend side of the hand contract.
///
/// Consumers querying a [`Hand`](crate::hand::Hand) never see these: missing
/// tracking data is reported through `None` / `false`.
#[derive(Debug, Error)]
pub enum HandError {
    #[error("joint index {0} is outside the hand skeleton")]
    JointIndexOutOfRange(usize),

    #[error("finger index {0} is outside the five fingers")]
    FingerIndexOutOfRange(usize),

    #[error("expected {expected} joint poses, got {actual}")]
    JointCountMismatch { expected: usize, actual: usize },

    #[error("snapshot violates invariant: {0}")]
    InvariantViolated(&'static str),

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("non-unit rotation in {0}")]
    DegenerateRotation(&'static str),

    #[error("hand scale must be finite and positive, got {0}")]
    InvalidScale(f32),
}

pub type HandResult<T> = Result<T, HandError>;
