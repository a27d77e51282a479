use thiserror::Error;

use crate::store::StoreError;

/// Failure classes surfaced by the quiz driver. NotFound and Validation never
/// mutate state; Persistence means the turn stopped before progress advanced.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),
}
