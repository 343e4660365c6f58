//! Error taxonomy shared by the source adapter, the aggregators and the reducer.

use serde::{Deserialize, Serialize};

/// Failures surfaced to the view. Results travel inside actions, so the
/// error is plain data: cloneable, comparable and serializable.
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DexError {
    /// The identifier, name or locator did not resolve upstream.
    #[error("not found: {0}")]
    NotFound(String),
    /// Network or transport failure; the request may succeed if repeated.
    #[error("fetch failed: {0}")]
    TransientFetchError(String),
    /// The compare selector already holds this record.
    #[error("{0} is already selected for comparison")]
    DuplicateSelection(String),
    /// One leg of a multi-fetch pipeline failed, so the whole view is dropped.
    #[error("could not load {stage}: {cause}")]
    IncompleteAggregation { stage: String, cause: Box<DexError> },
}

impl DexError {
    pub fn incomplete(stage: impl Into<String>, cause: DexError) -> Self {
        DexError::IncompleteAggregation {
            stage: stage.into(),
            cause: Box::new(cause),
        }
    }

    /// The innermost adapter error behind any aggregation wrappers.
    pub fn root_cause(&self) -> &DexError {
        match self {
            DexError::IncompleteAggregation { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root_cause(), DexError::NotFound(_))
    }
}

pub type DexResult<T> = Result<T, DexError>;
