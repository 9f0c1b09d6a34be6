use database::DbError;
use thiserror::Error;

/// Failures of a refresh pass, by stage. The detail string of
/// `SourceUnavailable` is human-readable and never says more than which
/// fetch or shape check failed; storage internals stay behind `Apply`.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error("External data source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Failed to apply the refresh pass to the store: {0}")]
    Apply(#[from] DbError),
}
