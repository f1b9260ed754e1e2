use thiserror::Error;

/// Failures raised at the storage boundary that callers may want to match on.
///
/// Repository traits return `anyhow::Result`, so callers recover these with
/// `err.downcast_ref::<RepositoryError>()`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("unknown {kind} value in storage: {value:?}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl RepositoryError {
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        matches!(
            err.downcast_ref::<RepositoryError>(),
            Some(RepositoryError::NotFound)
        ) || matches!(
            err.downcast_ref::<diesel::result::Error>(),
            Some(diesel::result::Error::NotFound)
        )
    }
}
