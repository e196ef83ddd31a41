use thiserror::Error;

/// Errors returned by cluster index operations.
///
/// All variants are caller-facing contract violations; none are retried
/// or recovered inside the index.
#[derive(Debug, Error)]
pub enum CentroidError {
    #[error("centroid: cluster id {id} out of range [0, {size})")]
    OutOfRange { id: usize, size: usize },

    #[error("centroid: dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("centroid: index has no clusters")]
    EmptyIndex,

    #[error("centroid: invalid nearest distance {distance}")]
    InvalidResult { distance: f64 },

    #[error("centroid: invalid argument: {0}")]
    InvalidArgument(String),

    #[error("centroid: config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, CentroidError>;

impl From<serde_json::Error> for CentroidError {
    fn from(e: serde_json::Error) -> Self {
        CentroidError::Config(e.to_string())
    }
}
