use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::distance::{Cosine, Distance, Euclidean, SquaredEuclidean};
use crate::error::Result;

/// Distance metric used for nearest-centroid queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    SquaredEuclidean,
    Euclidean,
    Cosine,
}

impl Metric {
    pub fn distance(self) -> Arc<dyn Distance> {
        match self {
            Metric::SquaredEuclidean => Arc::new(SquaredEuclidean),
            Metric::Euclidean => Arc::new(Euclidean),
            Metric::Cosine => Arc::new(Cosine),
        }
    }
}

/// Controls index behavior.
///
/// ```
/// use giztoy_centroid::{IndexConfig, Metric};
///
/// let cfg = IndexConfig::from_json(r#"{"metric":"cosine"}"#).unwrap();
/// assert_eq!(cfg.metric, Metric::Cosine);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Default: squared Euclidean.
    #[serde(default)]
    pub metric: Metric,
}

impl IndexConfig {
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}
