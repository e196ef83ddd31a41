use std::fmt;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockUpgradableReadGuard};
use tracing::{debug, trace};

use crate::centroid::ClusterCentroid;
use crate::config::IndexConfig;
use crate::distance::{Distance, SquaredEuclidean};
use crate::error::{CentroidError, Result};
use crate::schema::InputSchema;

/// Result of a nearest-centroid query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest {
    /// Id of the closest cluster.
    pub id: usize,

    /// Distance from the query to that cluster's center under the
    /// index's metric. Finite and non-negative.
    pub distance: f64,
}

/// Serves nearest-centroid queries over a fixed set of clusters whose
/// centers may be replaced one at a time while queries run.
///
/// Each cluster lives in its own slot holding an `Arc` to an immutable
/// [`ClusterCentroid`]. Readers clone the `Arc` under a short read lock and
/// compute outside it; writers build the replacement first and then swap
/// the `Arc` in. A reader therefore sees either the old or the new centroid
/// in full, replacements on distinct ids never contend, and replacements on
/// the same id are totally ordered.
///
/// A single [`nearest`](Self::nearest) scan reads each slot once; slots
/// replaced during the scan may be seen before or after their update.
///
/// Thread-safe: all methods can be called concurrently.
pub struct ClusterIndex {
    slots: Box<[RwLock<Arc<ClusterCentroid>>]>,
    schema: Arc<InputSchema>,
    distance: Arc<dyn Distance>,
}

impl ClusterIndex {
    /// Creates an index over `centroids` using squared Euclidean distance.
    ///
    /// Centroid ids must equal their positions and every center must have
    /// the schema's dimensionality.
    pub fn new(centroids: Vec<ClusterCentroid>, schema: Arc<InputSchema>) -> Result<Self> {
        Self::with_distance(centroids, schema, Arc::new(SquaredEuclidean))
    }

    /// Creates an index with the metric selected by `cfg`.
    pub fn with_config(
        centroids: Vec<ClusterCentroid>,
        schema: Arc<InputSchema>,
        cfg: &IndexConfig,
    ) -> Result<Self> {
        Self::with_distance(centroids, schema, cfg.metric.distance())
    }

    /// Creates an index with a caller-supplied metric.
    pub fn with_distance(
        centroids: Vec<ClusterCentroid>,
        schema: Arc<InputSchema>,
        distance: Arc<dyn Distance>,
    ) -> Result<Self> {
        let first_dim = match centroids.first() {
            Some(c) => c.dim(),
            None => {
                return Err(CentroidError::InvalidArgument(
                    "no initial centroids".into(),
                ));
            }
        };
        for (i, c) in centroids.iter().enumerate() {
            if c.id() != i {
                return Err(CentroidError::InvalidArgument(format!(
                    "centroid at position {i} has id {}",
                    c.id()
                )));
            }
            if c.dim() != first_dim {
                return Err(CentroidError::InvalidArgument(format!(
                    "centroid {i} has dimension {}, centroid 0 has {first_dim}",
                    c.dim()
                )));
            }
        }
        if first_dim != schema.dim() {
            return Err(CentroidError::DimensionMismatch {
                expected: schema.dim(),
                got: first_dim,
            });
        }

        debug!(
            "cluster index built: {} clusters, dim {}, metric {}",
            centroids.len(),
            first_dim,
            distance.name()
        );

        Ok(Self {
            slots: centroids
                .into_iter()
                .map(|c| RwLock::new(Arc::new(c)))
                .collect(),
            schema,
            distance,
        })
    }

    /// Creates an index with no clusters, for serving before a model is
    /// available. Every [`nearest`](Self::nearest) fails with
    /// [`CentroidError::EmptyIndex`].
    pub fn empty(schema: Arc<InputSchema>) -> Self {
        Self {
            slots: Vec::new().into_boxed_slice(),
            schema,
            distance: Arc::new(SquaredEuclidean),
        }
    }

    /// Number of clusters. Constant for the index's lifetime.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Dimensionality every center and query must have.
    pub fn dim(&self) -> usize {
        self.schema.dim()
    }

    pub fn schema(&self) -> &Arc<InputSchema> {
        &self.schema
    }

    pub fn distance(&self) -> &dyn Distance {
        self.distance.as_ref()
    }

    fn slot(&self, id: usize) -> Result<&RwLock<Arc<ClusterCentroid>>> {
        self.slots.get(id).ok_or(CentroidError::OutOfRange {
            id,
            size: self.slots.len(),
        })
    }

    fn check_dim(&self, got: usize) -> Result<()> {
        let expected = self.schema.dim();
        if got != expected {
            return Err(CentroidError::DimensionMismatch { expected, got });
        }
        Ok(())
    }

    /// Returns a snapshot of the centroid at `id`.
    ///
    /// The snapshot stays valid (and unchanged) after later replacements.
    pub fn get(&self, id: usize) -> Result<Arc<ClusterCentroid>> {
        Ok(Arc::clone(&*self.slot(id)?.read()))
    }

    /// Returns a snapshot of every centroid in id order.
    pub fn centroids(&self) -> Vec<Arc<ClusterCentroid>> {
        self.slots.iter().map(|s| Arc::clone(&*s.read())).collect()
    }

    /// Finds the cluster whose center is closest to `vector`.
    ///
    /// Full linear scan. Ties go to the lowest id. Fails with
    /// [`CentroidError::InvalidResult`] if any distance is NaN or negative,
    /// or the minimum is infinite, which means a malformed center or metric.
    pub fn nearest(&self, vector: &[f64]) -> Result<Nearest> {
        if self.slots.is_empty() {
            return Err(CentroidError::EmptyIndex);
        }
        self.check_dim(vector.len())?;

        let mut best: Option<Nearest> = None;
        for (id, slot) in self.slots.iter().enumerate() {
            let c = Arc::clone(&*slot.read());
            let distance = self.distance.distance(c.center(), vector);
            if distance.is_nan() || distance < 0.0 {
                return Err(CentroidError::InvalidResult { distance });
            }
            if best.is_none_or(|b| distance < b.distance) {
                best = Some(Nearest { id, distance });
            }
        }

        match best {
            Some(b) if b.distance.is_finite() => Ok(b),
            Some(b) => Err(CentroidError::InvalidResult {
                distance: b.distance,
            }),
            None => Err(CentroidError::EmptyIndex),
        }
    }

    /// Replaces the centroid at `id` with a new one built from `center`
    /// and `count`.
    ///
    /// On error the index is unchanged.
    pub fn replace(&self, id: usize, center: Vec<f64>, count: u64) -> Result<()> {
        let slot = self.slot(id)?;
        self.check_dim(center.len())?;

        let next = Arc::new(ClusterCentroid::new(id, center, count));
        let prev = std::mem::replace(&mut *slot.write(), next);
        trace!("cluster {} replaced: count {} -> {}", id, prev.count(), count);
        Ok(())
    }

    /// Folds `count` observations located at `point` into cluster `id`:
    /// the new center is the count-weighted mean of the current center and
    /// `point`, and the count grows by `count`.
    ///
    /// Concurrent `absorb`/`replace` calls on the same id are serialized,
    /// so no update is lost. Readers are not blocked while the new center
    /// is computed. Returns the centroid now published at `id`.
    pub fn absorb(&self, id: usize, point: &[f64], count: u64) -> Result<Arc<ClusterCentroid>> {
        let slot = self.slot(id)?;
        self.check_dim(point.len())?;

        let guard = slot.upgradable_read();
        if count == 0 {
            return Ok(Arc::clone(&*guard));
        }
        let next = Arc::new(guard.merged(point, count));
        let mut guard = RwLockUpgradableReadGuard::upgrade(guard);
        let prev = std::mem::replace(&mut *guard, Arc::clone(&next));
        drop(guard);

        trace!(
            "cluster {} absorbed {} points: count {} -> {}",
            id,
            count,
            prev.count(),
            next.count()
        );
        Ok(next)
    }
}

impl fmt::Display for ClusterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClusterIndex[clusters:{}]", self.slots.len())
    }
}

impl fmt::Debug for ClusterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterIndex")
            .field("clusters", &self.slots.len())
            .field("dim", &self.schema.dim())
            .field("metric", &self.distance.name())
            .finish()
    }
}
