use std::fmt;

/// One cluster of the model: a stable id, its center and the number of
/// observations it summarizes.
///
/// Immutable once constructed. The index publishes centroids behind `Arc`
/// and replaces them wholesale, so a holder always sees a complete value.
/// The count is informational and never enters distance computation.
#[derive(Clone, PartialEq)]
pub struct ClusterCentroid {
    id: usize,
    center: Vec<f64>,
    count: u64,
}

impl ClusterCentroid {
    pub fn new(id: usize, center: Vec<f64>, count: u64) -> Self {
        Self { id, center, count }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn center(&self) -> &[f64] {
        &self.center
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn dim(&self) -> usize {
        self.center.len()
    }

    /// Returns a new centroid whose center is the count-weighted mean of
    /// this center and `point` (weighted by `point_count`).
    ///
    /// The caller guarantees `point.len() == self.dim()`.
    pub(crate) fn merged(&self, point: &[f64], point_count: u64) -> Self {
        let total = self.count.saturating_add(point_count);
        if total == 0 {
            return self.clone();
        }
        let w_old = self.count as f64 / total as f64;
        let w_new = point_count as f64 / total as f64;
        let center = self
            .center
            .iter()
            .zip(point)
            .map(|(c, p)| c * w_old + p * w_new)
            .collect();
        Self {
            id: self.id,
            center,
            count: total,
        }
    }
}

impl fmt::Debug for ClusterCentroid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterCentroid")
            .field("id", &self.id)
            .field("count", &self.count)
            .field("center_len", &self.center.len())
            .finish()
    }
}
