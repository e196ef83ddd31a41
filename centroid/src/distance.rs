/// A distance metric between two equal-length vectors.
///
/// Implementations must be symmetric, non-negative and zero for identical
/// inputs. The index only compares distances, so a metric may skip any
/// monotonic transform (e.g. a square root) that does not change ordering.
///
/// Implementations must be safe for concurrent use.
pub trait Distance: Send + Sync {
    /// Distance between `a` and `b`. Callers pass slices of equal length.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64;

    /// Name of the metric (for logs and config).
    fn name(&self) -> &'static str;
}

/// Sum of squared coordinate differences. No square root is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredEuclidean;

impl Distance for SquaredEuclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| {
                let d = x - y;
                d * d
            })
            .sum()
    }

    fn name(&self) -> &'static str {
        "squared_euclidean"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl Distance for Euclidean {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        SquaredEuclidean.distance(a, b).sqrt()
    }

    fn name(&self) -> &'static str {
        "euclidean"
    }
}

/// Cosine distance: 1 - cosine similarity, in `[0, 2]`.
///
/// A zero vector has no direction; its distance to anything is 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cosine;

impl Distance for Cosine {
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        let mut dot = 0.0;
        let mut na = 0.0;
        let mut nb = 0.0;
        for (x, y) in a.iter().zip(b) {
            dot += x * y;
            na += x * x;
            nb += y * y;
        }
        let denom = na.sqrt() * nb.sqrt();
        if denom == 0.0 {
            return 1.0;
        }
        // Clamp to [-1, 1] to absorb rounding.
        1.0 - (dot / denom).clamp(-1.0, 1.0)
    }

    fn name(&self) -> &'static str {
        "cosine"
    }
}
