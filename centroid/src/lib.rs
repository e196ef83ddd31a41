//! Nearest-centroid index for serving a k-means model while its clusters
//! are updated online.
//!
//! Many threads may query the index while an update path replaces
//! individual cluster centers as new training results arrive.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use giztoy_centroid::{ClusterCentroid, ClusterIndex, InputSchema};
//!
//! let schema = Arc::new(InputSchema::new(["x", "y"]).unwrap());
//! let index = ClusterIndex::new(
//!     vec![
//!         ClusterCentroid::new(0, vec![0.0, 0.0], 10),
//!         ClusterCentroid::new(1, vec![10.0, 10.0], 4),
//!     ],
//!     schema,
//! )
//! .unwrap();
//!
//! let n = index.nearest(&[1.0, 1.0]).unwrap();
//! assert_eq!((n.id, n.distance), (0, 2.0));
//!
//! // Update path: swap in a retrained center.
//! index.replace(0, vec![5.0, 5.0], 7).unwrap();
//! assert_eq!(index.nearest(&[1.0, 1.0]).unwrap().distance, 32.0);
//! ```
//!
//! # Design
//!
//! Centroids are immutable and published per slot behind `Arc`. A
//! replacement swaps one slot and never touches the others, so readers
//! never see a half-written center and writers on different clusters do
//! not contend. A scan may mix pre- and post-update clusters when it races
//! with replacements; each cluster it reads is still whole.

mod centroid;
mod config;
mod distance;
mod error;
mod index;
mod schema;

pub use centroid::ClusterCentroid;
pub use config::{IndexConfig, Metric};
pub use distance::{Cosine, Distance, Euclidean, SquaredEuclidean};
pub use error::{CentroidError, Result};
pub use index::{ClusterIndex, Nearest};
pub use schema::InputSchema;
