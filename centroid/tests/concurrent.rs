//! Concurrency tests: readers racing replacements must only ever observe
//! whole centroids.
//!
//! Every center written here is uniform (all coordinates equal to the
//! write's sequence number, which is also its count), so a torn read shows
//! up as a center with mixed coordinates or a count that disagrees with it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use giztoy_centroid::{CentroidError, ClusterCentroid, ClusterIndex, InputSchema};

const DIM: usize = 64;
const CLUSTERS: usize = 8;
const WRITES: u64 = 2_000;

fn uniform(v: f64) -> Vec<f64> {
    vec![v; DIM]
}

fn build() -> Arc<ClusterIndex> {
    let schema = Arc::new(InputSchema::new((0..DIM).map(|i| format!("f{i}"))).unwrap());
    let cs = (0..CLUSTERS)
        .map(|id| ClusterCentroid::new(id, uniform(0.0), 0))
        .collect();
    Arc::new(ClusterIndex::new(cs, schema).unwrap())
}

fn assert_whole(c: &ClusterCentroid) {
    let first = c.center()[0];
    assert!(
        c.center().iter().all(|&x| x == first),
        "torn centroid {}: {:?}",
        c.id(),
        c.center()
    );
    assert_eq!(first, c.count() as f64, "center/count mismatch on {}", c.id());
}

#[test]
fn replace_distinct_ids_while_reading() {
    let index = build();
    let done = Arc::new(AtomicBool::new(false));

    let writers: Vec<_> = (0..CLUSTERS)
        .map(|id| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for seq in 1..=WRITES {
                    index.replace(id, uniform(seq as f64), seq).unwrap();
                }
            })
        })
        .collect();

    let readers: Vec<_> = (0..4)
        .map(|r| {
            let index = Arc::clone(&index);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                let mut last_seen = vec![0u64; CLUSTERS];
                let mut queries = 0u64;
                while !done.load(Ordering::Acquire) || queries == 0 {
                    for (id, last) in last_seen.iter_mut().enumerate() {
                        let c = index.get(id).unwrap();
                        assert_whole(&c);
                        assert!(c.count() >= *last, "cluster {id} went backwards");
                        *last = c.count();
                    }

                    let q = uniform((queries + r as u64) as f64 % WRITES as f64);
                    let n = index.nearest(&q).unwrap();
                    assert!(n.id < CLUSTERS);
                    assert!(n.distance.is_finite() && n.distance >= 0.0);
                    queries += 1;
                }
            })
        })
        .collect();

    for w in writers {
        w.join().unwrap();
    }
    done.store(true, Ordering::Release);
    for r in readers {
        r.join().unwrap();
    }

    for c in index.centroids() {
        assert_whole(&c);
        assert_eq!(c.count(), WRITES);
    }
}

#[test]
fn nearest_result_matches_some_observed_centroid() {
    let index = build();
    // Fix cluster 0 far away so the answer always comes from a moving one.
    index.replace(0, uniform(1e6), 1_000_000).unwrap();
    let done = Arc::new(AtomicBool::new(false));

    let writer = {
        let index = Arc::clone(&index);
        thread::spawn(move || {
            for seq in 1..=WRITES {
                for id in 1..CLUSTERS {
                    index.replace(id, uniform(seq as f64), seq).unwrap();
                }
            }
        })
    };

    let reader = {
        let index = Arc::clone(&index);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let q = uniform(0.0);
            while !done.load(Ordering::Acquire) {
                let n = index.nearest(&q).unwrap();
                // Distance to a uniform center v is DIM * v^2 for a
                // whole centroid; anything else means a torn read.
                let v = (n.distance / DIM as f64).sqrt();
                assert_eq!(v, v.round(), "distance {} not from a whole centroid", n.distance);
                assert!(v <= WRITES as f64);
            }
        })
    };

    writer.join().unwrap();
    done.store(true, Ordering::Release);
    reader.join().unwrap();
}

#[test]
fn concurrent_absorb_same_id_loses_nothing() {
    let index = build();
    let threads = 8;
    let per_thread = 500u64;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    index.absorb(3, &uniform(2.0), 1).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let c = index.get(3).unwrap();
    assert_eq!(c.count(), threads * per_thread);
    assert!(c.center().iter().all(|&x| (x - 2.0).abs() < 1e-9));
    assert_eq!(index.get(2).unwrap().count(), 0);
}

#[test]
fn errors_under_concurrency_leave_index_unchanged() {
    let index = build();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let index = Arc::clone(&index);
            thread::spawn(move || {
                for _ in 0..100 {
                    let err = index.replace(0, vec![1.0; DIM + 1], 9).unwrap_err();
                    assert!(matches!(err, CentroidError::DimensionMismatch { .. }));
                    let err = index.replace(CLUSTERS, uniform(1.0), 9).unwrap_err();
                    assert!(matches!(err, CentroidError::OutOfRange { .. }));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for c in index.centroids() {
        assert_eq!(c.count(), 0);
        assert_whole(&c);
    }
}
