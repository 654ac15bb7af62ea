//! # clustermi: Mutual Information Between Clusterings
//!
//! **clustermi** scores how much information two clustering assignments of the
//! same elements share. Labels are accumulated batch by batch into a sparse
//! contingency table, so a score over a stream (or over independently
//! processed shards) equals the score over the concatenated data.
//!
//! ## Usage Example
//!
//! ```no_run
//! use clustermi::metrics::{mutual_info_score, Metric, MutualInfoScore};
//! use ndarray::array;
//!
//! // 1. One-shot scoring
//! let score = mutual_info_score(&array![0, 0, 1, 1], &array![0, 0, 1, 1])?;
//!
//! // 2. Streaming: state persists across update calls
//! let mut metric = MutualInfoScore::<i32>::new();
//! metric.update_batch(&array![0, 0], &array![0, 0])?;
//! metric.update_batch(&array![1, 1], &array![1, 1])?;
//! assert!((metric.compute() - score).abs() < 1e-12);
//! # Ok::<(), clustermi::metrics::MetricError>(())
//! ```

// Declare public modules that constitute the core library API.
pub mod metrics;
pub mod serialization;
