//! Engine configuration

use serde::{Deserialize, Serialize};

/// Tuning knobs for a [`SearchServer`](crate::SearchServer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Accumulator shards used by each ranking call
    pub shard_count: usize,

    /// Size of a dedicated worker pool for the parallel policy. `None` uses
    /// rayon's global pool.
    pub worker_threads: Option<usize>,

    /// Maximum documents returned by a top-N search
    pub max_results: usize,

    /// Relevances closer than this are ranked by rating instead
    pub relevance_epsilon: f64,
}

pub const MAX_RESULT_DOCUMENT_COUNT: usize = 5;
pub const RELEVANCE_EPSILON: f64 = 1e-6;

fn default_shard_count() -> usize {
    std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            shard_count: default_shard_count(),
            worker_threads: None,
            max_results: MAX_RESULT_DOCUMENT_COUNT,
            relevance_epsilon: RELEVANCE_EPSILON,
        }
    }
}

impl EngineConfig {
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count.max(1);
        self
    }

    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }
}
