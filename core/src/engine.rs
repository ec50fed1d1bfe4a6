//! The search server: document ingestion, TF-IDF ranking and term matching.
//!
//! Queries borrow the store immutably, so any number of them may run at once.
//! Adding or removing documents needs `&mut self`; callers that share a server
//! across threads serialize mutation themselves (the HTTP front-end does it
//! with an `RwLock`).

use crate::accumulator::ShardedAccumulator;
use crate::config::EngineConfig;
use crate::error::{Result, SearchError};
use crate::filter::DocumentFilter;
use crate::index::{DocId, Document, DocumentStatus, DocumentStore};
use crate::query::{parse_query, parse_query_without_sort, Query};
use crate::tokenizer::{is_valid_word, split_words, unique_non_empty};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Whether a call fans out over the worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

#[derive(Debug)]
pub struct SearchServer {
    stop_words: BTreeSet<String>,
    store: DocumentStore,
    config: EngineConfig,
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl SearchServer {
    /// Build a server whose stop words are the space-separated words of `stop_words_text`.
    pub fn new(stop_words_text: &str) -> Result<Self> {
        Self::from_stop_words(split_words(stop_words_text))
    }

    pub fn from_stop_words<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(stop_words, EngineConfig::default())
    }

    pub fn with_config<I, S>(stop_words: I, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = unique_non_empty(stop_words);
        if let Some(bad) = stop_words.iter().find(|w| !is_valid_word(w)) {
            return Err(SearchError::invalid(format!("stop word {bad:?} contains control characters")));
        }
        let pool = match config.worker_threads {
            Some(threads) => Some(Arc::new(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("search-worker-{i}"))
                    .build()
                    .map_err(|e| SearchError::ThreadPool(e.to_string()))?,
            )),
            None => None,
        };
        let config = EngineConfig { shard_count: config.shard_count.max(1), ..config };
        Ok(Self { stop_words, store: DocumentStore::new(), config, pool })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
    ) -> Result<()> {
        let stop_words = &self.stop_words;
        self.store
            .add_document(id, text, status, ratings, |w| stop_words.contains(w))
    }

    pub fn remove_document(&mut self, id: DocId) {
        self.store.remove_document(id);
    }

    /// Like [`remove_document`](Self::remove_document); the parallel policy
    /// sorts the document's posting lists into emptied and shrunk on the pool.
    pub fn remove_document_policy(&mut self, policy: ExecutionPolicy, id: DocId) {
        let store = &mut self.store;
        match (policy, &self.pool) {
            (ExecutionPolicy::Sequential, _) => store.remove_document(id),
            (ExecutionPolicy::Parallel, Some(pool)) => pool.install(|| store.remove_document_par(id)),
            (ExecutionPolicy::Parallel, None) => store.remove_document_par(id),
        }
    }

    pub fn document_count(&self) -> usize {
        self.store.count()
    }

    /// Document ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.store.ids()
    }

    /// Term frequencies of a document, or an empty map if the id is unknown.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<String, f64> {
        self.store.word_frequencies(id)
    }

    /// `ln(N / df)` for an indexed term, `None` for terms no document contains.
    pub fn inverse_document_frequency(&self, term: &str) -> Option<f64> {
        self.store
            .postings(term)
            .map(|postings| self.idf(postings.len()))
    }

    fn idf(&self, document_freq: usize) -> f64 {
        (self.store.count() as f64 / document_freq as f64).ln()
    }

    /// Top documents with status `Active`.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<Document>> {
        self.find_top_documents_policy(ExecutionPolicy::Sequential, raw_query, &DocumentFilter::default())
    }

    pub fn find_top_documents_by_status(
        &self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_policy(ExecutionPolicy::Sequential, raw_query, &status.into())
    }

    pub fn find_top_documents_with(
        &self,
        raw_query: &str,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_policy(ExecutionPolicy::Sequential, raw_query, filter)
    }

    /// Rank every document accepted by `filter`, best first, capped at `max_results`.
    ///
    /// Relevances within `relevance_epsilon` of each other are ordered by rating.
    pub fn find_top_documents_policy(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>> {
        self.find_top_documents_counted(policy, raw_query, filter)
            .map(|(docs, _)| docs)
    }

    /// Top documents plus the number of documents that matched before the cap.
    pub fn find_top_documents_counted(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: &DocumentFilter,
    ) -> Result<(Vec<Document>, usize)> {
        let query = parse_query(raw_query, |w| self.is_stop_word(w))?;
        let mut matched = self.find_all_documents(policy, &query, filter);

        let by_relevance = relevance_order(self.config.relevance_epsilon);
        match policy {
            ExecutionPolicy::Sequential => matched.sort_by(by_relevance),
            ExecutionPolicy::Parallel => self.run(|| matched.par_sort_by(by_relevance)),
        }
        let total_hits = matched.len();
        matched.truncate(self.config.max_results);

        tracing::debug!(query = raw_query, ?policy, ?filter, total_hits, returned = matched.len(), "ranked query");
        Ok((matched, total_hits))
    }

    /// Score plus words, then strike out documents holding any minus word.
    /// The minus phase starts only after every plus posting has been added,
    /// and the snapshot only after every minus posting has been erased.
    fn find_all_documents(
        &self,
        policy: ExecutionPolicy,
        query: &Query<'_>,
        filter: &DocumentFilter,
    ) -> Vec<Document> {
        let relevance: ShardedAccumulator<DocId, f64> =
            ShardedAccumulator::new(self.config.shard_count);

        let score = |id: DocId, tf: f64, idf: f64| {
            if let Some(meta) = self.store.meta(id) {
                if filter.matches(id, meta.status, meta.rating) {
                    *relevance.access(id) += tf * idf;
                }
            }
        };

        match policy {
            ExecutionPolicy::Sequential => {
                for word in &query.plus_words {
                    if let Some(postings) = self.store.postings(word) {
                        let idf = self.idf(postings.len());
                        for (&id, &tf) in postings {
                            score(id, tf, idf);
                        }
                    }
                }
                for word in &query.minus_words {
                    if let Some(postings) = self.store.postings(word) {
                        for &id in postings.keys() {
                            relevance.erase(id);
                        }
                    }
                }
            }
            ExecutionPolicy::Parallel => self.run(|| {
                query.plus_words.par_iter().for_each(|word| {
                    if let Some(postings) = self.store.postings(word) {
                        let idf = self.idf(postings.len());
                        postings.par_iter().for_each(|(&id, &tf)| score(id, tf, idf));
                    }
                });
                query.minus_words.par_iter().for_each(|word| {
                    if let Some(postings) = self.store.postings(word) {
                        postings.par_iter().for_each(|(&id, _)| relevance.erase(id));
                    }
                });
            }),
        }

        relevance
            .snapshot()
            .into_iter()
            .filter_map(|(id, relevance)| {
                self.store
                    .meta(id)
                    .map(|meta| Document { id, relevance, rating: meta.rating })
            })
            .collect()
    }

    pub fn match_document(
        &self,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<String>, DocumentStatus)> {
        self.match_document_policy(ExecutionPolicy::Sequential, raw_query, id)
    }

    /// Plus words present in document `id`, sorted and distinct, with its status.
    /// A document containing any minus word matches nothing.
    pub fn match_document_policy(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<String>, DocumentStatus)> {
        let (Some(meta), Some(row)) = (self.store.meta(id), self.store.row(id)) else {
            return Err(SearchError::NotFound(id));
        };
        let is_stop = |w: &str| self.is_stop_word(w);
        let query = match policy {
            ExecutionPolicy::Sequential => parse_query(raw_query, is_stop)?,
            ExecutionPolicy::Parallel => parse_query_without_sort(raw_query, is_stop)?,
        };

        let excluded = match policy {
            ExecutionPolicy::Sequential => query.minus_words.iter().any(|w| row.contains_key(*w)),
            ExecutionPolicy::Parallel => self.run(|| query.minus_words.par_iter().any(|w| row.contains_key(*w))),
        };
        if excluded {
            return Ok((Vec::new(), meta.status));
        }

        let mut words: Vec<String> = match policy {
            ExecutionPolicy::Sequential => query
                .plus_words
                .iter()
                .filter(|w| row.contains_key(**w))
                .map(|w| w.to_string())
                .collect(),
            ExecutionPolicy::Parallel => self.run(|| {
                query
                    .plus_words
                    .par_iter()
                    .filter(|w| row.contains_key(**w))
                    .map(|w| w.to_string())
                    .collect()
            }),
        };
        words.sort_unstable();
        words.dedup();
        Ok((words, meta.status))
    }

    fn run<R: Send>(&self, op: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}

/// Descending relevance; near-equal relevances fall back to descending rating.
///
/// Equality within `epsilon` is not transitive, so this is not a strict total
/// order. A chain of relevances each within `epsilon` of the next can sort
/// either way; the rating tie-break is still kept as the ranking contract.
fn relevance_order(epsilon: f64) -> impl Fn(&Document, &Document) -> Ordering + Copy + Send + Sync {
    move |lhs, rhs| {
        if (lhs.relevance - rhs.relevance).abs() < epsilon {
            rhs.rating.cmp(&lhs.rating)
        } else {
            rhs.relevance
                .partial_cmp(&lhs.relevance)
                .unwrap_or(Ordering::Equal)
        }
    }
}
