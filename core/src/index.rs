use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_words};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type DocId = i32;

/// Interned term shared between the forward and inverted indices.
pub type Term = Arc<str>;

/// Lifecycle status of a document. Ranking ignores it; filters use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Active,
    Irrelevant,
    Banned,
    Removed,
}

impl FromStr for DocumentStatus {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(DocumentStatus::Active),
            "irrelevant" => Ok(DocumentStatus::Irrelevant),
            "banned" => Ok(DocumentStatus::Banned),
            "removed" => Ok(DocumentStatus::Removed),
            other => Err(SearchError::invalid(format!("unknown document status {other:?}"))),
        }
    }
}

/// One ranked hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ document_id = {}, relevance = {}, rating = {} }}",
            self.id, self.relevance, self.rating
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocMeta {
    pub rating: i32,
    pub status: DocumentStatus,
}

/// Integer mean of the ratings, truncated toward zero. Empty input rates 0.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| r as i64).sum();
    (sum / ratings.len() as i64) as i32
}

/// Forward and inverted indices plus per-document metadata.
///
/// Every `(term, id)` pair in `forward` is also in `inverted` and vice versa.
/// Posting lists are dropped once their last document goes away.
#[derive(Debug, Default)]
pub struct DocumentStore {
    forward: BTreeMap<DocId, BTreeMap<Term, f64>>,
    inverted: BTreeMap<Term, BTreeMap<DocId, f64>>,
    docs: BTreeMap<DocId, DocMeta>,
    order: BTreeSet<DocId>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and index a document. Nothing is touched when validation fails.
    pub fn add_document(
        &mut self,
        id: DocId,
        text: &str,
        status: DocumentStatus,
        ratings: &[i32],
        is_stop_word: impl Fn(&str) -> bool,
    ) -> Result<()> {
        if id < 0 {
            return Err(SearchError::invalid(format!("document id {id} is negative")));
        }
        if self.docs.contains_key(&id) {
            return Err(SearchError::invalid(format!("document id {id} already exists")));
        }
        if !is_valid_word(text) {
            return Err(SearchError::invalid("document text contains control characters"));
        }

        let words: Vec<&str> = split_words(text).filter(|w| !is_stop_word(*w)).collect();
        let inv_word_count = 1.0 / words.len() as f64;
        let mut row: BTreeMap<Term, f64> = BTreeMap::new();
        for word in words {
            // reuse the interned key when the term is already known
            let term = match self.inverted.get_key_value(word) {
                Some((term, _)) => Arc::clone(term),
                None => Term::from(word),
            };
            *row.entry(term).or_insert(0.0) += inv_word_count;
        }
        for (term, tf) in row.iter() {
            self.inverted
                .entry(Arc::clone(term))
                .or_default()
                .insert(id, *tf);
        }

        tracing::debug!(id, terms = row.len(), ?status, "document added");
        self.forward.insert(id, row);
        self.docs.insert(id, DocMeta { rating: average_rating(ratings), status });
        self.order.insert(id);
        Ok(())
    }

    /// Drop a document and every index entry it owns. Unknown ids are ignored.
    pub fn remove_document(&mut self, id: DocId) {
        let Some(row) = self.forward.remove(&id) else {
            return;
        };
        for term in row.keys() {
            if let Some(postings) = self.inverted.get_mut(term) {
                postings.remove(&id);
                if postings.is_empty() {
                    self.inverted.remove(term);
                }
            }
        }
        self.docs.remove(&id);
        self.order.remove(&id);
        tracing::debug!(id, "document removed");
    }

    /// [`remove_document`](Self::remove_document) with the posting-list scan
    /// split across rayon workers. Lists that would become empty are dropped.
    pub fn remove_document_par(&mut self, id: DocId) {
        let Some(row) = self.forward.remove(&id) else {
            return;
        };
        let inverted = &self.inverted;
        let (emptied, shrunk): (Vec<&Term>, Vec<&Term>) = row
            .par_iter()
            .map(|(term, _)| term)
            .partition(|term| inverted.get(*term).map_or(true, |postings| postings.len() <= 1));
        for term in emptied {
            self.inverted.remove(term);
        }
        for term in shrunk {
            if let Some(postings) = self.inverted.get_mut(term) {
                postings.remove(&id);
            }
        }
        self.docs.remove(&id);
        self.order.remove(&id);
        tracing::debug!(id, "document removed");
    }

    /// Term frequencies of one document; empty for unknown ids.
    pub fn word_frequencies(&self, id: DocId) -> BTreeMap<String, f64> {
        self.forward
            .get(&id)
            .map(|row| row.iter().map(|(t, f)| (t.to_string(), *f)).collect())
            .unwrap_or_default()
    }

    pub(crate) fn row(&self, id: DocId) -> Option<&BTreeMap<Term, f64>> {
        self.forward.get(&id)
    }

    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.inverted.get(term)
    }

    pub fn meta(&self, id: DocId) -> Option<&DocMeta> {
        self.docs.get(&id)
    }

    pub fn count(&self) -> usize {
        self.docs.len()
    }

    /// Ids in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.order.iter().copied()
    }

    pub fn num_terms(&self) -> usize {
        self.inverted.len()
    }
}
