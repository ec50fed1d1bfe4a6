use crate::engine::SearchServer;
use crate::index::DocId;
use std::collections::{BTreeSet, HashSet};

/// Remove documents whose set of indexed terms equals that of a lower id.
/// Frequencies are ignored. Returns the removed ids in ascending order.
pub fn remove_duplicates(server: &mut SearchServer) -> Vec<DocId> {
    let mut seen: HashSet<BTreeSet<String>> = HashSet::new();
    let duplicates: Vec<DocId> = server
        .ids()
        .filter(|&id| {
            let terms: BTreeSet<String> = server.word_frequencies(id).into_keys().collect();
            !seen.insert(terms)
        })
        .collect();

    for &id in &duplicates {
        tracing::info!(id, "found duplicate document");
        server.remove_document(id);
    }
    duplicates
}
