//! Document filters applied to every ranking candidate.

use crate::index::{DocId, DocumentStatus};
use std::fmt;
use std::sync::Arc;

type Predicate = dyn Fn(DocId, DocumentStatus, i32) -> bool + Send + Sync;

/// Decides which candidates may score. Checked once per posting.
#[derive(Clone)]
pub enum DocumentFilter {
    All,
    ByStatus(DocumentStatus),
    Custom(Arc<Predicate>),
}

impl DocumentFilter {
    /// Wrap a closure over `(id, status, rating)`.
    pub fn custom<F>(predicate: F) -> Self
    where
        F: Fn(DocId, DocumentStatus, i32) -> bool + Send + Sync + 'static,
    {
        DocumentFilter::Custom(Arc::new(predicate))
    }

    pub fn matches(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool {
        match self {
            DocumentFilter::All => true,
            DocumentFilter::ByStatus(wanted) => *wanted == status,
            DocumentFilter::Custom(predicate) => predicate(id, status, rating),
        }
    }
}

impl Default for DocumentFilter {
    fn default() -> Self {
        DocumentFilter::ByStatus(DocumentStatus::Active)
    }
}

impl From<DocumentStatus> for DocumentFilter {
    fn from(status: DocumentStatus) -> Self {
        DocumentFilter::ByStatus(status)
    }
}

impl fmt::Debug for DocumentFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFilter::All => f.write_str("All"),
            DocumentFilter::ByStatus(status) => f.debug_tuple("ByStatus").field(status).finish(),
            DocumentFilter::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_active_only() {
        let filter = DocumentFilter::default();
        assert!(filter.matches(0, DocumentStatus::Active, 0));
        assert!(!filter.matches(0, DocumentStatus::Banned, 0));
    }

    #[test]
    fn custom_sees_id_and_rating() {
        let even = DocumentFilter::custom(|id, _, _| id % 2 == 0);
        assert!(even.matches(2, DocumentStatus::Removed, -4));
        assert!(!even.matches(3, DocumentStatus::Active, 9));
        let rated = DocumentFilter::custom(|_, _, rating| rating > 0);
        assert!(!rated.matches(1, DocumentStatus::Active, 0));
        assert!(DocumentFilter::All.matches(1, DocumentStatus::Irrelevant, 0));
    }
}
