use crate::engine::SearchServer;
use crate::error::Result;
use crate::filter::DocumentFilter;
use crate::index::{Document, DocumentStatus};
use std::collections::VecDeque;

/// Requests remembered by a [`RequestQueue`]: one day of one-per-minute traffic.
pub const MIN_IN_DAY: usize = 1440;

/// Forwards searches to a server and counts recent requests with no results.
pub struct RequestQueue<'a> {
    server: &'a SearchServer,
    requests: VecDeque<bool>,
    no_result_requests: usize,
}

impl<'a> RequestQueue<'a> {
    pub fn new(server: &'a SearchServer) -> Self {
        Self { server, requests: VecDeque::with_capacity(MIN_IN_DAY), no_result_requests: 0 }
    }

    pub fn add_find_request(&mut self, raw_query: &str) -> Result<Vec<Document>> {
        let docs = self.server.find_top_documents(raw_query)?;
        self.record(docs.is_empty());
        Ok(docs)
    }

    pub fn add_find_request_by_status(
        &mut self,
        raw_query: &str,
        status: DocumentStatus,
    ) -> Result<Vec<Document>> {
        let docs = self.server.find_top_documents_by_status(raw_query, status)?;
        self.record(docs.is_empty());
        Ok(docs)
    }

    pub fn add_find_request_with(
        &mut self,
        raw_query: &str,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>> {
        let docs = self.server.find_top_documents_with(raw_query, filter)?;
        self.record(docs.is_empty());
        Ok(docs)
    }

    /// Empty results among the last [`MIN_IN_DAY`] requests.
    pub fn no_result_requests(&self) -> usize {
        self.no_result_requests
    }

    fn record(&mut self, empty: bool) {
        if self.requests.len() == MIN_IN_DAY {
            if let Some(true) = self.requests.pop_front() {
                self.no_result_requests -= 1;
            }
        }
        if empty {
            self.no_result_requests += 1;
        }
        self.requests.push_back(empty);
    }
}
