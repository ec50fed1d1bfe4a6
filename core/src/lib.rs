//! In-memory full-text search with TF-IDF ranking.
//!
//! Documents go into a [`SearchServer`], which keeps a forward index
//! (`id -> term -> tf`) and an inverted index (`term -> id -> tf`). Queries
//! are space-separated words; a leading `-` excludes documents containing the
//! word. Ranking can fan out over a rayon pool, with partial scores gathered in
//! a [`ShardedAccumulator`].

pub mod accumulator;
pub mod batch;
pub mod config;
pub mod corpus;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod filter;
pub mod index;
pub mod paginate;
pub mod query;
pub mod requests;
pub mod tokenizer;

pub use accumulator::{Access, ShardedAccumulator};
pub use batch::{process_queries, process_queries_joined};
pub use config::EngineConfig;
pub use dedup::remove_duplicates;
pub use engine::{ExecutionPolicy, SearchServer};
pub use error::{Result, SearchError};
pub use filter::DocumentFilter;
pub use index::{DocId, Document, DocumentStatus};
pub use paginate::paginate;
pub use requests::RequestQueue;
