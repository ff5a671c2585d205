//! # docstore - Dual-Backend Document Storage Layer
//!
//! `docstore` is the storage abstraction layer of a content-serving
//! backend: a uniform document-collection interface that can be backed
//! interchangeably by a remote document-store service or by a local
//! flat-file store, presenting identical query, cursor, pagination, and
//! aggregation semantics to all callers.
//!
//! ## Key Features
//!
//! - **Two interchangeable backends**: a remote MongoDB deployment via
//!   the official driver, and a flat-file JSON store that replicates the
//!   same query/cursor/aggregation subset entirely in memory
//! - **One-time backend selection**: the remote backend is probed at
//!   startup with a bounded timeout and the file backend is the logged
//!   fallback; callers never branch on backend identity
//! - **Closed query grammar**: equality filters plus `$text`, with
//!   everything else failing loudly instead of being silently ignored
//! - **Deferred cursors**: chainable skip/limit/sort state, materialized
//!   on demand, re-reading the backing store on every call
//! - **Aggregation**: Match/Group/Sort pipelines with a count accumulator
//! - **Identity normalization**: backend-native ids, domain slugs, and
//!   generated ids reconciled into one external `id` field
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docstore::{DocStore, SortOrder};
//! use docstore::filter::Filter;
//! use docstore::doc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open the adapter: remote first, file fallback
//! let store = DocStore::builder()
//!     .remote_uri("mongodb://localhost:27017")
//!     .database("content")
//!     .data_dir("data")
//!     .sequence_fields(&["sections", "assets"])
//!     .open()?;
//!
//! // Insert a document
//! store.insert_one("articles", doc!{ slug: "japan", name: "Japan" })?;
//!
//! // Query with a cursor
//! let page = store
//!     .find("articles", Filter::new().eq("published", true))?
//!     .sort("name", SortOrder::Ascending)
//!     .skip(20)
//!     .limit(10)
//!     .to_list()?;
//!
//! // Close the adapter at shutdown
//! store.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`aggregate`] - Pipeline stages and the in-memory aggregation engine
//! - [`collection`] - Documents, cursors, find options, and write results
//! - [`common`] - Common types and constants
//! - [`errors`] - Error types and result definitions
//! - [`filter`] - The closed query filter grammar
//! - [`identity`] - Identity normalization
//! - [`storage`] - The public storage adapter
//! - [`storage_builder`] - Adapter builder and backend selection
//! - [`storage_config`] - Adapter configuration
//! - [`store`] - Backend contract and the two implementations

pub mod aggregate;
pub mod collection;
pub mod common;
pub mod errors;
pub mod filter;
pub mod identity;
pub mod storage;
pub mod storage_builder;
pub mod storage_config;
pub mod store;

pub use common::{SortOrder, Value};
pub use storage::DocStore;
