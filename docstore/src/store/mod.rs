pub mod file;
pub mod remote;

pub use file::FileBackend;
pub use remote::RemoteBackend;

use crate::aggregate::PipelineStage;
use crate::collection::{DeleteResult, Document, FindOptions, InsertResult, UpdateResult};
use crate::common::Value;
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::Filter;
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

/// The update operator accepted for driver parity; its body is unwrapped
/// into the plain field-merge form.
pub(crate) const SET_OPERATOR: &str = "$set";

/// Identifies which storage implementation answered. Exposed for logging
/// only; callers never branch on backend identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Remote document-store service behind the driver.
    Remote,
    /// Local flat-file store.
    File,
}

impl Display for BackendKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Remote => write!(f, "remote"),
            BackendKind::File => write!(f, "file"),
        }
    }
}

/// Contract implemented by both storage backends.
///
/// The storage adapter composes a `BackendProvider` selected once at
/// startup; every operation here maps one-to-one to an adapter operation.
/// Implementations must present identical query, pagination, and
/// aggregation semantics so that callers cannot observe which backend
/// answered.
///
/// # Thread Safety
/// Implementers must be `Send + Sync`. No implementation may spawn
/// caller-visible threads or retry on its own.
pub trait BackendProvider: Send + Sync {
    /// The backend's identity, for logging.
    fn kind(&self) -> BackendKind;

    /// Finds the first document matching the filter, in natural order.
    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Finds all documents matching the filter, applying sort, skip, and
    /// limit in that order.
    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Inserts a document, assigning a backend-native identifier when the
    /// document has none. The collection is created implicitly.
    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<InsertResult>;

    /// Updates the first document matching the filter with a shallow
    /// field-level merge.
    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<UpdateResult>;

    /// Updates the first document matching the filter and returns the
    /// updated document.
    fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<Option<Document>>;

    /// Deletes the first document matching the filter.
    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult>;

    /// Deletes every document matching the filter. An empty filter deletes
    /// everything in the collection.
    fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult>;

    /// Counts the documents matching the filter.
    fn count_documents(&self, collection: &str, filter: &Filter) -> StoreResult<u64>;

    /// Collects the set of distinct non-null values of a field across the
    /// documents matching the filter.
    fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Filter,
    ) -> StoreResult<BTreeSet<Value>>;

    /// Runs an aggregation pipeline over a snapshot of the collection,
    /// then applies the cursor options to the pipeline output.
    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[PipelineStage],
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>>;

    /// Free-text search over the canonical searchable fields, best matches
    /// first. A limit of 0 means unbounded.
    fn text_search(&self, collection: &str, term: &str, limit: u64)
        -> StoreResult<Vec<Document>>;

    /// Releases backend resources. Called once by the adapter on close.
    fn close(&self) -> StoreResult<()>;
}

/// A storage backend handle.
///
/// Wraps a [BackendProvider] implementation behind an `Arc`, so the handle
/// is cheap to clone and share between the adapter and its cursors.
#[derive(Clone)]
pub struct Backend {
    inner: Arc<dyn BackendProvider>,
}

impl Backend {
    /// Creates a backend handle from a provider implementation.
    pub fn new(provider: impl BackendProvider + 'static) -> Self {
        Backend {
            inner: Arc::new(provider),
        }
    }
}

impl Deref for Backend {
    type Target = dyn BackendProvider;

    fn deref(&self) -> &Self::Target {
        self.inner.as_ref()
    }
}

/// Extracts the effective field set of an update document.
///
/// A `{"$set": {...}}` wrapper is unwrapped; any other `$` operator, or a
/// mix of `$set` with plain fields, is outside the supported update
/// grammar.
pub(crate) fn update_fields(update: &Document) -> StoreResult<Document> {
    let has_set = update.contains_key(SET_OPERATOR);

    for key in update.keys() {
        if key.starts_with('$') && key != SET_OPERATOR {
            log::error!("Unsupported update operator: {}", key);
            return Err(StoreError::new(
                &format!("Update operator {} is not supported", key),
                ErrorKind::UnsupportedQuery,
            ));
        }
        if has_set && !key.starts_with('$') {
            log::error!("Update mixes $set with plain field {}", key);
            return Err(StoreError::new(
                "Update cannot mix $set with plain fields",
                ErrorKind::UnsupportedQuery,
            ));
        }
    }

    if has_set {
        match update.get_opt(SET_OPERATOR).and_then(Value::as_document) {
            Some(fields) => Ok(fields.clone()),
            None => {
                log::error!("$set requires a document body");
                Err(StoreError::new(
                    "$set requires a document body",
                    ErrorKind::UnsupportedQuery,
                ))
            }
        }
    } else {
        Ok(update.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_update_fields_plain_document() {
        let update = doc! { name: "Nippon", published: true };
        let fields = update_fields(&update).unwrap();
        assert_eq!(fields, update);
    }

    #[test]
    fn test_update_fields_unwraps_set() {
        let update = doc! { "$set": { name: "Nippon" } };
        let fields = update_fields(&update).unwrap();
        assert_eq!(fields, doc! { name: "Nippon" });
    }

    #[test]
    fn test_update_fields_rejects_other_operators() {
        let update = doc! { "$inc": { views: 1 } };
        let err = update_fields(&update).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);
    }

    #[test]
    fn test_update_fields_rejects_mixed_form() {
        let update = doc! { "$set": { name: "Nippon" }, region: "Asia" };
        let err = update_fields(&update).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);
    }

    #[test]
    fn test_update_fields_rejects_scalar_set_body() {
        let update = doc! { "$set": "not a document" };
        let err = update_fields(&update).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnsupportedQuery);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(format!("{}", BackendKind::Remote), "remote");
        assert_eq!(format!("{}", BackendKind::File), "file");
    }
}
