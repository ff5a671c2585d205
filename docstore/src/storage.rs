use crate::aggregate::PipelineStage;
use crate::collection::{
    DeleteResult, Document, DocumentCursor, InsertResult, UpdateResult,
};
use crate::common::{atomic, Atomic, Value};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::Filter;
use crate::identity::IdentityNormalizer;
use crate::storage_builder::DocStoreBuilder;
use crate::store::{Backend, BackendKind};
use std::collections::BTreeSet;
use std::sync::Arc;

/// The public storage adapter: a uniform document-collection interface
/// over whichever backend was selected at startup.
///
/// `DocStore` is a cheap-clone handle sharing one inner state; pass it by
/// clone to whoever needs storage access. Callers see Documents, the
/// fixed result types, and `Option` for lookup misses — never
/// backend-specific types, and they never branch on backend identity.
///
/// The adapter has an explicit lifecycle: it is opened once by the
/// process bootstrap through [DocStore::builder] and closed at shutdown
/// with [DocStore::close]. Every operation invoked on a closed (or never
/// opened) adapter fails with [ErrorKind::NotConnected]. Side effects are
/// confined to the selected backend's durable store; there is no hidden
/// caching layer and no automatic retry.
#[derive(Clone)]
pub struct DocStore {
    inner: Arc<DocStoreInner>,
}

struct DocStoreInner {
    backend: Atomic<Option<Backend>>,
    normalizer: IdentityNormalizer,
}

impl DocStore {
    /// Creates a builder for opening a storage adapter.
    pub fn builder() -> DocStoreBuilder {
        DocStoreBuilder::new()
    }

    pub(crate) fn new(backend: Backend, normalizer: IdentityNormalizer) -> Self {
        DocStore {
            inner: Arc::new(DocStoreInner {
                backend: atomic(Some(backend)),
                normalizer,
            }),
        }
    }

    fn backend(&self) -> StoreResult<Backend> {
        match self.inner.backend.read().clone() {
            Some(backend) => Ok(backend),
            None => {
                log::error!("Storage adapter is not connected");
                Err(StoreError::new(
                    "Storage adapter is not connected",
                    ErrorKind::NotConnected,
                ))
            }
        }
    }

    fn normalized(&self, mut document: Document) -> Document {
        self.inner.normalizer.normalize(&mut document);
        document
    }

    /// Which backend answered the startup selection. For logging only.
    pub fn backend_kind(&self) -> StoreResult<BackendKind> {
        Ok(self.backend()?.kind())
    }

    /// Checks if the adapter is open.
    pub fn is_open(&self) -> bool {
        self.inner.backend.read().is_some()
    }

    /// Finds the first document matching the filter. A miss is an absent
    /// value, not an error.
    pub fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let found = self.backend()?.find_one(collection, filter)?;
        Ok(found.map(|doc| self.normalized(doc)))
    }

    /// Creates a deferred query over the collection. Attach skip, limit,
    /// and sort on the returned cursor, then materialize it with
    /// `to_list`.
    pub fn find(&self, collection: &str, filter: Filter) -> StoreResult<DocumentCursor> {
        Ok(DocumentCursor::find(
            self.backend()?,
            collection,
            filter,
            self.inner.normalizer.clone(),
        ))
    }

    /// Inserts a document, assigning an identifier when it has none. The
    /// collection is created implicitly on first write.
    pub fn insert_one(&self, collection: &str, document: Document) -> StoreResult<InsertResult> {
        self.backend()?.insert_one(collection, document)
    }

    /// Applies a shallow field-level update to the first matching
    /// document.
    pub fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<UpdateResult> {
        self.backend()?.update_one(collection, filter, update)
    }

    /// Applies a shallow field-level update to the first matching
    /// document and returns the updated document.
    pub fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<Option<Document>> {
        let updated = self
            .backend()?
            .find_one_and_update(collection, filter, update)?;
        Ok(updated.map(|doc| self.normalized(doc)))
    }

    /// Deletes the first document matching the filter.
    pub fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult> {
        self.backend()?.delete_one(collection, filter)
    }

    /// Deletes every document matching the filter. An empty filter
    /// deletes everything in the collection.
    pub fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult> {
        self.backend()?.delete_many(collection, filter)
    }

    /// Counts the documents matching the filter.
    pub fn count_documents(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        self.backend()?.count_documents(collection, filter)
    }

    /// Collects the distinct non-null values of a field across the
    /// documents matching the filter.
    pub fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Filter,
    ) -> StoreResult<BTreeSet<Value>> {
        self.backend()?.distinct(collection, field, filter)
    }

    /// Creates a deferred aggregation over the collection.
    pub fn aggregate(
        &self,
        collection: &str,
        pipeline: Vec<PipelineStage>,
    ) -> StoreResult<DocumentCursor> {
        Ok(DocumentCursor::aggregate(
            self.backend()?,
            collection,
            pipeline,
            self.inner.normalizer.clone(),
        ))
    }

    /// Free-text search over the canonical searchable fields, best
    /// matches first. A limit of 0 means unbounded.
    pub fn text_search(
        &self,
        collection: &str,
        term: &str,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        let documents = self.backend()?.text_search(collection, term, limit)?;
        Ok(documents
            .into_iter()
            .map(|doc| self.normalized(doc))
            .collect())
    }

    /// Releases the backend. Idempotent; operations invoked afterwards
    /// fail with [ErrorKind::NotConnected].
    pub fn close(&self) -> StoreResult<()> {
        let backend = self.inner.backend.write().take();
        if let Some(backend) = backend {
            backend.close()?;
            log::debug!("Storage adapter closed");
        }
        Ok(())
    }
}
