use crate::aggregate::PipelineStage;
use crate::collection::{Document, FindOptions};
use crate::common::SortOrder;
use crate::errors::StoreResult;
use crate::filter::Filter;
use crate::identity::IdentityNormalizer;
use crate::store::Backend;

/// A deferred query descriptor, materialized on demand.
///
/// A cursor accumulates skip/limit/sort state before execution; chain
/// order is irrelevant and the last value set per axis wins. Nothing runs
/// until [DocumentCursor::to_list] pulls the results, and materialization
/// never mutates the underlying collection.
///
/// Against the file backend, every `to_list` call re-reads the full
/// backing collection — correctness over speed, no staleness, no caching.
/// Against the remote backend the same state is forwarded to the driver's
/// native cursor chain, so callers cannot observe which backend answered.
///
/// Processing order is fixed: filter → sort → skip → limit.
///
/// # Examples
///
/// ```rust,ignore
/// let page = store
///     .find("articles", Filter::new().eq("published", true))?
///     .sort("name", SortOrder::Ascending)
///     .skip(20)
///     .limit(10)
///     .to_list()?;
/// ```
pub struct DocumentCursor {
    backend: Backend,
    collection: String,
    query: CursorQuery,
    options: FindOptions,
    normalizer: IdentityNormalizer,
}

enum CursorQuery {
    Find(Filter),
    Aggregate(Vec<PipelineStage>),
}

impl DocumentCursor {
    pub(crate) fn find(
        backend: Backend,
        collection: &str,
        filter: Filter,
        normalizer: IdentityNormalizer,
    ) -> Self {
        DocumentCursor {
            backend,
            collection: collection.to_string(),
            query: CursorQuery::Find(filter),
            options: FindOptions::new(),
            normalizer,
        }
    }

    pub(crate) fn aggregate(
        backend: Backend,
        collection: &str,
        pipeline: Vec<PipelineStage>,
        normalizer: IdentityNormalizer,
    ) -> Self {
        DocumentCursor {
            backend,
            collection: collection.to_string(),
            query: CursorQuery::Aggregate(pipeline),
            options: FindOptions::new(),
            normalizer,
        }
    }

    /// Sets the number of documents to skip. Skipping past the end of the
    /// result sequence yields an empty list.
    pub fn skip(mut self, skip: u64) -> Self {
        self.options = self.options.skip(skip);
        self
    }

    /// Sets the maximum number of documents to return. A limit of 0 means
    /// "all remaining".
    pub fn limit(mut self, limit: u64) -> Self {
        self.options = self.options.limit(limit);
        self
    }

    /// Sets the sort field and direction. The sort is stable and
    /// ascending by default; on the find path a document missing the sort
    /// field sorts as the empty string.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.options = self.options.sort_by(field, order);
        self
    }

    /// Materializes the cursor.
    pub fn to_list(&self) -> StoreResult<Vec<Document>> {
        match &self.query {
            CursorQuery::Find(filter) => {
                let mut documents =
                    self.backend
                        .find(&self.collection, filter, &self.options)?;
                for document in &mut documents {
                    self.normalizer.normalize(document);
                }
                Ok(documents)
            }
            CursorQuery::Aggregate(pipeline) => {
                // aggregation rows are synthetic; they are reshaped by the
                // backend but never sequence-defaulted
                self.backend
                    .aggregate(&self.collection, pipeline, &self.options)
            }
        }
    }

    /// Materializes the cursor and returns the first document, if any.
    pub fn first(&self) -> StoreResult<Option<Document>> {
        Ok(self.to_list()?.into_iter().next())
    }
}
