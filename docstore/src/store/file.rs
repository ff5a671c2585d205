use crate::aggregate::{run_pipeline, sort_by_field, PipelineStage};
use crate::collection::{DeleteResult, Document, FindOptions, InsertResult, UpdateResult};
use crate::common::{Value, COLLECTION_FILE_EXTENSION, DOC_ID};
use crate::errors::StoreResult;
use crate::filter::Filter;
use crate::store::{update_fields, BackendKind, BackendProvider};
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

/// Scoring weights for free-text search, best field first.
const TEXT_SCORE_WEIGHTS: [(&str, i64); 3] = [("name", 10), ("summary", 5), ("region", 3)];

/// Flat-file storage backend.
///
/// Each collection is one file at `<data_dir>/<collection>.json` holding a
/// single pretty-printed JSON array of plain documents; array order is
/// insertion order. Every operation reads the whole file, and every
/// mutating operation rewrites it: read → parse → mutate → serialize →
/// overwrite. A missing file reads as an empty collection, so collections
/// are created implicitly on first write.
///
/// There is no locking and no file-level atomicity beyond the whole-file
/// replace. Two uncoordinated writers race, and the later full-snapshot
/// write wins entirely — a documented limitation of this backend, not
/// corrected invisibly. Callers needing atomicity must provide it
/// externally.
#[derive(Clone)]
pub struct FileBackend {
    inner: Arc<FileBackendInner>,
}

struct FileBackendInner {
    data_dir: PathBuf,
}

impl FileBackend {
    /// Opens the backend, creating the data directory when needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        log::debug!("File backend opened at {}", data_dir.display());
        Ok(FileBackend {
            inner: Arc::new(FileBackendInner { data_dir }),
        })
    }

    /// Path of the file holding a collection.
    pub fn collection_path(&self, collection: &str) -> PathBuf {
        self.inner
            .data_dir
            .join(format!("{}.{}", collection, COLLECTION_FILE_EXTENSION))
    }

    fn read_collection(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let documents = serde_json::from_str(&content)?;
        Ok(documents)
    }

    fn write_collection(&self, collection: &str, documents: &[Document]) -> StoreResult<()> {
        let path = self.collection_path(collection);
        let content = serde_json::to_string_pretty(documents)?;
        fs::write(&path, content)?;
        Ok(())
    }
}

/// Applies skip and limit to an already filtered and sorted result set.
/// Skip past the end yields an empty sequence; a limit of 0 or no limit
/// returns all remaining documents.
fn paginate(documents: Vec<Document>, options: &FindOptions) -> Vec<Document> {
    let skip = options.skip.unwrap_or(0) as usize;
    let iter = documents.into_iter().skip(skip);
    if options.is_bounded() {
        iter.take(options.limit.unwrap_or(0) as usize).collect()
    } else {
        iter.collect()
    }
}

fn text_score(document: &Document, term: &str) -> i64 {
    TEXT_SCORE_WEIGHTS
        .iter()
        .map(|(field, weight)| {
            let hit = document
                .get_opt(field)
                .and_then(Value::as_str)
                .is_some_and(|s| s.to_lowercase().contains(term));
            if hit {
                *weight
            } else {
                0
            }
        })
        .sum()
}

impl BackendProvider for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        filter.validate()?;
        let documents = self.read_collection(collection)?;
        Ok(documents.into_iter().find(|doc| filter.matches(doc)))
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        filter.validate()?;
        let mut documents = self.read_collection(collection)?;
        documents.retain(|doc| filter.matches(doc));

        if let Some((field, order)) = &options.sort_by {
            // a document without the sort field sorts as the empty string
            sort_by_field(&mut documents, field, *order, &Value::String(String::new()));
        }

        Ok(paginate(documents, options))
    }

    fn insert_one(&self, collection: &str, mut document: Document) -> StoreResult<InsertResult> {
        let mut documents = self.read_collection(collection)?;

        if !document.contains_key(DOC_ID) {
            document.insert(DOC_ID, uuid::Uuid::new_v4().to_string());
        }
        let id = document.get(DOC_ID);

        documents.push(document);
        self.write_collection(collection, &documents)?;
        Ok(InsertResult::new(id))
    }

    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<UpdateResult> {
        filter.validate()?;
        let fields = update_fields(update)?;
        let mut documents = self.read_collection(collection)?;

        match documents.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                let before = documents[index].clone();
                documents[index].merge(&fields);
                let modified = documents[index] != before;
                self.write_collection(collection, &documents)?;
                Ok(UpdateResult::new(1, modified as u64))
            }
            None => Ok(UpdateResult::new(0, 0)),
        }
    }

    fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<Option<Document>> {
        filter.validate()?;
        let fields = update_fields(update)?;
        let mut documents = self.read_collection(collection)?;

        match documents.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                documents[index].merge(&fields);
                let updated = documents[index].clone();
                self.write_collection(collection, &documents)?;
                Ok(Some(updated))
            }
            None => Ok(None),
        }
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult> {
        filter.validate()?;
        let mut documents = self.read_collection(collection)?;

        match documents.iter().position(|doc| filter.matches(doc)) {
            Some(index) => {
                documents.remove(index);
                self.write_collection(collection, &documents)?;
                Ok(DeleteResult::new(1))
            }
            None => Ok(DeleteResult::new(0)),
        }
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult> {
        filter.validate()?;
        let mut documents = self.read_collection(collection)?;
        let before = documents.len();

        documents.retain(|doc| !filter.matches(doc));
        let deleted = (before - documents.len()) as u64;
        self.write_collection(collection, &documents)?;
        Ok(DeleteResult::new(deleted))
    }

    fn count_documents(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        filter.validate()?;
        let documents = self.read_collection(collection)?;
        Ok(documents.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Filter,
    ) -> StoreResult<BTreeSet<Value>> {
        filter.validate()?;
        let documents = self.read_collection(collection)?;

        let values = documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .filter_map(|doc| doc.get_opt(field))
            .filter(|value| !value.is_null())
            .cloned()
            .collect();
        Ok(values)
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[PipelineStage],
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let snapshot = self.read_collection(collection)?;
        let mut rows = run_pipeline(snapshot, pipeline)?;

        if let Some((field, order)) = &options.sort_by {
            sort_by_field(&mut rows, field, *order, &Value::I64(0));
        }

        Ok(paginate(rows, options))
    }

    fn text_search(
        &self,
        collection: &str,
        term: &str,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        let documents = self.read_collection(collection)?;
        let term = term.to_lowercase();

        let mut scored: Vec<(Document, i64)> = documents
            .into_iter()
            .filter_map(|doc| {
                let score = text_score(&doc, &term);
                if score > 0 {
                    Some((doc, score))
                } else {
                    None
                }
            })
            .collect();

        // stable sort keeps natural order between equal scores
        scored.sort_by_key(|(_, score)| std::cmp::Reverse(*score));

        let mut results: Vec<Document> = scored.into_iter().map(|(doc, _)| doc).collect();
        if limit > 0 {
            results.truncate(limit as usize);
        }
        Ok(results)
    }

    fn close(&self) -> StoreResult<()> {
        log::debug!(
            "File backend at {} closed",
            self.inner.data_dir.display()
        );
        Ok(())
    }
}
