use crate::aggregate::{GroupKey, PipelineStage};
use crate::collection::{DeleteResult, Document, FindOptions, InsertResult, UpdateResult};
use crate::common::{SortOrder, Value, GROUP_ID};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::{Filter, TEXT_OPERATOR, TEXT_SEARCH_KEY};
use crate::store::{update_fields, BackendKind, BackendProvider};
use bson::{Bson, Document as BsonDocument};
use mongodb::options::ReturnDocument;
use mongodb::sync::{Client, Database};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Remote document-store backend.
///
/// A thin adapter delegating every operation to the official driver's
/// equivalent call, translating the common skip/limit/sort cursor state
/// into the driver's find options and reshaping the driver's native
/// results (insert/update/delete outcomes, ObjectIds, timestamps) into
/// the common result and [Value] shapes. Connections are pooled by the
/// driver; the pool is small and fixed.
///
/// Free-text search delegates to the driver's `$text` operator and
/// therefore requires a text index over the searchable fields,
/// provisioned by deployment tooling outside this layer.
#[derive(Clone)]
pub struct RemoteBackend {
    inner: Arc<RemoteBackendInner>,
}

struct RemoteBackendInner {
    // kept alive for the pool; all calls go through the database handle
    _client: Client,
    database: Database,
}

impl RemoteBackend {
    /// Connects to the remote document store and probes it.
    ///
    /// The probe is a `ping` command bounded by `probe_timeout` (applied
    /// as the driver's server-selection timeout). Any failure — bad URI,
    /// unreachable host, timeout — maps to
    /// [ErrorKind::BackendUnavailable] so the caller can fall back to the
    /// file backend.
    pub fn connect(
        uri: &str,
        database: &str,
        probe_timeout: Duration,
        pool_size: u32,
    ) -> StoreResult<Self> {
        let uri = configured_uri(uri, probe_timeout, pool_size);

        let client = Client::with_uri_str(&uri).map_err(|err| {
            log::error!("Invalid remote store URI: {}", err);
            StoreError::new_with_cause(
                "Invalid remote store URI",
                ErrorKind::BackendUnavailable,
                err.into(),
            )
        })?;

        let db = client.database(database);
        db.run_command(bson::doc! { "ping": 1 }).run().map_err(|err| {
            log::error!("Remote store connectivity probe failed: {}", err);
            StoreError::new_with_cause(
                "Remote store is unreachable",
                ErrorKind::BackendUnavailable,
                err.into(),
            )
        })?;

        log::debug!("Remote backend connected to database {}", database);
        Ok(RemoteBackend {
            inner: Arc::new(RemoteBackendInner {
                _client: client,
                database: db,
            }),
        })
    }

    fn collection(&self, name: &str) -> mongodb::sync::Collection<BsonDocument> {
        self.inner.database.collection::<BsonDocument>(name)
    }
}

/// Appends the pool-size and timeout options to the connection string,
/// leaving options the caller already set untouched.
fn configured_uri(uri: &str, probe_timeout: Duration, pool_size: u32) -> String {
    let mut uri = uri.to_string();
    append_uri_option(
        &mut uri,
        "serverSelectionTimeoutMS",
        &probe_timeout.as_millis().to_string(),
    );
    append_uri_option(
        &mut uri,
        "connectTimeoutMS",
        &probe_timeout.as_millis().to_string(),
    );
    append_uri_option(&mut uri, "maxPoolSize", &pool_size.to_string());
    uri
}

fn append_uri_option(uri: &mut String, key: &str, value: &str) {
    if uri.contains(key) {
        return;
    }
    uri.push(if uri.contains('?') { '&' } else { '?' });
    uri.push_str(key);
    uri.push('=');
    uri.push_str(value);
}

fn sort_direction(order: SortOrder) -> i32 {
    match order {
        SortOrder::Ascending => 1,
        SortOrder::Descending => -1,
    }
}

pub(crate) fn value_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::I64(n) => Bson::Int64(*n),
        Value::F64(n) => Bson::Double(*n),
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(value_to_bson).collect()),
        Value::Document(doc) => Bson::Document(document_to_bson(doc)),
    }
}

pub(crate) fn document_to_bson(document: &Document) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (key, value) in document.iter() {
        out.insert(key.clone(), value_to_bson(value));
    }
    out
}

/// Converts a driver value into the common [Value] shape. Identifiers and
/// other non-JSON types collapse to their canonical string form: ObjectId
/// to hex, timestamps to RFC 3339, Decimal128 to its decimal string.
pub(crate) fn bson_to_value(bson: Bson) -> Value {
    match bson {
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(n) => Value::I64(n as i64),
        Bson::Int64(n) => Value::I64(n),
        Bson::Double(n) => Value::F64(n),
        Bson::String(s) => Value::String(s),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_value).collect()),
        Bson::Document(doc) => Value::Document(bson_to_document(doc)),
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => Value::String(
            dt.try_to_rfc3339_string()
                .unwrap_or_else(|_| dt.to_string()),
        ),
        Bson::Decimal128(d) => Value::String(d.to_string()),
        other => Value::String(other.to_string()),
    }
}

pub(crate) fn bson_to_document(document: BsonDocument) -> Document {
    let mut out = Document::new();
    for (key, value) in document {
        out.insert(key, bson_to_value(value));
    }
    out
}

pub(crate) fn filter_to_bson(filter: &Filter) -> BsonDocument {
    let mut out = BsonDocument::new();
    for (key, value) in filter.conditions() {
        out.insert(key.clone(), value_to_bson(value));
    }
    if let Some(term) = filter.text_term() {
        let mut text = BsonDocument::new();
        text.insert(TEXT_SEARCH_KEY, Bson::String(term.to_string()));
        out.insert(TEXT_OPERATOR, Bson::Document(text));
    }
    out
}

fn stage_to_bson(stage: &PipelineStage) -> BsonDocument {
    match stage {
        PipelineStage::Match(filter) => {
            bson::doc! { "$match": filter_to_bson(filter) }
        }
        PipelineStage::Group(GroupKey::Everything) => {
            bson::doc! { "$group": { "_id": Bson::Null, "count": { "$sum": 1 } } }
        }
        PipelineStage::Group(GroupKey::Field(field)) => {
            bson::doc! { "$group": { "_id": format!("${}", field), "count": { "$sum": 1 } } }
        }
        PipelineStage::Sort { field, order } => {
            let mut spec = BsonDocument::new();
            spec.insert(field.clone(), sort_direction(*order));
            bson::doc! { "$sort": spec }
        }
    }
}

/// Renames the driver's `_id` group key to the common `id` key, keeping
/// the remaining fields in place.
fn reshape_group_row(row: Document) -> Document {
    let mut out = Document::new();
    for (key, value) in row.iter() {
        if key == "_id" {
            out.insert(GROUP_ID, value.clone());
        } else {
            out.insert(key.clone(), value.clone());
        }
    }
    out
}

impl BackendProvider for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let found = self
            .collection(collection)
            .find_one(filter_to_bson(filter))
            .run()?;
        Ok(found.map(bson_to_document))
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let binding = self.collection(collection);
        let mut action = binding.find(filter_to_bson(filter));

        if let Some((field, order)) = &options.sort_by {
            let mut sort = BsonDocument::new();
            sort.insert(field.clone(), sort_direction(*order));
            action = action.sort(sort);
        }
        if let Some(skip) = options.skip {
            action = action.skip(skip);
        }
        if options.is_bounded() {
            action = action.limit(options.limit.unwrap_or(0) as i64);
        }

        let cursor = action.run()?;
        let mut documents = Vec::new();
        for document in cursor {
            documents.push(bson_to_document(document?));
        }
        Ok(documents)
    }

    fn insert_one(&self, collection: &str, document: Document) -> StoreResult<InsertResult> {
        let result = self
            .collection(collection)
            .insert_one(document_to_bson(&document))
            .run()?;
        Ok(InsertResult::new(bson_to_value(result.inserted_id)))
    }

    fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<UpdateResult> {
        let fields = update_fields(update)?;
        let result = self
            .collection(collection)
            .update_one(
                filter_to_bson(filter),
                bson::doc! { "$set": document_to_bson(&fields) },
            )
            .run()?;
        Ok(UpdateResult::new(result.matched_count, result.modified_count))
    }

    fn find_one_and_update(
        &self,
        collection: &str,
        filter: &Filter,
        update: &Document,
    ) -> StoreResult<Option<Document>> {
        let fields = update_fields(update)?;
        let updated = self
            .collection(collection)
            .find_one_and_update(
                filter_to_bson(filter),
                bson::doc! { "$set": document_to_bson(&fields) },
            )
            .return_document(ReturnDocument::After)
            .run()?;
        Ok(updated.map(bson_to_document))
    }

    fn delete_one(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult> {
        let result = self
            .collection(collection)
            .delete_one(filter_to_bson(filter))
            .run()?;
        Ok(DeleteResult::new(result.deleted_count))
    }

    fn delete_many(&self, collection: &str, filter: &Filter) -> StoreResult<DeleteResult> {
        let result = self
            .collection(collection)
            .delete_many(filter_to_bson(filter))
            .run()?;
        Ok(DeleteResult::new(result.deleted_count))
    }

    fn count_documents(&self, collection: &str, filter: &Filter) -> StoreResult<u64> {
        let count = self
            .collection(collection)
            .count_documents(filter_to_bson(filter))
            .run()?;
        Ok(count)
    }

    fn distinct(
        &self,
        collection: &str,
        field: &str,
        filter: &Filter,
    ) -> StoreResult<BTreeSet<Value>> {
        let values = self
            .collection(collection)
            .distinct(field, filter_to_bson(filter))
            .run()?;
        Ok(values
            .into_iter()
            .map(bson_to_value)
            .filter(|value| !value.is_null())
            .collect())
    }

    fn aggregate(
        &self,
        collection: &str,
        pipeline: &[PipelineStage],
        options: &FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut stages: Vec<BsonDocument> = pipeline.iter().map(stage_to_bson).collect();

        // cursor options become trailing stages in the driver's dialect
        if let Some((field, order)) = &options.sort_by {
            let mut spec = BsonDocument::new();
            spec.insert(field.clone(), sort_direction(*order));
            stages.push(bson::doc! { "$sort": spec });
        }
        if let Some(skip) = options.skip {
            stages.push(bson::doc! { "$skip": skip as i64 });
        }
        if options.is_bounded() {
            stages.push(bson::doc! { "$limit": options.limit.unwrap_or(0) as i64 });
        }

        let grouped = pipeline
            .iter()
            .any(|stage| matches!(stage, PipelineStage::Group(_)));

        let cursor = self.collection(collection).aggregate(stages).run()?;
        let mut rows = Vec::new();
        for row in cursor {
            let row = bson_to_document(row?);
            rows.push(if grouped { reshape_group_row(row) } else { row });
        }
        Ok(rows)
    }

    fn text_search(
        &self,
        collection: &str,
        term: &str,
        limit: u64,
    ) -> StoreResult<Vec<Document>> {
        let filter = bson::doc! { "$text": { "$search": term } };
        let binding = self.collection(collection);
        let mut action = binding.find(filter);
        if limit > 0 {
            action = action.limit(limit as i64);
        }

        let cursor = action.run()?;
        let mut documents = Vec::new();
        for document in cursor {
            documents.push(bson_to_document(document?));
        }
        Ok(documents)
    }

    fn close(&self) -> StoreResult<()> {
        // the driver tears the pool down when the client drops
        log::debug!("Remote backend connection released");
        Ok(())
    }
}
