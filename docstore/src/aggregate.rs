use crate::collection::Document;
use crate::common::{SortOrder, Value, GROUP_COUNT, GROUP_ID};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use crate::filter::Filter;
use indexmap::IndexMap;

/// The grouping key of a `Group` pipeline stage.
#[derive(Clone, Debug, PartialEq)]
pub enum GroupKey {
    /// Group every input row into a single bucket (`_id: null` in driver
    /// notation).
    Everything,
    /// Group rows by the distinct values of a field.
    Field(String),
}

/// One step of an aggregation computation, applied in sequence.
///
/// The stage set is closed: matching, grouping with a count accumulator,
/// and sorting. Parsing the driver-native map form rejects anything else
/// with `UnsupportedQuery` instead of passing unknown stages through.
#[derive(Clone, Debug, PartialEq)]
pub enum PipelineStage {
    /// Keeps the rows matching a filter; same semantics as a find filter.
    Match(Filter),
    /// Collapses rows into `{id, count}` buckets. The count accumulator is
    /// the only one supported.
    Group(GroupKey),
    /// Orders rows by a field. A row missing the field sorts as integer 0.
    Sort {
        field: String,
        order: SortOrder,
    },
}

impl PipelineStage {
    /// Parses one stage from its document (map) form, e.g.
    /// `{"$match": {"published": true}}` or
    /// `{"$group": {"_id": "$region", "count": {"$sum": 1}}}`.
    pub fn from_document(stage: &Document) -> StoreResult<PipelineStage> {
        if stage.len() != 1 {
            log::error!("Pipeline stage must contain exactly one operator: {}", stage);
            return Err(StoreError::new(
                "Pipeline stage must contain exactly one operator",
                ErrorKind::UnsupportedQuery,
            ));
        }

        let (operator, body) = stage.iter().next().expect("stage has one entry");
        match operator.as_str() {
            "$match" => match body.as_document() {
                Some(conditions) => Ok(PipelineStage::Match(Filter::from_document(conditions)?)),
                None => Err(unsupported_stage("$match requires a document body")),
            },
            "$group" => match body.as_document() {
                Some(spec) => Ok(PipelineStage::Group(parse_group(spec)?)),
                None => Err(unsupported_stage("$group requires a document body")),
            },
            "$sort" => match body.as_document() {
                Some(spec) => parse_sort(spec),
                None => Err(unsupported_stage("$sort requires a document body")),
            },
            other => {
                log::error!("Unsupported pipeline stage: {}", other);
                Err(StoreError::new(
                    &format!("Pipeline stage {} is not supported", other),
                    ErrorKind::UnsupportedQuery,
                ))
            }
        }
    }

    /// Parses an ordered list of stage documents into a pipeline.
    pub fn parse_pipeline(stages: &[Document]) -> StoreResult<Vec<PipelineStage>> {
        stages.iter().map(PipelineStage::from_document).collect()
    }
}

fn unsupported_stage(message: &str) -> StoreError {
    log::error!("{}", message);
    StoreError::new(message, ErrorKind::UnsupportedQuery)
}

fn parse_group(spec: &Document) -> StoreResult<GroupKey> {
    let key = match spec.get_opt("_id") {
        Some(Value::Null) => GroupKey::Everything,
        Some(Value::String(s)) if s.starts_with('$') => GroupKey::Field(s[1..].to_string()),
        _ => {
            return Err(unsupported_stage(
                "$group _id must be null or a $-prefixed field reference",
            ))
        }
    };

    // the count accumulator is the only supported one
    for (field, accumulator) in spec.iter().filter(|(k, _)| *k != "_id") {
        let is_count_sum = field == GROUP_COUNT
            && accumulator
                .as_document()
                .is_some_and(|d| d.len() == 1 && d.get("$sum") == Value::I64(1));
        if !is_count_sum {
            log::error!("Unsupported accumulator {}: {}", field, accumulator);
            return Err(StoreError::new(
                &format!("Accumulator {} is not supported", field),
                ErrorKind::UnsupportedQuery,
            ));
        }
    }

    Ok(key)
}

fn parse_sort(spec: &Document) -> StoreResult<PipelineStage> {
    if spec.len() != 1 {
        return Err(unsupported_stage("$sort requires exactly one field"));
    }
    let (field, direction) = spec.iter().next().expect("sort spec has one entry");
    let order = match direction.as_i64() {
        Some(1) => SortOrder::Ascending,
        Some(-1) => SortOrder::Descending,
        _ => return Err(unsupported_stage("$sort direction must be 1 or -1")),
    };
    Ok(PipelineStage::Sort {
        field: field.clone(),
        order,
    })
}

/// Sorts documents by a field. The sort is stable; a document missing the
/// field sorts as `missing_default`.
pub(crate) fn sort_by_field(
    documents: &mut [Document],
    field: &str,
    order: SortOrder,
    missing_default: &Value,
) {
    documents.sort_by(|a, b| {
        let left = a.get_opt(field).unwrap_or(missing_default);
        let right = b.get_opt(field).unwrap_or(missing_default);
        match order {
            SortOrder::Ascending => left.cmp(right),
            SortOrder::Descending => right.cmp(left),
        }
    });
}

/// Executes a pipeline over an in-memory snapshot, one stage at a time,
/// each stage consuming the previous stage's output. The snapshot is never
/// written back; aggregation cannot mutate the underlying collection.
pub(crate) fn run_pipeline(
    snapshot: Vec<Document>,
    stages: &[PipelineStage],
) -> StoreResult<Vec<Document>> {
    let mut rows = snapshot;

    for stage in stages {
        match stage {
            PipelineStage::Match(filter) => {
                filter.validate()?;
                rows.retain(|doc| filter.matches(doc));
            }
            PipelineStage::Group(GroupKey::Everything) => {
                let mut row = Document::new();
                row.insert(GROUP_ID, Value::Null);
                row.insert(GROUP_COUNT, rows.len() as i64);
                rows = vec![row];
            }
            PipelineStage::Group(GroupKey::Field(field)) => {
                // one bucket per distinct value, in first-seen order
                let mut buckets: IndexMap<Value, i64> = IndexMap::new();
                for doc in &rows {
                    *buckets.entry(doc.get(field)).or_insert(0) += 1;
                }
                rows = buckets
                    .into_iter()
                    .map(|(key, count)| {
                        let mut row = Document::new();
                        row.insert(GROUP_ID, key);
                        row.insert(GROUP_COUNT, count);
                        row
                    })
                    .collect();
            }
            PipelineStage::Sort { field, order } => {
                sort_by_field(&mut rows, field, *order, &Value::I64(0));
            }
        }
    }

    Ok(rows)
}
