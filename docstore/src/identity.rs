use crate::collection::Document;
use crate::common::{Value, DOC_EXTERNAL_ID, DOC_ID, DOC_SLUG};
use std::sync::Arc;

/// Reconciles heterogeneous identity representations into one contract.
///
/// Input documents may carry a backend-native identifier (`_id`), a
/// domain slug, and/or an externally generated `id`. After normalization a
/// document carries exactly one externally visible identifier field:
///
/// 1. an existing `id` is kept as-is;
/// 2. otherwise the `slug` becomes the `id`;
/// 3. otherwise the backend-native `_id` is stringified into the `id`.
///
/// The backend-native `_id` is stripped from the output entirely, and
/// every configured nested-sequence field is guaranteed to be present as
/// an array (an empty one when absent or null), because downstream
/// consumers index into those fields unconditionally.
///
/// Normalization is idempotent: re-normalizing an already-normalized
/// document is a no-op. The storage adapter applies it to every find-path
/// read.
#[derive(Clone, Debug, Default)]
pub struct IdentityNormalizer {
    sequence_fields: Arc<Vec<String>>,
}

impl IdentityNormalizer {
    /// Creates a normalizer with the expected nested-sequence field names.
    pub fn new<I, S>(sequence_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            sequence_fields: Arc::new(sequence_fields.into_iter().map(Into::into).collect()),
        }
    }

    /// The configured nested-sequence field names.
    pub fn sequence_fields(&self) -> &[String] {
        &self.sequence_fields
    }

    /// Normalizes a document in place.
    pub fn normalize(&self, document: &mut Document) {
        let native_id = document.remove(DOC_ID);

        let has_external_id = !document.get(DOC_EXTERNAL_ID).is_null();
        if !has_external_id {
            let external_id = match document.get_opt(DOC_SLUG) {
                Some(slug) if !slug.is_null() => Some(slug.clone()),
                _ => native_id.filter(|v| !v.is_null()).map(|v| match v {
                    Value::String(s) => Value::String(s),
                    other => Value::String(other.to_string()),
                }),
            };
            if let Some(id) = external_id {
                document.insert(DOC_EXTERNAL_ID, id);
            }
        }

        for field in self.sequence_fields.iter() {
            let missing = matches!(document.get_opt(field), None | Some(Value::Null));
            if missing {
                document.insert(field.clone(), Value::Array(Vec::new()));
            }
        }
    }
}
