use crate::common::Value;
use crate::errors::{ErrorKind, StoreError, StoreResult};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::fmt::{Debug, Display, Formatter};

/// Represents a stored record: an ordered mapping of field name to [Value].
///
/// Field order is insertion order and is preserved through serialization,
/// so a document written to the flat-file layout reads back exactly as it
/// was written. Documents have no enforced schema; nested one-to-many
/// relations are embedded as array-valued fields rather than referenced by
/// foreign key.
///
/// The `_id` field is the backend-native identifier. It is assigned at
/// insertion when absent and replaced by the single external `id` field on
/// the read path (see the identity normalizer).
///
/// # Examples
///
/// ```ignore
/// let mut doc = Document::new();
/// doc.put("name", "Japan")?;
/// doc.put("published", true)?;
/// assert_eq!(doc.get("name"), Value::from("Japan"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: IndexMap<String, Value>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Document {
            fields: IndexMap::new(),
        }
    }

    /// Checks if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields in the document.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Associates the specified value with the specified field in this
    /// document. If the field already exists, its value is replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is empty.
    pub fn put<T: Into<Value>>(&mut self, key: impl Into<String>, value: T) -> StoreResult<()> {
        let key = key.into();
        if key.is_empty() {
            log::error!("Document does not support empty key");
            return Err(StoreError::new(
                "Document does not support empty key",
                ErrorKind::InvalidOperation,
            ));
        }
        self.fields.insert(key, value.into());
        Ok(())
    }

    /// Inserts a field without key validation. Used internally where the
    /// key is a known constant.
    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Returns the value associated with the field, or [Value::Null] if
    /// the document contains no such field.
    pub fn get(&self, key: &str) -> Value {
        self.fields.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Returns a reference to the value associated with the field, if any.
    /// Unlike [Document::get], an absent field and an explicit null are
    /// distinguishable here.
    pub fn get_opt(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Checks if the document contains the field.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Removes the field and returns its value, preserving the order of
    /// the remaining fields.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.shift_remove(key)
    }

    /// Applies a shallow field-level merge: every field in `fields`
    /// replaces the value stored under the same name wholesale, whatever
    /// its type. Sequence-valued fields are therefore replaced, not
    /// concatenated, and applying the same merge twice yields the same
    /// document as applying it once.
    pub fn merge(&mut self, fields: &Document) {
        for (key, value) in fields.iter() {
            self.fields.insert(key.clone(), value.clone());
        }
    }

    /// Iterates over `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.fields.iter()
    }

    /// Iterates over field names in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.fields.keys()
    }
}

impl PartialOrd for Document {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Document {
    fn cmp(&self, other: &Self) -> Ordering {
        // lexicographic over (field, value) pairs sorted by field name, so
        // the order agrees with equality, which ignores insertion order
        let mut left: Vec<(&String, &Value)> = self.fields.iter().collect();
        let mut right: Vec<(&String, &Value)> = other.fields.iter().collect();
        left.sort_by(|a, b| a.0.cmp(b.0));
        right.sort_by(|a, b| a.0.cmp(b.0));
        left.cmp(&right)
    }
}

impl Debug for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Display for Document {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        write!(f, "{}", json)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Strips the quotes `stringify!` adds around string-literal keys in the
/// [doc!](crate::doc) macro.
pub fn normalize(key: &str) -> String {
    key.trim_matches('"').to_string()
}

/// Creates a [Document] from field-value pairs.
///
/// Keys can be identifiers or string literals; values can be literals,
/// parenthesized expressions, nested `{ ... }` documents, or `[ ... ]`
/// arrays.
///
/// # Examples
///
/// ```ignore
/// let doc = doc!{
///     name: "Japan",
///     region: "Asia",
///     published: true,
///     sections: [
///         { title: "Overview", order: 1 },
///     ],
/// };
/// ```
#[macro_export]
macro_rules! doc {
    () => {
        $crate::collection::Document::new()
    };

    ($($key:tt : $value:tt),* $(,)?) => {
        {
            #[allow(unused_imports)]
            use $crate::doc_value;

            let mut doc = $crate::collection::Document::new();
            $(
                doc.put($crate::collection::normalize(stringify!($key)), $crate::doc_value!($value))
                    .expect("failed to put value in document");
            )*
            doc
        }
    };
}

/// Helper macro converting values for the [doc!](crate::doc) macro.
/// Handles nested documents, arrays, and expressions.
#[macro_export]
macro_rules! doc_value {
    // match a nested document
    ({ $($key:tt : $value:tt),* $(,)? }) => {
        $crate::common::Value::Document($crate::doc!{ $($key : $value),* })
    };

    // match an array of values
    ([ $($value:tt),* $(,)? ]) => {
        $crate::common::Value::Array(vec![$($crate::doc_value!($value)),*])
    };

    // match an expression (variable, literal, parenthesized arithmetic, ...)
    ($value:expr) => {
        $crate::common::Value::from($value)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc;

    #[test]
    fn test_new_document_is_empty() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.len(), 0);
    }

    #[test]
    fn test_put_and_get() {
        let mut doc = Document::new();
        doc.put("name", "Japan").unwrap();
        doc.put("population", 125_700_000i64).unwrap();

        assert_eq!(doc.get("name"), Value::from("Japan"));
        assert_eq!(doc.get("population"), Value::I64(125_700_000));
        assert_eq!(doc.get("missing"), Value::Null);
        assert!(doc.get_opt("missing").is_none());
    }

    #[test]
    fn test_put_rejects_empty_key() {
        let mut doc = Document::new();
        let result = doc.put("", 1);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            &crate::errors::ErrorKind::InvalidOperation
        );
    }

    #[test]
    fn test_put_replaces_existing_value() {
        let mut doc = doc! { status: "draft" };
        doc.put("status", "published").unwrap();
        assert_eq!(doc.get("status"), Value::from("published"));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut doc = doc! { a: 1, b: 2, c: 3 };
        assert_eq!(doc.remove("b"), Some(Value::I64(2)));
        assert_eq!(doc.remove("b"), None);
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_field_order_preserved() {
        let doc = doc! { z: 1, a: 2, m: 3 };
        let keys: Vec<&String> = doc.keys().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_json_round_trip_is_plain_object() {
        let doc = doc! {
            slug: "japan",
            name: "Japan",
            published: true,
            sections: [ { title: "Overview", order: 1 } ],
        };

        let json = serde_json::to_string(&doc).unwrap();
        assert_eq!(
            json,
            r#"{"slug":"japan","name":"Japan","published":true,"sections":[{"title":"Overview","order":1}]}"#
        );

        let parsed: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
    }

    #[test]
    fn test_merge_replaces_fields_wholesale() {
        let mut doc = doc! {
            name: "Japan",
            sections: [ { title: "Old", order: 1 } ],
            region: "Asia",
        };
        let update = doc! {
            name: "Nippon",
            sections: [ { title: "New", order: 1 }, { title: "Extra", order: 2 } ],
        };

        doc.merge(&update);

        assert_eq!(doc.get("name"), Value::from("Nippon"));
        assert_eq!(doc.get("region"), Value::from("Asia"));
        let sections = doc.get("sections");
        assert_eq!(sections.as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut first = doc! { a: 1, tags: ["x"] };
        let mut second = first.clone();
        let update = doc! { a: 2, tags: ["y", "z"] };

        first.merge(&update);
        second.merge(&update);
        second.merge(&update);

        assert_eq!(first, second);
    }

    #[test]
    fn test_doc_macro_with_string_literal_keys() {
        let doc = doc! { "visa_required": false };
        assert_eq!(doc.get("visa_required"), Value::Bool(false));
    }

    #[test]
    fn test_doc_macro_nested() {
        let doc = doc! {
            location: {
                city: "Tokyo",
                coordinates: [(139.7), (35.7)],
            },
        };
        let location = doc.get("location");
        let location = location.as_document().unwrap();
        assert_eq!(location.get("city"), Value::from("Tokyo"));
        assert_eq!(
            location.get("coordinates"),
            Value::Array(vec![Value::F64(139.7), Value::F64(35.7)])
        );
    }

    #[test]
    fn test_document_ordering_is_deterministic() {
        let a = doc! { x: 1 };
        let b = doc! { x: 2 };
        assert!(a < b);
        assert_eq!(a.cmp(&a), Ordering::Equal);
    }
}
