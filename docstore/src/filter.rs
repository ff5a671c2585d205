use crate::collection::Document;
use crate::common::{Value, TEXT_SEARCH_FIELDS};
use crate::errors::{ErrorKind, StoreError, StoreResult};
use indexmap::IndexMap;

/// Reserved filter key for free-text matching.
pub const TEXT_OPERATOR: &str = "$text";
/// Key carrying the search term inside a `$text` operator document.
pub const TEXT_SEARCH_KEY: &str = "$search";

/// An equality-based predicate over documents.
///
/// A filter is a closed grammar: a mapping from field name to a literal
/// value (compared for equality, by value), plus an optional free-text
/// term matched case-insensitively as a substring over the canonical
/// searchable fields (`name`, `summary`). All conditions are AND-ed; a
/// document missing a filtered field does not match.
///
/// Anything else — logical OR, ranges, `$in`, existence checks — is
/// outside the grammar and fails with
/// [ErrorKind::UnsupportedQuery](crate::errors::ErrorKind) when the filter
/// is validated, rather than being silently ignored. The remote backend
/// forwards translated filters to its driver, which may accept more, but
/// that extra power is not portable across backends.
///
/// # Examples
///
/// ```rust,ignore
/// use docstore::filter::Filter;
///
/// let filter = Filter::new()
///     .eq("published", true)
///     .eq("region", "Asia");
///
/// let search = Filter::new().text("visa on arrival");
/// let everything = Filter::all();
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    conditions: IndexMap<String, Value>,
    text: Option<String>,
}

impl Filter {
    /// Creates an empty filter. An empty filter matches every document.
    pub fn new() -> Self {
        Filter::default()
    }

    /// Creates a filter that matches all documents.
    pub fn all() -> Self {
        Filter::default()
    }

    /// Adds an equality condition on a field.
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// Sets the free-text search term.
    pub fn text(mut self, term: impl Into<String>) -> Self {
        self.text = Some(term.into());
        self
    }

    /// Checks if the filter has no conditions and no text term.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.text.is_none()
    }

    /// The free-text search term, if one is set.
    pub fn text_term(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub(crate) fn conditions(&self) -> &IndexMap<String, Value> {
        &self.conditions
    }

    /// Parses a filter from its document (map) form.
    ///
    /// The `$text` key maps to the text term and must carry a
    /// `{"$search": <string>}` document. Every other key is an equality
    /// condition. Any other reserved `$` key fails with
    /// `UnsupportedQuery`.
    pub fn from_document(doc: &Document) -> StoreResult<Filter> {
        let mut filter = Filter::new();
        for (key, value) in doc.iter() {
            if key == TEXT_OPERATOR {
                let term = value
                    .as_document()
                    .map(|d| d.get(TEXT_SEARCH_KEY))
                    .and_then(|v| v.as_str().map(str::to_string));
                match term {
                    Some(term) => filter.text = Some(term),
                    None => {
                        log::error!("Malformed $text operator: {}", value);
                        return Err(StoreError::new(
                            "$text requires a {\"$search\": <string>} document",
                            ErrorKind::UnsupportedQuery,
                        ));
                    }
                }
            } else {
                filter.conditions.insert(key.clone(), value.clone());
            }
        }
        filter.validate()?;
        Ok(filter)
    }

    /// Checks that the filter stays inside the supported grammar:
    /// equality conditions on plain fields plus the `$text` term.
    ///
    /// # Errors
    ///
    /// `UnsupportedQuery` for reserved `$` keys (`$or`, ...) or
    /// operator-shaped condition values (`{"$gt": 5}`, ...).
    pub fn validate(&self) -> StoreResult<()> {
        for (key, value) in &self.conditions {
            if key.starts_with('$') {
                log::error!("Unsupported query operator: {}", key);
                return Err(StoreError::new(
                    &format!("Query operator {} is not supported", key),
                    ErrorKind::UnsupportedQuery,
                ));
            }
            if let Value::Document(doc) = value {
                if let Some(op) = doc.keys().find(|k| k.starts_with('$')) {
                    log::error!("Unsupported query operator {} on field {}", op, key);
                    return Err(StoreError::new(
                        &format!("Query operator {} is not supported", op),
                        ErrorKind::UnsupportedQuery,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Evaluates the filter against a document.
    ///
    /// A document matches iff every equality condition names a field the
    /// document has with an equal value, and, if a text term is set, the
    /// term is a case-insensitive substring of one of the canonical
    /// searchable fields.
    pub fn matches(&self, document: &Document) -> bool {
        for (key, value) in &self.conditions {
            match document.get_opt(key) {
                Some(stored) if stored == value => {}
                _ => return false,
            }
        }

        if let Some(term) = &self.text {
            let term = term.to_lowercase();
            let found = TEXT_SEARCH_FIELDS.iter().any(|field| {
                document
                    .get_opt(field)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&term))
            });
            if !found {
                return false;
            }
        }

        true
    }
}
