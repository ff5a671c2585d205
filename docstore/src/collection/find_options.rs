use crate::common::SortOrder;

/// Options controlling find operations: sorting and pagination.
///
/// `FindOptions` supports method chaining; chain order is irrelevant and
/// the last value set per axis wins. A limit of 0 (or no limit) means
/// "return all remaining documents".
///
/// # Examples
///
/// ```rust,ignore
/// use docstore::collection::FindOptions;
/// use docstore::SortOrder;
///
/// let options = FindOptions::new()
///     .sort_by("name", SortOrder::Descending)
///     .skip(10)
///     .limit(20);
///
/// // Or use the convenience constructors
/// let options = order_by("name", SortOrder::Ascending);
/// let options = skip_by(5);
/// let options = limit_to(100);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub(crate) sort_by: Option<(String, SortOrder)>,
    pub(crate) skip: Option<u64>,
    pub(crate) limit: Option<u64>,
}

/// Creates `FindOptions` with sorting by a field.
pub fn order_by(field_name: &str, sort_order: SortOrder) -> FindOptions {
    FindOptions {
        sort_by: Some((field_name.to_string(), sort_order)),
        skip: None,
        limit: None,
    }
}

/// Creates `FindOptions` that skips a number of results.
pub fn skip_by(skip: u64) -> FindOptions {
    FindOptions {
        sort_by: None,
        skip: Some(skip),
        limit: None,
    }
}

/// Creates `FindOptions` that limits the number of results.
///
/// Combined with skip for pagination: skip(10).limit(20) returns results
/// 11-30.
pub fn limit_to(limit: u64) -> FindOptions {
    FindOptions {
        sort_by: None,
        skip: None,
        limit: Some(limit),
    }
}

impl FindOptions {
    /// Creates new `FindOptions` with no sorting or pagination.
    pub fn new() -> FindOptions {
        FindOptions::default()
    }

    /// Sets the number of documents to skip.
    pub fn skip(mut self, skip: u64) -> FindOptions {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of documents to return. A limit of 0 means
    /// unbounded.
    pub fn limit(mut self, limit: u64) -> FindOptions {
        self.limit = Some(limit);
        self
    }

    /// Sets the sort field and direction. Only one sort axis is supported;
    /// setting it again replaces the previous one.
    pub fn sort_by(mut self, field_name: &str, sort_order: SortOrder) -> FindOptions {
        self.sort_by = Some((field_name.to_string(), sort_order));
        self
    }

    /// Whether a limit is in effect (a limit of 0 counts as unbounded).
    pub(crate) fn is_bounded(&self) -> bool {
        matches!(self.limit, Some(n) if n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_by() {
        let options = order_by("name", SortOrder::Ascending);
        assert_eq!(
            options.sort_by,
            Some(("name".to_string(), SortOrder::Ascending))
        );
        assert!(options.skip.is_none());
        assert!(options.limit.is_none());
    }

    #[test]
    fn test_skip_by() {
        let options = skip_by(10);
        assert_eq!(options.skip, Some(10));
        assert!(options.sort_by.is_none());
        assert!(options.limit.is_none());
    }

    #[test]
    fn test_limit_to() {
        let options = limit_to(5);
        assert_eq!(options.limit, Some(5));
        assert!(options.skip.is_none());
    }

    #[test]
    fn test_chaining_last_set_wins() {
        let options = FindOptions::new()
            .skip(3)
            .limit(10)
            .skip(7)
            .sort_by("a", SortOrder::Ascending)
            .sort_by("b", SortOrder::Descending);

        assert_eq!(options.skip, Some(7));
        assert_eq!(options.limit, Some(10));
        assert_eq!(
            options.sort_by,
            Some(("b".to_string(), SortOrder::Descending))
        );
    }

    #[test]
    fn test_zero_limit_is_unbounded() {
        assert!(!FindOptions::new().limit(0).is_bounded());
        assert!(!FindOptions::new().is_bounded());
        assert!(FindOptions::new().limit(1).is_bounded());
    }
}
