use crate::common::Value;

/// The result of an insert operation.
///
/// Carries the backend-native identifier assigned to the inserted
/// document: a generated UUID string on the file backend, or the driver's
/// inserted id on the remote backend. The external `id` field is produced
/// on the read path by the identity normalizer.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertResult {
    id: Value,
}

impl InsertResult {
    pub fn new(id: Value) -> Self {
        Self { id }
    }

    /// The identifier of the inserted document.
    pub fn id(&self) -> &Value {
        &self.id
    }
}

/// The result of an update operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    matched_count: u64,
    modified_count: u64,
}

impl UpdateResult {
    pub fn new(matched_count: u64, modified_count: u64) -> Self {
        Self {
            matched_count,
            modified_count,
        }
    }

    /// The number of documents the filter matched.
    pub fn matched_count(&self) -> u64 {
        self.matched_count
    }

    /// The number of documents actually changed. An update that leaves a
    /// matched document byte-identical counts as matched but not modified.
    pub fn modified_count(&self) -> u64 {
        self.modified_count
    }
}

/// The result of a delete operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    deleted_count: u64,
}

impl DeleteResult {
    pub fn new(deleted_count: u64) -> Self {
        Self { deleted_count }
    }

    /// The number of documents removed.
    pub fn deleted_count(&self) -> u64 {
        self.deleted_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_result() {
        let result = InsertResult::new(Value::from("abc-123"));
        assert_eq!(result.id(), &Value::from("abc-123"));
    }

    #[test]
    fn test_update_result() {
        let result = UpdateResult::new(1, 0);
        assert_eq!(result.matched_count(), 1);
        assert_eq!(result.modified_count(), 0);
    }

    #[test]
    fn test_delete_result() {
        let result = DeleteResult::new(4);
        assert_eq!(result.deleted_count(), 4);
    }
}
