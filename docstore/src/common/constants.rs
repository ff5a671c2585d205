// doc constants
/// Backend-native identifier field. Stripped from documents on the read
/// path by the identity normalizer.
pub const DOC_ID: &str = "_id";
/// The single externally visible identifier field.
pub const DOC_EXTERNAL_ID: &str = "id";
/// Human-meaningful unique key a document may carry; preferred over the
/// backend-native identifier when producing the external id.
pub const DOC_SLUG: &str = "slug";

// text search constants
/// Canonical searchable fields for the `$text` filter operator.
pub const TEXT_SEARCH_FIELDS: [&str; 2] = ["name", "summary"];

// aggregation constants
/// Key carrying the group identity in aggregation output rows.
pub const GROUP_ID: &str = "id";
/// Key carrying the member count in aggregation output rows.
pub const GROUP_COUNT: &str = "count";

// file store constants
/// Extension of per-collection files in the file backend.
pub const COLLECTION_FILE_EXTENSION: &str = "json";
