pub mod cursor;
pub mod document;
pub mod find_options;
pub mod write_result;

pub use cursor::DocumentCursor;
pub use document::{normalize, Document};
pub use find_options::{limit_to, order_by, skip_by, FindOptions};
pub use write_result::{DeleteResult, InsertResult, UpdateResult};
