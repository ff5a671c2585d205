pub mod constants;
pub mod sort_order;
pub mod value;

pub use constants::*;
pub use sort_order::SortOrder;
pub use value::Value;

use parking_lot::RwLock;
use std::sync::Arc;

/// A shared, lock-protected value.
pub type Atomic<T> = Arc<RwLock<T>>;

/// Wraps a value in an [Atomic] cell.
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_read_write() {
        let cell = atomic(1);
        assert_eq!(*cell.read(), 1);
        *cell.write() = 2;
        assert_eq!(*cell.read(), 2);
    }

    #[test]
    fn test_atomic_shared_between_clones() {
        let cell = atomic(String::from("a"));
        let other = cell.clone();
        other.write().push('b');
        assert_eq!(*cell.read(), "ab");
    }
}
