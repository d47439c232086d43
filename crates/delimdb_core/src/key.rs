//! Store key types.

use std::fmt::Debug;
use std::hash::Hash;

use delimdb_codec::{FromValue, Value};

/// A type records can be stored under.
///
/// Keys convert from the value the key selector picks and back into the
/// cell written as a child row's owner column. Implemented for every type
/// meeting the bounds, e.g. `String`, `i64`, `u64`, `u32`.
pub trait StoreKey: FromValue + Into<Value> + Clone + Eq + Hash + Debug + Send + Sync + 'static {
    /// Renders the key as cell text.
    fn to_cell(&self) -> String {
        self.clone().into().to_cell()
    }
}

impl<T> StoreKey for T where
    T: FromValue + Into<Value> + Clone + Eq + Hash + Debug + Send + Sync + 'static
{
}
