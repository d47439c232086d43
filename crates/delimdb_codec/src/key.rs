//! Store key selection.

use crate::record::Record;
use crate::schema::Schema;
use crate::value::Value;

/// Returns the value that keys `record` in a store.
///
/// The first field marked key (and not ignored) supplies the value, read
/// from that field itself; a field's explicit column index only affects
/// where it sits in a line. With no key-eligible field the first
/// declared field is used. A [`Value::Null`] result means the record must
/// not be stored.
pub fn select_key<R: Record>(record: &R) -> Value {
    let schema = R::schema();
    if schema.is_empty() {
        return Value::Null;
    }
    record.get(schema.key_field())
}

/// Returns the key of a parsed row, given its values in declaration order.
///
/// Same field choice as [`select_key`], except that an empty cell in the
/// key field leaves the first declared field's value as the key.
#[must_use]
pub fn row_key(schema: &Schema, values: &[Value]) -> Value {
    match values.get(schema.key_field()) {
        Some(value) if !value.is_null() => value.clone(),
        _ => values.first().cloned().unwrap_or(Value::Null),
    }
}
