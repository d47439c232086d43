//! The `Record` trait implemented by every persistable type.

use crate::error::{CodecError, CodecResult};
use crate::schema::Schema;
use crate::value::Value;

/// A type whose fields can be written to and read from delimited lines.
///
/// Implementors provide a static [`Schema`] and indexed accessors; the
/// codec never inspects the type any other way. `Default` supplies the
/// blank instance a loaded row is written into.
///
/// # Example
///
/// ```rust
/// use delimdb_codec::{CodecError, CodecResult, FieldKind, FieldSpec, FromValue, Record, Schema, Value};
///
/// #[derive(Debug, Default, Clone, PartialEq)]
/// struct User {
///     id: String,
///     age: i32,
/// }
///
/// static USER_FIELDS: [FieldSpec; 2] = [
///     FieldSpec::new("Id", FieldKind::Text).key(),
///     FieldSpec::new("Age", FieldKind::Integer),
/// ];
/// static USER: Schema = Schema::new("User", &USER_FIELDS);
///
/// impl Record for User {
///     fn schema() -> &'static Schema {
///         &USER
///     }
///
///     fn get(&self, field: usize) -> Value {
///         match field {
///             0 => self.id.clone().into(),
///             1 => self.age.into(),
///             _ => Value::Null,
///         }
///     }
///
///     fn set(&mut self, field: usize, value: Value) -> CodecResult<()> {
///         match field {
///             0 => self.id = String::from_value(value)?,
///             1 => self.age = i32::from_value(value)?,
///             _ => return Err(CodecError::unknown_field("User", field)),
///         }
///         Ok(())
///     }
/// }
///
/// let user = User { id: "u1".into(), age: 30 };
/// assert_eq!(user.key(), Value::Text("u1".into()));
/// ```
pub trait Record: Default + Send + 'static {
    /// Returns the type's field table.
    fn schema() -> &'static Schema;

    /// Reads field `field` (declaration order).
    ///
    /// Collection fields return [`Value::List`]. Out-of-range indexes
    /// return [`Value::Null`].
    fn get(&self, field: usize) -> Value;

    /// Writes field `field`.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not fit the field or the index is
    /// unknown.
    fn set(&mut self, field: usize, value: Value) -> CodecResult<()>;

    /// Returns the store key of this record.
    ///
    /// See [`crate::select_key`].
    fn key(&self) -> Value {
        crate::key::select_key(self)
    }

    /// Returns every declared field value in order.
    fn values(&self) -> Vec<Value> {
        (0..Self::schema().len()).map(|i| self.get(i)).collect()
    }

    /// Builds a record from values in declaration order.
    ///
    /// `Null` entries leave the field at its default.
    ///
    /// # Errors
    ///
    /// Returns the first `set` failure, or `UnknownField` if more values
    /// than fields are supplied.
    fn from_values(values: Vec<Value>) -> CodecResult<Self> {
        let schema = Self::schema();
        if values.len() > schema.len() {
            return Err(CodecError::unknown_field(schema.type_name(), values.len() - 1));
        }

        let mut record = Self::default();
        for (i, value) in values.into_iter().enumerate() {
            if !value.is_null() {
                record.set(i, value)?;
            }
        }
        Ok(record)
    }
}
