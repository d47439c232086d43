//! Dynamic field value type.

use crate::error::{CodecError, CodecResult};
use crate::hex::bytes_to_hex;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;

/// Text layout used when a timestamp field is written to a cell.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// A dynamic field value.
///
/// Records exchange their fields with the codec through `Value`. Scalars map
/// one-to-one onto cells; [`Value::List`] holds the rows of a collection
/// field, each row being the element's own field values in schema order.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value. A `Null` key means "do not store".
    Null,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Unsigned integer.
    Unsigned(u64),
    /// Floating point number.
    Float(f64),
    /// Text (UTF-8).
    Text(String),
    /// Byte sequence, stored as hex.
    Bytes(Vec<u8>),
    /// Local date and time without zone.
    Timestamp(NaiveDateTime),
    /// Elements of a collection field, one row of values per element.
    List(Vec<Vec<Value>>),
}

impl Value {
    /// Returns the variant name, used in error messages.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Unsigned(_) => "unsigned",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the text if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the collection rows if this is a list value.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Vec<Value>]> {
        match self {
            Value::List(rows) => Some(rows),
            _ => None,
        }
    }

    /// Renders the value as cell text.
    ///
    /// Null and list values render as empty text; lists are never inlined.
    /// Nothing is quoted or escaped.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            Value::Null | Value::List(_) => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Unsigned(u) => u.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => s.clone(),
            Value::Bytes(b) => bytes_to_hex(b),
            Value::Timestamp(t) => t.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Builds a list value from nested records.
    pub fn list_of<T: crate::Record>(items: &[T]) -> Self {
        Value::List(items.iter().map(crate::Record::values).collect())
    }

    /// Builds a list value from scalars, one single-cell row per element.
    pub fn scalars<T>(items: &[T]) -> Self
    where
        T: Clone + Into<Value>,
    {
        Value::List(items.iter().map(|item| vec![item.clone().into()]).collect())
    }

    /// Converts a list value back into nested records.
    ///
    /// `Null` converts to an empty vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a list or an element fails to
    /// convert.
    pub fn into_records<T: crate::Record>(self) -> CodecResult<Vec<T>> {
        match self {
            Value::Null => Ok(Vec::new()),
            Value::List(rows) => rows.into_iter().map(T::from_values).collect(),
            other => Err(CodecError::type_mismatch("list", other.kind_name())),
        }
    }

    /// Converts a list value back into scalars.
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a list or an element fails to
    /// convert.
    pub fn into_scalars<T: FromValue>(self) -> CodecResult<Vec<T>> {
        match self {
            Value::Null => Ok(Vec::new()),
            Value::List(rows) => rows
                .into_iter()
                .map(|row| T::from_value(row.into_iter().next().unwrap_or(Value::Null)))
                .collect(),
            other => Err(CodecError::type_mismatch("list", other.kind_name())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_cell())
    }
}

/// Conversion from a [`Value`] into a concrete field type.
///
/// Implemented for the scalar types records usually hold. `Option<T>`
/// maps `Null` to `None`.
pub trait FromValue: Sized {
    /// Converts the value, failing on a variant mismatch.
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` or `IntegerOverflow`.
    fn from_value(value: Value) -> CodecResult<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> CodecResult<Self> {
        Ok(value)
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null | Value::List(_) => {
                Err(CodecError::type_mismatch("text", value.kind_name()))
            }
            other => Ok(other.to_cell()),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(CodecError::type_mismatch("bool", other.kind_name())),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Unsigned(u) => {
                i64::try_from(u).map_err(|_| CodecError::IntegerOverflow { target: "i64" })
            }
            other => Err(CodecError::type_mismatch("integer", other.kind_name())),
        }
    }
}

impl FromValue for u64 {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Unsigned(u) => Ok(u),
            Value::Integer(i) => {
                u64::try_from(i).map_err(|_| CodecError::IntegerOverflow { target: "u64" })
            }
            other => Err(CodecError::type_mismatch("unsigned", other.kind_name())),
        }
    }
}

macro_rules! narrow_from_value {
    ($($ty:ty => $wide:ty),* $(,)?) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> CodecResult<Self> {
                    let wide = <$wide>::from_value(value)?;
                    <$ty>::try_from(wide).map_err(|_| CodecError::IntegerOverflow {
                        target: stringify!($ty),
                    })
                }
            }
        )*
    };
}

narrow_from_value!(
    i32 => i64,
    i16 => i64,
    u32 => u64,
    u16 => u64,
    u8 => u64,
    usize => u64,
);

impl FromValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            Value::Unsigned(u) => Ok(u as f64),
            other => Err(CodecError::type_mismatch("float", other.kind_name())),
        }
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => Err(CodecError::type_mismatch("bytes", other.kind_name())),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            other => Err(CodecError::type_mismatch("timestamp", other.kind_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> CodecResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i64 => Integer,
    i32 => Integer,
    i16 => Integer,
    u64 => Unsigned,
    u32 => Unsigned,
    u16 => Unsigned,
    u8 => Unsigned,
    f64 => Float,
    f32 => Float,
    String => Text,
    &str => Text,
    Vec<u8> => Bytes,
    NaiveDateTime => Timestamp,
);

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Value::Unsigned(v as u64)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Timestamp(v.and_time(NaiveTime::default()))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn scalar_cells() {
        assert_eq!(Value::Null.to_cell(), "");
        assert_eq!(Value::Bool(true).to_cell(), "true");
        assert_eq!(Value::Integer(-22).to_cell(), "-22");
        assert_eq!(Value::Unsigned(12345).to_cell(), "12345");
        assert_eq!(Value::Float(1.5).to_cell(), "1.5");
        assert_eq!(Value::Text("DESKTOP-123".into()).to_cell(), "DESKTOP-123");
        assert_eq!(Value::Bytes(vec![0x11, 0x12]).to_cell(), "1112");
        assert_eq!(Value::Bytes(Vec::new()).to_cell(), "");
    }

    #[test]
    fn timestamp_cell() {
        let t = ts(2018, 5, 17, 9, 30, 0);
        assert_eq!(Value::Timestamp(t).to_cell(), "2018-05-17 09:30:00");
    }

    #[test]
    fn list_never_renders() {
        let list = Value::List(vec![vec![Value::Integer(1)]]);
        assert_eq!(list.to_cell(), "");
        assert_eq!(list.to_string(), "");
    }

    #[test]
    fn narrow_integers() {
        assert_eq!(i32::from_value(Value::Integer(22)).unwrap(), 22);
        assert_eq!(
            u8::from_value(Value::Unsigned(300)),
            Err(CodecError::IntegerOverflow { target: "u8" })
        );
        assert_eq!(u64::from_value(Value::Integer(7)).unwrap(), 7);
        assert!(u64::from_value(Value::Integer(-1)).is_err());
    }

    #[test]
    fn string_accepts_scalars() {
        assert_eq!(String::from_value(Value::Integer(5)).unwrap(), "5");
        assert!(String::from_value(Value::Null).is_err());
    }

    #[test]
    fn option_maps_null() {
        assert_eq!(Option::<i64>::from_value(Value::Null).unwrap(), None);
        assert_eq!(Option::<i64>::from_value(Value::Integer(3)).unwrap(), Some(3));
        assert_eq!(Value::from(None::<i64>), Value::Null);
    }

    #[test]
    fn mismatch_reports_kinds() {
        assert_eq!(
            bool::from_value(Value::Text("yes".into())),
            Err(CodecError::type_mismatch("bool", "text"))
        );
    }

    #[test]
    fn scalar_lists() {
        let list = Value::scalars(&["a".to_string(), "b".to_string()]);
        assert_eq!(
            list,
            Value::List(vec![
                vec![Value::Text("a".into())],
                vec![Value::Text("b".into())]
            ])
        );
        let back: Vec<String> = list.into_scalars().unwrap();
        assert_eq!(back, vec!["a", "b"]);
        assert!(Value::Null.into_scalars::<i64>().unwrap().is_empty());
    }
}
