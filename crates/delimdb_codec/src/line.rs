//! Delimited line codec.
//!
//! One record is one line. Persisted fields (not ignored, readable, not a
//! collection) become cells in the order of [`Schema::columns`], separated
//! by the delimiter with no trailing delimiter.
//!
//! ## Load rules
//!
//! - Strict mode requires exactly one cell per persisted column
//! - Each field reads the column [`Schema::columns`] places it in, the
//!   same column it is written to
//! - An empty first column aborts the row; other empty cells leave the
//!   field at its default
//! - Trimming removes surrounding whitespace before conversion
//! - `"..."` cells lose their outer quotes and `""` becomes `"`
//! - Collection fields are never parsed from text; they load as empty lists
//!
//! Saving never quotes or escapes, so values containing the delimiter or
//! quotes do not survive a round trip.

use crate::error::{CodecError, CodecResult, RowError};
use crate::hex::hex_to_bytes;
use crate::key::row_key;
use crate::record::Record;
use crate::schema::{FieldKind, Schema};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::borrow::Cow;

/// The only recognised quote character.
pub const QUOTE: char = '"';

/// Default cell delimiter.
pub const DEFAULT_DELIMITER: char = '|';

/// Layouts accepted when parsing timestamp cells.
const TIMESTAMP_LAYOUTS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Per-line parsing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    /// Cell delimiter.
    pub delimiter: char,
    /// Reject rows whose cell count differs from the column count.
    pub strict: bool,
    /// Trim surrounding whitespace from cells.
    pub trim: bool,
}

impl Default for LineFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            strict: true,
            trim: true,
        }
    }
}

impl LineFormat {
    /// Creates the default format: `|`, strict, trimmed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the delimiter.
    #[must_use]
    pub const fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets strict arity checking.
    #[must_use]
    pub const fn strict(mut self, value: bool) -> Self {
        self.strict = value;
        self
    }

    /// Sets cell trimming.
    #[must_use]
    pub const fn trim(mut self, value: bool) -> Self {
        self.trim = value;
        self
    }
}

/// Splits a line into cells.
#[must_use]
pub fn split_line(line: &str, delimiter: char) -> Vec<&str> {
    line.split(delimiter).collect()
}

/// Strips one pair of surrounding quotes and unescapes doubled quotes.
///
/// Text that is not wrapped in quotes is returned unchanged.
#[must_use]
pub fn unquote(text: &str) -> Cow<'_, str> {
    if text.len() >= 2 && text.starts_with(QUOTE) && text.ends_with(QUOTE) {
        Cow::Owned(text[1..text.len() - 1].replace("\"\"", "\""))
    } else {
        Cow::Borrowed(text)
    }
}

/// Prepares raw cell text for conversion. `None` for blank cells.
fn clean_cell(raw: &str, trim: bool) -> Option<Cow<'_, str>> {
    if raw.trim().is_empty() {
        return None;
    }
    let text = if trim { raw.trim() } else { raw };
    Some(unquote(text))
}

/// Converts cell text to a value of `kind`.
///
/// Collection kinds ignore the text and yield an empty list.
///
/// # Errors
///
/// Returns `InvalidCell` or `InvalidHex` when the text does not parse.
pub fn parse_cell(text: &str, kind: FieldKind) -> CodecResult<Value> {
    let invalid = || CodecError::invalid_cell(kind.name(), text);
    match kind {
        FieldKind::Text => Ok(Value::Text(text.to_string())),
        FieldKind::Bool => {
            if text.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(invalid())
            }
        }
        FieldKind::Integer => text.parse().map(Value::Integer).map_err(|_| invalid()),
        FieldKind::Unsigned => text.parse().map(Value::Unsigned).map_err(|_| invalid()),
        FieldKind::Float => text.parse().map(Value::Float).map_err(|_| invalid()),
        FieldKind::Timestamp => parse_timestamp(text).map(Value::Timestamp).ok_or_else(invalid),
        FieldKind::Bytes => hex_to_bytes(text).map(Value::Bytes),
        FieldKind::List(_) => Ok(Value::List(Vec::new())),
    }
}

fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    TIMESTAMP_LAYOUTS
        .iter()
        .find_map(|layout| NaiveDateTime::parse_from_str(text, layout).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::default()))
        })
}

/// Parses the cells of one row against `schema`.
///
/// Returns one value per declared field: parsed cells for persisted
/// columns, empty lists for collection fields, and `Null` for ignored
/// fields and skipped empty cells.
///
/// # Errors
///
/// Returns a [`RowError`] if the row must be dropped.
pub fn parse_row(
    schema: &Schema,
    cells: &[&str],
    format: &LineFormat,
) -> Result<Vec<Value>, RowError> {
    let columns = schema.columns();
    if format.strict && cells.len() != columns.len() {
        return Err(RowError::Arity {
            expected: columns.len(),
            actual: cells.len(),
        });
    }

    let mut values: Vec<Value> = schema
        .fields()
        .iter()
        .map(|f| {
            if f.is_collection() && !f.descriptor().is_ignored {
                Value::List(Vec::new())
            } else {
                Value::Null
            }
        })
        .collect();

    for (column, &field_index) in columns.iter().enumerate() {
        let field = &schema.fields()[field_index];
        let Some(text) = cells.get(column).and_then(|raw| clean_cell(raw, format.trim)) else {
            if column == 0 {
                return Err(RowError::MissingKeyCell);
            }
            continue;
        };

        values[field_index] =
            parse_cell(&text, field.kind()).map_err(|e| RowError::field(field.name(), e))?;
    }

    Ok(values)
}

/// Parses one line into a fresh record.
///
/// # Errors
///
/// Returns a [`RowError`] if the row must be dropped; no partially
/// populated record escapes.
pub fn parse_record<R: Record>(line: &str, format: &LineFormat) -> Result<R, RowError> {
    let values = parse_row(R::schema(), &split_line(line, format.delimiter), format)?;
    build_record(values)
}

/// Parses one line into its store key and a fresh record.
///
/// The key is read from the row itself through [`row_key`], so an empty
/// key cell falls back to the first declared field's cell.
///
/// # Errors
///
/// Returns a [`RowError`] if the row must be dropped.
pub fn parse_keyed_record<R: Record>(
    line: &str,
    format: &LineFormat,
) -> Result<(Value, R), RowError> {
    let schema = R::schema();
    let values = parse_row(schema, &split_line(line, format.delimiter), format)?;
    let key = row_key(schema, &values);
    Ok((key, build_record(values)?))
}

fn build_record<R: Record>(values: Vec<Value>) -> Result<R, RowError> {
    let schema = R::schema();
    let mut record = R::default();
    for (index, value) in values.into_iter().enumerate() {
        if value.is_null() {
            continue;
        }
        record
            .set(index, value)
            .map_err(|e| RowError::field(schema.fields()[index].name(), e))?;
    }
    Ok(record)
}

fn join_cells<I>(cells: I, delimiter: char) -> String
where
    I: IntoIterator<Item = String>,
{
    let mut line = String::new();
    for (i, cell) in cells.into_iter().enumerate() {
        if i > 0 {
            line.push(delimiter);
        }
        line.push_str(&cell);
    }
    line
}

/// Renders the header line of `schema`: persisted column names in column
/// order.
#[must_use]
pub fn header_line(schema: &Schema, delimiter: char) -> String {
    join_cells(
        schema.column_names().into_iter().map(str::to_string),
        delimiter,
    )
}

/// Renders declaration-ordered `values` as one line of `schema`'s columns.
///
/// Missing values render as empty cells.
#[must_use]
pub fn format_row(schema: &Schema, values: &[Value], delimiter: char) -> String {
    join_cells(
        schema
            .columns()
            .into_iter()
            .map(|i| values.get(i).map(Value::to_cell).unwrap_or_default()),
        delimiter,
    )
}

/// Renders `record` as one line. Collection fields contribute nothing.
#[must_use]
pub fn format_record<R: Record>(record: &R, delimiter: char) -> String {
    join_cells(
        R::schema()
            .columns()
            .into_iter()
            .map(|i| record.get(i).to_cell()),
        delimiter,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSpec, TEXT_LIST};
    use crate::value::FromValue;
    use proptest::prelude::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Machine {
        id: String,
        name: String,
        age: i32,
        bytes_array: Vec<u8>,
        ignore_data: u64,
        tags: Vec<String>,
    }

    static MACHINE_FIELDS: [FieldSpec; 6] = [
        FieldSpec::new("Id", FieldKind::Text).key().index(0),
        FieldSpec::new("Name", FieldKind::Text).index(1),
        FieldSpec::new("Age", FieldKind::Integer).index(2),
        FieldSpec::new("BytesArray", FieldKind::Bytes).index(3),
        FieldSpec::new("IgnoreData", FieldKind::Unsigned).ignored(),
        FieldSpec::new("Tags", FieldKind::List(&TEXT_LIST)),
    ];
    static MACHINE: Schema = Schema::new("Machine", &MACHINE_FIELDS);

    impl Record for Machine {
        fn schema() -> &'static Schema {
            &MACHINE
        }

        fn get(&self, field: usize) -> Value {
            match field {
                0 => self.id.clone().into(),
                1 => self.name.clone().into(),
                2 => self.age.into(),
                3 => self.bytes_array.clone().into(),
                4 => self.ignore_data.into(),
                5 => Value::scalars(&self.tags),
                _ => Value::Null,
            }
        }

        fn set(&mut self, field: usize, value: Value) -> CodecResult<()> {
            match field {
                0 => self.id = String::from_value(value)?,
                1 => self.name = String::from_value(value)?,
                2 => self.age = i32::from_value(value)?,
                3 => self.bytes_array = Vec::from_value(value)?,
                4 => self.ignore_data = u64::from_value(value)?,
                5 => self.tags = value.into_scalars()?,
                _ => return Err(CodecError::unknown_field("Machine", field)),
            }
            Ok(())
        }
    }

    fn desktop() -> Machine {
        Machine {
            id: "1234567890".into(),
            name: "DESKTOP-123".into(),
            age: 22,
            bytes_array: vec![0x11, 0x12, 0x13, 0x14],
            ignore_data: 12345,
            tags: vec!["a".into(), "b".into()],
        }
    }

    #[test]
    fn header_lists_persisted_columns() {
        assert_eq!(header_line(&MACHINE, '|'), "Id|Name|Age|BytesArray");
        assert_eq!(header_line(&MACHINE, ';'), "Id;Name;Age;BytesArray");
    }

    #[test]
    fn format_scenario_line() {
        assert_eq!(
            format_record(&desktop(), '|'),
            "1234567890|DESKTOP-123|22|11121314"
        );
    }

    #[test]
    fn format_empty_bytes_is_empty_cell() {
        let mut m = desktop();
        m.bytes_array.clear();
        assert_eq!(format_record(&m, '|'), "1234567890|DESKTOP-123|22|");
    }

    #[test]
    fn parse_scenario_line() {
        let m: Machine =
            parse_record("1234567890|DESKTOP-123|22|11121314", &LineFormat::new()).unwrap();
        assert_eq!(m.id, "1234567890");
        assert_eq!(m.name, "DESKTOP-123");
        assert_eq!(m.age, 22);
        assert_eq!(m.bytes_array, vec![0x11, 0x12, 0x13, 0x14]);
        assert_eq!(m.ignore_data, 0);
        assert!(m.tags.is_empty());
        assert_eq!(m.key(), Value::Text("1234567890".into()));
    }

    #[test]
    fn strict_rejects_wrong_arity() {
        let format = LineFormat::new();
        let short = parse_record::<Machine>("1|a|2", &format);
        assert_eq!(
            short.unwrap_err(),
            RowError::Arity {
                expected: 4,
                actual: 3
            }
        );

        let long = parse_record::<Machine>("1|a|2|FF|99", &format);
        assert_eq!(
            long.unwrap_err(),
            RowError::Arity {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn lenient_accepts_short_rows() {
        let format = LineFormat::new().strict(false);
        let m: Machine = parse_record("1|a", &format).unwrap();
        assert_eq!(m.id, "1");
        assert_eq!(m.name, "a");
        assert_eq!(m.age, 0);
    }

    #[test]
    fn empty_first_cell_aborts() {
        let result = parse_record::<Machine>(" |a|2|FF", &LineFormat::new());
        assert_eq!(result.unwrap_err(), RowError::MissingKeyCell);
    }

    #[test]
    fn empty_later_cell_keeps_default() {
        let m: Machine = parse_record("1||2|FF", &LineFormat::new()).unwrap();
        assert_eq!(m.name, "");
        assert_eq!(m.age, 2);
    }

    #[test]
    fn conversion_failure_drops_row() {
        let result = parse_record::<Machine>("1|a|old|FF", &LineFormat::new());
        assert!(matches!(
            result.unwrap_err(),
            RowError::Field { field: "Age", .. }
        ));

        let result = parse_record::<Machine>("1|a|2|XZ", &LineFormat::new());
        assert!(matches!(
            result.unwrap_err(),
            RowError::Field {
                field: "BytesArray",
                source: CodecError::InvalidHex { .. }
            }
        ));
    }

    #[test]
    fn trim_applies_before_conversion() {
        let m: Machine = parse_record(" 1 | a | 22 | FF ", &LineFormat::new()).unwrap();
        assert_eq!(m.id, "1");
        assert_eq!(m.name, "a");
        assert_eq!(m.age, 22);

        let untrimmed = parse_record::<Machine>("1| a | 22 |FF", &LineFormat::new().trim(false));
        assert!(matches!(
            untrimmed.unwrap_err(),
            RowError::Field { field: "Age", .. }
        ));
    }

    #[test]
    fn quoted_cells_unescape() {
        let m: Machine =
            parse_record(r#""1"|"say ""hi"""|22|FF"#, &LineFormat::new()).unwrap();
        assert_eq!(m.id, "1");
        assert_eq!(m.name, r#"say "hi""#);
    }

    #[test]
    fn unquote_leaves_plain_text() {
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
        assert_eq!(unquote("\"\""), "");
    }

    #[test]
    fn explicit_index_reorders_columns() {
        static SWAPPED_FIELDS: [FieldSpec; 2] = [
            FieldSpec::new("Name", FieldKind::Text).index(1),
            FieldSpec::new("Id", FieldKind::Unsigned).key().index(0),
        ];
        static SWAPPED: Schema = Schema::new("Swapped", &SWAPPED_FIELDS);

        let values = parse_row(&SWAPPED, &["7", "alice"], &LineFormat::new()).unwrap();
        assert_eq!(values[0], Value::Text("alice".into()));
        assert_eq!(values[1], Value::Unsigned(7));

        assert_eq!(header_line(&SWAPPED, '|'), "Id|Name");
        let values = vec![Value::Text("alice".into()), Value::Unsigned(7)];
        let line = format_row(&SWAPPED, &values, '|');
        assert_eq!(line, "7|alice");
        assert_eq!(
            parse_row(&SWAPPED, &split_line(&line, '|'), &LineFormat::new()).unwrap(),
            values
        );
    }

    #[test]
    fn empty_key_cell_falls_back_to_first_field() {
        static LATE_FIELDS: [FieldSpec; 2] = [
            FieldSpec::new("Value", FieldKind::Text),
            FieldSpec::new("Code", FieldKind::Text).key(),
        ];
        static LATE: Schema = Schema::new("Late", &LATE_FIELDS);

        let cells = ["a", ""];
        let values = parse_row(&LATE, &cells, &LineFormat::new()).unwrap();
        assert_eq!(row_key(&LATE, &values), Value::Text("a".into()));

        let values = parse_row(&LATE, &["a", "c7"], &LineFormat::new()).unwrap();
        assert_eq!(row_key(&LATE, &values), Value::Text("c7".into()));
    }

    #[test]
    fn keyed_parse_returns_cell_key() {
        let (key, m) =
            parse_keyed_record::<Machine>("1234567890|DESKTOP-123|22|", &LineFormat::new())
                .unwrap();
        assert_eq!(key, Value::Text("1234567890".into()));
        assert_eq!(m.name, "DESKTOP-123");
    }

    #[test]
    fn out_of_range_index_uses_position() {
        static FAR_FIELDS: [FieldSpec; 2] = [
            FieldSpec::new("Id", FieldKind::Text),
            FieldSpec::new("Name", FieldKind::Text).index(9),
        ];
        static FAR: Schema = Schema::new("Far", &FAR_FIELDS);

        let values = parse_row(&FAR, &["1", "bob"], &LineFormat::new()).unwrap();
        assert_eq!(values[1], Value::Text("bob".into()));
    }

    #[test]
    fn custom_delimiter() {
        let format = LineFormat::new().delimiter(';');
        let m: Machine = parse_record("1;a;3;0A", &format).unwrap();
        assert_eq!(m.bytes_array, vec![0x0A]);
        assert_eq!(format_record(&m, ';'), "1;a;3;0A");
    }

    #[test]
    fn parse_cells_by_kind() {
        assert_eq!(parse_cell("TRUE", FieldKind::Bool).unwrap(), Value::Bool(true));
        assert_eq!(parse_cell("false", FieldKind::Bool).unwrap(), Value::Bool(false));
        assert!(parse_cell("yes", FieldKind::Bool).is_err());
        assert_eq!(parse_cell("-4", FieldKind::Integer).unwrap(), Value::Integer(-4));
        assert!(parse_cell("-4", FieldKind::Unsigned).is_err());
        assert_eq!(parse_cell("2.5", FieldKind::Float).unwrap(), Value::Float(2.5));
        assert_eq!(
            parse_cell("anything", FieldKind::List(&TEXT_LIST)).unwrap(),
            Value::List(Vec::new())
        );
    }

    #[test]
    fn parse_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2018, 5, 17)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        for text in ["2018-05-17 09:30:00", "2018-05-17T09:30:00"] {
            assert_eq!(
                parse_cell(text, FieldKind::Timestamp).unwrap(),
                Value::Timestamp(expected)
            );
        }
        assert_eq!(
            parse_cell("2018-05-17", FieldKind::Timestamp).unwrap(),
            Value::Timestamp(expected.date().and_time(NaiveTime::default()))
        );
        assert!(parse_cell("17/05/2018", FieldKind::Timestamp).is_err());
    }

    #[test]
    fn format_row_matches_format_record() {
        let m = desktop();
        assert_eq!(format_row(&MACHINE, &m.values(), '|'), format_record(&m, '|'));
    }

    proptest! {
        #[test]
        fn line_roundtrip(
            id in "[A-Za-z0-9]{1,12}",
            name in "[A-Za-z0-9 _.-]{0,20}",
            age in any::<i32>(),
            bytes in proptest::collection::vec(any::<u8>(), 0..16),
        ) {
            let name = name.trim().to_string();
            let original = Machine {
                id,
                name,
                age,
                bytes_array: bytes,
                ignore_data: 0,
                tags: Vec::new(),
            };
            let line = format_record(&original, '|');
            let parsed: Machine = parse_record(&line, &LineFormat::new()).unwrap();
            prop_assert_eq!(parsed, original);
        }
    }
}
