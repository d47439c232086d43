//! Static field metadata for record types.
//!
//! Each record type declares one [`Schema`]: its name plus an ordered table
//! of [`FieldSpec`]s. Tables are plain `static` data built with `const fn`
//! builders, so descriptor lookup never needs runtime introspection.
//!
//! ```rust
//! use delimdb_codec::{FieldKind, FieldSpec, Schema};
//!
//! static USER_FIELDS: [FieldSpec; 3] = [
//!     FieldSpec::new("Id", FieldKind::Text).key().index(0),
//!     FieldSpec::new("Name", FieldKind::Text),
//!     FieldSpec::new("Cache", FieldKind::Bytes).ignored(),
//! ];
//! static USER: Schema = Schema::new("User", &USER_FIELDS);
//!
//! assert_eq!(USER.column_names(), vec!["Id", "Name"]);
//! assert!(USER.resolve("Id").is_key);
//! assert!(!USER.resolve("Missing").is_key);
//! ```

/// Mapping metadata of one field.
///
/// `explicit_index` of `None` means "use the next free column".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor<'a> {
    /// Column name used in headers.
    pub name: &'a str,
    /// Field supplies the store key.
    pub is_key: bool,
    /// Field is neither saved nor loaded.
    pub is_ignored: bool,
    /// Column to read the field from on load.
    pub explicit_index: Option<usize>,
}

impl<'a> FieldDescriptor<'a> {
    /// Descriptor used when a field declares no metadata.
    #[must_use]
    pub const fn unmapped(name: &'a str) -> Self {
        Self {
            name,
            is_key: false,
            is_ignored: false,
            explicit_index: None,
        }
    }
}

/// The declared kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 text.
    Text,
    /// `true` / `false`.
    Bool,
    /// Signed integer.
    Integer,
    /// Unsigned integer.
    Unsigned,
    /// Floating point number.
    Float,
    /// Local date and time.
    Timestamp,
    /// Byte sequence, stored as hex.
    Bytes,
    /// Collection of elements described by the nested schema. Stored in a
    /// child file, never inline.
    List(&'static Schema),
}

impl FieldKind {
    /// Returns the kind name, used in error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Unsigned => "unsigned",
            FieldKind::Float => "float",
            FieldKind::Timestamp => "timestamp",
            FieldKind::Bytes => "bytes",
            FieldKind::List(_) => "list",
        }
    }

    /// Returns the element schema of a collection kind.
    #[must_use]
    pub const fn element_schema(&self) -> Option<&'static Schema> {
        match self {
            FieldKind::List(schema) => Some(*schema),
            _ => None,
        }
    }
}

/// A declared field: descriptor, kind, and readability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    descriptor: FieldDescriptor<'static>,
    kind: FieldKind,
    readable: bool,
}

impl FieldSpec {
    /// Declares a field with default metadata.
    #[must_use]
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            descriptor: FieldDescriptor::unmapped(name),
            kind,
            readable: true,
        }
    }

    /// Marks the field as the key source.
    #[must_use]
    pub const fn key(mut self) -> Self {
        self.descriptor.is_key = true;
        self
    }

    /// Excludes the field from headers, rows, and loading.
    #[must_use]
    pub const fn ignored(mut self) -> Self {
        self.descriptor.is_ignored = true;
        self
    }

    /// Reads the field from column `index` on load.
    #[must_use]
    pub const fn index(mut self, index: usize) -> Self {
        self.descriptor.explicit_index = Some(index);
        self
    }

    /// Marks the field as not readable; it is skipped from header and rows.
    #[must_use]
    pub const fn write_only(mut self) -> Self {
        self.readable = false;
        self
    }

    /// Returns the field name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Returns the mapping descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> FieldDescriptor<'static> {
        self.descriptor
    }

    /// Returns the declared kind.
    #[must_use]
    pub const fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns `true` if the field can be read for saving.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.readable
    }

    /// Returns `true` for collection fields.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self.kind, FieldKind::List(_))
    }

    /// Returns `true` if the field occupies a column in the main file.
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        !self.descriptor.is_ignored && self.readable && !self.is_collection()
    }
}

/// The ordered field table of one record type.
#[derive(Debug, PartialEq, Eq)]
pub struct Schema {
    type_name: &'static str,
    fields: &'static [FieldSpec],
}

impl Schema {
    /// Creates a schema.
    #[must_use]
    pub const fn new(type_name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { type_name, fields }
    }

    /// Returns the record type name; the default file is `{type_name}.csv`.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns all declared fields in order.
    #[must_use]
    pub const fn fields(&self) -> &'static [FieldSpec] {
        self.fields
    }

    /// Returns the number of declared fields.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if no fields are declared.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the field at `index`.
    #[must_use]
    pub fn field(&self, index: usize) -> Option<&'static FieldSpec> {
        self.fields.get(index)
    }

    /// Returns the index of the first field named `name`.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Resolves the descriptor of `name`.
    ///
    /// The first field declaring that name wins. Unknown names resolve to
    /// [`FieldDescriptor::unmapped`].
    #[must_use]
    pub fn resolve<'a>(&self, name: &'a str) -> FieldDescriptor<'a> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .map_or_else(|| FieldDescriptor::unmapped(name), |f| f.descriptor())
    }

    /// Returns the indexes of persisted fields, in column order.
    ///
    /// A field with an explicit index takes that column when it is in
    /// range and not already claimed by an earlier field. The other
    /// persisted fields fill the free columns in declaration order. Load
    /// and save both use this layout.
    #[must_use]
    pub fn columns(&self) -> Vec<usize> {
        let persisted: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_persisted())
            .map(|(i, _)| i)
            .collect();

        let mut slots: Vec<Option<usize>> = vec![None; persisted.len()];
        let mut placed = vec![false; self.fields.len()];
        for &i in &persisted {
            if let Some(column) = self.fields[i].descriptor.explicit_index {
                if column < slots.len() && slots[column].is_none() {
                    slots[column] = Some(i);
                    placed[i] = true;
                }
            }
        }

        let mut rest = persisted.into_iter().filter(|&i| !placed[i]);
        slots
            .into_iter()
            .filter_map(|slot| slot.or_else(|| rest.next()))
            .collect()
    }

    /// Returns the number of persisted columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.fields.iter().filter(|f| f.is_persisted()).count()
    }

    /// Returns persisted column names in column order.
    #[must_use]
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns()
            .into_iter()
            .map(|i| self.fields[i].name())
            .collect()
    }

    /// Returns the collection fields that are saved to child files.
    pub fn collections(&self) -> impl Iterator<Item = (usize, &'static FieldSpec)> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_collection() && !f.descriptor.is_ignored && f.readable)
    }

    /// Returns the index of the field that supplies the store key.
    ///
    /// The first field marked key and not ignored, else the first declared
    /// field. The explicit index never redirects the key source.
    #[must_use]
    pub fn key_field(&self) -> usize {
        self.fields
            .iter()
            .position(|f| f.descriptor.is_key && !f.descriptor.is_ignored)
            .unwrap_or(0)
    }
}

macro_rules! scalar_schema {
    ($($(#[$doc:meta])* $name:ident, $fields:ident => $type_name:literal, $kind:ident;)*) => {
        $(
            static $fields: [FieldSpec; 1] = [FieldSpec::new("Value", FieldKind::$kind)];
            $(#[$doc])*
            pub static $name: Schema = Schema::new($type_name, &$fields);
        )*
    };
}

scalar_schema! {
    /// Element schema for lists of text.
    TEXT_LIST, TEXT_LIST_FIELDS => "String", Text;
    /// Element schema for lists of booleans.
    BOOL_LIST, BOOL_LIST_FIELDS => "Boolean", Bool;
    /// Element schema for lists of signed integers.
    INTEGER_LIST, INTEGER_LIST_FIELDS => "Int64", Integer;
    /// Element schema for lists of unsigned integers.
    UNSIGNED_LIST, UNSIGNED_LIST_FIELDS => "UInt64", Unsigned;
    /// Element schema for lists of floats.
    FLOAT_LIST, FLOAT_LIST_FIELDS => "Double", Float;
    /// Element schema for lists of timestamps.
    TIMESTAMP_LIST, TIMESTAMP_LIST_FIELDS => "DateTime", Timestamp;
    /// Element schema for lists of byte sequences.
    BYTES_LIST, BYTES_LIST_FIELDS => "Bytes", Bytes;
}

#[cfg(test)]
mod tests {
    use super::*;

    static PHONE_FIELDS: [FieldSpec; 2] = [
        FieldSpec::new("Number", FieldKind::Text),
        FieldSpec::new("Kind", FieldKind::Text),
    ];
    static PHONE: Schema = Schema::new("Phone", &PHONE_FIELDS);

    static CONTACT_FIELDS: [FieldSpec; 5] = [
        FieldSpec::new("Name", FieldKind::Text),
        FieldSpec::new("Id", FieldKind::Unsigned).key().index(0),
        FieldSpec::new("Secret", FieldKind::Text).ignored(),
        FieldSpec::new("Phones", FieldKind::List(&PHONE)),
        FieldSpec::new("Hash", FieldKind::Bytes).write_only(),
    ];
    static CONTACT: Schema = Schema::new("Contact", &CONTACT_FIELDS);

    static NO_KEY_FIELDS: [FieldSpec; 2] = [
        FieldSpec::new("First", FieldKind::Text),
        FieldSpec::new("Second", FieldKind::Text).key().ignored(),
    ];
    static NO_KEY: Schema = Schema::new("NoKey", &NO_KEY_FIELDS);

    #[test]
    fn resolve_declared_descriptor() {
        let d = CONTACT.resolve("Id");
        assert_eq!(d.name, "Id");
        assert!(d.is_key);
        assert!(!d.is_ignored);
        assert_eq!(d.explicit_index, Some(0));

        assert!(CONTACT.resolve("Secret").is_ignored);
    }

    #[test]
    fn resolve_unknown_is_default() {
        let d = CONTACT.resolve("Nickname");
        assert_eq!(d, FieldDescriptor::unmapped("Nickname"));
        assert_eq!(d.explicit_index, None);
    }

    #[test]
    fn persisted_columns_skip_ignored_lists_and_write_only() {
        // Id claims column 0; Name takes the remaining one.
        assert_eq!(CONTACT.columns(), vec![1, 0]);
        assert_eq!(CONTACT.column_count(), 2);
        assert_eq!(CONTACT.column_names(), vec!["Id", "Name"]);
    }

    #[test]
    fn column_layout_resolves_claims() {
        static CLASH_FIELDS: [FieldSpec; 4] = [
            FieldSpec::new("A", FieldKind::Text).index(2),
            FieldSpec::new("B", FieldKind::Text).index(2),
            FieldSpec::new("C", FieldKind::Text).index(7),
            FieldSpec::new("D", FieldKind::Text).index(0),
        ];
        static CLASH: Schema = Schema::new("Clash", &CLASH_FIELDS);

        // A wins column 2, D takes 0; B and C fill 1 and 3 in order.
        assert_eq!(CLASH.columns(), vec![3, 1, 0, 2]);
        assert_eq!(CLASH.column_names(), vec!["D", "B", "A", "C"]);
    }

    #[test]
    fn collections_listed() {
        let found: Vec<_> = CONTACT.collections().map(|(i, f)| (i, f.name())).collect();
        assert_eq!(found, vec![(3, "Phones")]);
        assert_eq!(
            CONTACT_FIELDS[3].kind().element_schema().map(Schema::type_name),
            Some("Phone")
        );
    }

    #[test]
    fn key_field_prefers_marked() {
        assert_eq!(CONTACT.key_field(), 1);
    }

    #[test]
    fn key_field_falls_back_to_first() {
        // An ignored key marker is not key-eligible.
        assert_eq!(NO_KEY.key_field(), 0);
        assert_eq!(PHONE.key_field(), 0);
    }

    #[test]
    fn scalar_list_schemas() {
        assert_eq!(TEXT_LIST.column_names(), vec!["Value"]);
        assert_eq!(BYTES_LIST.fields()[0].kind(), FieldKind::Bytes);
        assert_eq!(INTEGER_LIST.type_name(), "Int64");
    }
}
