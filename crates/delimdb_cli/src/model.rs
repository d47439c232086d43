//! Record types used by the demo command.

use delimdb_codec::{
    CodecError, CodecResult, FieldKind, FieldSpec, FromValue, NaiveDateTime, Record, Schema,
    Value, TEXT_LIST,
};

/// A disk attached to a host.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Disk {
    pub label: String,
    pub size_gb: u64,
}

static DISK_FIELDS: [FieldSpec; 2] = [
    FieldSpec::new("Label", FieldKind::Text),
    FieldSpec::new("SizeGb", FieldKind::Unsigned),
];
static DISK: Schema = Schema::new("Disk", &DISK_FIELDS);

impl Record for Disk {
    fn schema() -> &'static Schema {
        &DISK
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.label.clone().into(),
            1 => self.size_gb.into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) -> CodecResult<()> {
        match field {
            0 => self.label = String::from_value(value)?,
            1 => self.size_gb = u64::from_value(value)?,
            _ => return Err(CodecError::unknown_field("Disk", field)),
        }
        Ok(())
    }
}

/// An inventoried machine.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Host {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub fingerprint: Vec<u8>,
    pub seen: Option<NaiveDateTime>,
    pub online: bool,
    /// Runtime-only; never persisted.
    pub session: u64,
    pub disks: Vec<Disk>,
    pub tags: Vec<String>,
}

static HOST_FIELDS: [FieldSpec; 9] = [
    FieldSpec::new("Id", FieldKind::Text).key(),
    FieldSpec::new("Name", FieldKind::Text),
    FieldSpec::new("Age", FieldKind::Integer),
    FieldSpec::new("Fingerprint", FieldKind::Bytes),
    FieldSpec::new("Seen", FieldKind::Timestamp),
    FieldSpec::new("Online", FieldKind::Bool),
    FieldSpec::new("Session", FieldKind::Unsigned).ignored(),
    FieldSpec::new("Disks", FieldKind::List(&DISK)),
    FieldSpec::new("Tags", FieldKind::List(&TEXT_LIST)),
];
static HOST: Schema = Schema::new("Host", &HOST_FIELDS);

impl Record for Host {
    fn schema() -> &'static Schema {
        &HOST
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.id.clone().into(),
            1 => self.name.clone().into(),
            2 => self.age.into(),
            3 => self.fingerprint.clone().into(),
            4 => self.seen.into(),
            5 => self.online.into(),
            6 => self.session.into(),
            7 => Value::list_of(&self.disks),
            8 => Value::scalars(&self.tags),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) -> CodecResult<()> {
        match field {
            0 => self.id = String::from_value(value)?,
            1 => self.name = String::from_value(value)?,
            2 => self.age = i32::from_value(value)?,
            3 => self.fingerprint = Vec::from_value(value)?,
            4 => self.seen = Option::from_value(value)?,
            5 => self.online = bool::from_value(value)?,
            6 => self.session = u64::from_value(value)?,
            7 => self.disks = value.into_records()?,
            8 => self.tags = value.into_scalars()?,
            _ => return Err(CodecError::unknown_field("Host", field)),
        }
        Ok(())
    }
}
