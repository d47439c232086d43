//! Record types shared by the store integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use delimdb_core::codec::{
    CodecError, CodecResult, FieldKind, FieldSpec, FromValue, Record, Schema, Value, TEXT_LIST,
};
use delimdb_core::storage::InMemoryBackend;
use delimdb_core::{CollectingSink, CsvStore, StoreConfig, NEWLINE};

/// A disk attached to a machine; stored in `Machine.Disks.csv`.
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

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Machine {
    pub id: String,
    pub name: String,
    pub age: i32,
    pub bytes_array: Vec<u8>,
    pub ignore_data: u64,
    pub disks: Vec<Disk>,
    pub tags: Vec<String>,
}

static MACHINE_FIELDS: [FieldSpec; 7] = [
    FieldSpec::new("Id", FieldKind::Text).key().index(0),
    FieldSpec::new("Name", FieldKind::Text),
    FieldSpec::new("Age", FieldKind::Integer),
    FieldSpec::new("BytesArray", FieldKind::Bytes),
    FieldSpec::new("IgnoreData", FieldKind::Unsigned).ignored(),
    FieldSpec::new("Disks", FieldKind::List(&DISK)),
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
            5 => Value::list_of(&self.disks),
            6 => Value::scalars(&self.tags),
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
            5 => self.disks = value.into_records()?,
            6 => self.tags = value.into_scalars()?,
            _ => return Err(CodecError::unknown_field("Machine", field)),
        }
        Ok(())
    }
}

/// A record without a key-marked field; keyed by its first field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reading {
    pub sensor: String,
    pub value: f64,
}

static READING_FIELDS: [FieldSpec; 2] = [
    FieldSpec::new("Sensor", FieldKind::Text),
    FieldSpec::new("Value", FieldKind::Float),
];
static READING: Schema = Schema::new("Reading", &READING_FIELDS);

impl Record for Reading {
    fn schema() -> &'static Schema {
        &READING
    }

    fn get(&self, field: usize) -> Value {
        match field {
            0 => self.sensor.clone().into(),
            1 => self.value.into(),
            _ => Value::Null,
        }
    }

    fn set(&mut self, field: usize, value: Value) -> CodecResult<()> {
        match field {
            0 => self.sensor = String::from_value(value)?,
            1 => self.value = f64::from_value(value)?,
            _ => return Err(CodecError::unknown_field("Reading", field)),
        }
        Ok(())
    }
}

/// The reference machine used across tests.
pub fn desktop() -> Machine {
    Machine {
        id: "1234567890".into(),
        name: "DESKTOP-123".into(),
        age: 22,
        bytes_array: vec![0x11, 0x12, 0x13, 0x14],
        ..Machine::default()
    }
}

pub fn disk(label: &str, size_gb: u64) -> Disk {
    Disk {
        label: label.into(),
        size_gb,
    }
}

/// Joins lines with the platform newline, including a trailing one.
pub fn lines(rows: &[&str]) -> String {
    rows.iter().map(|row| format!("{row}{NEWLINE}")).collect()
}

/// A store over a fresh in-memory backend with a collecting sink.
pub fn memory_store(
    config: StoreConfig,
) -> (CsvStore<String, Machine>, Arc<InMemoryBackend>, Arc<CollectingSink>) {
    let backend = Arc::new(InMemoryBackend::new());
    let store = CsvStore::with_config(backend.clone(), config);
    let sink = Arc::new(CollectingSink::new());
    store.set_sink(sink.clone());
    (store, backend, sink)
}

/// A store reading `text` as `Machine.csv`.
pub fn store_with_file(
    text: &str,
    config: StoreConfig,
) -> (CsvStore<String, Machine>, Arc<CollectingSink>) {
    let backend = Arc::new(InMemoryBackend::with_file("Machine.csv", text));
    let store = CsvStore::with_config(backend, config);
    let sink = Arc::new(CollectingSink::new());
    store.set_sink(sink.clone());
    (store, sink)
}
