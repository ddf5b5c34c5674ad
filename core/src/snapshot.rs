//! CSV snapshot persistence for the active phone set.
//!
//! The snapshot is a plain CSV file with the store's historical column
//! layout (`ID,Modelo,Capacidad,Condicion,Precio,Estado`). Only the active
//! set is persisted; the ledger, queue, and sales history are rebuilt empty
//! on restart.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::reducer::environment::SnapshotStore;
use crate::types::{Money, PhoneId, PhoneRecord};

/// Errors from reading or writing snapshot files.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Filesystem failure.
    #[error("snapshot i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed CSV.
    #[error("snapshot csv error: {0}")]
    Csv(#[from] csv::Error),

    /// A row that parsed as CSV but not as a phone record.
    #[error("snapshot row for id {id}: {message}")]
    Parse {
        /// Id column of the bad row.
        id: u64,
        /// What was wrong with it.
        message: String,
    },
}

/// One CSV row in the snapshot column layout.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(rename = "Modelo")]
    model: String,
    #[serde(rename = "Capacidad")]
    capacity: String,
    #[serde(rename = "Condicion")]
    condition: String,
    #[serde(rename = "Precio")]
    price: f64,
    #[serde(rename = "Estado")]
    status: String,
}

impl From<&PhoneRecord> for CsvRow {
    fn from(record: &PhoneRecord) -> Self {
        Self {
            id: record.id.value(),
            model: record.model.clone(),
            capacity: record.capacity.clone(),
            condition: record.condition.clone(),
            price: record.price.units(),
            status: record.status.to_string(),
        }
    }
}

impl TryFrom<CsvRow> for PhoneRecord {
    type Error = SnapshotError;

    fn try_from(row: CsvRow) -> Result<Self, Self::Error> {
        let price = Money::try_from_units(row.price).map_err(|message| SnapshotError::Parse {
            id: row.id,
            message,
        })?;
        let status = row.status.parse().map_err(|message| SnapshotError::Parse {
            id: row.id,
            message,
        })?;
        Ok(Self {
            id: PhoneId::new(row.id),
            model: row.model,
            capacity: row.capacity,
            condition: row.condition,
            price,
            status,
        })
    }
}

/// Serializes records into CSV.
///
/// # Errors
///
/// Returns a [`SnapshotError`] on write failure.
pub fn write_records<W: Write>(writer: W, records: &[PhoneRecord]) -> Result<(), SnapshotError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for record in records {
        csv_writer.serialize(CsvRow::from(record))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Deserializes records from CSV.
///
/// # Errors
///
/// Returns a [`SnapshotError`] on malformed rows.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<PhoneRecord>, SnapshotError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut records = Vec::new();
    for row in csv_reader.deserialize::<CsvRow>() {
        records.push(PhoneRecord::try_from(row?)?);
    }
    Ok(records)
}

/// File-backed snapshot store.
///
/// Writes are serialized through an internal lock; effects may save
/// concurrently from several runtime tasks.
#[derive(Debug)]
pub struct CsvSnapshots {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvSnapshots {
    /// Creates a snapshot store at the given path. Nothing is touched on
    /// disk until the first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path this store reads and writes.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the snapshot, or `None` when the file does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] when the file exists but cannot be read.
    pub fn load(&self) -> Result<Option<Vec<PhoneRecord>>, SnapshotError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        read_records(file).map(Some)
    }
}

impl SnapshotStore for CsvSnapshots {
    fn save(&self, records: &[PhoneRecord]) -> Result<(), SnapshotError> {
        let guard = self.write_lock.lock();
        // A poisoned lock means a previous save panicked mid-write; the
        // file is rewritten from scratch either way.
        let _guard = match guard {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        write_records(file, records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PhoneStatus;

    fn records() -> Vec<PhoneRecord> {
        vec![
            PhoneRecord {
                id: PhoneId::new(1),
                model: "iPhone 15".to_string(),
                capacity: "128GB".to_string(),
                condition: "Nuevo".to_string(),
                price: Money::from_units(20000),
                status: PhoneStatus::Available,
            },
            PhoneRecord {
                id: PhoneId::new(2),
                model: "iPhone 13 Pro".to_string(),
                capacity: "512GB".to_string(),
                condition: "Seminuevo".to_string(),
                price: Money::from_cents(1_312_550),
                status: PhoneStatus::Sold,
            },
        ]
    }

    #[test]
    fn csv_round_trip_preserves_records() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &records()).unwrap();

        let parsed = read_records(buffer.as_slice()).unwrap();
        assert_eq!(parsed, records());
    }

    #[test]
    fn csv_uses_historical_header() {
        let mut buffer = Vec::new();
        write_records(&mut buffer, &records()).unwrap();

        let text = String::from_utf8(buffer).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "ID,Modelo,Capacidad,Condicion,Precio,Estado");
        assert!(text.contains("Vendido"));
    }

    #[test]
    fn bad_status_is_reported_with_row_id() {
        let csv = "ID,Modelo,Capacidad,Condicion,Precio,Estado\n\
                   9,iPhone 12,64GB,Nuevo,9000.0,Apartado\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SnapshotError::Parse { id: 9, .. }));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let store = CsvSnapshots::new("/nonexistent/dir/inventario.csv");
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "celustock-snapshot-test-{}.csv",
            std::process::id()
        ));
        let store = CsvSnapshots::new(&path);

        store.save(&records()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded, records());

        let _ = std::fs::remove_file(&path);
    }
}
