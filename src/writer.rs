//! CSV output for event records

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::error::{DocumentorError, Result};
use crate::record::EventRecord;

/// Serialize records (header row first) to any writer
pub fn write_records_to<W: Write>(writer: W, records: &[EventRecord]) -> Result<()> {
    let mut csv = csv::WriterBuilder::new().has_headers(true).from_writer(writer);

    if records.is_empty() {
        // serde-driven headers only appear with the first row
        csv.write_record(HEADERS)?;
    }
    for record in records {
        csv.serialize(record)?;
    }

    csv.flush()?;
    Ok(())
}

/// Create or truncate `path` and write the records to it
pub fn write_records(path: &Path, records: &[EventRecord]) -> Result<()> {
    let file = File::create(path).map_err(|source| DocumentorError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    write_records_to(io::BufWriter::new(file), records)
}

/// Column names, matching `EventRecord`'s serialized field names
pub const HEADERS: [&str; 10] = [
    "EventId",
    "EventName",
    "Level",
    "Keywords",
    "Opcode",
    "Task",
    "Channel",
    "Version",
    "Message",
    "Parameters",
];
