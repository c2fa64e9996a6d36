// delimited-text export of the parsed entities
//
// addresses and names routinely contain commas, so the default delimiter is `|`.
// Any field that still contains the delimiter, a quote or a newline gets quoted.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::takeout::{ActivitySegment, PlaceVisit};

pub const DEFAULT_DELIMITER: u8 = b'|';

/// an entity that can be written as one row of an export
pub trait Row: Serialize {
    /// column names, in field order
    const HEADERS: &'static [&'static str];
}

impl Row for ActivitySegment {
    const HEADERS: &'static [&'static str] = &[
        "start_lat_e7",
        "start_lon_e7",
        "end_lat_e7",
        "end_lon_e7",
        "start_timestamp",
        "end_timestamp",
        "distance",
        "activity_type",
        "confidence",
        "travel_distance",
    ];
}

impl Row for PlaceVisit {
    const HEADERS: &'static [&'static str] = &[
        "lat_e7",
        "lon_e7",
        "address",
        "name",
        "place_id",
        "start_timestamp",
        "end_timestamp",
        "confidence",
    ];
}

#[derive(Clone, Copy, Debug)]
pub struct ExportOptions {
    pub delimiter: u8,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

/// Writes a header row and one row per record; absent values are left empty.
/// Returns the number of records written.
pub fn write_rows<T: Row, W: Write>(writer: W, rows: &[T], options: ExportOptions) -> csv::Result<usize> {
    // headers are written by hand so that an empty export still has them
    let mut csv = csv::WriterBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(false)
        .from_writer(writer);
    csv.write_record(T::HEADERS)?;
    for row in rows {
        csv.serialize(row)?;
    }
    csv.flush()?;
    Ok(rows.len())
}

pub fn export_to_path<T: Row>(path: &Path, rows: &[T], options: ExportOptions) -> csv::Result<usize> {
    let file = std::fs::File::create(path)?;
    write_rows(std::io::BufWriter::new(file), rows, options)
}
