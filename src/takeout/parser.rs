use std::io::Read;

use clap::ValueEnum;
use serde_json::Value;
use tracing::warn;

use super::data::{ActivitySegment, FileRecords, PlaceVisit, SkippedRecord};
use super::json::{JsonDocument, SEGMENT_MARKER, VISIT_MARKER};
use crate::error::{Result, TakeoutError};

/// what to do with a record that is neither an activity segment nor a place visit
#[derive(PartialEq, Eq, Copy, Clone, Debug, Default, ValueEnum)]
pub enum RecordPolicy {
    /// fail the whole parse
    #[default]
    Strict,
    /// skip the record and keep going
    Lenient,
}

/// one timeline record after classification
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Segment(ActivitySegment),
    Visit(PlaceVisit),
    /// neither marker present; holds the keys the record had
    Unrecognized(Vec<String>),
}

/// Classifies a raw `timelineObjects` element and extracts its entity.
///
/// Absent fields become `None`; only a present value of the wrong type is an error.
pub fn parse_record(record: Value) -> serde_json::Result<Record> {
    let mut map = match record {
        Value::Object(map) => map,
        _ => return Ok(Record::Unrecognized(Vec::new())),
    };

    if let Some(segment) = map.remove(SEGMENT_MARKER) {
        Ok(Record::Segment(ActivitySegment::from_json(
            serde_json::from_value(segment)?,
        )))
    } else if let Some(visit) = map.remove(VISIT_MARKER) {
        Ok(Record::Visit(PlaceVisit::from_json(serde_json::from_value(
            visit,
        )?)))
    } else {
        Ok(Record::Unrecognized(map.keys().cloned().collect()))
    }
}

/// Parses a Semantic Location History JSON stream. `file` names the stream in errors.
pub fn parse_history_file(file: &str, reader: impl Read, policy: RecordPolicy) -> Result<FileRecords> {
    let document = serde_json::from_reader(reader).map_err(|e| decode_error(file, e))?;
    parse_document(file, document, policy)
}

/// same as [`parse_history_file`] for a body that has already been read into memory
pub fn parse_history_slice(file: &str, body: &[u8], policy: RecordPolicy) -> Result<FileRecords> {
    let document = serde_json::from_slice(body).map_err(|e| decode_error(file, e))?;
    parse_document(file, document, policy)
}

fn decode_error(file: &str, e: serde_json::Error) -> TakeoutError {
    if e.is_io() {
        TakeoutError::io(file, e.into())
    } else {
        TakeoutError::MalformedFile {
            file: file.to_owned(),
            reason: e.to_string(),
        }
    }
}

fn parse_document(file: &str, document: JsonDocument, policy: RecordPolicy) -> Result<FileRecords> {
    let mut records = FileRecords::default();
    for (index, record) in document.timeline_objects.into_iter().enumerate() {
        let record = parse_record(record).map_err(|e| TakeoutError::MalformedFile {
            file: file.to_owned(),
            reason: format!("record {index}: {e}"),
        })?;
        match record {
            Record::Segment(segment) => records.activities.push(segment),
            Record::Visit(visit) => records.places.push(visit),
            Record::Unrecognized(keys) => match policy {
                RecordPolicy::Strict => {
                    return Err(TakeoutError::UnrecognizedRecord {
                        file: file.to_owned(),
                        index,
                        keys,
                    })
                }
                RecordPolicy::Lenient => {
                    warn!(file, index, ?keys, "skipping unrecognized record");
                    records.skipped.push(SkippedRecord {
                        file: file.to_owned(),
                        index,
                        keys,
                    });
                }
            },
        }
    }
    Ok(records)
}
