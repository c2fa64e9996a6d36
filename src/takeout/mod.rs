//! Reading the Semantic Location History out of a Google Takeout.

pub mod data;
pub mod json;
pub mod locator;
pub mod parser;
pub mod reader;
pub mod storage;

pub use data::{ActivitySegment, FileRecords, PlaceVisit, SkippedRecord, TakeoutData};
pub use locator::{find_data_paths, HISTORY_PATH};
pub use parser::{parse_history_file, parse_history_slice, parse_record, Record, RecordPolicy};
pub use reader::{read_storage, read_takeout, ParseOptions};
pub use storage::{open_storage, DirStorage, Storage, ZipStorage};
