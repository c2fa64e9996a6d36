//! Flattens the Semantic Location History of a Google Takeout (zipped or extracted)
//! into activity segments and place visits, ready for tabular export.

pub mod error;
pub mod export;
pub mod takeout;

pub use error::{Result, TakeoutError};
pub use takeout::{
    read_takeout, ActivitySegment, ParseOptions, PlaceVisit, RecordPolicy, TakeoutData,
};
