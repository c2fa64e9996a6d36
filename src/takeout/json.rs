// this file contains definitions for the JSON types encountered in the Semantic Location History files
//
// every field is optional: Takeout populates these objects inconsistently, and a
// missing key must decode to `None` rather than fail. Only a present value of the
// wrong type is a decode error.

use serde::Deserialize;
use serde_json::Value;

/// record key marking a movement record
pub const SEGMENT_MARKER: &str = "activitySegment";
/// record key marking a stay record
pub const VISIT_MARKER: &str = "placeVisit";

/// one `<period>/<file>.json` document
///
/// records are kept as raw values so that an unrecognized record can be reported
/// (or skipped) on its own instead of failing the whole document
#[derive(Deserialize)]
pub struct JsonDocument {
    #[serde(rename(deserialize = "timelineObjects"))]
    pub timeline_objects: Vec<Value>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonActivitySegment {
    pub start_location: Option<JsonLocation>,
    pub end_location: Option<JsonLocation>,
    pub duration: Option<JsonDuration>,
    pub distance: Option<i64>,
    pub activity_type: Option<String>,
    pub confidence: Option<String>,
    pub waypoint_path: Option<JsonPath>,
    pub transit_path: Option<JsonPath>,
    pub simplified_raw_path: Option<JsonPath>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonPlaceVisit {
    pub location: Option<JsonLocation>,
    pub duration: Option<JsonDuration>,
    pub place_confidence: Option<String>,
}

/// shared by `startLocation`/`endLocation` and the visit's `location`;
/// segment locations never carry the address fields
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonLocation {
    #[serde(rename(deserialize = "latitudeE7"))]
    pub latitude: Option<i64>,
    #[serde(rename(deserialize = "longitudeE7"))]
    pub longitude: Option<i64>,
    pub address: Option<String>,
    pub name: Option<String>,
    pub place_id: Option<String>,
}

#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonDuration {
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
}

/// `waypointPath`, `transitPath` and `simplifiedRawPath` all report a distance the same way
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct JsonPath {
    pub distance_meters: Option<f64>,
}
