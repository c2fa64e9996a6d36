// this file contains type/data definitions for internal use

use serde::Serialize;

use super::json::{JsonActivitySegment, JsonDuration, JsonLocation, JsonPlaceVisit};

/// this is a flat, cleaner version of the raw `activitySegment` record (in json.rs)
///
/// coordinates stay fixed-point (degrees * 1E7) and timestamps stay as the
/// strings Takeout wrote; any field may be absent
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ActivitySegment {
    pub start_lat_e7: Option<i64>,
    pub start_lon_e7: Option<i64>,
    pub end_lat_e7: Option<i64>,
    pub end_lon_e7: Option<i64>,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    pub distance: Option<i64>,
    pub activity_type: Option<String>,
    pub confidence: Option<String>,
    /// travel distance in meters, taken from the most precise path present
    pub travel_distance: Option<f64>,
}

impl ActivitySegment {
    pub fn from_json(json: JsonActivitySegment) -> Self {
        let travel_distance = travel_distance(&json);
        let (start_lat_e7, start_lon_e7) = coordinates(json.start_location.as_ref());
        let (end_lat_e7, end_lon_e7) = coordinates(json.end_location.as_ref());
        let (start_timestamp, end_timestamp) = timestamps(json.duration);

        ActivitySegment {
            start_lat_e7,
            start_lon_e7,
            end_lat_e7,
            end_lon_e7,
            start_timestamp,
            end_timestamp,
            distance: json.distance,
            activity_type: json.activity_type,
            confidence: json.confidence,
            travel_distance,
        }
    }
}

/// waypoint path beats transit path beats simplified raw path.
/// The first path present decides, even when it carries no distance.
fn travel_distance(json: &JsonActivitySegment) -> Option<f64> {
    if let Some(path) = &json.waypoint_path {
        path.distance_meters
    } else if let Some(path) = &json.transit_path {
        path.distance_meters
    } else if let Some(path) = &json.simplified_raw_path {
        path.distance_meters
    } else {
        None
    }
}

/// this is a flat, cleaner version of the raw `placeVisit` record (in json.rs)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlaceVisit {
    pub lat_e7: Option<i64>,
    pub lon_e7: Option<i64>,
    /// free text, usually containing commas; left as-is for the exporter to quote
    pub address: Option<String>,
    pub name: Option<String>,
    pub place_id: Option<String>,
    pub start_timestamp: Option<String>,
    pub end_timestamp: Option<String>,
    pub confidence: Option<String>,
}

impl PlaceVisit {
    pub fn from_json(json: JsonPlaceVisit) -> Self {
        let (lat_e7, lon_e7) = coordinates(json.location.as_ref());
        let (start_timestamp, end_timestamp) = timestamps(json.duration);
        let location = json.location.unwrap_or_default();

        PlaceVisit {
            lat_e7,
            lon_e7,
            address: location.address,
            name: location.name,
            place_id: location.place_id,
            start_timestamp,
            end_timestamp,
            confidence: json.place_confidence,
        }
    }
}

fn coordinates(location: Option<&JsonLocation>) -> (Option<i64>, Option<i64>) {
    match location {
        Some(l) => (l.latitude, l.longitude),
        None => (None, None),
    }
}

fn timestamps(duration: Option<JsonDuration>) -> (Option<String>, Option<String>) {
    match duration {
        Some(d) => (d.start_timestamp, d.end_timestamp),
        None => (None, None),
    }
}

/// a record that matched neither marker, kept when parsing leniently
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRecord {
    /// archive-relative path of the period file
    pub file: String,
    /// position of the record within `timelineObjects`
    pub index: usize,
    /// top-level keys the record did have
    pub keys: Vec<String>,
}

/// everything extracted from one takeout, in discovery order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TakeoutData {
    pub activities: Vec<ActivitySegment>,
    pub places: Vec<PlaceVisit>,
    pub skipped: Vec<SkippedRecord>,
    pub num_files: usize,
}

/// the entities found in a single period file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileRecords {
    pub activities: Vec<ActivitySegment>,
    pub places: Vec<PlaceVisit>,
    pub skipped: Vec<SkippedRecord>,
}

impl TakeoutData {
    /// appends one parsed file and counts it
    pub(crate) fn merge(&mut self, file: FileRecords) {
        self.activities.extend(file.activities);
        self.places.extend(file.places);
        self.skipped.extend(file.skipped);
        self.num_files += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty() && self.places.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::takeout::json::JsonPath;

    fn path(distance: Option<f64>) -> Option<JsonPath> {
        Some(JsonPath {
            distance_meters: distance,
        })
    }

    #[test]
    fn waypoint_distance_wins_over_other_paths() {
        let json = JsonActivitySegment {
            waypoint_path: path(Some(1.0)),
            transit_path: path(Some(2.0)),
            simplified_raw_path: path(Some(3.0)),
            ..Default::default()
        };
        assert_eq!(ActivitySegment::from_json(json).travel_distance, Some(1.0));
    }

    #[test]
    fn transit_distance_wins_over_simplified_raw_path() {
        let json = JsonActivitySegment {
            transit_path: path(Some(2.0)),
            simplified_raw_path: path(Some(3.0)),
            ..Default::default()
        };
        assert_eq!(ActivitySegment::from_json(json).travel_distance, Some(2.0));
    }

    #[test]
    fn present_path_without_distance_does_not_fall_through() {
        let json = JsonActivitySegment {
            waypoint_path: path(None),
            simplified_raw_path: path(Some(3.0)),
            ..Default::default()
        };
        assert_eq!(ActivitySegment::from_json(json).travel_distance, None);
    }

    #[test]
    fn empty_segment_is_all_none() {
        let segment = ActivitySegment::from_json(JsonActivitySegment::default());
        assert_eq!(segment.start_lat_e7, None);
        assert_eq!(segment.end_lon_e7, None);
        assert_eq!(segment.start_timestamp, None);
        assert_eq!(segment.travel_distance, None);
    }

    #[test]
    fn visit_without_location_keeps_duration() {
        let json = JsonPlaceVisit {
            duration: Some(JsonDuration {
                start_timestamp: Some("2023-01-01T10:00:00Z".to_owned()),
                end_timestamp: None,
            }),
            ..Default::default()
        };
        let visit = PlaceVisit::from_json(json);
        assert_eq!(visit.lat_e7, None);
        assert_eq!(visit.address, None);
        assert_eq!(visit.start_timestamp.as_deref(), Some("2023-01-01T10:00:00Z"));
        assert_eq!(visit.end_timestamp, None);
    }

    #[test]
    fn merge_counts_files_even_when_empty() {
        let mut data = TakeoutData::default();
        data.merge(FileRecords::default());
        assert_eq!(data.num_files, 1);
        assert!(data.is_empty());
    }
}
