use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use super::data::TakeoutData;
use super::locator::find_data_paths;
use super::parser::RecordPolicy;
use super::storage::{open_storage, Storage};
use crate::error::{Result, TakeoutError};

#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    pub policy: RecordPolicy,
    /// files parsed at once; 0 or 1 reads strictly one file at a time.
    /// Only honoured with the `parallel` feature.
    pub jobs: usize,
    /// checked between files; setting it stops the run with [`TakeoutError::Cancelled`]
    pub cancel: Option<Arc<AtomicBool>>,
}

impl ParseOptions {
    pub fn with_policy(policy: RecordPolicy) -> Self {
        ParseOptions {
            policy,
            ..Default::default()
        }
    }

    fn check_cancelled(&self, files_done: usize) -> Result<()> {
        match &self.cancel {
            Some(flag) if flag.load(Ordering::Relaxed) => Err(TakeoutError::Cancelled { files_done }),
            _ => Ok(()),
        }
    }
}

/// Reads the takeout at `path`, zipped or extracted.
pub fn read_takeout(path: &Path, options: &ParseOptions) -> Result<TakeoutData> {
    let mut storage = open_storage(path)?;
    read_storage(storage.as_mut(), options)
}

/// Parses every period file in `storage`, in sorted discovery order.
///
/// Any structural failure aborts the run; no partial result is returned.
pub fn read_storage(storage: &mut dyn Storage, options: &ParseOptions) -> Result<TakeoutData> {
    let paths = find_data_paths(storage)?;
    debug!(files = paths.len(), "found history files");

    #[cfg(feature = "parallel")]
    let takeout = if options.jobs > 1 {
        read_parallel(storage, &paths, options)?
    } else {
        read_sequential(storage, &paths, options)?
    };
    #[cfg(not(feature = "parallel"))]
    let takeout = read_sequential(storage, &paths, options)?;

    info!(
        files = takeout.num_files,
        activities = takeout.activities.len(),
        places = takeout.places.len(),
        skipped = takeout.skipped.len(),
        "parsed takeout"
    );
    Ok(takeout)
}

fn read_sequential(storage: &mut dyn Storage, paths: &[String], options: &ParseOptions) -> Result<TakeoutData> {
    let mut takeout = TakeoutData::default();
    for path in paths {
        options.check_cancelled(takeout.num_files)?;
        debug!(%path, "parsing history file");
        // the entry is closed at the end of this statement, also on error
        let records = super::parser::parse_history_file(path, storage.open_for_read(path)?, options.policy)?;
        takeout.merge(records);
    }
    Ok(takeout)
}

/// Reads file bodies one at a time (the zip reader has a single owner) and parses
/// them on a bounded rayon pool. Results are merged in discovery order.
#[cfg(feature = "parallel")]
fn read_parallel(storage: &mut dyn Storage, paths: &[String], options: &ParseOptions) -> Result<TakeoutData> {
    use rayon::prelude::*;
    use std::io::Read;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.jobs)
        .build()
        .map_err(|e| TakeoutError::io("<thread pool>", std::io::Error::new(std::io::ErrorKind::Other, e)))?;

    let mut takeout = TakeoutData::default();
    // one batch of `jobs` files in memory at a time
    for batch in paths.chunks(options.jobs) {
        options.check_cancelled(takeout.num_files)?;
        let mut bodies = Vec::with_capacity(batch.len());
        for path in batch {
            let mut body = Vec::new();
            storage
                .open_for_read(path)?
                .read_to_end(&mut body)
                .map_err(|e| TakeoutError::io(path.as_str(), e))?;
            bodies.push(body);
        }

        let parsed: Vec<_> = pool.install(|| {
            batch
                .par_iter()
                .zip(bodies.par_iter())
                .map(|(path, body)| super::parser::parse_history_slice(path, body, options.policy))
                .collect()
        });
        for records in parsed {
            takeout.merge(records?);
        }
    }
    Ok(takeout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::takeout::storage::DirStorage;
    use serde_json::json;
    use std::fs;

    const ROOT: &str = "Takeout/Location History/Semantic Location History";

    fn write(dir: &Path, file: &str, body: serde_json::Value) {
        let path = dir.join(ROOT).join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body.to_string()).unwrap();
    }

    #[test]
    fn empty_file_still_counts() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2020/2020_MAY.json", json!({"timelineObjects": []}));
        write(
            dir.path(),
            "2020/2020_JUNE.json",
            json!({"timelineObjects": [{"placeVisit": {}}]}),
        );

        let takeout = read_takeout(dir.path(), &ParseOptions::default()).unwrap();
        assert_eq!(takeout.num_files, 2);
        assert_eq!(takeout.places.len(), 1);
        assert!(takeout.activities.is_empty());
    }

    #[test]
    fn records_follow_sorted_file_order() {
        let dir = tempfile::tempdir().unwrap();
        for (file, name) in [("2021/b.json", "third"), ("2020/z.json", "second"), ("2020/a.json", "first")] {
            write(
                dir.path(),
                file,
                json!({"timelineObjects": [{"placeVisit": {"location": {"name": name}}}]}),
            );
        }

        let takeout = read_takeout(dir.path(), &ParseOptions::default()).unwrap();
        let names: Vec<_> = takeout.places.iter().filter_map(|p| p.name.as_deref()).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn malformed_file_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2020/a.json", json!({"timelineObjects": []}));
        write(dir.path(), "2020/b.json", json!({"unexpected": true}));
        assert!(matches!(
            read_takeout(dir.path(), &ParseOptions::with_policy(RecordPolicy::Lenient)),
            Err(TakeoutError::MalformedFile { .. })
        ));
    }

    #[test]
    fn lenient_run_collects_skipped_records() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "2020/a.json",
            json!({"timelineObjects": [{"mystery": 1}, {"activitySegment": {}}]}),
        );
        let takeout = read_takeout(dir.path(), &ParseOptions::with_policy(RecordPolicy::Lenient)).unwrap();
        assert_eq!(takeout.activities.len(), 1);
        assert_eq!(takeout.skipped.len(), 1);
        assert_eq!(takeout.skipped[0].file, format!("{ROOT}/2020/a.json"));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn parallel_run_matches_sequential_run() {
        let dir = tempfile::tempdir().unwrap();
        for month in 1..=12 {
            write(
                dir.path(),
                &format!("2022/2022_{month:02}.json"),
                json!({"timelineObjects": [
                    {"activitySegment": {"distance": month}},
                    {"placeVisit": {"location": {"placeId": format!("p{month}")}}}
                ]}),
            );
        }

        let sequential = read_takeout(dir.path(), &ParseOptions::default()).unwrap();
        let parallel = read_takeout(
            dir.path(),
            &ParseOptions {
                jobs: 4,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(sequential, parallel);
        assert_eq!(parallel.activities[11].distance, Some(12));
    }

    #[test]
    fn cancel_flag_stops_between_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "2020/a.json", json!({"timelineObjects": []}));
        let options = ParseOptions {
            cancel: Some(Arc::new(AtomicBool::new(true))),
            ..Default::default()
        };
        let mut storage = DirStorage::new(dir.path());
        assert!(matches!(
            read_storage(&mut storage, &options),
            Err(TakeoutError::Cancelled { files_done: 0 })
        ));
    }
}
