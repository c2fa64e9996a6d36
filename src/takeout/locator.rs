use tracing::debug;

use super::storage::{join, Storage};
use crate::error::{Result, TakeoutError};

/// where the per-period files live, relative to the takeout root
pub const HISTORY_PATH: [&str; 3] = ["Takeout", "Location History", "Semantic Location History"];

/// Given the root of the takeout, returns every period file below
/// `Takeout/Location History/Semantic Location History/<period>/`.
///
/// Backends list entries in whatever order they like, so the result is sorted by
/// period and then by file name. Entries that are not `.json` files inside a period
/// directory are skipped.
pub fn find_data_paths(storage: &dyn Storage) -> Result<Vec<String>> {
    let history_path = HISTORY_PATH.iter().fold(String::new(), |p, c| join(&p, c));
    if !storage.is_directory(&history_path) {
        return Err(TakeoutError::MissingDataDirectory(history_path));
    }

    let mut periods = storage.list_children(&history_path)?;
    periods.sort();

    let mut paths = Vec::new();
    for period in periods {
        if !storage.is_directory(&period) {
            debug!(%period, "skipping non-directory entry in history directory");
            continue;
        }
        let mut files = storage.list_children(&period)?;
        files.sort();
        for file in files {
            if !file.ends_with(".json") || storage.is_directory(&file) {
                debug!(%file, "skipping non-data entry");
                continue;
            }
            paths.push(file);
        }
    }
    Ok(paths)
}
