//! One view over the two forms a takeout arrives in: the downloaded zip and the
//! extracted directory tree.
//!
//! Entries are addressed by `/`-separated paths relative to the takeout root, the
//! way zip entry names are written. The empty path is the root itself.

use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufReader, Read, Seek};
use std::path::{Path, PathBuf};

use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::{Result, TakeoutError};

pub trait Storage {
    /// paths of the direct children of the directory at `path`
    fn list_children(&self, path: &str) -> Result<Vec<String>>;

    /// opens the file at `path`; the stream is released when the returned reader is dropped
    fn open_for_read(&mut self, path: &str) -> Result<Box<dyn Read + '_>>;

    fn is_directory(&self, path: &str) -> bool;
}

/// joins an entry path and a child name
pub fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_owned()
    } else {
        format!("{parent}/{child}")
    }
}

fn not_a_directory(path: &str) -> TakeoutError {
    TakeoutError::io(
        path,
        io::Error::new(io::ErrorKind::NotFound, "not a directory"),
    )
}

/// takeout still packed in its zip container
pub struct ZipStorage<R> {
    archive: ZipArchive<R>,
}

impl<R: Read + Seek> ZipStorage<R> {
    pub fn new(reader: R) -> std::result::Result<Self, ZipError> {
        Ok(ZipStorage {
            archive: ZipArchive::new(reader)?,
        })
    }

    fn dir_prefix(path: &str) -> String {
        if path.is_empty() {
            String::new()
        } else {
            format!("{}/", path.trim_end_matches('/'))
        }
    }
}

impl<R: Read + Seek> Storage for ZipStorage<R> {
    fn list_children(&self, path: &str) -> Result<Vec<String>> {
        if !self.is_directory(path) {
            return Err(not_a_directory(path));
        }
        let prefix = Self::dir_prefix(path);
        // zips don't always carry explicit directory entries, so directories are
        // inferred from the names of the files below them
        let children: BTreeSet<&str> = self
            .archive
            .file_names()
            .filter_map(|name| name.strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split('/').next())
            .filter(|child| !child.is_empty())
            .collect();
        Ok(children.into_iter().map(|c| join(path, c)).collect())
    }

    fn open_for_read(&mut self, path: &str) -> Result<Box<dyn Read + '_>> {
        match self.archive.by_name(path) {
            Ok(file) => Ok(Box::new(file)),
            Err(e) => Err(TakeoutError::io(path, io::Error::from(e))),
        }
    }

    fn is_directory(&self, path: &str) -> bool {
        if path.is_empty() {
            return true;
        }
        let prefix = Self::dir_prefix(path);
        self.archive
            .file_names()
            .any(|name| name.starts_with(prefix.as_str()))
    }
}

/// takeout already extracted to a directory
pub struct DirStorage {
    root: PathBuf,
}

impl DirStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirStorage { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        path.split('/')
            .filter(|c| !c.is_empty())
            .fold(self.root.clone(), |p, c| p.join(c))
    }
}

impl Storage for DirStorage {
    fn list_children(&self, path: &str) -> Result<Vec<String>> {
        if !self.is_directory(path) {
            return Err(not_a_directory(path));
        }
        let entries = fs::read_dir(self.resolve(path)).map_err(|e| TakeoutError::io(path, e))?;
        let mut children = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| TakeoutError::io(path, e))?;
            children.push(join(path, &entry.file_name().to_string_lossy()));
        }
        Ok(children)
    }

    fn open_for_read(&mut self, path: &str) -> Result<Box<dyn Read + '_>> {
        let file = fs::File::open(self.resolve(path)).map_err(|e| TakeoutError::io(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn is_directory(&self, path: &str) -> bool {
        self.resolve(path).is_dir()
    }
}

/// picks the backend for `root`: a directory is read in place, anything else must be a zip
pub fn open_storage(root: &Path) -> Result<Box<dyn Storage>> {
    if root.is_dir() {
        debug!(root = %root.display(), "reading extracted takeout directory");
        return Ok(Box::new(DirStorage::new(root)));
    }

    let invalid = |reason: String| TakeoutError::InvalidArchive {
        path: root.to_path_buf(),
        reason,
    };
    let file = fs::File::open(root).map_err(|e| invalid(e.to_string()))?;
    let storage = ZipStorage::new(BufReader::new(file)).map_err(|e| invalid(e.to_string()))?;
    debug!(root = %root.display(), "reading zipped takeout");
    Ok(Box::new(storage))
}
