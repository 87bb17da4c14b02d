use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Version-control directories that never hold a corpus.
const METADATA_DIRS: &[&str] = &[".git", ".svn"];

/// One indexed subdirectory of the root, served by one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RootDir {
    root: PathBuf,
}

impl RootDir {
    /// Resolve the root directory from, in order of priority:
    /// 1. An explicit path (from -d/--dir)
    /// 2. The WORDFREQ_ROOT environment variable
    /// 3. The current directory
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        let root = if let Some(path) = explicit {
            path.to_path_buf()
        } else if let Ok(val) = std::env::var("WORDFREQ_ROOT") {
            PathBuf::from(val)
        } else {
            PathBuf::from(".")
        };

        if !root.is_dir() {
            return Err(Error::RootDir(root));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// List the corpus subdirectories, one per future worker.
    ///
    /// Metadata directories and plain files are skipped; symlinks are
    /// followed. Fails with [`Error::TooManyWorkers`] as soon as one more
    /// directory than `capacity` is seen, so no worker is ever started for
    /// an oversized root. The result is sorted by name.
    pub fn corpora(&self, capacity: usize) -> Result<Vec<Corpus>> {
        let entries = std::fs::read_dir(&self.root)
            .map_err(|_| Error::RootDir(self.root.clone()))?;

        let mut found = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if METADATA_DIRS.contains(&name.as_str()) {
                continue;
            }

            let path = entry.path();
            if !std::fs::metadata(&path)?.is_dir() {
                continue;
            }

            if found.len() >= capacity {
                return Err(Error::TooManyWorkers { capacity });
            }
            found.push(Corpus { name, path });
        }

        found.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(found)
    }
}
