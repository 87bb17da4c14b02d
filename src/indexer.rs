use std::{
    collections::{BTreeMap, HashMap},
    path::{Path, PathBuf},
};

use globset::{Glob, GlobMatcher};
use rayon::prelude::*;

use crate::{
    error::{Error, Result},
    index::{FILENAMES_FILE, INDEX_FILE, IndexEntry, WordIndex},
    limits::{MAX_WORD, PATH_LENGTH},
};

/// A file selected for indexing.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// Path relative to the corpus directory; this is the registry name.
    pub relative_path: PathBuf,
    /// Path used to read the file.
    pub absolute_path: PathBuf,
}

/// Build the index of `dir` and store it there.
pub fn index_directory(dir: &Path, include: &str) -> Result<WordIndex> {
    let index = build_index(dir, include)?;
    index.save(dir)?;
    tracing::info!(
        corpus = %dir.display(),
        files = index.files().len(),
        words = index.entries().len(),
        "wrote index"
    );
    Ok(index)
}

/// Count the words of every matching file under `dir`.
///
/// Files are read in parallel. Unreadable files and files whose relative
/// path does not fit a wire record are left out with a warning; words too
/// long to ever be queried are dropped. Entries are sorted by word.
pub fn build_index(dir: &Path, include: &str) -> Result<WordIndex> {
    let matcher = Glob::new(include)
        .map_err(|e| Error::Config(format!("invalid glob pattern: {e}")))?
        .compile_matcher();

    let files = discover_files(dir, &matcher)?;
    let counted: Vec<(String, HashMap<String, u32>)> = files
        .par_iter()
        .filter_map(|file| {
            let name = registry_name(&file.relative_path)?;
            match std::fs::read_to_string(&file.absolute_path) {
                Ok(text) => Some((name, count_words(&text))),
                Err(e) => {
                    tracing::warn!(
                        file = %name,
                        error = %e,
                        "skipping unreadable file"
                    );
                    None
                }
            }
        })
        .collect();

    let mut table: BTreeMap<String, Vec<u32>> = BTreeMap::new();
    for (slot, (_, counts)) in counted.iter().enumerate() {
        for (word, &count) in counts {
            table
                .entry(word.clone())
                .or_insert_with(|| vec![0; counted.len()])[slot] = count;
        }
    }

    let files = counted.into_iter().map(|(name, _)| name).collect();
    let entries = table
        .into_iter()
        .map(|(word, freqs)| IndexEntry::new(word, freqs))
        .collect();
    WordIndex::new(files, entries)
}

/// Split text into lowercase alphanumeric words.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}

fn count_words(text: &str) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for word in tokenize(text).filter(|w| w.len() < MAX_WORD) {
        let count: &mut u32 = counts.entry(word).or_default();
        *count = count.saturating_add(1);
    }
    counts
}

fn registry_name(relative_path: &Path) -> Option<String> {
    let name = relative_path.to_string_lossy().into_owned();
    if name.len() >= PATH_LENGTH || name.contains('\n') {
        tracing::warn!(file = %name, "skipping file with unusable name");
        return None;
    }
    Some(name)
}

/// Recursively walk a directory and collect files matching `include`.
///
/// Skips hidden files/directories (names starting with `.`) and the index
/// files of a previous run. Results are sorted by relative path, which
/// fixes the registry order.
pub fn discover_files(
    root: &Path,
    include: &GlobMatcher,
) -> Result<Vec<DiscoveredFile>> {
    let mut results = Vec::new();
    walk_dir(root, root, include, &mut results)?;
    results.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(results)
}

fn walk_dir(
    root: &Path,
    current: &Path,
    include: &GlobMatcher,
    results: &mut Vec<DiscoveredFile>,
) -> Result<()> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        let file_name = entry.file_name();
        let name = file_name.to_string_lossy();

        if name.starts_with('.') {
            continue;
        }
        if current == root && (name == INDEX_FILE || name == FILENAMES_FILE) {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_dir(root, &path, include, results)?;
        } else if file_type.is_file() {
            let relative_path =
                path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            if include.is_match(&relative_path) {
                results.push(DiscoveredFile {
                    relative_path,
                    absolute_path: path,
                });
            }
        }
    }

    Ok(())
}
