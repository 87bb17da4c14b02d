use std::{
    collections::HashMap,
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    limits::PATH_LENGTH,
    protocol::ResultRecord,
};

/// Name of the word-frequency table inside a corpus directory.
pub const INDEX_FILE: &str = "index";

/// Name of the file registry inside a corpus directory.
pub const FILENAMES_FILE: &str = "filenames";

/// One word's per-file occurrence counts, in file-registry order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub word: String,
    pub frequencies: Vec<u32>,
}

impl IndexEntry {
    pub fn new(word: impl Into<String>, frequencies: Vec<u32>) -> Self {
        Self {
            word: word.into(),
            frequencies,
        }
    }
}

/// The loaded index of one corpus.
///
/// On disk a corpus directory holds two files:
/// - `filenames`: one filename per line, in registry order
/// - `index`: a JSON array of `{"word": ..., "frequencies": [...]}`
///
/// Every entry carries exactly one frequency slot per registered file.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    files: Vec<String>,
    entries: Vec<IndexEntry>,
    positions: HashMap<String, usize>,
}

impl WordIndex {
    /// Build an index from an in-memory registry and entry list.
    ///
    /// # Examples
    ///
    /// ```
    /// use wordfreq::index::{IndexEntry, WordIndex};
    ///
    /// let index = WordIndex::new(
    ///     vec!["f1".into(), "f2".into()],
    ///     vec![IndexEntry::new("apple", vec![0, 4])],
    /// )
    /// .unwrap();
    ///
    /// let records = index.lookup("apple");
    /// assert_eq!(records.len(), 2);
    /// assert_eq!(records[0].filename, "f2");
    /// assert!(records[1].is_terminator());
    /// ```
    pub fn new(files: Vec<String>, entries: Vec<IndexEntry>) -> Result<Self> {
        check(&files, &entries).map_err(Error::Config)?;
        Ok(Self::assemble(files, entries))
    }

    /// Load the index stored in a corpus directory.
    pub fn load(dir: &Path) -> Result<Self> {
        let filenames_path = dir.join(FILENAMES_FILE);
        let index_path = dir.join(INDEX_FILE);

        let mut files: Vec<String> = std::fs::read_to_string(&filenames_path)
            .map_err(|e| index_error(&filenames_path, e))?
            .lines()
            .map(str::to_string)
            .collect();
        while files.last().is_some_and(|f| f.is_empty()) {
            files.pop();
        }

        let reader = File::open(&index_path)
            .map(BufReader::new)
            .map_err(|e| index_error(&index_path, e))?;
        let entries: Vec<IndexEntry> = serde_json::from_reader(reader)
            .map_err(|e| index_error(&index_path, e))?;

        check(&files, &entries).map_err(|detail| Error::Index {
            path: dir.to_path_buf(),
            detail,
        })?;

        tracing::debug!(
            corpus = %dir.display(),
            files = files.len(),
            words = entries.len(),
            "loaded index"
        );

        Ok(Self::assemble(files, entries))
    }

    /// Write this index into a corpus directory, replacing any previous one.
    pub fn save(&self, dir: &Path) -> Result<()> {
        let mut filenames =
            BufWriter::new(File::create(dir.join(FILENAMES_FILE))?);
        for name in &self.files {
            writeln!(filenames, "{name}")?;
        }
        filenames.flush()?;

        let mut index = BufWriter::new(File::create(dir.join(INDEX_FILE))?);
        serde_json::to_writer(&mut index, &self.entries)?;
        index.flush()?;
        Ok(())
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn get(&self, word: &str) -> Option<&IndexEntry> {
        self.positions.get(word).map(|&pos| &self.entries[pos])
    }

    /// Report every file containing `word`, in registry order.
    ///
    /// Matching is exact: case-sensitive, no trimming. Files with a zero
    /// count are skipped. The returned records always end with the
    /// terminator, which is the only record when the word is unknown.
    pub fn lookup(&self, word: &str) -> Vec<ResultRecord> {
        let mut records: Vec<ResultRecord> = match self.get(word) {
            Some(entry) => entry
                .frequencies
                .iter()
                .zip(&self.files)
                .filter(|(freq, _)| **freq > 0)
                .map(|(&freq, name)| ResultRecord::new(freq, name.as_str()))
                .collect(),
            None => Vec::with_capacity(1),
        };
        records.push(ResultRecord::terminator());
        records
    }

    fn assemble(files: Vec<String>, entries: Vec<IndexEntry>) -> Self {
        let mut positions = HashMap::with_capacity(entries.len());
        for (pos, entry) in entries.iter().enumerate() {
            // First occurrence wins for duplicated words.
            positions.entry(entry.word.clone()).or_insert(pos);
        }
        Self {
            files,
            entries,
            positions,
        }
    }
}

fn check(
    files: &[String],
    entries: &[IndexEntry],
) -> std::result::Result<(), String> {
    for name in files {
        if name.is_empty() {
            return Err("empty filename in registry".to_string());
        }
        if name.len() >= PATH_LENGTH {
            return Err(format!(
                "filename longer than {} bytes: {name}",
                PATH_LENGTH - 1
            ));
        }
    }

    for entry in entries {
        if entry.frequencies.len() != files.len() {
            return Err(format!(
                "word '{}' has {} frequency slots for {} files",
                entry.word,
                entry.frequencies.len(),
                files.len()
            ));
        }
    }

    Ok(())
}

fn index_error(path: &Path, err: impl std::fmt::Display) -> Error {
    Error::Index {
        path: path.to_path_buf(),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// f1 has apple once; f2 has apple twice and orange four times; f3 has
    /// apple three times, orange five times and banana six times.
    fn fruit_index() -> WordIndex {
        WordIndex::new(
            vec!["f1".into(), "f2".into(), "f3".into()],
            vec![
                IndexEntry::new("apple", vec![1, 2, 3]),
                IndexEntry::new("orange", vec![0, 4, 5]),
                IndexEntry::new("banana", vec![0, 0, 6]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn lookup_reports_every_nonzero_slot_in_registry_order() {
        let index = fruit_index();
        assert_eq!(
            index.lookup("apple"),
            vec![
                ResultRecord::new(1, "f1"),
                ResultRecord::new(2, "f2"),
                ResultRecord::new(3, "f3"),
                ResultRecord::terminator(),
            ]
        );
    }

    #[test]
    fn lookup_skips_zero_counts() {
        let index = fruit_index();
        assert_eq!(
            index.lookup("orange"),
            vec![
                ResultRecord::new(4, "f2"),
                ResultRecord::new(5, "f3"),
                ResultRecord::terminator(),
            ]
        );
        assert_eq!(
            index.lookup("banana"),
            vec![ResultRecord::new(6, "f3"), ResultRecord::terminator()]
        );
    }

    #[test]
    fn unknown_words_get_only_the_terminator() {
        let index = fruit_index();
        for word in ["few", "gone", "APPLE", "Banana", "banana\n", " apple", ""]
        {
            assert_eq!(
                index.lookup(word),
                vec![ResultRecord::terminator()],
                "word {word:?}"
            );
        }
    }

    #[test]
    fn all_zero_entry_gets_only_the_terminator() {
        let index = WordIndex::new(
            vec!["f1".into()],
            vec![IndexEntry::new("ghost", vec![0])],
        )
        .unwrap();
        assert_eq!(index.lookup("ghost"), vec![ResultRecord::terminator()]);
    }

    #[test]
    fn duplicate_word_keeps_first_entry() {
        let index = WordIndex::new(
            vec!["f1".into()],
            vec![
                IndexEntry::new("kiwi", vec![2]),
                IndexEntry::new("kiwi", vec![9]),
            ],
        )
        .unwrap();
        assert_eq!(index.lookup("kiwi")[0], ResultRecord::new(2, "f1"));
    }

    #[test]
    fn rejects_misaligned_frequencies() {
        let err = WordIndex::new(
            vec!["f1".into(), "f2".into()],
            vec![IndexEntry::new("apple", vec![1])],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_oversized_filename() {
        let err = WordIndex::new(vec!["x".repeat(PATH_LENGTH)], vec![])
            .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        fruit_index().save(tmp.path()).unwrap();

        let loaded = WordIndex::load(tmp.path()).unwrap();
        assert_eq!(loaded.files(), ["f1", "f2", "f3"]);
        assert_eq!(loaded.entries().len(), 3);
        assert_eq!(loaded.lookup("orange"), fruit_index().lookup("orange"));
    }

    #[test]
    fn load_ignores_trailing_blank_lines() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(FILENAMES_FILE), "a.txt\nb.txt\n\n")
            .unwrap();
        std::fs::write(
            tmp.path().join(INDEX_FILE),
            r#"[{"word":"fig","frequencies":[0,3]}]"#,
        )
        .unwrap();

        let index = WordIndex::load(tmp.path()).unwrap();
        assert_eq!(index.files().len(), 2);
        assert_eq!(index.lookup("fig")[0], ResultRecord::new(3, "b.txt"));
    }

    #[test]
    fn load_reports_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let err = WordIndex::load(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Index { .. }));
    }

    #[test]
    fn load_reports_bad_json() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(FILENAMES_FILE), "a.txt\n").unwrap();
        std::fs::write(tmp.path().join(INDEX_FILE), "not json").unwrap();

        let err = WordIndex::load(tmp.path()).unwrap_err();
        assert!(matches!(err, Error::Index { .. }));
    }
}
