/// Maximum number of corpora (and therefore worker processes) per query run.
pub const MAX_WORKERS: usize = 10;

/// Maximum number of ranked records printed for a single query word.
pub const MAX_RECORDS: usize = 100;

/// Size of one query buffer on the query channel, NUL padded.
pub const MAX_WORD: usize = 32;

/// Size of the filename field in one wire record, NUL padded.
pub const PATH_LENGTH: usize = 128;

/// Pool-level caps carried through the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_workers: usize,
    pub max_records: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_workers: MAX_WORKERS,
            max_records: MAX_RECORDS,
        }
    }
}
